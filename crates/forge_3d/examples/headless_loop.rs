//! Headless Showcase Loop
//!
//! Drives the showcase from a timer-backed scheduler against an in-memory
//! scene, injects a few gestures and prints the diagnostics snapshot.
//!
//! Run with: cargo run -p forge_3d --example headless_loop
//! Pass a TOML file as the first argument to override the configuration.

use anyhow::{Context, Result};
use forge_3d::gesture::TouchPoints;
use forge_3d::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

const FRAMES: u32 = 600;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("reading configuration from {path}"))?;
            ShowcaseConfig::from_toml_str(&source)?
        }
        None => ShowcaseConfig::default(),
    };

    let mut scene = MemoryScene::new();
    let mut picker = RectPicker::new();
    let mut bindings = Vec::new();
    for (index, tool) in config.tools.iter().enumerate() {
        let handle = scene.spawn(tool.base_position);
        picker = picker.with_region(handle, [index as f32 * 200.0, 300.0, 180.0, 180.0]);
        bindings.push((tool.id.clone(), handle));
    }

    let probe = DeviceCapabilities::mobile;
    let mut showcase = Showcase::new(config, scene, &probe)?.with_picker(picker);
    for (id, handle) in &bindings {
        showcase.bind_entity(id, *handle);
    }
    showcase.on_tool_selected(|id| tracing::info!("selected {}", id));
    showcase
        .governor_mut()
        .on_quality_change(|change| tracing::info!("quality {} -> {} ({:?})", change.from, change.to, change.reason));

    let showcase = Rc::new(RefCell::new(showcase));
    let scheduler = AnimationScheduler::new(FrameSource::Timer { target_fps: 60 });
    let registration =
        Showcase::mount(&showcase, &scheduler.handle()).context("scheduler dropped before mount")?;
    let interval = scheduler
        .frame_interval()
        .map(|interval| interval.as_secs_f32())
        .unwrap_or(1.0 / 60.0);

    for frame in 0..FRAMES {
        let now = showcase.borrow().now_ms();
        match frame {
            60 => tap(&showcase, Vec2::new(250.0, 380.0), now),
            240 => pinch(&showcase, now),
            300 => {
                showcase.borrow_mut().handle_input(GestureInput::Voice {
                    transcript: "rotate left".to_string(),
                    time_ms: now,
                });
            }
            _ => {}
        }

        // Simulated time; frames 400..460 are reported slow to exercise the quality ladder
        let dt = if (400..460).contains(&frame) { 0.05 } else { interval };
        scheduler.advance(dt);
    }
    drop(registration);

    let showcase = showcase.borrow();
    let snapshot = showcase.governor().snapshot().to_json()?;
    println!("performance: {snapshot}");
    println!("camera mode: {:?}", showcase.camera().mode());
    for handle in bindings.iter().map(|(_, handle)| handle) {
        if let Some(transform) = showcase.scene().transform(*handle) {
            println!("{:?}: {:?}", handle, transform.position);
        }
    }

    Ok(())
}

fn tap(showcase: &Rc<RefCell<Showcase<MemoryScene>>>, position: Vec2, now: f64) {
    let mut showcase = showcase.borrow_mut();
    showcase.handle_input(GestureInput::PointerDown { position, time_ms: now });
    showcase.handle_input(GestureInput::PointerUp {
        position,
        time_ms: now + 40.0,
    });
}

fn pinch(showcase: &Rc<RefCell<Showcase<MemoryScene>>>, now: f64) {
    let mut showcase = showcase.borrow_mut();
    let touches = |spread: f32| -> TouchPoints {
        [Vec2::new(400.0 - spread, 400.0), Vec2::new(400.0 + spread, 400.0)]
            .into_iter()
            .collect()
    };
    showcase.handle_input(GestureInput::TouchStart {
        touches: touches(50.0),
        time_ms: now,
    });
    showcase.handle_input(GestureInput::TouchMove {
        touches: touches(90.0),
        time_ms: now + 16.0,
    });
    showcase.handle_input(GestureInput::TouchEnd {
        touches: TouchPoints::new(),
        time_ms: now + 32.0,
    });
}
