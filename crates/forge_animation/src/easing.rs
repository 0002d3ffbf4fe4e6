//! Easing functions
//!
//! Pure maps from normalized time to eased progress. Inputs are clamped to
//! `[0, 1]`; non-finite input is treated as `0`. Every easing returns exactly
//! `0` at `t = 0` and `1` at `t = 1` (within float tolerance). The back,
//! elastic, bounce and spring families may overshoot in between.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::str::FromStr;

const BACK_C1: f32 = 1.70158;
const BACK_C2: f32 = BACK_C1 * 1.525;
const BACK_C3: f32 = BACK_C1 + 1.0;
const ELASTIC_C4: f32 = (2.0 * PI) / 3.0;
const ELASTIC_C5: f32 = (2.0 * PI) / 4.5;
const BOUNCE_N1: f32 = 7.5625;
const BOUNCE_D1: f32 = 2.75;

/// Easing family
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EasingKind {
    Linear,
    Sine,
    Quad,
    Cubic,
    Back,
    Elastic,
    Bounce,
    Spring,
}

impl FromStr for EasingKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(EasingKind::Linear),
            "sine" => Ok(EasingKind::Sine),
            "quad" => Ok(EasingKind::Quad),
            "cubic" => Ok(EasingKind::Cubic),
            "back" => Ok(EasingKind::Back),
            "elastic" => Ok(EasingKind::Elastic),
            "bounce" => Ok(EasingKind::Bounce),
            "spring" => Ok(EasingKind::Spring),
            _ => Err(()),
        }
    }
}

/// Which end of the curve is shaped
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EasingDirection {
    In,
    Out,
    #[default]
    InOut,
}

/// Easing function
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Easing {
    #[default]
    Linear,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInBack,
    EaseOutBack,
    EaseInOutBack,
    EaseInElastic,
    EaseOutElastic,
    EaseInOutElastic,
    EaseInBounce,
    EaseOutBounce,
    EaseInOutBounce,
    /// Damped oscillation settling on 1
    Spring,
}

impl Easing {
    /// Select an easing by family and direction
    ///
    /// `Linear` and `Spring` ignore the direction.
    pub fn from_parts(kind: EasingKind, direction: EasingDirection) -> Self {
        use EasingDirection::*;
        match (kind, direction) {
            (EasingKind::Linear, _) => Easing::Linear,
            (EasingKind::Spring, _) => Easing::Spring,
            (EasingKind::Sine, In) => Easing::EaseInSine,
            (EasingKind::Sine, Out) => Easing::EaseOutSine,
            (EasingKind::Sine, InOut) => Easing::EaseInOutSine,
            (EasingKind::Quad, In) => Easing::EaseInQuad,
            (EasingKind::Quad, Out) => Easing::EaseOutQuad,
            (EasingKind::Quad, InOut) => Easing::EaseInOutQuad,
            (EasingKind::Cubic, In) => Easing::EaseInCubic,
            (EasingKind::Cubic, Out) => Easing::EaseOutCubic,
            (EasingKind::Cubic, InOut) => Easing::EaseInOutCubic,
            (EasingKind::Back, In) => Easing::EaseInBack,
            (EasingKind::Back, Out) => Easing::EaseOutBack,
            (EasingKind::Back, InOut) => Easing::EaseInOutBack,
            (EasingKind::Elastic, In) => Easing::EaseInElastic,
            (EasingKind::Elastic, Out) => Easing::EaseOutElastic,
            (EasingKind::Elastic, InOut) => Easing::EaseInOutElastic,
            (EasingKind::Bounce, In) => Easing::EaseInBounce,
            (EasingKind::Bounce, Out) => Easing::EaseOutBounce,
            (EasingKind::Bounce, InOut) => Easing::EaseInOutBounce,
        }
    }

    /// Parse a name such as `easeInOutSine`, `ease-out-back` or `in-cubic`
    ///
    /// A family without a direction defaults to in-out. Unknown names fall
    /// back to `Linear`.
    pub fn from_name(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        let rest = normalized.strip_prefix("ease").unwrap_or(&normalized);

        let (direction, kind) = if let Some(kind) = rest.strip_prefix("inout") {
            (EasingDirection::InOut, kind)
        } else if let Some(kind) = rest.strip_prefix("in") {
            (EasingDirection::In, kind)
        } else if let Some(kind) = rest.strip_prefix("out") {
            (EasingDirection::Out, kind)
        } else {
            (EasingDirection::InOut, rest)
        };

        match kind.parse::<EasingKind>() {
            Ok(kind) => Easing::from_parts(kind, direction),
            Err(()) => {
                tracing::debug!("Easing: unknown easing '{}', using linear", name);
                Easing::Linear
            }
        }
    }

    /// Canonical camel-case name
    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseInSine => "easeInSine",
            Easing::EaseOutSine => "easeOutSine",
            Easing::EaseInOutSine => "easeInOutSine",
            Easing::EaseInQuad => "easeInQuad",
            Easing::EaseOutQuad => "easeOutQuad",
            Easing::EaseInOutQuad => "easeInOutQuad",
            Easing::EaseInCubic => "easeInCubic",
            Easing::EaseOutCubic => "easeOutCubic",
            Easing::EaseInOutCubic => "easeInOutCubic",
            Easing::EaseInBack => "easeInBack",
            Easing::EaseOutBack => "easeOutBack",
            Easing::EaseInOutBack => "easeInOutBack",
            Easing::EaseInElastic => "easeInElastic",
            Easing::EaseOutElastic => "easeOutElastic",
            Easing::EaseInOutElastic => "easeInOutElastic",
            Easing::EaseInBounce => "easeInBounce",
            Easing::EaseOutBounce => "easeOutBounce",
            Easing::EaseInOutBounce => "easeInOutBounce",
            Easing::Spring => "spring",
        }
    }

    /// Whether the curve may leave `[0, 1]` between the endpoints
    pub fn overshoots(&self) -> bool {
        matches!(
            self,
            Easing::EaseInBack
                | Easing::EaseOutBack
                | Easing::EaseInOutBack
                | Easing::EaseInElastic
                | Easing::EaseOutElastic
                | Easing::EaseInOutElastic
                | Easing::Spring
        )
    }

    /// Apply the easing to normalized time
    pub fn apply(&self, t: f32) -> f32 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };

        match self {
            Easing::Linear => t,

            Easing::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            Easing::EaseOutSine => (t * PI / 2.0).sin(),
            Easing::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,

            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }

            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }

            Easing::EaseInBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Easing::EaseOutBack => {
                let u = t - 1.0;
                1.0 + BACK_C3 * u.powi(3) + BACK_C1 * u.powi(2)
            }
            Easing::EaseInOutBack => {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((BACK_C2 + 1.0) * (t * 2.0 - 2.0) + BACK_C2) + 2.0)
                        / 2.0
                }
            }

            Easing::EaseInElastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    -(2.0f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * ELASTIC_C4).sin()
                }
            }
            Easing::EaseOutElastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    2.0f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
                }
            }
            Easing::EaseInOutElastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    -(2.0f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin()) / 2.0
                } else {
                    (2.0f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin()) / 2.0
                        + 1.0
                }
            }

            Easing::EaseInBounce => 1.0 - bounce_out(1.0 - t),
            Easing::EaseOutBounce => bounce_out(t),
            Easing::EaseInOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }

            Easing::Spring => {
                // Evaluated in f64 so cos(4.5 pi) vanishes at t = 1
                let t = t as f64;
                (1.0 - (t * std::f64::consts::PI * 4.5).cos() * (-t * 6.0).exp()) as f32
            }
        }
    }
}

fn bounce_out(t: f32) -> f32 {
    if t < 1.0 / BOUNCE_D1 {
        BOUNCE_N1 * t * t
    } else if t < 2.0 / BOUNCE_D1 {
        let t = t - 1.5 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.75
    } else if t < 2.5 / BOUNCE_D1 {
        let t = t - 2.25 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.984375
    }
}

impl From<String> for Easing {
    fn from(name: String) -> Self {
        Easing::from_name(&name)
    }
}

impl From<&str> for Easing {
    fn from(name: &str) -> Self {
        Easing::from_name(name)
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 20] = [
        Easing::Linear,
        Easing::EaseInSine,
        Easing::EaseOutSine,
        Easing::EaseInOutSine,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInBack,
        Easing::EaseOutBack,
        Easing::EaseInOutBack,
        Easing::EaseInElastic,
        Easing::EaseOutElastic,
        Easing::EaseInOutElastic,
        Easing::EaseInBounce,
        Easing::EaseOutBounce,
        Easing::EaseInOutBounce,
        Easing::Spring,
    ];

    #[test]
    fn test_boundary_values() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-6, "{:?} at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{:?} at 1", easing);
        }
    }

    #[test]
    fn test_monotone_easings_stay_in_range() {
        for easing in ALL.iter().filter(|e| !e.overshoots()) {
            let mut previous = 0.0;
            for i in 0..=100 {
                let value = easing.apply(i as f32 / 100.0);
                assert!((-1e-6..=1.0 + 1e-6).contains(&value), "{:?}", easing);
                if !matches!(
                    easing,
                    Easing::EaseInBounce | Easing::EaseOutBounce | Easing::EaseInOutBounce
                ) {
                    assert!(value + 1e-6 >= previous, "{:?} not monotone", easing);
                }
                previous = value;
            }
        }
    }

    #[test]
    fn test_back_overshoots() {
        let min = (0..100)
            .map(|i| Easing::EaseInBack.apply(i as f32 / 100.0))
            .fold(f32::MAX, f32::min);
        assert!(min < 0.0);
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(Easing::EaseInCubic.apply(-3.0), 0.0);
        assert_eq!(Easing::EaseInCubic.apply(7.0), 1.0);
        assert_eq!(Easing::EaseOutQuad.apply(f32::NAN), 0.0);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Easing::from_name("easeInOutSine"), Easing::EaseInOutSine);
        assert_eq!(Easing::from_name("ease-out-back"), Easing::EaseOutBack);
        assert_eq!(Easing::from_name("in_cubic"), Easing::EaseInCubic);
        assert_eq!(Easing::from_name("bounce"), Easing::EaseInOutBounce);
        assert_eq!(Easing::from_name("Spring"), Easing::Spring);
        assert_eq!(Easing::from_name("wobble"), Easing::Linear);
        assert_eq!(Easing::from_name(""), Easing::Linear);
    }

    #[test]
    fn test_name_roundtrip() {
        for easing in ALL {
            assert_eq!(Easing::from_name(easing.name()), easing);
        }
    }

    #[test]
    fn test_from_parts() {
        assert_eq!(
            Easing::from_parts(EasingKind::Elastic, EasingDirection::Out),
            Easing::EaseOutElastic
        );
        assert_eq!(
            Easing::from_parts(EasingKind::Linear, EasingDirection::In),
            Easing::Linear
        );
    }

    #[test]
    fn test_serde_uses_names() {
        let easing: Easing = serde_json::from_str("\"ease-in-out-cubic\"").unwrap();
        assert_eq!(easing, Easing::EaseInOutCubic);
        assert_eq!(serde_json::to_string(&easing).unwrap(), "\"easeInOutCubic\"");
    }
}
