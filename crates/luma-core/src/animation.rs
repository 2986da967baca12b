use crate::errors::EngineError;
use keyframe::functions::BezierCurve;
use keyframe::mint::Vector2;
use keyframe::EasingFunction;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Supported timing functions for transitions.
///
/// Values are written and parsed in CSS `transition-timing-function` syntax
/// (`"ease-in-out"`, `"cubic-bezier(0.4, 0, 0.2, 1)"`), since that is what the
/// stylesheet consumes through the scoped easing variable.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum EasingType {
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
    CubicBezier(f32, f32, f32, f32),
}

impl EasingFunction for EasingType {
    fn y(&self, x: f64) -> f64 {
        match self {
            EasingType::Linear => keyframe::functions::Linear.y(x),
            EasingType::EaseIn => keyframe::functions::EaseIn.y(x),
            EasingType::EaseOut => keyframe::functions::EaseOut.y(x),
            EasingType::EaseInOut => keyframe::functions::EaseInOut.y(x),
            // CSS `ease` is cubic-bezier(0.25, 0.1, 0.25, 1).
            EasingType::Ease => bezier(0.25, 0.1, 0.25, 1.0).y(x),
            EasingType::CubicBezier(x1, y1, x2, y2) => bezier(*x1, *y1, *x2, *y2).y(x),
        }
    }
}

impl EasingType {
    /// Evaluates the easing curve at a specific point `x` (0.0 to 1.0).
    pub fn eval(&self, x: f32) -> f32 {
        self.y(x.clamp(0.0, 1.0) as f64) as f32
    }

    /// Renders the CSS timing-function value.
    pub fn to_css(&self) -> String {
        match self {
            EasingType::Linear => "linear".to_string(),
            EasingType::Ease => "ease".to_string(),
            EasingType::EaseIn => "ease-in".to_string(),
            EasingType::EaseOut => "ease-out".to_string(),
            EasingType::EaseInOut => "ease-in-out".to_string(),
            EasingType::CubicBezier(x1, y1, x2, y2) => {
                format!("cubic-bezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
        }
    }
}

impl fmt::Display for EasingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl FromStr for EasingType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "linear" => Ok(EasingType::Linear),
            "ease" => Ok(EasingType::Ease),
            "ease-in" => Ok(EasingType::EaseIn),
            "ease-out" => Ok(EasingType::EaseOut),
            "ease-in-out" => Ok(EasingType::EaseInOut),
            other => parse_cubic_bezier(other).ok_or_else(|| EngineError::InvalidEasing(s.to_string())),
        }
    }
}

fn parse_cubic_bezier(s: &str) -> Option<EasingType> {
    let args = s.strip_prefix("cubic-bezier(")?.strip_suffix(')')?;
    let values: Vec<f32> = args
        .split(',')
        .map(|v| v.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .ok()?;

    match values.as_slice() {
        // x coordinates must stay within [0, 1] for the curve to be a function of time.
        [x1, y1, x2, y2] if (0.0..=1.0).contains(x1) && (0.0..=1.0).contains(x2) => {
            Some(EasingType::CubicBezier(*x1, *y1, *x2, *y2))
        }
        _ => None,
    }
}

fn bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> BezierCurve {
    BezierCurve::from(Vector2 { x: x1, y: y1 }, Vector2 { x: x2, y: y2 })
}

impl Serialize for EasingType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> Deserialize<'de> for EasingType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
