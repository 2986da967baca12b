//! # Engine Configuration
//!
//! Runtime settings for the transition engine and the named presets shipped
//! with it.

use crate::animation::EasingType;
use crate::errors::{EngineError, EngineResult};
use crate::systems::transitions::TransitionStyle;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings applied to transitions as they start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Style used when a request doesn't name one.
    pub default_style: TransitionStyle,
    /// Animation length in milliseconds. Must be greater than zero.
    pub duration_ms: u64,
    pub easing: EasingType,
    pub enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_style: TransitionStyle::Fade,
            duration_ms: 1000,
            easing: EasingType::EaseInOut,
            enabled: true,
        }
    }
}

impl EngineConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.duration_ms == 0 {
            return Err(EngineError::InvalidDuration(self.duration_ms));
        }
        Ok(())
    }

    /// Returns a copy with every field set in `update` replaced.
    ///
    /// The result is validated; `self` is left untouched on error.
    pub fn merged(&self, update: &ConfigUpdate) -> EngineResult<Self> {
        let mut next = self.clone();
        if let Some(style) = &update.default_style {
            next.default_style = style.parse()?;
        }
        if let Some(duration_ms) = update.duration_ms {
            next.duration_ms = duration_ms;
        }
        if let Some(easing) = &update.easing {
            next.easing = easing.parse()?;
        }
        if let Some(enabled) = update.enabled {
            next.enabled = enabled;
        }
        next.validate()?;
        Ok(next)
    }
}

/// A partial configuration. Unset fields keep their current value.
///
/// Style and easing are carried as strings so that bad values surface as
/// [`EngineError`]s from `configure` rather than as deserialization failures.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigUpdate {
    #[serde(alias = "style", skip_serializing_if = "Option::is_none")]
    pub default_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub easing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.default_style = Some(style.into());
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn easing(mut self, easing: impl Into<String>) -> Self {
        self.easing = Some(easing.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }
}

/// A named, fixed style/duration/easing combination.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub style: TransitionStyle,
    pub duration_ms: u64,
    pub easing: EasingType,
}

impl Preset {
    /// The update that applies this preset without touching `enabled`.
    pub fn to_update(&self) -> ConfigUpdate {
        ConfigUpdate::new()
            .style(self.style.as_str())
            .duration_ms(self.duration_ms)
            .easing(self.easing.to_css())
    }
}

/// Built-in presets.
pub const PRESETS: [Preset; 6] = [
    Preset {
        name: "subtle",
        style: TransitionStyle::Fade,
        duration_ms: 800,
        easing: EasingType::EaseInOut,
    },
    Preset {
        name: "dynamic",
        style: TransitionStyle::SlideLeft,
        duration_ms: 600,
        easing: EasingType::EaseOut,
    },
    Preset {
        name: "dramatic",
        style: TransitionStyle::Cube,
        duration_ms: 1500,
        easing: EasingType::EaseInOut,
    },
    Preset {
        name: "modern",
        style: TransitionStyle::Zoom,
        duration_ms: 700,
        easing: EasingType::CubicBezier(0.4, 0.0, 0.2, 1.0),
    },
    Preset {
        name: "fast",
        style: TransitionStyle::Fade,
        duration_ms: 300,
        easing: EasingType::Ease,
    },
    Preset {
        name: "slow",
        style: TransitionStyle::Fade,
        duration_ms: 2000,
        easing: EasingType::EaseInOut,
    },
];

/// Looks up a preset by exact name.
pub fn preset(name: &str) -> EngineResult<&'static Preset> {
    PRESETS
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| EngineError::UnknownPreset(name.to_string()))
}
