//! # Transitions System
//!
//! The catalog of built-in transition styles and the declarative states each
//! one applies.
//!
//! ## Responsibilities
//! - **Transition Styles**: Enum of supported enter/exit recipes.
//! - **State Classes**: Class names for the four animation states of a style.
//! - **Declarations**: CSS declarations for each state, consumed by the
//!   stylesheet builder.
//!
//! ## Key Types
//! - `TransitionStyle`: Fade, Slide*, Zoom, Flip, Cube, Mosaic, Ripple.
//! - `TransitionPhase`: Enter/exit, initial/active.

use crate::errors::EngineError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The visual recipe used to swap one scene for another.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransitionStyle {
    #[default]
    Fade,
    SlideLeft,
    SlideRight,
    SlideUp,
    SlideDown,
    Zoom,
    Flip,
    Cube,
    Mosaic,
    Ripple,
}

/// One of the four states a transition container passes through.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransitionPhase {
    Enter,
    EnterActive,
    Exit,
    ExitActive,
}

impl TransitionPhase {
    fn suffix(&self) -> &'static str {
        match self {
            TransitionPhase::Enter => "enter",
            TransitionPhase::EnterActive => "enter-active",
            TransitionPhase::Exit => "exit",
            TransitionPhase::ExitActive => "exit-active",
        }
    }
}

/// Declarations for the four states of one style.
#[derive(Copy, Clone, Debug)]
pub struct StyleStates {
    pub enter: &'static str,
    pub enter_active: &'static str,
    pub exit: &'static str,
    pub exit_active: &'static str,
}

impl StyleStates {
    pub fn get(&self, phase: TransitionPhase) -> &'static str {
        match phase {
            TransitionPhase::Enter => self.enter,
            TransitionPhase::EnterActive => self.enter_active,
            TransitionPhase::Exit => self.exit,
            TransitionPhase::ExitActive => self.exit_active,
        }
    }
}

impl TransitionStyle {
    /// Every built-in style, in catalog order.
    pub const ALL: [TransitionStyle; 10] = [
        TransitionStyle::Fade,
        TransitionStyle::SlideLeft,
        TransitionStyle::SlideRight,
        TransitionStyle::SlideUp,
        TransitionStyle::SlideDown,
        TransitionStyle::Zoom,
        TransitionStyle::Flip,
        TransitionStyle::Cube,
        TransitionStyle::Mosaic,
        TransitionStyle::Ripple,
    ];

    /// The identifier used in configuration and class names.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionStyle::Fade => "fade",
            TransitionStyle::SlideLeft => "slide-left",
            TransitionStyle::SlideRight => "slide-right",
            TransitionStyle::SlideUp => "slide-up",
            TransitionStyle::SlideDown => "slide-down",
            TransitionStyle::Zoom => "zoom",
            TransitionStyle::Flip => "flip",
            TransitionStyle::Cube => "cube",
            TransitionStyle::Mosaic => "mosaic",
            TransitionStyle::Ripple => "ripple",
        }
    }

    /// Class name applied to a transition container for `phase`.
    pub fn class(&self, phase: TransitionPhase) -> String {
        format!("luma-{}-{}", self.as_str(), phase.suffix())
    }

    /// Returns the CSS declarations for each state of this style.
    pub fn states(&self) -> StyleStates {
        match self {
            TransitionStyle::Fade => StyleStates {
                enter: "opacity: 0;",
                enter_active: "opacity: 1;",
                exit: "opacity: 1;",
                exit_active: "opacity: 0;",
            },
            TransitionStyle::SlideLeft => StyleStates {
                enter: "transform: translateX(100%);",
                enter_active: "transform: translateX(0);",
                exit: "transform: translateX(0);",
                exit_active: "transform: translateX(-100%);",
            },
            TransitionStyle::SlideRight => StyleStates {
                enter: "transform: translateX(-100%);",
                enter_active: "transform: translateX(0);",
                exit: "transform: translateX(0);",
                exit_active: "transform: translateX(100%);",
            },
            TransitionStyle::SlideUp => StyleStates {
                enter: "transform: translateY(100%);",
                enter_active: "transform: translateY(0);",
                exit: "transform: translateY(0);",
                exit_active: "transform: translateY(-100%);",
            },
            TransitionStyle::SlideDown => StyleStates {
                enter: "transform: translateY(-100%);",
                enter_active: "transform: translateY(0);",
                exit: "transform: translateY(0);",
                exit_active: "transform: translateY(100%);",
            },
            TransitionStyle::Zoom => StyleStates {
                enter: "opacity: 0; transform: scale(0.8);",
                enter_active: "opacity: 1; transform: scale(1);",
                exit: "opacity: 1; transform: scale(1);",
                exit_active: "opacity: 0; transform: scale(1.2);",
            },
            TransitionStyle::Flip => StyleStates {
                enter: "backface-visibility: hidden; transform: perspective(1200px) rotateY(-90deg);",
                enter_active: "backface-visibility: hidden; transform: perspective(1200px) rotateY(0deg);",
                exit: "backface-visibility: hidden; transform: perspective(1200px) rotateY(0deg);",
                exit_active: "backface-visibility: hidden; transform: perspective(1200px) rotateY(90deg);",
            },
            TransitionStyle::Cube => StyleStates {
                enter: "transform-origin: left center; transform: perspective(1200px) rotateY(90deg);",
                enter_active: "transform-origin: left center; transform: perspective(1200px) rotateY(0deg);",
                exit: "transform-origin: right center; transform: perspective(1200px) rotateY(0deg);",
                exit_active: "transform-origin: right center; transform: perspective(1200px) rotateY(-90deg);",
            },
            TransitionStyle::Mosaic => StyleStates {
                enter: "opacity: 0; clip-path: inset(50% 50% 50% 50%);",
                enter_active: "opacity: 1; clip-path: inset(0 0 0 0);",
                exit: "opacity: 1; filter: blur(0);",
                exit_active: "opacity: 0; filter: blur(12px);",
            },
            TransitionStyle::Ripple => StyleStates {
                enter: "clip-path: circle(0% at 50% 50%);",
                enter_active: "clip-path: circle(150% at 50% 50%);",
                exit: "opacity: 1;",
                exit_active: "opacity: 0;",
            },
        }
    }
}

impl fmt::Display for TransitionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionStyle {
    type Err = EngineError;

    /// Accepts both `slide-left` and `slide_left`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        TransitionStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == normalized)
            .ok_or_else(|| EngineError::UnknownStyle(s.to_string()))
    }
}

impl Serialize for TransitionStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransitionStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Returns the identifiers of every built-in style, in catalog order.
pub fn available_styles() -> Vec<&'static str> {
    TransitionStyle::ALL.iter().map(|s| s.as_str()).collect()
}
