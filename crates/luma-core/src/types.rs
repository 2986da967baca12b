//! # Types Module
//!
//! Shared data types used across the engine.
//!
//! ## Key Types
//! - `NodeId`: Type alias for arena indices (`usize`).
//! - `TransitionOutcome`: How a completed request reached its destination.
//! - `EngineStatus`: Point-in-time snapshot of the engine.

use crate::animation::EasingType;
use crate::systems::transitions::TransitionStyle;
use serde::Serialize;
use std::time::Duration;

/// A unique identifier for a node on a surface.
pub type NodeId = usize;

/// How a transition request was completed.
///
/// Every variant means the destination is now live in the container.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// The full enter/exit animation ran.
    Animated {
        style: TransitionStyle,
        #[serde(with = "duration_ms")]
        duration: Duration,
    },
    /// Transitions were disabled; the scenes were swapped without animation.
    Instant,
    /// The animation failed part-way and the scenes were swapped without it.
    Fallback { reason: String },
}

impl TransitionOutcome {
    pub fn is_animated(&self) -> bool {
        matches!(self, TransitionOutcome::Animated { .. })
    }
}

/// Snapshot returned by [`SceneTransitionEngine::status`](crate::engine::SceneTransitionEngine::status).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EngineStatus {
    pub is_transitioning: bool,
    pub active_style: Option<TransitionStyle>,
    /// Eased progress of the active transition, once its active state is applied.
    pub progress: Option<f32>,
    pub queue_length: usize,
    pub enabled: bool,
    pub default_style: TransitionStyle,
    pub duration_ms: u64,
    pub easing: EasingType,
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
