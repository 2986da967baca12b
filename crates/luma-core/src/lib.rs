//! # LumaBoard Core
//!
//! `luma-core` animates the handoff between scenes on a LumaBoard signage
//! display. A scene is any subtree of renderable nodes (usually a grid of
//! widgets); the [`SceneTransitionEngine`] swaps the scene shown in a live
//! container for another one, running an enter/exit animation from a fixed
//! catalog of styles.
//!
//! ## Core Features
//!
//! *   **Serialized transitions**: Requests made while a transition runs are queued
//!     and executed strictly in submission order.
//! *   **Declarative styles**: Ten built-in styles rendered into a single stylesheet,
//!     driven by state classes and scoped duration/easing variables.
//! *   **Graceful failure**: Any surface error mid-animation degrades to an instant
//!     swap, so the destination always ends up live.
//! *   **Runtime configuration**: Partial updates and named presets.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use luma_core::{MemorySurface, SceneNode, SceneTransitionEngine, Surface};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), luma_core::EngineError> {
//! let surface = MemorySurface::new();
//! let live = surface.create_element(SceneNode::new("main"))?;
//! let lobby = surface.create_element(SceneNode::new("section").with_label("lobby"))?;
//! let menu = surface.create_element(SceneNode::new("section").with_label("menu"))?;
//! surface.append_child(live, lobby)?;
//!
//! let engine = SceneTransitionEngine::new(Arc::new(surface.clone()), live)?;
//! engine.request_transition(Some(lobby), menu, Some("slide-left")).await?;
//! assert!(surface.contains(live, menu));
//! # Ok(())
//! # }
//! ```

/// Easing curves in CSS timing-function syntax.
pub mod animation;

/// Engine configuration and named presets.
pub mod config;

/// The scene transition engine.
pub mod engine;

pub mod errors;

/// The arena-backed scene graph used by the in-memory surface.
pub mod scene;

/// The `Surface` trait and its in-memory implementation.
pub mod surface;

/// Style catalog and stylesheet injection.
pub mod systems;

/// Shared data structures used across the engine.
pub mod types;

pub use animation::EasingType;
pub use config::{ConfigUpdate, EngineConfig, Preset, PRESETS};
pub use engine::{
    ActiveTransition, SceneTransitionEngine, TransitionEvent, TransitionHandle, TransitionRequest,
};
pub use errors::{EngineError, SurfaceError};
pub use scene::{SceneGraph, SceneNode};
pub use surface::{MemorySurface, Surface};
pub use systems::{TransitionPhase, TransitionStyle};
pub use types::{EngineStatus, NodeId, TransitionOutcome};
