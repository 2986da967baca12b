use crate::types::NodeId;
use thiserror::Error;

/// Failures reported by a [`Surface`](crate::surface::Surface) backend.
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("Appending node {0} would create a cycle")]
    CycleDetected(NodeId),
    #[error("Surface rejected operation: {0}")]
    Rejected(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Errors returned by the [`SceneTransitionEngine`](crate::engine::SceneTransitionEngine).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Transitions disabled")]
    Disabled,
    #[error("Engine has been torn down")]
    TornDown,
    #[error("Unknown transition style: {0}")]
    UnknownStyle(String),
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
    #[error("Invalid easing function: {0}")]
    InvalidEasing(String),
    #[error("Duration must be greater than zero, got {0}ms")]
    InvalidDuration(u64),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("Transition driver dropped the request")]
    Dropped,
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;
pub type EngineResult<T> = Result<T, EngineError>;
