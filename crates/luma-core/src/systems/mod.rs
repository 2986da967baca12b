pub mod stylesheet;
pub mod transitions;

pub use transitions::{TransitionPhase, TransitionStyle};
