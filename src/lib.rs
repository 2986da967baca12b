//! # LumaBoard
//!
//! `lumaboard` is the scene transition core of the LumaBoard signage
//! dashboard. Widgets and the layout engine produce scenes; this crate swaps
//! them on screen with queued, animated transitions.
//!
//! Everything lives in [`luma_core`] and is re-exported here.

pub use luma_core::*;
