//! # Stylesheet System
//!
//! Renders the transition catalog as a single stylesheet and injects it into
//! a surface at most once.

use super::transitions::{TransitionPhase, TransitionStyle};
use crate::errors::SurfaceResult;
use crate::surface::Surface;
use std::fmt::Write;
use std::sync::OnceLock;
use tracing::debug;

/// Id of the shared stylesheet on a surface.
pub const STYLESHEET_ID: &str = "luma-transition-styles";

/// Class carried by every ephemeral transition container.
pub const CONTAINER_CLASS: &str = "luma-transition-container";

/// Scoped variable holding the transition duration (e.g. `"1000ms"`).
pub const DURATION_VAR: &str = "--luma-transition-duration";

/// Scoped variable holding the timing function.
pub const EASING_VAR: &str = "--luma-transition-easing";

static STYLESHEET: OnceLock<String> = OnceLock::new();

/// Returns the stylesheet text for the whole catalog. Built once per process.
pub fn stylesheet() -> &'static str {
    STYLESHEET.get_or_init(build_stylesheet)
}

fn build_stylesheet() -> String {
    let mut css = String::new();
    let _ = writeln!(
        css,
        ".{container} {{\n  position: absolute;\n  inset: 0;\n  width: 100%;\n  height: 100%;\n  \
         transition-property: opacity, transform, clip-path, filter;\n  \
         transition-duration: var({duration}, 1000ms);\n  \
         transition-timing-function: var({easing}, ease-in-out);\n}}",
        container = CONTAINER_CLASS,
        duration = DURATION_VAR,
        easing = EASING_VAR,
    );

    for style in TransitionStyle::ALL {
        let states = style.states();
        for phase in [
            TransitionPhase::Enter,
            TransitionPhase::EnterActive,
            TransitionPhase::Exit,
            TransitionPhase::ExitActive,
        ] {
            let _ = writeln!(
                css,
                ".{}.{} {{ {} }}",
                CONTAINER_CLASS,
                style.class(phase),
                states.get(phase)
            );
        }
    }
    css
}

/// Injects the shared stylesheet unless the surface already carries it.
///
/// Returns `true` if this call inserted it.
pub fn ensure_stylesheet(surface: &dyn Surface) -> SurfaceResult<bool> {
    if surface.has_stylesheet(STYLESHEET_ID) {
        return Ok(false);
    }
    surface.insert_stylesheet(STYLESHEET_ID, stylesheet())?;
    debug!(id = STYLESHEET_ID, "Injected transition stylesheet");
    Ok(true)
}
