//! # Viewer Constants
//!
//! Values baked into every viewer. Changing them changes camera framing
//! for every host, so treat them as part of the public contract.

// =============================================================================
// CAMERA FRAMING
// =============================================================================

/// Heading (radians) of the offset synthesized for single-volume targets.
pub const DEFAULT_OFFSET_HEADING: f64 = 0.0;

/// Pitch (radians) of the offset synthesized for single-volume targets.
///
/// Slightly looking down onto the target.
pub const DEFAULT_OFFSET_PITCH: f64 = -0.5;

// =============================================================================
// RENDER LOOP
// =============================================================================

/// Title shown on the error panel once the render loop has stopped.
pub const ERROR_PANEL_TITLE: &str = "An error occurred while rendering. Rendering has stopped.";

/// Default length of a data source clock when none is given (one day, seconds).
pub const DEFAULT_CLOCK_SPAN_SECS: i64 = 86_400;
