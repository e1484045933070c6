//! # VANTAGE Shared
//!
//! Common types used by data sources, the viewer core and hosts.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - a scene or renderer
//! - a camera implementation
//! - any windowing or widget crate
//!
//! If you need collaborator contracts, put them in `vantage_viewer`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod events;
pub mod math;

pub use constants::{DEFAULT_OFFSET_HEADING, DEFAULT_OFFSET_PITCH, ERROR_PANEL_TITLE};
pub use events::{Event, Subscription};
pub use math::{BoundingSphere, HeadingPitchRange, Matrix4, Vec3};
