//! # VANTAGE
//!
//! Viewer orchestration, integrating the world model with a host scene
//! and camera.
//!
//! ## Layers
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         VANTAGE                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  vantage_viewer   ClockCoordinator   SelectionTracker        │
//! │                   TargetResolver     CameraDirector          │
//! │                   RenderSupervisor   Viewer                  │
//! ├──────────────────────────────────────────────────────────────┤
//! │  vantage_core     Clock   Entity   DataSource(Collection)    │
//! ├──────────────────────────────────────────────────────────────┤
//! │  vantage_shared   Vec3   BoundingSphere   Event              │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

// Re-export the layers
pub use vantage_core as core;
pub use vantage_shared as shared;
pub use vantage_viewer as viewer;

// Re-export commonly used types
pub use vantage_core::{Clock, DataSource, DataSourceClock, Entity, PositionProperty};
pub use vantage_shared::{BoundingSphere, HeadingPitchRange, Vec3};
pub use vantage_viewer::{
    Camera, CameraError, CameraOutcome, Container, FlyToOptions, RenderLoopState, Scene, Viewer,
    ViewerConfig, ViewerError, ZoomTarget,
};
