//! # VANTAGE Viewer
//!
//! Orchestration layer between the world model, a scene and a camera.
//!
//! ## Components
//!
//! - [`ClockCoordinator`]: which data source drives the clock
//! - [`SelectionTracker`]: selected and tracked entities
//! - [`TargetResolver`]: bounding spheres for zoom/fly targets
//! - [`CameraDirector`]: generation-ordered camera cuts and flights
//! - [`RenderSupervisor`]: per-frame failure boundary
//!
//! [`Viewer`] owns one of each and wires them together.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let viewer = Viewer::builder(scene, camera)
//!     .container(Container::new("map", 1280.0, 720.0))
//!     .config(ViewerConfig::from_toml_file("viewer.toml")?)
//!     .build()?;
//!
//! viewer.data_sources().add(source.clone());
//! let settlement = viewer.zoom_to(ZoomTarget::data_source(source), None)?;
//!
//! // Host frame callback
//! viewer.on_animation_frame(timestamp_ms);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod camera;
pub mod clock_tracking;
pub mod config;
pub mod error;
pub mod mock;
pub mod render_loop;
pub mod scene;
pub mod selection;
pub mod settlement;
pub mod target;
pub mod viewer;

pub use camera::{
    Camera, CameraDirector, CameraMoveRequest, FlightOptions, Generation, MoveMode, SharedCamera,
};
pub use clock_tracking::ClockCoordinator;
pub use config::ViewerConfig;
pub use error::{CameraError, RenderFailure, SceneError, ViewerError, ViewerResult};
pub use render_loop::{ErrorPanel, FrameOutcome, FramePacer, RenderLoopState, RenderSupervisor};
pub use scene::{Container, Scene, SharedScene, Viewport};
pub use selection::{SelectionTracker, TrackedState};
pub use settlement::{CameraOutcome, CameraSettlement, SettlementResult, Settler};
pub use target::{
    offset_for, BoundedVolume, BoundingSphereState, EntityBoundsProvider, EntityGroup,
    PositionBoundsProvider, ResolvedVolume, TargetKind, TargetResolver, TimeDynamicVolume,
    ZoomTarget,
};
pub use viewer::{FlyToOptions, Viewer, ViewerBuilder};
