//! # Camera Direction
//!
//! Executes resolved camera moves. Every request carries a generation
//! stamp; a request older than the last one applied to the camera settles
//! as [`CameraOutcome::Superseded`] and leaves the camera alone.
//!
//! ```text
//! zoom_to / fly_to ──> issue() ──> queue ──> resolve ──> apply()
//!                      gen = n                          gen >= last? move : Superseded
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use vantage_shared::{BoundingSphere, HeadingPitchRange, Matrix4};

use crate::error::{CameraError, ViewerError, ViewerResult};
use crate::settlement::{CameraOutcome, Settler};
use crate::target::{offset_for, ZoomTarget};

/// Monotonic stamp of a camera request.
pub type Generation = u64;

/// Camera shared between the viewer and its host.
pub type SharedCamera = Arc<Mutex<dyn Camera>>;

/// Options handed to [`Camera::fly_to_bounding_sphere`].
pub struct FlightOptions {
    /// Final offset from the sphere center
    pub offset: Option<HeadingPitchRange>,
    /// Flight duration (seconds); camera chooses when `None`
    pub duration: Option<f64>,
    /// Peak height of the flight path (meters)
    pub maximum_height: Option<f64>,
    /// Called once the camera arrives
    pub complete: Box<dyn FnOnce() + Send>,
    /// Called if the flight is interrupted
    pub cancel: Box<dyn FnOnce() + Send>,
}

impl fmt::Debug for FlightOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlightOptions")
            .field("offset", &self.offset)
            .field("duration", &self.duration)
            .field("maximum_height", &self.maximum_height)
            .finish_non_exhaustive()
    }
}

/// The camera collaborator.
///
/// Implementations own transform math and flight interpolation; the viewer
/// only decides where to point them.
pub trait Camera: Send {
    /// Reference frame the camera is expressed in.
    fn transform(&self) -> Matrix4;

    /// Replaces the reference frame.
    fn set_transform(&mut self, transform: Matrix4);

    /// Moves instantly so `sphere` fills the view.
    fn view_bounding_sphere(&mut self, sphere: &BoundingSphere, offset: Option<HeadingPitchRange>);

    /// Starts an animated flight to `sphere`. Must eventually call exactly
    /// one of `options.complete` or `options.cancel`.
    fn fly_to_bounding_sphere(&mut self, sphere: &BoundingSphere, options: FlightOptions);

    /// Flies to the home view.
    fn fly_home(&mut self, duration: Option<f64>);
}

/// How to move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MoveMode {
    /// Instant cut.
    Cut,
    /// Animated flight.
    Flight {
        /// Seconds, or camera default
        duration: Option<f64>,
        /// Meters, or camera default
        maximum_height: Option<f64>,
    },
}

/// A queued camera move.
#[derive(Debug)]
pub struct CameraMoveRequest {
    /// Issue order
    pub generation: Generation,
    /// What to look at
    pub target: ZoomTarget,
    /// Explicit offset, if given
    pub offset: Option<HeadingPitchRange>,
    /// Cut or flight
    pub mode: MoveMode,
    /// Delivers the outcome to the caller
    pub settler: Settler,
}

#[derive(Debug, Default)]
struct Generations {
    next: Generation,
    last_applied: Option<Generation>,
}

/// Applies camera moves in generation order.
#[derive(Debug, Default)]
pub struct CameraDirector {
    generations: Mutex<Generations>,
}

impl CameraDirector {
    /// Creates a director with no moves issued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps a new request.
    pub fn issue(&self) -> Generation {
        let mut generations = self.generations.lock();
        let generation = generations.next;
        generations.next += 1;
        generation
    }

    /// Stamps a move made outside the queue, so older queued moves lose to it.
    pub fn claim(&self) -> Generation {
        let mut generations = self.generations.lock();
        let generation = generations.next;
        generations.next += 1;
        generations.last_applied = Some(generation);
        generation
    }

    /// Generation of the last move that reached the camera.
    #[must_use]
    pub fn last_applied(&self) -> Option<Generation> {
        self.generations.lock().last_applied
    }

    /// Records `generation` as applied unless a newer one already was.
    fn admit(&self, generation: Generation) -> bool {
        let mut generations = self.generations.lock();
        if generations.last_applied.is_some_and(|last| generation < last) {
            return false;
        }
        generations.last_applied = Some(generation);
        true
    }

    /// Instant cut: frames `sphere` and resets the reference frame.
    pub fn cut(
        camera: &mut dyn Camera,
        sphere: &BoundingSphere,
        offset: Option<HeadingPitchRange>,
    ) -> ViewerResult<()> {
        validate_sphere(sphere)?;
        camera.view_bounding_sphere(sphere, offset);
        camera.set_transform(Matrix4::IDENTITY);
        Ok(())
    }

    /// Starts a flight whose callbacks settle through `settler`.
    pub fn fly_to(
        camera: &mut dyn Camera,
        sphere: &BoundingSphere,
        offset: Option<HeadingPitchRange>,
        duration: Option<f64>,
        maximum_height: Option<f64>,
        settler: &Settler,
    ) -> ViewerResult<()> {
        validate_sphere(sphere)?;

        let on_complete = settler.clone();
        let on_cancel = settler.clone();
        camera.fly_to_bounding_sphere(
            sphere,
            FlightOptions {
                offset,
                duration,
                maximum_height,
                complete: Box::new(move || {
                    on_complete.settle(Ok(CameraOutcome::Completed));
                }),
                cancel: Box::new(move || {
                    tracing::debug!("camera flight canceled");
                    on_cancel.settle(Err(CameraError::FlightCanceled));
                }),
            },
        );
        Ok(())
    }

    /// Executes a resolved request and settles it, unless a flight settles
    /// it later.
    pub fn apply(&self, camera: &mut dyn Camera, request: CameraMoveRequest, sphere: BoundingSphere) {
        if !self.admit(request.generation) {
            tracing::debug!(generation = request.generation, "camera move superseded");
            request.settler.settle(Ok(CameraOutcome::Superseded));
            return;
        }

        let offset = offset_for(request.target.kind(), request.offset, &sphere);
        let result = match request.mode {
            MoveMode::Cut => Self::cut(camera, &sphere, offset).map(|()| {
                tracing::debug!(generation = request.generation, radius = sphere.radius, "camera cut");
                request.settler.settle(Ok(CameraOutcome::Completed));
            }),
            MoveMode::Flight {
                duration,
                maximum_height,
            } => {
                tracing::debug!(generation = request.generation, ?duration, "camera flight started");
                Self::fly_to(camera, &sphere, offset, duration, maximum_height, &request.settler)
            }
        };

        if let Err(err) = result {
            tracing::warn!(generation = request.generation, %err, "camera move rejected");
            request.settler.settle(Err(CameraError::Unresolvable));
        }
    }
}

fn validate_sphere(sphere: &BoundingSphere) -> ViewerResult<()> {
    if sphere.is_valid() {
        Ok(())
    } else {
        Err(ViewerError::invalid_argument(
            "bounding_sphere",
            format!("center must be finite and radius non-negative, got {sphere:?}"),
        ))
    }
}
