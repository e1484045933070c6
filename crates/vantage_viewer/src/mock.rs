//! Mock collaborators for tests and headless runs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use vantage_core::SimTime;
use vantage_shared::{BoundingSphere, HeadingPitchRange, Matrix4, Vec3};

use crate::camera::{Camera, FlightOptions};
use crate::error::SceneError;
use crate::scene::{Scene, Viewport};
use crate::target::{BoundedVolume, TimeDynamicVolume};

/// A flight as the camera received it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordedFlight {
    /// Target sphere
    pub sphere: BoundingSphere,
    /// Requested offset
    pub offset: Option<HeadingPitchRange>,
    /// Requested duration
    pub duration: Option<f64>,
    /// Requested peak height
    pub maximum_height: Option<f64>,
}

type FlightCallbacks = (Box<dyn FnOnce() + Send>, Box<dyn FnOnce() + Send>);

/// Camera that records every call. Flights stay open until completed or
/// canceled by the test.
#[derive(Default)]
pub struct RecordingCamera {
    transform: Matrix4,
    views: Vec<(BoundingSphere, Option<HeadingPitchRange>)>,
    flights: Vec<RecordedFlight>,
    open_flights: VecDeque<FlightCallbacks>,
    homes: Vec<Option<f64>>,
}

impl RecordingCamera {
    /// Camera at the identity transform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `view_bounding_sphere` call.
    #[must_use]
    pub fn views(&self) -> &[(BoundingSphere, Option<HeadingPitchRange>)] {
        &self.views
    }

    /// Every `fly_to_bounding_sphere` call.
    #[must_use]
    pub fn flights(&self) -> &[RecordedFlight] {
        &self.flights
    }

    /// Every `fly_home` call.
    #[must_use]
    pub fn homes(&self) -> &[Option<f64>] {
        &self.homes
    }

    /// Flights started but not yet finished.
    #[must_use]
    pub fn open_flight_count(&self) -> usize {
        self.open_flights.len()
    }

    /// Finishes the oldest open flight.
    pub fn complete_next_flight(&mut self) -> bool {
        match self.open_flights.pop_front() {
            Some((complete, _)) => {
                complete();
                true
            }
            None => false,
        }
    }

    /// Interrupts the oldest open flight.
    pub fn cancel_next_flight(&mut self) -> bool {
        match self.open_flights.pop_front() {
            Some((_, cancel)) => {
                cancel();
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for RecordingCamera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingCamera")
            .field("transform", &self.transform)
            .field("views", &self.views.len())
            .field("flights", &self.flights.len())
            .field("open_flights", &self.open_flights.len())
            .finish()
    }
}

impl Camera for RecordingCamera {
    fn transform(&self) -> Matrix4 {
        self.transform
    }

    fn set_transform(&mut self, transform: Matrix4) {
        self.transform = transform;
    }

    fn view_bounding_sphere(&mut self, sphere: &BoundingSphere, offset: Option<HeadingPitchRange>) {
        self.views.push((*sphere, offset));
    }

    fn fly_to_bounding_sphere(&mut self, sphere: &BoundingSphere, options: FlightOptions) {
        self.flights.push(RecordedFlight {
            sphere: *sphere,
            offset: options.offset,
            duration: options.duration,
            maximum_height: options.maximum_height,
        });
        self.open_flights.push_back((options.complete, options.cancel));
    }

    fn fly_home(&mut self, duration: Option<f64>) {
        self.homes.push(duration);
        self.transform = Matrix4::IDENTITY;
    }
}

/// Scene that counts calls and fails on a chosen update.
#[derive(Debug, Default)]
pub struct ScriptedScene {
    updates: usize,
    renders: usize,
    viewports: Vec<Viewport>,
    fail_at: Option<usize>,
    panic_at: Option<usize>,
}

impl ScriptedScene {
    /// Scene that never fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an error from the `nth` update (1-based).
    #[must_use]
    pub fn failing_at(nth: usize) -> Self {
        Self {
            fail_at: Some(nth),
            ..Self::default()
        }
    }

    /// Panics in the `nth` update (1-based).
    #[must_use]
    pub fn panicking_at(nth: usize) -> Self {
        Self {
            panic_at: Some(nth),
            ..Self::default()
        }
    }

    /// Updates attempted.
    #[must_use]
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// Frames rendered.
    #[must_use]
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Viewports received.
    #[must_use]
    pub fn viewports(&self) -> &[Viewport] {
        &self.viewports
    }
}

impl Scene for ScriptedScene {
    fn update(&mut self, _time: SimTime) -> Result<(), SceneError> {
        self.updates += 1;
        if self.panic_at == Some(self.updates) {
            panic!("scripted panic in update {}", self.updates);
        }
        if self.fail_at == Some(self.updates) {
            return Err(format!("scripted failure in update {}", self.updates).into());
        }
        Ok(())
    }

    fn render(&mut self, _time: SimTime) -> Result<(), SceneError> {
        self.renders += 1;
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewports.push(viewport);
    }
}

/// Fixed volume that becomes ready on demand.
#[derive(Debug)]
pub struct FixedVolume {
    sphere: BoundingSphere,
    ready: AtomicBool,
}

impl FixedVolume {
    /// Volume that is ready immediately.
    #[must_use]
    pub fn ready(sphere: BoundingSphere) -> Self {
        Self {
            sphere,
            ready: AtomicBool::new(true),
        }
    }

    /// Volume that waits for [`set_ready`](Self::set_ready).
    #[must_use]
    pub fn pending(sphere: BoundingSphere) -> Self {
        Self {
            sphere,
            ready: AtomicBool::new(false),
        }
    }

    /// Flips readiness.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }
}

impl BoundedVolume for FixedVolume {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn bounding_sphere(&self) -> Option<BoundingSphere> {
        Some(self.sphere)
    }
}

/// Time-dynamic volume that is undefined for its first polls, then grows
/// by a fixed radius step per poll.
#[derive(Debug)]
pub struct GrowingVolume {
    center: Vec3,
    radius_step: f64,
    undefined_polls: usize,
    polls: AtomicUsize,
}

impl GrowingVolume {
    /// Undefined for `undefined_polls` polls; poll `n` after that yields a
    /// radius of `radius_step * n`.
    #[must_use]
    pub fn new(center: Vec3, radius_step: f64, undefined_polls: usize) -> Self {
        Self {
            center,
            radius_step,
            undefined_polls,
            polls: AtomicUsize::new(0),
        }
    }

    /// Times the volume was queried.
    #[must_use]
    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::Acquire)
    }
}

impl TimeDynamicVolume for GrowingVolume {
    #[allow(clippy::cast_precision_loss)]
    fn bounding_sphere_at(&self, _time: SimTime) -> Option<BoundingSphere> {
        let poll = self.polls.fetch_add(1, Ordering::AcqRel) + 1;
        (poll > self.undefined_polls)
            .then(|| BoundingSphere::new(self.center, self.radius_step * poll as f64))
    }
}
