//! # Viewer
//!
//! Owns one of each orchestration component and wires them to the world
//! model, the scene and the camera.
//!
//! ```text
//! DataSourceCollection ──added/removed──> ClockCoordinator ──> Clock
//!          │
//!          └─ entity removals ──────────> SelectionTracker ──> camera follow
//!
//! zoom_to / fly_to ──> queue ──(post-render)──> TargetResolver ──> CameraDirector
//!
//! render() ──> RenderSupervisor ──> Scene ──> post-render
//! ```
//!
//! Listeners hold a weak reference to the viewer, and `destroy` removes
//! every one of them.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use vantage_core::{
    Clock, DataSource, DataSourceCollection, DataSourceHandle, DataSourceId, EntityCollection,
    EntityHandle, SharedClock, SimTime,
};
use vantage_shared::{Event, HeadingPitchRange, Matrix4, Subscription};

use crate::camera::{CameraDirector, CameraMoveRequest, MoveMode, SharedCamera};
use crate::clock_tracking::ClockCoordinator;
use crate::config::{validate_frame_rate, validate_resolution_scale, ViewerConfig};
use crate::error::{CameraError, RenderFailure, ViewerError, ViewerResult};
use crate::render_loop::{ErrorPanel, FrameOutcome, FramePacer, RenderLoopState, RenderSupervisor};
use crate::scene::{Container, SharedScene, Viewport};
use crate::selection::SelectionTracker;
use crate::settlement::CameraSettlement;
use crate::target::{
    EntityBoundsProvider, PositionBoundsProvider, ResolvedVolume, TargetKind, TargetResolver,
    ZoomTarget,
};

/// Options for [`Viewer::fly_to`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlyToOptions {
    /// Final offset from the target; synthesized for single volumes when `None`
    pub offset: Option<HeadingPitchRange>,
    /// Flight duration (seconds)
    pub duration: Option<f64>,
    /// Peak height of the flight path (meters)
    pub maximum_height: Option<f64>,
}

/// Builder for [`Viewer`].
pub struct ViewerBuilder {
    scene: SharedScene,
    camera: SharedCamera,
    container: Option<Container>,
    config: ViewerConfig,
    data_sources: Option<Arc<DataSourceCollection>>,
    clock: Option<SharedClock>,
    entity_bounds: Option<Arc<dyn EntityBoundsProvider>>,
}

impl ViewerBuilder {
    /// Starts a builder around the two required collaborators.
    pub fn new(scene: SharedScene, camera: SharedCamera) -> Self {
        Self {
            scene,
            camera,
            container: None,
            config: ViewerConfig::default(),
            data_sources: None,
            clock: None,
            entity_bounds: None,
        }
    }

    /// Host element to draw into. Required.
    #[must_use]
    pub fn container(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }

    /// Viewer options.
    #[must_use]
    pub fn config(mut self, config: ViewerConfig) -> Self {
        self.config = config;
        self
    }

    /// Externally owned data source collection. Sources already in it are
    /// processed as if just added; `destroy` leaves it untouched.
    #[must_use]
    pub fn data_sources(mut self, data_sources: Arc<DataSourceCollection>) -> Self {
        self.data_sources = Some(data_sources);
        self
    }

    /// Clock to drive instead of a fresh one.
    #[must_use]
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Bounding sphere provider for entity targets.
    #[must_use]
    pub fn entity_bounds(mut self, provider: Arc<dyn EntityBoundsProvider>) -> Self {
        self.entity_bounds = Some(provider);
        self
    }

    /// Builds and wires the viewer.
    pub fn build(self) -> ViewerResult<Viewer> {
        let container = self
            .container
            .ok_or_else(|| ViewerError::invalid_argument("container", "a container is required"))?;
        self.config.validate()?;

        let config = self.config;
        let clock = self.clock.unwrap_or_else(|| Clock::default().shared());
        if let Some(animate) = config.should_animate {
            clock.write().should_animate = animate;
        }

        let (data_sources, owns_data_sources) = match self.data_sources {
            Some(collection) => (collection, false),
            None => (Arc::new(DataSourceCollection::new()), true),
        };
        let bounds = self
            .entity_bounds
            .unwrap_or_else(|| Arc::new(PositionBoundsProvider));

        let inner = Arc::new_cyclic(|this| ViewerInner {
            this: this.clone(),
            container: Mutex::new(container),
            scene: self.scene,
            camera: self.camera,
            clock: Arc::clone(&clock),
            data_sources,
            owns_data_sources,
            default_source: DataSource::new("default"),
            clock_coordinator: ClockCoordinator::new(
                clock,
                config.automatically_track_data_source_clocks,
            ),
            selection: SelectionTracker::new(),
            resolver: TargetResolver::new(bounds),
            director: CameraDirector::new(),
            supervisor: RenderSupervisor::new(
                config.use_default_render_loop,
                config.show_render_loop_errors,
            ),
            display: Mutex::new(DisplaySettings {
                resolution_scale: config.resolution_scale,
                use_browser_recommended_resolution: config.use_browser_recommended_resolution,
            }),
            pacer: Mutex::new(FramePacer::new(config.target_frame_rate)),
            viewport: Mutex::new(None),
            last_tick: Mutex::new(None),
            pending_moves: Mutex::new(VecDeque::new()),
            subscriptions: Mutex::new(ViewerSubscriptions::default()),
            destroyed: AtomicBool::new(false),
        });
        inner.wire();

        let viewer = Viewer { inner };
        let viewport = viewer.resize();
        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            sources = viewer.inner.data_sources.len(),
            "viewer created"
        );
        Ok(viewer)
    }
}

#[derive(Clone, Copy, Debug)]
struct DisplaySettings {
    resolution_scale: f64,
    use_browser_recommended_resolution: bool,
}

#[derive(Debug, Default)]
struct ViewerSubscriptions {
    /// Collection, default entities and internal listeners
    viewer: Vec<Subscription>,
    /// `changed` and `collection_changed` per observed data source
    per_source: HashMap<DataSourceId, Vec<Subscription>>,
}

struct ViewerInner {
    this: Weak<ViewerInner>,
    container: Mutex<Container>,
    scene: SharedScene,
    camera: SharedCamera,
    clock: SharedClock,
    data_sources: Arc<DataSourceCollection>,
    owns_data_sources: bool,
    default_source: DataSourceHandle,
    clock_coordinator: ClockCoordinator,
    selection: SelectionTracker,
    resolver: TargetResolver,
    director: CameraDirector,
    supervisor: RenderSupervisor,
    display: Mutex<DisplaySettings>,
    pacer: Mutex<FramePacer>,
    viewport: Mutex<Option<Viewport>>,
    last_tick: Mutex<Option<Instant>>,
    pending_moves: Mutex<VecDeque<CameraMoveRequest>>,
    subscriptions: Mutex<ViewerSubscriptions>,
    destroyed: AtomicBool,
}

impl ViewerInner {
    /// Subscribes to the collection, the default entities and the tracked
    /// entity, then processes sources already present.
    fn wire(&self) {
        let added = {
            let this = self.this.clone();
            self.data_sources.data_source_added().add_listener(move |source| {
                if let Some(inner) = this.upgrade() {
                    inner.on_data_source_added(source);
                }
            })
        };
        let removed = {
            let this = self.this.clone();
            self.data_sources.data_source_removed().add_listener(move |source| {
                if let Some(inner) = this.upgrade() {
                    inner.on_data_source_removed(source);
                }
            })
        };
        let default_entities = self.watch_entity_removals(self.default_source.entities());
        let untracked = {
            let this = self.this.clone();
            self.selection.tracked_entity_changed().add_listener(move |tracked| {
                if tracked.is_none() {
                    if let Some(inner) = this.upgrade() {
                        inner.camera.lock().set_transform(Matrix4::IDENTITY);
                    }
                }
            })
        };
        self.subscriptions.lock().viewer = vec![added, removed, default_entities, untracked];

        for source in self.data_sources.values() {
            self.on_data_source_added(&source);
        }
    }

    fn watch_entity_removals(&self, entities: &EntityCollection) -> Subscription {
        let this = self.this.clone();
        entities.collection_changed().add_listener(move |change| {
            if let Some(inner) = this.upgrade() {
                inner.selection.on_entities_removed(&change.removed);
            }
        })
    }

    fn on_data_source_added(&self, source: &DataSourceHandle) {
        let changed = {
            let this = self.this.clone();
            source.changed().add_listener(move |id| {
                if let Some(inner) = this.upgrade() {
                    inner.clock_coordinator.on_data_source_changed(*id);
                }
            })
        };
        let entities = self.watch_entity_removals(source.entities());

        let replaced = self
            .subscriptions
            .lock()
            .per_source
            .insert(source.id(), vec![changed, entities]);
        for subscription in replaced.into_iter().flatten() {
            subscription.unsubscribe();
        }

        tracing::debug!(source = source.name(), "data source observed");
        self.clock_coordinator.on_data_source_added(source);
    }

    fn on_data_source_removed(&self, source: &DataSourceHandle) {
        let subscriptions = self.subscriptions.lock().per_source.remove(&source.id());
        for subscription in subscriptions.into_iter().flatten() {
            subscription.unsubscribe();
        }

        tracing::debug!(source = source.name(), "data source released");
        self.clock_coordinator.on_data_source_removed(source);
        self.selection.on_entities_removed(&source.entities().values());
    }

    fn tick_clock(&self) -> SimTime {
        let now = Instant::now();
        let elapsed = self
            .last_tick
            .lock()
            .replace(now)
            .map_or(Duration::ZERO, |last| now.duration_since(last));
        self.clock.write().tick(elapsed)
    }
}

/// The viewer. Tears itself down on drop.
pub struct Viewer {
    inner: Arc<ViewerInner>,
}

impl fmt::Debug for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewer")
            .field("container", &self.inner.container.lock().id)
            .field("data_sources", &self.inner.data_sources.len())
            .field("render_loop", &self.inner.supervisor.state())
            .field("destroyed", &self.is_destroyed())
            .finish_non_exhaustive()
    }
}

impl Viewer {
    /// Starts a [`ViewerBuilder`].
    pub fn builder(scene: SharedScene, camera: SharedCamera) -> ViewerBuilder {
        ViewerBuilder::new(scene, camera)
    }

    // =========================================================================
    // COLLABORATORS
    // =========================================================================

    /// The shared simulation clock.
    #[must_use]
    pub fn clock(&self) -> &SharedClock {
        &self.inner.clock
    }

    /// The observed data sources.
    #[must_use]
    pub fn data_sources(&self) -> &Arc<DataSourceCollection> {
        &self.inner.data_sources
    }

    /// Entities not belonging to any data source.
    #[must_use]
    pub fn entities(&self) -> &EntityCollection {
        self.inner.default_source.entities()
    }

    /// The camera.
    #[must_use]
    pub fn camera(&self) -> &SharedCamera {
        &self.inner.camera
    }

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &SharedScene {
        &self.inner.scene
    }

    /// Current container snapshot.
    #[must_use]
    pub fn container(&self) -> Container {
        self.inner.container.lock().clone()
    }

    /// Current options, read back from the components that own them.
    #[must_use]
    pub fn config(&self) -> ViewerConfig {
        let display = *self.inner.display.lock();
        ViewerConfig {
            target_frame_rate: self.inner.pacer.lock().target_frame_rate(),
            resolution_scale: display.resolution_scale,
            use_browser_recommended_resolution: display.use_browser_recommended_resolution,
            use_default_render_loop: self.inner.supervisor.use_default_render_loop(),
            show_render_loop_errors: self.inner.supervisor.show_render_loop_errors(),
            automatically_track_data_source_clocks: self.inner.clock_coordinator.automatic_tracking(),
            should_animate: Some(self.inner.clock.read().should_animate),
        }
    }

    // =========================================================================
    // CLOCK TRACKING
    // =========================================================================

    /// Data source whose clock settings drive the clock.
    #[must_use]
    pub fn clock_tracked_data_source(&self) -> Option<DataSourceHandle> {
        self.inner.clock_coordinator.tracked_data_source()
    }

    /// Pins (or unpins) the clock-tracked data source.
    pub fn set_clock_tracked_data_source(&self, source: Option<DataSourceHandle>) {
        self.inner.clock_coordinator.set_tracked_data_source(source);
    }

    /// Whether added sources take over the clock.
    #[must_use]
    pub fn automatically_track_data_source_clocks(&self) -> bool {
        self.inner.clock_coordinator.automatic_tracking()
    }

    /// Enables or disables automatic clock tracking.
    pub fn set_automatically_track_data_source_clocks(&self, automatic: bool) {
        self.inner.clock_coordinator.set_automatic_tracking(automatic);
    }

    /// Raised when the clock-tracked data source changes.
    #[must_use]
    pub fn clock_tracked_data_source_changed(&self) -> &Event<Option<DataSourceHandle>> {
        self.inner.clock_coordinator.tracked_data_source_changed()
    }

    // =========================================================================
    // SELECTION
    // =========================================================================

    /// Entity shown in the inspection UI.
    #[must_use]
    pub fn selected_entity(&self) -> Option<EntityHandle> {
        self.inner.selection.selected_entity()
    }

    /// Sets the selected entity. Returns `true` when it changed.
    pub fn set_selected_entity(&self, entity: Option<EntityHandle>) -> bool {
        self.inner.selection.set_selected_entity(entity)
    }

    /// Entity the camera follows.
    #[must_use]
    pub fn tracked_entity(&self) -> Option<EntityHandle> {
        self.inner.selection.tracked_entity()
    }

    /// Sets the tracked entity. Returns `true` when it changed.
    ///
    /// Clearing it resets the camera transform, so the camera lock must not
    /// be held by the caller.
    pub fn set_tracked_entity(&self, entity: Option<EntityHandle>) -> bool {
        self.inner.selection.set_tracked_entity(entity)
    }

    /// Raised when the selected entity changes.
    #[must_use]
    pub fn selected_entity_changed(&self) -> &Event<Option<EntityHandle>> {
        self.inner.selection.selected_entity_changed()
    }

    /// Raised when the tracked entity changes.
    #[must_use]
    pub fn tracked_entity_changed(&self) -> &Event<Option<EntityHandle>> {
        self.inner.selection.tracked_entity_changed()
    }

    // =========================================================================
    // CAMERA
    // =========================================================================

    /// Cuts the camera to `target` on the next post-render pass.
    pub fn zoom_to(
        &self,
        target: impl Into<Option<ZoomTarget>>,
        offset: Option<HeadingPitchRange>,
    ) -> ViewerResult<CameraSettlement> {
        let target = TargetResolver::require(target.into())?;
        validate_offset(offset)?;
        Ok(self.enqueue(target, offset, MoveMode::Cut))
    }

    /// Flies the camera to `target`, starting on the next post-render pass.
    pub fn fly_to(
        &self,
        target: impl Into<Option<ZoomTarget>>,
        options: FlyToOptions,
    ) -> ViewerResult<CameraSettlement> {
        let target = TargetResolver::require(target.into())?;
        validate_offset(options.offset)?;
        if let Some(duration) = options.duration {
            if !(duration.is_finite() && duration >= 0.0) {
                return Err(ViewerError::invalid_argument(
                    "duration",
                    format!("must be finite and non-negative, got {duration}"),
                ));
            }
        }
        if let Some(height) = options.maximum_height {
            if !height.is_finite() {
                return Err(ViewerError::invalid_argument(
                    "maximum_height",
                    format!("must be finite, got {height}"),
                ));
            }
        }

        let mode = MoveMode::Flight {
            duration: options.duration,
            maximum_height: options.maximum_height,
        };
        Ok(self.enqueue(target, options.offset, mode))
    }

    /// Clears the tracked entity and flies the camera home.
    ///
    /// Camera moves queued before this call settle as superseded.
    pub fn home(&self, duration: Option<f64>) {
        self.inner.selection.set_tracked_entity(None);
        self.inner.director.claim();
        self.inner.camera.lock().fly_home(duration);
    }

    /// Camera moves waiting for their target to resolve.
    #[must_use]
    pub fn pending_camera_moves(&self) -> usize {
        self.inner.pending_moves.lock().len()
    }

    fn enqueue(
        &self,
        target: ZoomTarget,
        offset: Option<HeadingPitchRange>,
        mode: MoveMode,
    ) -> CameraSettlement {
        if self.is_destroyed() {
            return CameraSettlement::settled(Err(CameraError::Abandoned));
        }

        let (settler, settlement) = CameraSettlement::channel();
        let request = CameraMoveRequest {
            generation: self.inner.director.issue(),
            target,
            offset,
            mode,
            settler,
        };
        tracing::debug!(
            generation = request.generation,
            kind = ?request.target.kind(),
            "camera move queued"
        );
        self.inner.pending_moves.lock().push_back(request);
        settlement
    }

    // =========================================================================
    // FRAMES
    // =========================================================================

    /// Host animation frame callback. Renders when the default loop is on
    /// and a frame is due at `timestamp_ms`.
    pub fn on_animation_frame(&self, timestamp_ms: f64) -> FrameOutcome {
        let supervisor = &self.inner.supervisor;
        if self.is_destroyed() || !supervisor.use_default_render_loop() || !supervisor.is_running() {
            return FrameOutcome::Skipped;
        }
        if !self.inner.pacer.lock().should_render(timestamp_ms) {
            return FrameOutcome::Skipped;
        }
        self.resize();
        self.render()
    }

    /// Renders one frame and runs the post-render pass.
    ///
    /// A no-op once the render loop is suspended.
    pub fn render(&self) -> FrameOutcome {
        if self.is_destroyed() || !self.inner.supervisor.is_running() {
            return FrameOutcome::Skipped;
        }

        let inner = &self.inner;
        let mut frame_time = None;
        let outcome = inner.supervisor.render_frame(|| {
            let time = inner.tick_clock();
            frame_time = Some(time);
            let mut scene = inner.scene.lock();
            scene.update(time)?;
            scene.render(time)
        });

        if let (FrameOutcome::Rendered, Some(time)) = (&outcome, frame_time) {
            self.post_render(time);
        }
        outcome
    }

    fn post_render(&self, time: SimTime) {
        self.update_zoom_targets(time);

        let mut camera = self.inner.camera.lock();
        self.inner.selection.follow_tracked(&mut *camera, time);
    }

    fn update_zoom_targets(&self, time: SimTime) {
        let queued: Vec<CameraMoveRequest> = self.inner.pending_moves.lock().drain(..).collect();
        if queued.is_empty() {
            return;
        }

        let mut still_pending = Vec::new();
        for request in queued {
            match self.inner.resolver.resolve(&request.target, time) {
                ResolvedVolume::Pending => still_pending.push(request),
                ResolvedVolume::Unresolvable => {
                    tracing::debug!(generation = request.generation, "camera target unresolvable");
                    request.settler.settle(Err(CameraError::Unresolvable));
                }
                ResolvedVolume::Ready(sphere) => {
                    if request.target.kind() == TargetKind::Collection {
                        self.inner.selection.set_tracked_entity(None);
                    }
                    let mut camera = self.inner.camera.lock();
                    self.inner.director.apply(&mut *camera, request, sphere);
                }
            }
        }

        if !still_pending.is_empty() {
            let mut queue = self.inner.pending_moves.lock();
            for request in still_pending.into_iter().rev() {
                queue.push_front(request);
            }
        }
    }

    // =========================================================================
    // RESOLUTION
    // =========================================================================

    /// Recomputes the drawing buffer size and pushes it to the scene when it
    /// changed.
    pub fn resize(&self) -> Viewport {
        let viewport = {
            let container = self.inner.container.lock();
            let display = self.inner.display.lock();
            Viewport::compute(
                &container,
                display.resolution_scale,
                display.use_browser_recommended_resolution,
            )
        };

        let changed = {
            let mut last = self.inner.viewport.lock();
            let changed = *last != Some(viewport);
            *last = Some(viewport);
            changed
        };
        if changed {
            self.inner.scene.lock().set_viewport(viewport);
        }
        viewport
    }

    /// Updates the container's client size. Takes effect on the next resize.
    pub fn set_container_size(&self, client_width: f64, client_height: f64) {
        let mut container = self.inner.container.lock();
        container.client_width = client_width;
        container.client_height = client_height;
    }

    /// Sets the resolution scale and resizes.
    pub fn set_resolution_scale(&self, scale: f64) -> ViewerResult<()> {
        validate_resolution_scale(scale)?;
        self.inner.display.lock().resolution_scale = scale;
        self.resize();
        Ok(())
    }

    /// Chooses between CSS-pixel and device-pixel resolution, then resizes.
    pub fn set_use_browser_recommended_resolution(&self, enabled: bool) {
        self.inner.display.lock().use_browser_recommended_resolution = enabled;
        self.resize();
    }

    /// Sets the frame rate cap. `None` renders every host frame.
    pub fn set_target_frame_rate(&self, rate: Option<f64>) -> ViewerResult<()> {
        if let Some(rate) = rate {
            validate_frame_rate(rate)?;
        }
        self.inner.pacer.lock().set_target_frame_rate(rate);
        Ok(())
    }

    // =========================================================================
    // RENDER LOOP
    // =========================================================================

    /// Render loop lifecycle state.
    #[must_use]
    pub fn render_loop_state(&self) -> RenderLoopState {
        self.inner.supervisor.state()
    }

    /// Turns automatic rendering on or off. Does not revive a suspended loop.
    pub fn set_use_default_render_loop(&self, enabled: bool) {
        self.inner.supervisor.set_use_default_render_loop(enabled);
    }

    /// Enables or disables the error panel.
    pub fn set_show_render_loop_errors(&self, show: bool) {
        self.inner.supervisor.set_show_render_loop_errors(show);
    }

    /// The failure that stopped the render loop.
    #[must_use]
    pub fn render_failure(&self) -> Option<RenderFailure> {
        self.inner.supervisor.failure()
    }

    /// The open error panel.
    #[must_use]
    pub fn error_panel(&self) -> Option<ErrorPanel> {
        self.inner.supervisor.error_panel()
    }

    /// Closes the error panel.
    pub fn dismiss_error_panel(&self) -> bool {
        self.inner.supervisor.dismiss_error_panel()
    }

    /// Raised once when the render loop stops.
    #[must_use]
    pub fn render_error(&self) -> &Event<RenderFailure> {
        self.inner.supervisor.render_error()
    }

    // =========================================================================
    // TEARDOWN
    // =========================================================================

    /// True after [`destroy`](Self::destroy).
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::Acquire)
    }

    /// Removes every listener the viewer registered and abandons queued
    /// camera moves. An internally created data source collection is
    /// emptied; a supplied one is left as it is.
    pub fn destroy(&self) {
        if self.inner.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }

        let (viewer, per_source) = {
            let mut subscriptions = self.inner.subscriptions.lock();
            (
                std::mem::take(&mut subscriptions.viewer),
                std::mem::take(&mut subscriptions.per_source),
            )
        };
        for subscription in viewer.into_iter().chain(per_source.into_values().flatten()) {
            subscription.unsubscribe();
        }

        let abandoned: Vec<CameraMoveRequest> = self.inner.pending_moves.lock().drain(..).collect();
        for request in abandoned {
            request.settler.settle(Err(CameraError::Abandoned));
        }

        if self.inner.owns_data_sources {
            self.inner.data_sources.remove_all();
        }
        self.inner.default_source.entities().remove_all();
        tracing::debug!("viewer destroyed");
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn validate_offset(offset: Option<HeadingPitchRange>) -> ViewerResult<()> {
    match offset {
        Some(offset) if !offset.is_finite() => Err(ViewerError::invalid_argument(
            "offset",
            format!("heading, pitch and range must be finite, got {offset:?}"),
        )),
        _ => Ok(()),
    }
}
