//! Integration tests for the viewer: clock tracking, selection, camera
//! targeting and render supervision wired together.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use parking_lot::Mutex;

use vantage_core::{
    Clock, ClockRange, ClockStep, DataSource, DataSourceClock, DataSourceCollection, Entity,
    PositionProperty,
};
use vantage_shared::{BoundingSphere, HeadingPitchRange, Matrix4, Vec3, ERROR_PANEL_TITLE};
use vantage_viewer::mock::{FixedVolume, GrowingVolume, RecordingCamera, ScriptedScene};
use vantage_viewer::{
    Camera, CameraError, CameraOutcome, Container, FlyToOptions, FrameOutcome, RenderLoopState,
    Viewer, ViewerConfig, ViewerError, ZoomTarget,
};

struct Fixture {
    viewer: Viewer,
    camera: Arc<Mutex<RecordingCamera>>,
    scene: Arc<Mutex<ScriptedScene>>,
}

fn fixture_with(scene: ScriptedScene, config: ViewerConfig) -> Fixture {
    let camera = Arc::new(Mutex::new(RecordingCamera::new()));
    let scene = Arc::new(Mutex::new(scene));
    let viewer = Viewer::builder(scene.clone(), camera.clone())
        .container(Container::new("map", 800.0, 600.0))
        .config(config)
        .build()
        .unwrap();
    Fixture {
        viewer,
        camera,
        scene,
    }
}

fn fixture() -> Fixture {
    fixture_with(ScriptedScene::new(), ViewerConfig::default())
}

fn clock_settings(multiplier: f64) -> DataSourceClock {
    let start = Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap();
    DataSourceClock {
        start_time: start,
        stop_time: start + chrono::Duration::days(2),
        current_time: start + chrono::Duration::hours(12),
        clock_range: ClockRange::LoopStop,
        clock_step: ClockStep::SystemClockMultiplier,
        multiplier,
    }
}

fn point(x: f64, y: f64, z: f64) -> PositionProperty {
    PositionProperty::constant(Vec3::new(x, y, z))
}

// =============================================================================
// CLOCK TRACKING
// =============================================================================

#[test]
fn test_clock_follows_last_added_source() {
    let f = fixture();
    let a = DataSource::with_clock("a", clock_settings(1.0));
    let b = DataSource::with_clock("b", clock_settings(2.0));

    f.viewer.data_sources().add(a.clone());
    f.viewer.data_sources().add(b.clone());
    assert_eq!(f.viewer.clock_tracked_data_source().map(|s| s.id()), Some(b.id()));
    assert_eq!(f.viewer.clock().read().multiplier, 2.0);
    assert_eq!(f.viewer.clock().read().clock_range, ClockRange::LoopStop);

    f.viewer.data_sources().remove(b.id());
    assert_eq!(f.viewer.clock_tracked_data_source().map(|s| s.id()), Some(a.id()));
    assert_eq!(f.viewer.clock().read().multiplier, 1.0);

    f.viewer.data_sources().remove(a.id());
    assert!(f.viewer.clock_tracked_data_source().is_none());
}

#[test]
fn test_source_change_reaches_clock() {
    let f = fixture();
    let a = DataSource::with_clock("a", clock_settings(1.0));
    f.viewer.data_sources().add(a.clone());

    a.set_clock(Some(clock_settings(64.0)));
    assert_eq!(f.viewer.clock().read().multiplier, 64.0);
}

#[test]
fn test_manual_tracking_ignores_adds() {
    let config = ViewerConfig {
        automatically_track_data_source_clocks: false,
        ..ViewerConfig::default()
    };
    let f = fixture_with(ScriptedScene::new(), config);
    let a = DataSource::with_clock("a", clock_settings(1.0));
    let b = DataSource::with_clock("b", clock_settings(2.0));

    f.viewer.data_sources().add(a.clone());
    assert!(f.viewer.clock_tracked_data_source().is_none());

    f.viewer.set_clock_tracked_data_source(Some(a.clone()));
    f.viewer.data_sources().add(b.clone());
    assert_eq!(f.viewer.clock_tracked_data_source().map(|s| s.id()), Some(a.id()));
    assert!(!f.viewer.automatically_track_data_source_clocks());

    // Removing the pinned source turns tracking off, even with `b` present
    f.viewer.data_sources().remove(a.id());
    assert!(f.viewer.data_sources().contains(b.id()));
    assert!(f.viewer.clock_tracked_data_source().is_none());
}

#[test]
fn test_supplied_collection_is_seeded() {
    let sources = Arc::new(DataSourceCollection::new());
    let a = DataSource::with_clock("seeded", clock_settings(3.0));
    sources.add(a.clone());

    let viewer = Viewer::builder(
        Arc::new(Mutex::new(ScriptedScene::new())),
        Arc::new(Mutex::new(RecordingCamera::new())),
    )
    .container(Container::new("map", 10.0, 10.0))
    .data_sources(sources)
    .build()
    .unwrap();

    assert_eq!(viewer.clock_tracked_data_source().map(|s| s.id()), Some(a.id()));
    assert_eq!(viewer.clock().read().multiplier, 3.0);
}

#[test]
fn test_supplied_clock_keeps_animating() {
    let clock = Clock {
        should_animate: true,
        ..Clock::default()
    }
    .shared();

    let viewer = Viewer::builder(
        Arc::new(Mutex::new(ScriptedScene::new())),
        Arc::new(Mutex::new(RecordingCamera::new())),
    )
    .container(Container::new("map", 10.0, 10.0))
    .clock(Arc::clone(&clock))
    .build()
    .unwrap();

    assert!(clock.read().should_animate);
    assert_eq!(viewer.config().should_animate, Some(true));
}

#[test]
fn test_config_overrides_clock_animation() {
    let clock = Clock {
        should_animate: true,
        ..Clock::default()
    }
    .shared();
    let config = ViewerConfig {
        should_animate: Some(false),
        ..ViewerConfig::default()
    };

    let _viewer = Viewer::builder(
        Arc::new(Mutex::new(ScriptedScene::new())),
        Arc::new(Mutex::new(RecordingCamera::new())),
    )
    .container(Container::new("map", 10.0, 10.0))
    .clock(Arc::clone(&clock))
    .config(config)
    .build()
    .unwrap();

    assert!(!clock.read().should_animate);
}

#[test]
fn test_runaway_clock_multiplier_keeps_rendering() {
    let config = ViewerConfig {
        should_animate: Some(true),
        ..ViewerConfig::default()
    };
    let f = fixture_with(ScriptedScene::new(), config);
    let mut settings = clock_settings(1e13);
    settings.clock_step = ClockStep::TickDependent;
    settings.clock_range = ClockRange::Unbounded;
    let start = settings.current_time;
    f.viewer.data_sources().add(DataSource::with_clock("runaway", settings));

    assert_eq!(f.viewer.render(), FrameOutcome::Rendered);
    assert_eq!(f.viewer.render(), FrameOutcome::Rendered);
    assert_eq!(f.viewer.clock().read().current_time, start);
    assert_eq!(f.viewer.render_loop_state(), RenderLoopState::Running);
}

#[test]
fn test_tracked_source_event_fires_per_change() {
    let f = fixture();
    let hits = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&hits);
    let _ = f
        .viewer
        .clock_tracked_data_source_changed()
        .add_listener(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });

    let a = DataSource::with_clock("a", clock_settings(1.0));
    f.viewer.data_sources().add(a.clone());
    f.viewer.data_sources().add(DataSource::new("no clock"));
    f.viewer.data_sources().remove(a.id());

    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

// =============================================================================
// SELECTION
// =============================================================================

#[test]
fn test_entity_removal_clears_selection() {
    let f = fixture();
    let source = DataSource::new("tracks");
    let entity = Entity::new(point(1.0, 2.0, 3.0));
    let bystander = Entity::new(point(0.0, 0.0, 0.0));
    source.entities().add(entity.clone());
    source.entities().add(bystander.clone());
    f.viewer.data_sources().add(source.clone());

    f.viewer.set_selected_entity(Some(entity.clone()));
    f.viewer.set_tracked_entity(Some(entity.clone()));

    source.entities().remove(bystander.id());
    assert!(f.viewer.tracked_entity().is_some());

    source.entities().remove(entity.id());
    assert!(f.viewer.tracked_entity().is_none());
    assert!(f.viewer.selected_entity().is_none());
}

#[test]
fn test_removing_source_clears_its_entities() {
    let f = fixture();
    let source = DataSource::new("tracks");
    let entity = Entity::new(point(1.0, 0.0, 0.0));
    source.entities().add(entity.clone());
    f.viewer.data_sources().add(source.clone());

    f.viewer.set_tracked_entity(Some(entity));
    f.viewer.data_sources().remove(source.id());
    assert!(f.viewer.tracked_entity().is_none());
}

#[test]
fn test_default_entities_observed() {
    let f = fixture();
    let entity = Entity::new(point(1.0, 0.0, 0.0));
    f.viewer.entities().add(entity.clone());
    f.viewer.set_selected_entity(Some(entity.clone()));

    f.viewer.entities().remove(entity.id());
    assert!(f.viewer.selected_entity().is_none());
}

#[test]
fn test_tracked_entity_is_followed() {
    let f = fixture();
    let entity = Entity::new(point(10.0, 20.0, 30.0));
    f.viewer.entities().add(entity.clone());
    f.viewer.set_tracked_entity(Some(entity));

    assert_eq!(f.viewer.render(), FrameOutcome::Rendered);
    assert_eq!(
        f.camera.lock().transform().translation(),
        Vec3::new(10.0, 20.0, 30.0)
    );

    f.viewer.set_tracked_entity(None);
    assert!(f.camera.lock().transform().is_identity());
}

#[test]
fn test_unpositioned_tracked_entity_leaves_camera() {
    let f = fixture();
    let fixed = Matrix4::from_translation(Vec3::new(5.0, 5.0, 5.0));
    f.camera.lock().set_transform(fixed);

    f.viewer.set_tracked_entity(Some(Entity::new(PositionProperty::Undefined)));
    f.viewer.render();
    assert_eq!(f.camera.lock().transform(), fixed);
}

// =============================================================================
// CAMERA TARGETING
// =============================================================================

#[test]
fn test_missing_target_rejected_before_any_frame() {
    let f = fixture();
    let err = f.viewer.zoom_to(None::<ZoomTarget>, None).unwrap_err();
    assert!(matches!(err, ViewerError::InvalidArgument { name: "target", .. }));

    let err = f.viewer.fly_to(None::<ZoomTarget>, FlyToOptions::default()).unwrap_err();
    assert!(matches!(err, ViewerError::InvalidArgument { name: "target", .. }));
    assert_eq!(f.scene.lock().updates(), 0);
}

#[test]
fn test_zoom_to_fixed_volume_uses_default_offset() {
    let f = fixture();
    let sphere = BoundingSphere::new(Vec3::new(100.0, 0.0, 0.0), 25.0);
    let mut settlement = f
        .viewer
        .zoom_to(ZoomTarget::fixed(Arc::new(FixedVolume::ready(sphere))), None)
        .unwrap();

    assert_eq!(settlement.try_result(), None);
    f.viewer.render();

    let camera = f.camera.lock();
    assert_eq!(camera.views(), &[(sphere, Some(HeadingPitchRange::new(0.0, -0.5, 25.0)))]);
    assert!(camera.transform().is_identity());
    drop(camera);
    assert_eq!(settlement.try_result(), Some(Ok(CameraOutcome::Completed)));
}

#[test]
fn test_zoom_to_collection_passes_no_offset() {
    let f = fixture();
    let a = Entity::new(point(-5.0, 0.0, 0.0));
    let b = Entity::new(point(5.0, 0.0, 0.0));
    f.viewer.set_tracked_entity(Some(a.clone()));

    let mut settlement = f
        .viewer
        .zoom_to(ZoomTarget::entities(vec![a, b]), None)
        .unwrap();
    f.viewer.render();

    assert_eq!(
        f.camera.lock().views(),
        &[(BoundingSphere::new(Vec3::ZERO, 5.0), None)]
    );
    assert!(f.viewer.tracked_entity().is_none());
    assert_eq!(settlement.try_result(), Some(Ok(CameraOutcome::Completed)));
}

#[test]
fn test_tracking_after_collection_zoom_is_followed() {
    let f = fixture();
    let source = DataSource::new("orbit");
    let satellite = Entity::new(point(7.0, 0.0, 0.0));
    source.entities().add(satellite.clone());
    source.entities().add(Entity::new(point(-7.0, 0.0, 0.0)));
    f.viewer.data_sources().add(source.clone());

    let mut settlement = f.viewer.zoom_to(ZoomTarget::data_source(source), None).unwrap();
    f.viewer.render();
    assert_eq!(settlement.try_result(), Some(Ok(CameraOutcome::Completed)));

    f.viewer.set_tracked_entity(Some(satellite.clone()));
    f.viewer.render();
    f.viewer.render();
    assert_eq!(f.viewer.tracked_entity().map(|e| e.id()), Some(satellite.id()));
    assert_eq!(f.camera.lock().transform().translation(), Vec3::new(7.0, 0.0, 0.0));
}

#[test]
fn test_explicit_offset_forwarded() {
    let f = fixture();
    let offset = HeadingPitchRange::new(0.3, -0.2, 900.0);
    let sphere = BoundingSphere::new(Vec3::ZERO, 1.0);
    let _ = f
        .viewer
        .zoom_to(ZoomTarget::fixed(Arc::new(FixedVolume::ready(sphere))), Some(offset))
        .unwrap();
    f.viewer.render();

    assert_eq!(f.camera.lock().views()[0].1, Some(offset));
}

#[test]
fn test_pending_volume_waits_across_frames() {
    let f = fixture();
    let sphere = BoundingSphere::new(Vec3::ZERO, 3.0);
    let volume = Arc::new(FixedVolume::pending(sphere));
    let mut settlement = f.viewer.zoom_to(ZoomTarget::fixed(volume.clone()), None).unwrap();

    f.viewer.render();
    f.viewer.render();
    assert_eq!(settlement.try_result(), None);
    assert_eq!(f.viewer.pending_camera_moves(), 1);
    assert!(f.camera.lock().views().is_empty());

    volume.set_ready(true);
    f.viewer.render();
    assert_eq!(settlement.try_result(), Some(Ok(CameraOutcome::Completed)));
    assert_eq!(f.viewer.pending_camera_moves(), 0);
}

#[test]
fn test_time_dynamic_polled_each_pass() {
    let f = fixture();
    let volume = Arc::new(GrowingVolume::new(Vec3::ZERO, 2.0, 3));
    let mut settlement = f
        .viewer
        .zoom_to(ZoomTarget::time_dynamic(volume.clone()), None)
        .unwrap();

    for _ in 0..3 {
        f.viewer.render();
    }
    assert_eq!(settlement.try_result(), None);

    f.viewer.render();
    assert_eq!(volume.polls(), 4);
    assert_eq!(settlement.try_result(), Some(Ok(CameraOutcome::Completed)));
    assert_eq!(
        f.camera.lock().views()[0].1,
        Some(HeadingPitchRange::new(0.0, -0.5, 8.0))
    );
}

#[test]
fn test_unresolvable_collection_settles_error() {
    let f = fixture();
    let mut settlement = f
        .viewer
        .zoom_to(ZoomTarget::entity(Entity::new(PositionProperty::Undefined)), None)
        .unwrap();
    f.viewer.render();

    assert_eq!(settlement.try_result(), Some(Err(CameraError::Unresolvable)));
    assert!(f.camera.lock().views().is_empty());
}

#[test]
fn test_loading_data_source_waits() {
    let f = fixture();
    let source = DataSource::new("streaming");
    source.set_loading(true);
    source.entities().add(Entity::new(point(1.0, 1.0, 1.0)));
    f.viewer.data_sources().add(source.clone());

    let mut settlement = f.viewer.zoom_to(ZoomTarget::data_source(source.clone()), None).unwrap();
    f.viewer.render();
    assert_eq!(settlement.try_result(), None);

    source.set_loading(false);
    f.viewer.render();
    assert_eq!(settlement.try_result(), Some(Ok(CameraOutcome::Completed)));
}

#[test]
fn test_newer_move_supersedes_older_pending() {
    let f = fixture();
    let slow = Arc::new(FixedVolume::pending(BoundingSphere::new(Vec3::ZERO, 1.0)));
    let fast = Arc::new(FixedVolume::ready(BoundingSphere::new(Vec3::new(9.0, 0.0, 0.0), 1.0)));

    let mut older = f.viewer.zoom_to(ZoomTarget::fixed(slow.clone()), None).unwrap();
    let mut newer = f.viewer.zoom_to(ZoomTarget::fixed(fast), None).unwrap();
    f.viewer.render();
    assert_eq!(newer.try_result(), Some(Ok(CameraOutcome::Completed)));

    slow.set_ready(true);
    f.viewer.render();
    assert_eq!(older.try_result(), Some(Ok(CameraOutcome::Superseded)));
    assert_eq!(f.camera.lock().views().len(), 1);
}

#[tokio::test]
async fn test_fly_to_completes() {
    let f = fixture();
    let sphere = BoundingSphere::new(Vec3::new(0.0, 0.0, 6_378_137.0), 1000.0);
    let settlement = f
        .viewer
        .fly_to(
            ZoomTarget::fixed(Arc::new(FixedVolume::ready(sphere))),
            FlyToOptions {
                duration: Some(2.5),
                maximum_height: Some(20_000.0),
                ..FlyToOptions::default()
            },
        )
        .unwrap();
    f.viewer.render();

    {
        let mut camera = f.camera.lock();
        let flight = camera.flights()[0];
        assert_eq!(flight.duration, Some(2.5));
        assert_eq!(flight.maximum_height, Some(20_000.0));
        assert_eq!(flight.offset, Some(HeadingPitchRange::new(0.0, -0.5, 1000.0)));
        assert!(camera.complete_next_flight());
    }
    assert_eq!(settlement.await, Ok(CameraOutcome::Completed));
}

#[tokio::test]
async fn test_fly_to_canceled() {
    let f = fixture();
    let entity = Entity::new(point(1.0, 2.0, 3.0));
    let settlement = f
        .viewer
        .fly_to(ZoomTarget::entity(entity), FlyToOptions::default())
        .unwrap();
    f.viewer.render();

    {
        let mut camera = f.camera.lock();
        assert_eq!(camera.flights()[0].duration, None);
        assert_eq!(camera.flights()[0].offset, None);
        assert!(camera.cancel_next_flight());
    }
    assert_eq!(settlement.await, Err(CameraError::FlightCanceled));
}

#[test]
fn test_home_supersedes_queued_moves() {
    let f = fixture();
    let entity = Entity::new(point(1.0, 0.0, 0.0));
    f.viewer.set_tracked_entity(Some(entity));
    let mut queued = f
        .viewer
        .zoom_to(
            ZoomTarget::fixed(Arc::new(FixedVolume::ready(BoundingSphere::new(Vec3::ZERO, 1.0)))),
            None,
        )
        .unwrap();

    f.viewer.home(Some(1.5));
    assert!(f.viewer.tracked_entity().is_none());
    assert_eq!(f.camera.lock().homes(), &[Some(1.5)]);

    f.viewer.render();
    assert_eq!(queued.try_result(), Some(Ok(CameraOutcome::Superseded)));
}

// =============================================================================
// RENDER SUPERVISION
// =============================================================================

#[test]
fn test_failed_update_suspends_loop() {
    let f = fixture_with(ScriptedScene::failing_at(2), ViewerConfig::default());
    let failures = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&failures);
    let _ = f.viewer.render_error().add_listener(move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(f.viewer.render(), FrameOutcome::Rendered);
    assert!(matches!(f.viewer.render(), FrameOutcome::Failed(_)));
    assert_eq!(f.viewer.render(), FrameOutcome::Skipped);
    assert_eq!(f.viewer.on_animation_frame(1000.0), FrameOutcome::Skipped);

    assert_eq!(f.scene.lock().updates(), 2);
    assert_eq!(f.viewer.render_loop_state(), RenderLoopState::Suspended);
    assert!(!f.viewer.config().use_default_render_loop);
    assert_eq!(failures.load(Ordering::SeqCst), 1);

    let panel = f.viewer.error_panel().unwrap();
    assert_eq!(panel.title, ERROR_PANEL_TITLE);
    assert!(panel.message.contains("scripted failure"));
    assert!(f.viewer.dismiss_error_panel());
    assert!(f.viewer.error_panel().is_none());
}

#[test]
fn test_panic_in_update_contained() {
    let config = ViewerConfig {
        show_render_loop_errors: false,
        ..ViewerConfig::default()
    };
    let f = fixture_with(ScriptedScene::panicking_at(1), config);

    assert!(matches!(f.viewer.render(), FrameOutcome::Failed(_)));
    assert!(f.viewer.error_panel().is_none());
    assert!(f
        .viewer
        .render_failure()
        .is_some_and(|failure| failure.message.contains("scripted panic")));

    // Scene lock was released by the unwind
    assert_eq!(f.scene.lock().updates(), 1);
}

#[test]
fn test_camera_moves_stop_with_loop() {
    let f = fixture_with(ScriptedScene::failing_at(1), ViewerConfig::default());
    let mut settlement = f
        .viewer
        .zoom_to(
            ZoomTarget::fixed(Arc::new(FixedVolume::ready(BoundingSphere::new(Vec3::ZERO, 1.0)))),
            None,
        )
        .unwrap();

    f.viewer.render();
    assert_eq!(settlement.try_result(), None);
    assert!(f.camera.lock().views().is_empty());
}

#[test]
fn test_animation_frames_paced() {
    let config = ViewerConfig {
        target_frame_rate: Some(10.0),
        ..ViewerConfig::default()
    };
    let f = fixture_with(ScriptedScene::new(), config);

    assert_eq!(f.viewer.on_animation_frame(0.0), FrameOutcome::Rendered);
    assert_eq!(f.viewer.on_animation_frame(50.0), FrameOutcome::Skipped);
    assert_eq!(f.viewer.on_animation_frame(120.0), FrameOutcome::Rendered);

    f.viewer.set_use_default_render_loop(false);
    assert_eq!(f.viewer.on_animation_frame(500.0), FrameOutcome::Skipped);
    assert_eq!(f.viewer.render(), FrameOutcome::Rendered);
    assert_eq!(f.scene.lock().renders(), 3);
}

// =============================================================================
// RESOLUTION
// =============================================================================

#[test]
fn test_viewport_pushed_on_change() {
    let f = fixture();
    assert_eq!(f.scene.lock().viewports().len(), 1);

    f.viewer.resize();
    assert_eq!(f.scene.lock().viewports().len(), 1);

    f.viewer.set_container_size(1024.0, 768.0);
    let viewport = f.viewer.resize();
    assert_eq!((viewport.width, viewport.height), (1024, 768));

    f.viewer.set_resolution_scale(0.5).unwrap();
    let scene = f.scene.lock();
    assert_eq!(scene.viewports().len(), 3);
    assert_eq!(scene.viewports()[2].width, 512);
}

// =============================================================================
// TEARDOWN
// =============================================================================

#[test]
fn test_destroy_unsubscribes_everything() {
    let sources = Arc::new(DataSourceCollection::new());
    let source = DataSource::with_clock("kept", clock_settings(1.0));
    sources.add(source.clone());

    let viewer = Viewer::builder(
        Arc::new(Mutex::new(ScriptedScene::new())),
        Arc::new(Mutex::new(RecordingCamera::new())),
    )
    .container(Container::new("map", 10.0, 10.0))
    .data_sources(sources.clone())
    .build()
    .unwrap();

    assert_eq!(sources.data_source_added().listener_count(), 1);
    assert_eq!(source.changed().listener_count(), 1);
    assert_eq!(source.entities().collection_changed().listener_count(), 1);

    let mut abandoned = viewer.zoom_to(ZoomTarget::data_source(source.clone()), None).unwrap();
    viewer.destroy();

    assert_eq!(sources.data_source_added().listener_count(), 0);
    assert_eq!(sources.data_source_removed().listener_count(), 0);
    assert_eq!(source.changed().listener_count(), 0);
    assert_eq!(source.entities().collection_changed().listener_count(), 0);
    assert_eq!(sources.len(), 1);
    assert_eq!(abandoned.try_result(), Some(Err(CameraError::Abandoned)));

    let mut late = viewer.zoom_to(ZoomTarget::data_source(source), None).unwrap();
    assert_eq!(late.try_result(), Some(Err(CameraError::Abandoned)));
}

#[test]
fn test_drop_empties_owned_collection() {
    let f = fixture();
    let source = DataSource::new("owned");
    f.viewer.data_sources().add(source.clone());
    let sources = Arc::clone(f.viewer.data_sources());

    drop(f);
    assert!(sources.is_empty());
    assert_eq!(source.changed().listener_count(), 0);
}
