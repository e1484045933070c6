//! # VANTAGE Headless Viewer
//!
//! Drives a viewer against a recording camera and scripted scene, with a
//! synthetic 60 Hz host frame callback.
//!
//! ```bash
//! RUST_LOG=vantage_viewer=debug ./headless_viewer --config config/viewer.toml --frames 300
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use parking_lot::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use vantage::core::{ClockRange, ClockStep, DataSourceHandle};
use vantage::viewer::mock::{RecordingCamera, ScriptedScene};
use vantage::{
    Container, DataSource, DataSourceClock, Entity, PositionProperty, Vec3, Viewer, ViewerConfig,
    ViewerError, ZoomTarget,
};

/// Host frame interval in milliseconds.
const HOST_FRAME_MS: f64 = 1000.0 / 60.0;

/// Headless viewer driver
#[derive(Parser, Debug)]
#[command(name = "headless_viewer")]
#[command(about = "Run the viewer orchestration loop without a window")]
struct Args {
    /// Viewer options file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host frames to run
    #[arg(long, default_value_t = 120)]
    frames: u64,
}

fn demo_source() -> DataSourceHandle {
    let start = Utc::now();
    let source = DataSource::with_clock(
        "orbit",
        DataSourceClock {
            start_time: start,
            stop_time: start + chrono::Duration::minutes(10),
            current_time: start,
            clock_range: ClockRange::LoopStop,
            clock_step: ClockStep::SystemClockMultiplier,
            multiplier: 60.0,
        },
    );

    let samples = (0..=10)
        .map(|minute| {
            let angle = f64::from(minute) * std::f64::consts::TAU / 10.0;
            (
                start + chrono::Duration::minutes(i64::from(minute)),
                Vec3::new(7_000.0 * angle.cos(), 7_000.0 * angle.sin(), 0.0),
            )
        })
        .collect();
    source
        .entities()
        .add(Entity::named("satellite", PositionProperty::sampled(samples)));
    source
        .entities()
        .add(Entity::named("ground-station", PositionProperty::constant(Vec3::new(6_371.0, 0.0, 0.0))));
    source
}

fn run(args: &Args) -> Result<(), ViewerError> {
    let config = match &args.config {
        Some(path) => ViewerConfig::from_toml_file(path)?,
        None => ViewerConfig::default(),
    };

    let scene = Arc::new(Mutex::new(ScriptedScene::new()));
    let camera = Arc::new(Mutex::new(RecordingCamera::new()));
    let viewer = Viewer::builder(scene.clone(), camera.clone())
        .container(Container::new("headless", 1280.0, 720.0))
        .config(config)
        .build()?;

    let (_errors_subscription, render_errors) = viewer.render_error().subscribe_channel(16);

    let source = demo_source();
    viewer.data_sources().add(source.clone());
    info!(
        tracked = ?viewer.clock_tracked_data_source().map(|s| s.name().to_owned()),
        "Data source added"
    );

    let mut settlement = viewer.zoom_to(ZoomTarget::data_source(source.clone()), None)?;
    // A collection zoom clears the tracked entity, so follow only once it lands
    let mut satellite = source.entities().values().into_iter().next();

    for frame in 0..args.frames {
        #[allow(clippy::cast_precision_loss)]
        let timestamp = frame as f64 * HOST_FRAME_MS;
        viewer.on_animation_frame(timestamp);
        std::thread::sleep(Duration::from_micros(200));

        if satellite.is_some() {
            if let Some(result) = settlement.try_result() {
                info!(frame, ?result, "Zoom settled");
                viewer.set_tracked_entity(satellite.take());
            }
        }

        for failure in render_errors.try_iter() {
            error!(frame = failure.frame, message = %failure.message, "Render loop stopped");
        }
    }

    if viewer.error_panel().is_some() {
        warn!("Viewer finished with the error panel open");
    }
    let (updates, renders) = {
        let scene = scene.lock();
        (scene.updates(), scene.renders())
    };
    let views = camera.lock().views().len();
    let clock_time = viewer.clock().read().current_time;
    info!(
        state = ?viewer.render_loop_state(),
        updates,
        renders,
        views,
        clock = %clock_time,
        "Headless run complete"
    );

    viewer.destroy();
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Headless viewer failed");
            ExitCode::FAILURE
        }
    }
}
