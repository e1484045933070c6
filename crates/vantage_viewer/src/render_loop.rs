//! # Render Supervision
//!
//! ```text
//! ┌─────────┐  scene update fails or panics  ┌───────────┐
//! │ Running │───────────────────────────────>│ Suspended │  (terminal)
//! └─────────┘                                └───────────┘
//!                                             ├── default loop off
//!                                             ├── render_error raised
//!                                             └── error panel (optional)
//! ```
//!
//! Each frame runs inside a failure boundary that catches returned errors
//! and panics alike. The first failure stops the loop for the lifetime of
//! the viewer; there is no retry.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use parking_lot::Mutex;

use vantage_shared::{Event, ERROR_PANEL_TITLE};

use crate::error::{RenderFailure, SceneError};

/// Render loop lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderLoopState {
    /// Frames are rendered.
    Running,
    /// A frame failed; nothing renders anymore.
    Suspended,
}

/// What happened to one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The frame rendered.
    Rendered,
    /// The frame was not attempted.
    Skipped,
    /// The frame failed and the loop is now suspended.
    Failed(RenderFailure),
}

/// Dismissible message shown after the loop stops.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorPanel {
    /// Panel title
    pub title: String,
    /// Failure details
    pub message: String,
}

#[derive(Debug)]
struct SupervisorState {
    state: RenderLoopState,
    frames: u64,
    failure: Option<RenderFailure>,
    error_panel: Option<ErrorPanel>,
    use_default_render_loop: bool,
    show_render_loop_errors: bool,
}

/// Wraps every frame in a failure boundary.
#[derive(Debug)]
pub struct RenderSupervisor {
    state: Mutex<SupervisorState>,
    render_error: Event<RenderFailure>,
}

impl RenderSupervisor {
    /// Creates a running supervisor.
    #[must_use]
    pub fn new(use_default_render_loop: bool, show_render_loop_errors: bool) -> Self {
        Self {
            state: Mutex::new(SupervisorState {
                state: RenderLoopState::Running,
                frames: 0,
                failure: None,
                error_panel: None,
                use_default_render_loop,
                show_render_loop_errors,
            }),
            render_error: Event::new(),
        }
    }

    /// Runs one frame.
    ///
    /// `frame` is not called once the loop is suspended.
    pub fn render_frame<F>(&self, frame: F) -> FrameOutcome
    where
        F: FnOnce() -> Result<(), SceneError>,
    {
        let number = {
            let mut state = self.state.lock();
            if state.state == RenderLoopState::Suspended {
                return FrameOutcome::Skipped;
            }
            state.frames += 1;
            state.frames
        };

        let message = match catch_unwind(AssertUnwindSafe(frame)) {
            Ok(Ok(())) => return FrameOutcome::Rendered,
            Ok(Err(err)) => err.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };

        let failure = RenderFailure {
            frame: number,
            message,
        };
        self.suspend(failure.clone());
        FrameOutcome::Failed(failure)
    }

    fn suspend(&self, failure: RenderFailure) {
        {
            let mut state = self.state.lock();
            state.state = RenderLoopState::Suspended;
            state.use_default_render_loop = false;
            if state.show_render_loop_errors {
                state.error_panel = Some(ErrorPanel {
                    title: ERROR_PANEL_TITLE.to_owned(),
                    message: failure.message.clone(),
                });
            }
            state.failure = Some(failure.clone());
        }

        tracing::error!(frame = failure.frame, error = %failure.message, "render loop stopped");
        self.render_error.raise(&failure);
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RenderLoopState {
        self.state.lock().state
    }

    /// True while frames are rendered.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == RenderLoopState::Running
    }

    /// Frames attempted so far, including the failed one.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.state.lock().frames
    }

    /// The failure that stopped the loop.
    #[must_use]
    pub fn failure(&self) -> Option<RenderFailure> {
        self.state.lock().failure.clone()
    }

    /// The open error panel.
    #[must_use]
    pub fn error_panel(&self) -> Option<ErrorPanel> {
        self.state.lock().error_panel.clone()
    }

    /// Closes the error panel. The loop stays suspended.
    pub fn dismiss_error_panel(&self) -> bool {
        self.state.lock().error_panel.take().is_some()
    }

    /// Whether host animation frames render automatically.
    #[must_use]
    pub fn use_default_render_loop(&self) -> bool {
        self.state.lock().use_default_render_loop
    }

    /// Turns automatic rendering on or off. Does not revive a suspended loop.
    pub fn set_use_default_render_loop(&self, enabled: bool) {
        self.state.lock().use_default_render_loop = enabled;
    }

    /// Whether a failure opens the error panel.
    #[must_use]
    pub fn show_render_loop_errors(&self) -> bool {
        self.state.lock().show_render_loop_errors
    }

    /// Enables or disables the error panel for future failures.
    pub fn set_show_render_loop_errors(&self, show: bool) {
        self.state.lock().show_render_loop_errors = show;
    }

    /// Raised once, with the failure that stopped the loop.
    #[must_use]
    pub fn render_error(&self) -> &Event<RenderFailure> {
        &self.render_error
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// Throttles host animation frames to a target frame rate.
#[derive(Clone, Debug, Default)]
pub struct FramePacer {
    target_frame_rate: Option<f64>,
    last_frame_ms: Option<f64>,
}

impl FramePacer {
    /// Creates a pacer. `None` renders every frame.
    #[must_use]
    pub fn new(target_frame_rate: Option<f64>) -> Self {
        Self {
            target_frame_rate,
            last_frame_ms: None,
        }
    }

    /// Changes the target rate.
    pub fn set_target_frame_rate(&mut self, target_frame_rate: Option<f64>) {
        self.target_frame_rate = target_frame_rate;
    }

    /// Target rate.
    #[must_use]
    pub fn target_frame_rate(&self) -> Option<f64> {
        self.target_frame_rate
    }

    /// True when a frame is due at `timestamp_ms`.
    pub fn should_render(&mut self, timestamp_ms: f64) -> bool {
        let Some(rate) = self.target_frame_rate else {
            return true;
        };
        let Some(last) = self.last_frame_ms else {
            self.last_frame_ms = Some(timestamp_ms);
            return true;
        };

        let interval = 1000.0 / rate;
        let delta = timestamp_ms - last;
        if delta > interval {
            // Keep the remainder so the cadence does not drift
            self.last_frame_ms = Some(timestamp_ms - delta % interval);
            true
        } else {
            false
        }
    }
}
