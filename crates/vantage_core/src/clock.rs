//! # Simulation Clock
//!
//! The single clock every time-dynamic object is evaluated against.
//! Data sources only carry clock *settings*; the viewer decides which
//! source's settings get copied here.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use vantage_shared::constants::DEFAULT_CLOCK_SPAN_SECS;

use crate::data_source::DataSourceClock;

/// Simulation instant.
pub type SimTime = DateTime<Utc>;

/// Clock shared between the viewer, its render loop and data sources.
pub type SharedClock = Arc<RwLock<Clock>>;

/// What happens when the current time leaves `[start_time, stop_time]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockRange {
    /// Time keeps advancing past the stop time.
    #[default]
    Unbounded,
    /// Time stops at the stop time (or the start time when running backwards).
    Clamped,
    /// Time wraps to the start time once it passes the stop time.
    LoopStop,
}

/// How a tick advances the current time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockStep {
    /// Every tick advances by `multiplier` seconds, regardless of wall time.
    TickDependent,
    /// Every tick advances by elapsed wall time times `multiplier`.
    #[default]
    SystemClockMultiplier,
    /// Current time follows the system clock.
    SystemClock,
}

/// The shared simulation clock.
#[derive(Clone, Debug, PartialEq)]
pub struct Clock {
    /// Start of the clock range
    pub start_time: SimTime,
    /// End of the clock range
    pub stop_time: SimTime,
    /// Current simulation time
    pub current_time: SimTime,
    /// Range behavior
    pub clock_range: ClockRange,
    /// Step behavior
    pub clock_step: ClockStep,
    /// Rate multiplier
    pub multiplier: f64,
    /// Whether ticks advance time at all
    pub should_animate: bool,
}

impl Default for Clock {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            start_time: now,
            stop_time: now + Duration::seconds(DEFAULT_CLOCK_SPAN_SECS),
            current_time: now,
            clock_range: ClockRange::default(),
            clock_step: ClockStep::default(),
            multiplier: 1.0,
            should_animate: false,
        }
    }
}

impl Clock {
    /// Creates a shared clock.
    #[must_use]
    pub fn shared(self) -> SharedClock {
        Arc::new(RwLock::new(self))
    }

    /// Copies a data source's clock settings onto this clock, field for field.
    ///
    /// `should_animate` belongs to the viewer and is left untouched.
    pub fn apply_data_source_clock(&mut self, settings: &DataSourceClock) {
        self.start_time = settings.start_time;
        self.stop_time = settings.stop_time;
        self.current_time = settings.current_time;
        self.clock_range = settings.clock_range;
        self.clock_step = settings.clock_step;
        self.multiplier = settings.multiplier;
    }

    /// Advances the clock by one tick and returns the new current time.
    ///
    /// A step that leaves the representable time range stops at the range
    /// boundary it ran into: the stop (or start) time when clamped, the
    /// start time when looping, and the current time when unbounded.
    pub fn tick(&mut self, elapsed: std::time::Duration) -> SimTime {
        if !self.should_animate {
            return self.current_time;
        }

        let step_secs = match self.clock_step {
            ClockStep::SystemClock => None,
            ClockStep::TickDependent => Some(self.multiplier),
            ClockStep::SystemClockMultiplier => Some(elapsed.as_secs_f64() * self.multiplier),
        };
        let advanced = match step_secs {
            None => Some(Utc::now()),
            Some(secs) => offset_time(self.current_time, secs),
        };

        self.current_time = match (self.clock_range, advanced) {
            (ClockRange::Unbounded, Some(advanced)) => advanced,
            (ClockRange::Unbounded, None) => {
                tracing::warn!(multiplier = self.multiplier, "clock step out of range, holding time");
                self.current_time
            }
            (ClockRange::Clamped, Some(advanced)) => {
                if advanced > self.stop_time {
                    self.stop_time
                } else if advanced < self.start_time {
                    self.start_time
                } else {
                    advanced
                }
            }
            (ClockRange::Clamped, None) => {
                if step_secs.is_some_and(|secs| secs < 0.0) {
                    self.start_time
                } else {
                    self.stop_time
                }
            }
            (ClockRange::LoopStop, Some(advanced)) => {
                if advanced > self.stop_time || advanced < self.start_time {
                    self.start_time
                } else {
                    advanced
                }
            }
            (ClockRange::LoopStop, None) => self.start_time,
        };
        self.current_time
    }
}

/// `time` moved by `secs` seconds, or `None` when the result is not a
/// representable instant.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn offset_time(time: SimTime, secs: f64) -> Option<SimTime> {
    let micros = secs * 1e6;
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return None;
    }
    time.checked_add_signed(Duration::microseconds(micros as i64))
}
