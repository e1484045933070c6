//! # Clock Tracking
//!
//! Decides which data source's clock settings drive the shared clock.
//!
//! ## Policy
//!
//! ```text
//! automatic on:   tracked = most recently added present source with a clock
//! automatic off:  tracked = whatever was pinned, until that source is removed
//! ```
//!
//! A pin made while automatic tracking is on holds until the next add of a
//! source with a clock.

use parking_lot::Mutex;

use vantage_core::{DataSourceHandle, DataSourceId, SharedClock};
use vantage_shared::Event;

#[derive(Debug)]
struct TrackingState {
    automatic: bool,
    tracked: Option<DataSourceHandle>,
    /// Observed sources in insertion order
    present: Vec<DataSourceHandle>,
}

/// Keeps the shared clock in step with the tracked data source.
#[derive(Debug)]
pub struct ClockCoordinator {
    clock: SharedClock,
    state: Mutex<TrackingState>,
    tracked_changed: Event<Option<DataSourceHandle>>,
}

fn same_source(a: Option<&DataSourceHandle>, b: Option<&DataSourceHandle>) -> bool {
    a.map(|s| s.id()) == b.map(|s| s.id())
}

impl ClockCoordinator {
    /// Creates a coordinator writing into `clock`.
    #[must_use]
    pub fn new(clock: SharedClock, automatic: bool) -> Self {
        Self {
            clock,
            state: Mutex::new(TrackingState {
                automatic,
                tracked: None,
                present: Vec::new(),
            }),
            tracked_changed: Event::new(),
        }
    }

    /// The clock this coordinator writes into.
    #[must_use]
    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Handles a data source joining the observed set.
    pub fn on_data_source_added(&self, source: &DataSourceHandle) {
        let changed = {
            let mut state = self.state.lock();
            if !state.present.iter().any(|s| s.id() == source.id()) {
                state.present.push(source.clone());
            }
            if state.automatic && source.has_clock() {
                self.track_locked(&mut state, Some(source.clone()))
            } else {
                None
            }
        };
        self.announce(changed);
    }

    /// Handles a data source leaving the observed set.
    pub fn on_data_source_removed(&self, source: &DataSourceHandle) {
        let changed = {
            let mut state = self.state.lock();
            state.present.retain(|s| s.id() != source.id());

            let was_tracked = state.tracked.as_ref().is_some_and(|t| t.id() == source.id());
            if was_tracked {
                let fallback = if state.automatic {
                    state.present.iter().rev().find(|s| s.has_clock()).cloned()
                } else {
                    None
                };
                self.track_locked(&mut state, fallback)
            } else {
                None
            }
        };
        self.announce(changed);
    }

    /// Handles a data source announcing new content or clock settings.
    pub fn on_data_source_changed(&self, id: DataSourceId) {
        let state = self.state.lock();
        if let Some(tracked) = state.tracked.as_ref().filter(|t| t.id() == id) {
            if let Some(settings) = tracked.clock() {
                self.clock.write().apply_data_source_clock(&settings);
                tracing::debug!(source = tracked.name(), "tracked clock settings reapplied");
            }
        }
    }

    /// Currently tracked data source.
    #[must_use]
    pub fn tracked_data_source(&self) -> Option<DataSourceHandle> {
        self.state.lock().tracked.clone()
    }

    /// Pins (or unpins) the tracked data source.
    ///
    /// Takes effect whether or not automatic tracking is on, and leaves the
    /// automatic flag alone.
    pub fn set_tracked_data_source(&self, source: Option<DataSourceHandle>) {
        let changed = {
            let mut state = self.state.lock();
            self.track_locked(&mut state, source)
        };
        self.announce(changed);
    }

    /// Whether newly added sources take over the clock.
    #[must_use]
    pub fn automatic_tracking(&self) -> bool {
        self.state.lock().automatic
    }

    /// Enables or disables automatic tracking. Does not change the current
    /// tracked source.
    pub fn set_automatic_tracking(&self, automatic: bool) {
        self.state.lock().automatic = automatic;
    }

    /// Raised with the new tracked source after every effective change.
    #[must_use]
    pub fn tracked_data_source_changed(&self) -> &Event<Option<DataSourceHandle>> {
        &self.tracked_changed
    }

    /// Number of observed sources.
    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.state.lock().present.len()
    }

    /// Replaces the tracked source. Returns the new value when it differs
    /// from the old one.
    fn track_locked(
        &self,
        state: &mut TrackingState,
        source: Option<DataSourceHandle>,
    ) -> Option<Option<DataSourceHandle>> {
        if let Some(settings) = source.as_ref().and_then(|s| s.clock()) {
            self.clock.write().apply_data_source_clock(&settings);
        }
        if same_source(state.tracked.as_ref(), source.as_ref()) {
            return None;
        }

        tracing::debug!(
            from = ?state.tracked.as_ref().map(|s| s.name()),
            to = ?source.as_ref().map(|s| s.name()),
            "clock tracking changed"
        );
        state.tracked.clone_from(&source);
        Some(source)
    }

    fn announce(&self, changed: Option<Option<DataSourceHandle>>) {
        if let Some(tracked) = changed {
            self.tracked_changed.raise(&tracked);
        }
    }
}
