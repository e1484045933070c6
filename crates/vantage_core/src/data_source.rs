//! # Data Sources
//!
//! A data source is a named bundle of entities with optional clock
//! settings. The [`DataSourceCollection`] keeps sources in insertion order;
//! that order is the tie-break when the viewer picks a clock to follow.
//!
//! ## Notifications
//!
//! | Event | Raised by |
//! |-------|-----------|
//! | `DataSource::changed` | `set_clock`, `notify_changed` |
//! | `DataSourceCollection::data_source_added` | `add` |
//! | `DataSourceCollection::data_source_removed` | `remove`, `remove_all` |

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use vantage_shared::Event;

use crate::clock::{ClockRange, ClockStep, SimTime};
use crate::collection::EntityCollection;

static NEXT_DATA_SOURCE_ID: AtomicU64 = AtomicU64::new(0);

/// Stable identity of a data source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct DataSourceId(u64);

impl DataSourceId {
    fn next() -> Self {
        Self(NEXT_DATA_SOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Clock settings a data source would like the viewer to use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataSourceClock {
    /// Start of the source's time range
    pub start_time: SimTime,
    /// End of the source's time range
    pub stop_time: SimTime,
    /// Time to show initially
    pub current_time: SimTime,
    /// Range behavior
    pub clock_range: ClockRange,
    /// Step behavior
    pub clock_step: ClockStep,
    /// Rate multiplier
    pub multiplier: f64,
}

/// Shared data source handle.
pub type DataSourceHandle = Arc<DataSource>;

/// A named set of entities with optional clock settings.
#[derive(Debug)]
pub struct DataSource {
    id: DataSourceId,
    name: String,
    clock: RwLock<Option<DataSourceClock>>,
    entities: EntityCollection,
    loading: AtomicBool,
    changed: Event<DataSourceId>,
}

impl DataSource {
    /// Creates a data source without clock settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> DataSourceHandle {
        Self::build(name.into(), None)
    }

    /// Creates a data source with clock settings.
    #[must_use]
    pub fn with_clock(name: impl Into<String>, clock: DataSourceClock) -> DataSourceHandle {
        Self::build(name.into(), Some(clock))
    }

    fn build(name: String, clock: Option<DataSourceClock>) -> DataSourceHandle {
        Arc::new(Self {
            id: DataSourceId::next(),
            name,
            clock: RwLock::new(clock),
            entities: EntityCollection::new(),
            loading: AtomicBool::new(false),
            changed: Event::new(),
        })
    }

    /// Stable id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> DataSourceId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the clock settings.
    #[must_use]
    pub fn clock(&self) -> Option<DataSourceClock> {
        self.clock.read().clone()
    }

    /// True when the source carries clock settings.
    #[must_use]
    pub fn has_clock(&self) -> bool {
        self.clock.read().is_some()
    }

    /// Replaces the clock settings and raises `changed`.
    pub fn set_clock(&self, clock: Option<DataSourceClock>) {
        *self.clock.write() = clock;
        self.changed.raise(&self.id);
    }

    /// Raises `changed` without modifying anything.
    pub fn notify_changed(&self) {
        self.changed.raise(&self.id);
    }

    /// The source's entities.
    #[must_use]
    pub fn entities(&self) -> &EntityCollection {
        &self.entities
    }

    /// True while the source is still loading its content.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Updates the loading flag.
    pub fn set_loading(&self, loading: bool) {
        self.loading.store(loading, Ordering::Release);
    }

    /// Raised when the source's content or clock settings change.
    #[must_use]
    pub fn changed(&self) -> &Event<DataSourceId> {
        &self.changed
    }
}

/// Ordered collection of data sources.
#[derive(Debug, Default)]
pub struct DataSourceCollection {
    sources: RwLock<Vec<DataSourceHandle>>,
    data_source_added: Event<DataSourceHandle>,
    data_source_removed: Event<DataSourceHandle>,
}

impl DataSourceCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a data source. Returns `false` if it is already present.
    pub fn add(&self, source: DataSourceHandle) -> bool {
        {
            let mut sources = self.sources.write();
            if sources.iter().any(|s| s.id() == source.id()) {
                tracing::debug!(source = source.name(), "data source already in collection");
                return false;
            }
            sources.push(Arc::clone(&source));
        }
        self.data_source_added.raise(&source);
        true
    }

    /// Removes a data source. Returns `false` if it was not present.
    pub fn remove(&self, id: DataSourceId) -> bool {
        let removed = {
            let mut sources = self.sources.write();
            match sources.iter().position(|s| s.id() == id) {
                Some(index) => sources.remove(index),
                None => return false,
            }
        };
        self.data_source_removed.raise(&removed);
        true
    }

    /// Removes every data source, announcing each in insertion order.
    pub fn remove_all(&self) -> usize {
        let removed = std::mem::take(&mut *self.sources.write());
        for source in &removed {
            self.data_source_removed.raise(source);
        }
        removed.len()
    }

    /// True when a source with `id` is present.
    #[must_use]
    pub fn contains(&self, id: DataSourceId) -> bool {
        self.sources.read().iter().any(|s| s.id() == id)
    }

    /// Source at `index` in insertion order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<DataSourceHandle> {
        self.sources.read().get(index).cloned()
    }

    /// Snapshot of the sources in insertion order.
    #[must_use]
    pub fn values(&self) -> Vec<DataSourceHandle> {
        self.sources.read().clone()
    }

    /// Number of sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.read().len()
    }

    /// True when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.read().is_empty()
    }

    /// Raised after a source is appended.
    #[must_use]
    pub fn data_source_added(&self) -> &Event<DataSourceHandle> {
        &self.data_source_added
    }

    /// Raised after a source is removed.
    #[must_use]
    pub fn data_source_removed(&self) -> &Event<DataSourceHandle> {
        &self.data_source_removed
    }
}
