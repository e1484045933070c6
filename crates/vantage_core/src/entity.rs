//! # Entities
//!
//! Entities are shared handles with a stable identity:
//! - An [`EntityId`] allocated once and never reused
//! - An optional display name
//! - A position that may vary with simulation time
//!
//! Selection and tracking compare entities by id, never by pointer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use vantage_shared::Vec3;

use crate::clock::SimTime;

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(0);

/// Unique identifier for an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Allocates the next process-wide id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Where an entity is over time.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PositionProperty {
    /// The entity has no position.
    #[default]
    Undefined,
    /// Same position at every time.
    Constant(Vec3),
    /// Time-tagged samples, sorted by time. Linear between samples,
    /// undefined outside the sampled interval.
    Sampled(Vec<(SimTime, Vec3)>),
}

impl PositionProperty {
    /// Fixed position.
    #[must_use]
    pub const fn constant(position: Vec3) -> Self {
        Self::Constant(position)
    }

    /// Sampled position. Samples are sorted by time.
    #[must_use]
    pub fn sampled(mut samples: Vec<(SimTime, Vec3)>) -> Self {
        samples.sort_by_key(|(time, _)| *time);
        Self::Sampled(samples)
    }

    /// True when the position never changes with time.
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        matches!(self, Self::Undefined | Self::Constant(_))
    }

    /// Position at `time`, `None` when undefined there.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value_at(&self, time: SimTime) -> Option<Vec3> {
        match self {
            Self::Undefined => None,
            Self::Constant(position) => Some(*position),
            Self::Sampled(samples) => {
                let index = match samples.binary_search_by_key(&time, |(t, _)| *t) {
                    Ok(exact) => return Some(samples[exact].1),
                    Err(insert_at) => insert_at,
                };
                if index == 0 || index >= samples.len() {
                    return None;
                }

                let (t0, p0) = samples[index - 1];
                let (t1, p1) = samples[index];
                let span = (t1 - t0).num_microseconds()? as f64;
                let into = (time - t0).num_microseconds()? as f64;
                Some(p0.lerp(p1, into / span))
            }
        }
    }
}

/// Shared entity handle.
pub type EntityHandle = Arc<Entity>;

/// An object in the scene.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    name: RwLock<Option<String>>,
    position: RwLock<PositionProperty>,
}

impl Entity {
    /// Creates an unnamed entity.
    #[must_use]
    pub fn new(position: PositionProperty) -> EntityHandle {
        Arc::new(Self {
            id: EntityId::next(),
            name: RwLock::new(None),
            position: RwLock::new(position),
        })
    }

    /// Creates a named entity.
    #[must_use]
    pub fn named(name: impl Into<String>, position: PositionProperty) -> EntityHandle {
        Arc::new(Self {
            id: EntityId::next(),
            name: RwLock::new(Some(name.into())),
            position: RwLock::new(position),
        })
    }

    /// Stable id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Display name, if any.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.name.read().clone()
    }

    /// Replaces the display name.
    pub fn set_name(&self, name: Option<String>) {
        *self.name.write() = name;
    }

    /// Position property snapshot.
    #[must_use]
    pub fn position(&self) -> PositionProperty {
        self.position.read().clone()
    }

    /// Replaces the position property.
    pub fn set_position(&self, position: PositionProperty) {
        *self.position.write() = position;
    }

    /// Position at `time`.
    #[must_use]
    pub fn position_at(&self, time: SimTime) -> Option<Vec3> {
        self.position.read().value_at(time)
    }
}
