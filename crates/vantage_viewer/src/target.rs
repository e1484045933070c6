//! # Target Resolution
//!
//! Turns a zoom/fly target into a bounding sphere.
//!
//! ## Target kinds
//!
//! | Kind | Ready when | Default offset |
//! |------|------------|----------------|
//! | `FixedVolume` | the volume reports ready | heading 0, pitch -0.5, range = radius |
//! | `TimeDynamic` | the sphere is defined at the current time | heading 0, pitch -0.5, range = radius |
//! | `Collection` | no member is pending | none |
//!
//! Resolution never blocks. A pending target is polled again on the next
//! post-render pass.

use std::fmt;
use std::sync::Arc;

use vantage_core::{DataSourceHandle, Entity, EntityHandle, SimTime};
use vantage_shared::{BoundingSphere, HeadingPitchRange, DEFAULT_OFFSET_HEADING, DEFAULT_OFFSET_PITCH};

use crate::error::{ViewerError, ViewerResult};

// =============================================================================
// COLLABORATOR TRAITS
// =============================================================================

/// A volume with a fixed extent that may take time to become available
/// (a tileset still loading its root, a model still parsing).
pub trait BoundedVolume: Send + Sync {
    /// True once `bounding_sphere` can be trusted.
    fn is_ready(&self) -> bool;

    /// The volume's extent.
    fn bounding_sphere(&self) -> Option<BoundingSphere>;
}

/// A volume whose extent depends on simulation time.
pub trait TimeDynamicVolume: Send + Sync {
    /// Extent at `time`, `None` while undefined.
    fn bounding_sphere_at(&self, time: SimTime) -> Option<BoundingSphere>;
}

/// Per-entity bounding sphere state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundingSphereState {
    /// Sphere computed.
    Done(BoundingSphere),
    /// Not computable yet, ask again later.
    Pending,
    /// Never computable for this entity.
    Failed,
}

/// Computes bounding spheres for entities.
pub trait EntityBoundsProvider: Send + Sync {
    /// Bounding sphere of `entity` at `time`.
    fn bounding_sphere(&self, entity: &Entity, time: SimTime) -> BoundingSphereState;
}

/// Point sphere at the entity's position. Entities without a position fail.
#[derive(Clone, Copy, Debug, Default)]
pub struct PositionBoundsProvider;

impl EntityBoundsProvider for PositionBoundsProvider {
    fn bounding_sphere(&self, entity: &Entity, time: SimTime) -> BoundingSphereState {
        entity
            .position_at(time)
            .map_or(BoundingSphereState::Failed, |position| {
                BoundingSphereState::Done(BoundingSphere::from_point(position))
            })
    }
}

// =============================================================================
// TARGETS
// =============================================================================

/// Entities to frame together.
#[derive(Clone, Debug)]
pub enum EntityGroup {
    /// An explicit list.
    Entities(Vec<EntityHandle>),
    /// Every entity of a data source.
    DataSource(DataSourceHandle),
}

/// Anything the camera can be pointed at.
#[derive(Clone)]
pub enum ZoomTarget {
    /// Fixed extent, possibly not ready yet.
    FixedVolume(Arc<dyn BoundedVolume>),
    /// Extent changes with time.
    TimeDynamic(Arc<dyn TimeDynamicVolume>),
    /// A set of entities.
    Collection(EntityGroup),
}

/// Discriminant of [`ZoomTarget`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetKind {
    /// [`ZoomTarget::FixedVolume`]
    FixedVolume,
    /// [`ZoomTarget::TimeDynamic`]
    TimeDynamic,
    /// [`ZoomTarget::Collection`]
    Collection,
}

impl ZoomTarget {
    /// Fixed volume target.
    pub fn fixed(volume: Arc<dyn BoundedVolume>) -> Self {
        Self::FixedVolume(volume)
    }

    /// Time-dynamic target.
    pub fn time_dynamic(volume: Arc<dyn TimeDynamicVolume>) -> Self {
        Self::TimeDynamic(volume)
    }

    /// A single entity.
    #[must_use]
    pub fn entity(entity: EntityHandle) -> Self {
        Self::Collection(EntityGroup::Entities(vec![entity]))
    }

    /// Several entities.
    #[must_use]
    pub fn entities(entities: Vec<EntityHandle>) -> Self {
        Self::Collection(EntityGroup::Entities(entities))
    }

    /// All entities of a data source.
    #[must_use]
    pub fn data_source(source: DataSourceHandle) -> Self {
        Self::Collection(EntityGroup::DataSource(source))
    }

    /// Which kind of target this is.
    #[must_use]
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::FixedVolume(_) => TargetKind::FixedVolume,
            Self::TimeDynamic(_) => TargetKind::TimeDynamic,
            Self::Collection(_) => TargetKind::Collection,
        }
    }
}

impl fmt::Debug for ZoomTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedVolume(_) => f.write_str("ZoomTarget::FixedVolume"),
            Self::TimeDynamic(_) => f.write_str("ZoomTarget::TimeDynamic"),
            Self::Collection(group) => f.debug_tuple("ZoomTarget::Collection").field(group).finish(),
        }
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Outcome of one resolution attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResolvedVolume {
    /// Sphere available.
    Ready(BoundingSphere),
    /// Try again next pass.
    Pending,
    /// Will never produce a sphere.
    Unresolvable,
}

/// Offset to hand the camera for a resolved target.
///
/// Single volumes get a synthesized offset when none is given; collections
/// pass `None` through and let the camera choose.
#[must_use]
pub fn offset_for(
    kind: TargetKind,
    explicit: Option<HeadingPitchRange>,
    sphere: &BoundingSphere,
) -> Option<HeadingPitchRange> {
    match (explicit, kind) {
        (Some(offset), _) => Some(offset),
        (None, TargetKind::Collection) => None,
        (None, TargetKind::FixedVolume | TargetKind::TimeDynamic) => Some(HeadingPitchRange::new(
            DEFAULT_OFFSET_HEADING,
            DEFAULT_OFFSET_PITCH,
            sphere.radius,
        )),
    }
}

/// Resolves targets to bounding spheres.
#[derive(Clone)]
pub struct TargetResolver {
    bounds: Arc<dyn EntityBoundsProvider>,
}

impl fmt::Debug for TargetResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetResolver").finish_non_exhaustive()
    }
}

impl Default for TargetResolver {
    fn default() -> Self {
        Self::new(Arc::new(PositionBoundsProvider))
    }
}

impl TargetResolver {
    /// Creates a resolver using `bounds` for entity members.
    pub fn new(bounds: Arc<dyn EntityBoundsProvider>) -> Self {
        Self { bounds }
    }

    /// Single resolution attempt at `time`.
    #[must_use]
    pub fn resolve(&self, target: &ZoomTarget, time: SimTime) -> ResolvedVolume {
        match target {
            ZoomTarget::FixedVolume(volume) => {
                if !volume.is_ready() {
                    return ResolvedVolume::Pending;
                }
                volume
                    .bounding_sphere()
                    .map_or(ResolvedVolume::Unresolvable, ResolvedVolume::Ready)
            }
            ZoomTarget::TimeDynamic(volume) => volume
                .bounding_sphere_at(time)
                .map_or(ResolvedVolume::Pending, ResolvedVolume::Ready),
            ZoomTarget::Collection(EntityGroup::Entities(entities)) => {
                self.resolve_entities(entities, time)
            }
            ZoomTarget::Collection(EntityGroup::DataSource(source)) => {
                if source.is_loading() {
                    return ResolvedVolume::Pending;
                }
                self.resolve_entities(&source.entities().values(), time)
            }
        }
    }

    /// Rejects a missing target before anything is queued.
    pub fn require(target: Option<ZoomTarget>) -> ViewerResult<ZoomTarget> {
        target.ok_or_else(|| ViewerError::invalid_argument("target", "target is required"))
    }

    fn resolve_entities(&self, entities: &[EntityHandle], time: SimTime) -> ResolvedVolume {
        let mut spheres = Vec::with_capacity(entities.len());
        for entity in entities {
            match self.bounds.bounding_sphere(entity, time) {
                BoundingSphereState::Done(sphere) => spheres.push(sphere),
                BoundingSphereState::Pending => return ResolvedVolume::Pending,
                BoundingSphereState::Failed => {}
            }
        }
        BoundingSphere::from_bounding_spheres(&spheres)
            .map_or(ResolvedVolume::Unresolvable, ResolvedVolume::Ready)
    }
}
