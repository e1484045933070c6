//! # Selection and Tracking
//!
//! Holds the selected entity (inspection UI) and the tracked entity (camera
//! follow). Each field raises its change event once per effective change.

use parking_lot::Mutex;

use vantage_core::{EntityHandle, SimTime};
use vantage_shared::{Event, Matrix4};

use crate::camera::Camera;

/// Snapshot of both selection fields.
#[derive(Clone, Debug, Default)]
pub struct TrackedState {
    /// Entity shown in the inspection UI
    pub selected_entity: Option<EntityHandle>,
    /// Entity the camera follows
    pub tracked_entity: Option<EntityHandle>,
}

fn same_entity(a: Option<&EntityHandle>, b: Option<&EntityHandle>) -> bool {
    a.map(|e| e.id()) == b.map(|e| e.id())
}

/// Selected/tracked entity state.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    state: Mutex<TrackedState>,
    selected_changed: Event<Option<EntityHandle>>,
    tracked_changed: Event<Option<EntityHandle>>,
}

impl SelectionTracker {
    /// Creates a tracker with nothing selected or tracked.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of both fields.
    #[must_use]
    pub fn snapshot(&self) -> TrackedState {
        self.state.lock().clone()
    }

    /// Currently selected entity.
    #[must_use]
    pub fn selected_entity(&self) -> Option<EntityHandle> {
        self.state.lock().selected_entity.clone()
    }

    /// Currently tracked entity.
    #[must_use]
    pub fn tracked_entity(&self) -> Option<EntityHandle> {
        self.state.lock().tracked_entity.clone()
    }

    /// Sets the selected entity. Returns `true` when the value changed.
    pub fn set_selected_entity(&self, entity: Option<EntityHandle>) -> bool {
        {
            let mut state = self.state.lock();
            if same_entity(state.selected_entity.as_ref(), entity.as_ref()) {
                return false;
            }
            state.selected_entity.clone_from(&entity);
        }
        tracing::debug!(entity = ?entity.as_ref().map(|e| e.id()), "selected entity changed");
        self.selected_changed.raise(&entity);
        true
    }

    /// Sets the tracked entity. Returns `true` when the value changed.
    pub fn set_tracked_entity(&self, entity: Option<EntityHandle>) -> bool {
        {
            let mut state = self.state.lock();
            if same_entity(state.tracked_entity.as_ref(), entity.as_ref()) {
                return false;
            }
            state.tracked_entity.clone_from(&entity);
        }
        tracing::debug!(entity = ?entity.as_ref().map(|e| e.id()), "tracked entity changed");
        self.tracked_changed.raise(&entity);
        true
    }

    /// Clears whichever fields reference one of `removed`.
    pub fn on_entities_removed(&self, removed: &[EntityHandle]) {
        if removed.is_empty() {
            return;
        }

        let (clear_selected, clear_tracked) = {
            let state = self.state.lock();
            let matches = |field: &Option<EntityHandle>| {
                field
                    .as_ref()
                    .is_some_and(|current| removed.iter().any(|e| e.id() == current.id()))
            };
            (matches(&state.selected_entity), matches(&state.tracked_entity))
        };

        if clear_selected {
            self.set_selected_entity(None);
        }
        if clear_tracked {
            self.set_tracked_entity(None);
        }
    }

    /// Moves the camera reference frame onto the tracked entity.
    ///
    /// Returns `true` when the transform was updated. An entity without a
    /// position at `time` leaves the camera where it is.
    pub fn follow_tracked(&self, camera: &mut dyn Camera, time: SimTime) -> bool {
        let Some(entity) = self.tracked_entity() else {
            return false;
        };
        match entity.position_at(time) {
            Some(position) => {
                camera.set_transform(Matrix4::from_translation(position));
                true
            }
            None => false,
        }
    }

    /// Raised with the new selected entity.
    #[must_use]
    pub fn selected_entity_changed(&self) -> &Event<Option<EntityHandle>> {
        &self.selected_changed
    }

    /// Raised with the new tracked entity.
    #[must_use]
    pub fn tracked_entity_changed(&self) -> &Event<Option<EntityHandle>> {
        &self.tracked_changed
    }
}
