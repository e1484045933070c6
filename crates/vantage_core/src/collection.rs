//! # Entity Collections
//!
//! An ordered set of entities keyed by id. Every change is announced on
//! `collection_changed` after the internal lock has been released.

use parking_lot::RwLock;

use vantage_shared::Event;

use crate::entity::{EntityHandle, EntityId};

/// Payload of [`EntityCollection::collection_changed`].
#[derive(Clone, Debug, Default)]
pub struct CollectionChange {
    /// Entities that were added
    pub added: Vec<EntityHandle>,
    /// Entities that were removed
    pub removed: Vec<EntityHandle>,
}

/// Ordered, id-unique set of entities.
#[derive(Debug, Default)]
pub struct EntityCollection {
    entities: RwLock<Vec<EntityHandle>>,
    collection_changed: Event<CollectionChange>,
}

impl EntityCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity. Returns `false` if an entity with the same id is
    /// already present.
    pub fn add(&self, entity: EntityHandle) -> bool {
        {
            let mut entities = self.entities.write();
            if entities.iter().any(|e| e.id() == entity.id()) {
                return false;
            }
            entities.push(entity.clone());
        }

        self.collection_changed.raise(&CollectionChange {
            added: vec![entity],
            removed: Vec::new(),
        });
        true
    }

    /// Removes the entity with `id`. Returns the removed handle.
    pub fn remove(&self, id: EntityId) -> Option<EntityHandle> {
        let removed = {
            let mut entities = self.entities.write();
            let index = entities.iter().position(|e| e.id() == id)?;
            entities.remove(index)
        };

        self.collection_changed.raise(&CollectionChange {
            added: Vec::new(),
            removed: vec![removed.clone()],
        });
        Some(removed)
    }

    /// Removes every entity. Returns how many were removed.
    pub fn remove_all(&self) -> usize {
        let removed = std::mem::take(&mut *self.entities.write());
        let count = removed.len();
        if count > 0 {
            self.collection_changed.raise(&CollectionChange {
                added: Vec::new(),
                removed,
            });
        }
        count
    }

    /// True when an entity with `id` is present.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.read().iter().any(|e| e.id() == id)
    }

    /// Looks an entity up by id.
    #[must_use]
    pub fn get_by_id(&self, id: EntityId) -> Option<EntityHandle> {
        self.entities.read().iter().find(|e| e.id() == id).cloned()
    }

    /// Snapshot of the entities in insertion order.
    #[must_use]
    pub fn values(&self) -> Vec<EntityHandle> {
        self.entities.read().clone()
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    /// True when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }

    /// Raised after entities are added or removed.
    #[must_use]
    pub fn collection_changed(&self) -> &Event<CollectionChange> {
        &self.collection_changed
    }
}
