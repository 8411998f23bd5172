// ── Generic entity collection ──
//
// Concurrent storage with O(1) lookups by `EntityId`. Populated once
// when a store is loaded and only read afterwards.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::model::EntityId;

/// A concurrent collection for a single entity kind.
pub(crate) struct EntityCollection<T: Send + Sync + 'static> {
    by_id: DashMap<EntityId, Arc<T>>,
}

impl<T: Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        Self {
            by_id: DashMap::new(),
        }
    }

    /// Insert an entity. Returns `false` (and keeps the existing entry)
    /// if the id was already taken.
    pub(crate) fn insert(&self, id: EntityId, entity: T) -> bool {
        match self.by_id.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(entity));
                true
            }
        }
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<Arc<T>> {
        self.by_id.get(&id).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn contains(&self, id: EntityId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// All entities, ordered by id.
    pub(crate) fn snapshot(&self) -> Vec<Arc<T>> {
        let mut entries: Vec<(EntityId, Arc<T>)> = self
            .by_id
            .iter()
            .map(|r| (*r.key(), Arc::clone(r.value())))
            .collect();
        entries.sort_by_key(|(id, _)| *id);
        entries.into_iter().map(|(_, v)| v).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    #[allow(dead_code)]
    pub(crate) fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
