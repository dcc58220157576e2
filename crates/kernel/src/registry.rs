use std::collections::BTreeMap;
use worldsync_common::{ObjectId, ProcessId};

use crate::object::Object;

/// Live objects plus tombstones of deleted ones.
///
/// Tombstones are kept so that events arriving after a deletion can still
/// resolve their participants' authority.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    live: BTreeMap<ObjectId, Object>,
    tombstones: BTreeMap<ObjectId, Object>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a live object. Returns false if the id is already known.
    pub fn insert(&mut self, obj: Object) -> bool {
        if self.knows(obj.id) {
            return false;
        }
        self.live.insert(obj.id, obj);
        true
    }

    /// Move a live object to the tombstones, marking it deleted.
    pub fn retire(&mut self, id: ObjectId) -> Option<&Object> {
        let mut obj = self.live.remove(&id)?;
        obj.deleted = true;
        self.tombstones.insert(id, obj);
        self.tombstones.get(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.live.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.live.get_mut(&id)
    }

    /// Live object or tombstone.
    pub fn lookup(&self, id: ObjectId) -> Option<&Object> {
        self.live.get(&id).or_else(|| self.tombstones.get(&id))
    }

    pub fn is_live(&self, id: ObjectId) -> bool {
        self.live.contains_key(&id)
    }

    /// Live or tombstoned.
    pub fn knows(&self, id: ObjectId) -> bool {
        self.live.contains_key(&id) || self.tombstones.contains_key(&id)
    }

    pub fn owner_of(&self, id: ObjectId) -> Option<ProcessId> {
        self.lookup(id).map(Object::owner)
    }

    pub fn live(&self) -> impl Iterator<Item = &Object> {
        self.live.values()
    }

    pub fn live_mut(&mut self) -> impl Iterator<Item = &mut Object> {
        self.live.values_mut()
    }

    pub fn live_ids(&self) -> Vec<ObjectId> {
        self.live.keys().copied().collect()
    }

    pub fn tombstone_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.tombstones.keys().copied()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn tombstone_count(&self) -> usize {
        self.tombstones.len()
    }
}
