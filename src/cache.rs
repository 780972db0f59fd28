// the cache holds instances of many entity types, so they are kept type-erased
use std::any::{Any, TypeId};
use std::sync::Arc;

use core::hash::BuildHasherDefault;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use seahash::SeaHasher;

use crate::entity::Entity;
use crate::key::EntityKey;

pub type KeyHasher = BuildHasherDefault<SeaHasher>;

type Kept = Arc<dyn Any + Send + Sync>;

// ------------- IdentityCache -------------
/// Keeps the canonical instance of every entity materialized so far.
///
/// Instances are filed per entity type, so two types may use the same
/// identifier value without colliding. Lookups never perform I/O.
#[derive(Default)]
pub struct IdentityCache {
    kept: HashMap<TypeId, HashMap<EntityKey, Kept, KeyHasher>, KeyHasher>,
    length: usize,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn get<T: Entity>(&self, key: &EntityKey) -> Option<Arc<T>> {
        let kept = self.kept.get(&TypeId::of::<T>())?.get(key)?;
        Arc::clone(kept).downcast::<T>().ok()
    }
    /// Files an instance under its key, replacing whatever was kept before.
    pub fn put<T: Entity>(&mut self, key: EntityKey, instance: Arc<T>) {
        let map = self.kept.entry(TypeId::of::<T>()).or_default();
        match map.entry(key) {
            Entry::Vacant(e) => {
                e.insert(instance);
                self.length += 1;
            }
            Entry::Occupied(mut e) => {
                e.insert(instance);
            }
        }
    }
    pub fn len(&self) -> usize {
        self.length
    }
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
    pub fn clear(&mut self) {
        self.kept.clear();
        self.length = 0;
    }
}
