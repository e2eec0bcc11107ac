//! Entity allocation and the type-keyed table of component storages.
//!
//! Grounded in `libsbx-ecs/libsbx/ecs/storage.hpp`'s entity-pool
//! specialization (`basic_storage<Entity, Entity, Allocator>`) for
//! [`EntityAllocator`], and in the general shape of an EnTT-style registry
//! for [`Registry`]'s type-erased storage table.

use std::any::TypeId;

use rustc_hash::FxHashMap;

use crate::any_storage::AnyStorage;
use crate::entity::Entity;
use crate::error::{EcsError, Result};
use crate::sparse_set::{DeletionPolicy, SparseSet};
use crate::storage::Storage;

const DEFAULT_PAGE_SIZE: usize = 1024;

/// Issues and recycles [`Entity`] handles. Internally a [`SparseSet`] run in
/// [`DeletionPolicy::SwapOnly`] mode: alive entities occupy the front
/// partition, destroyed-but-not-yet-overwritten ones sit past the boundary
/// carrying an already-bumped version, ready for LIFO reuse.
pub struct EntityAllocator {
    pool: SparseSet,
}

impl EntityAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pool: SparseSet::new(DeletionPolicy::SwapOnly),
        }
    }

    /// Creates a new entity, recycling a destroyed index if one is free.
    pub fn create(&mut self) -> Entity {
        if self.pool.has_recyclable() {
            self.pool.recycle_front()
        } else {
            let index = self.pool.dense_len() as u32;
            let entity = Entity::combine(index, 0);
            self.pool.push_new(entity);
            entity
        }
    }

    pub fn destroy(&mut self, entity: Entity) -> Result<()> {
        if !self.is_alive(entity) {
            return Err(EcsError::BadEntity(entity));
        }
        self.pool.destroy_swap_only(entity);
        Ok(())
    }

    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.pool.contains(entity)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pool.size()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns entity lifetime and every component storage, keyed by
/// [`TypeId`]. Storages are created lazily on first use, with whatever
/// [`DeletionPolicy`] was configured via [`Registry::configure_storage`]
/// beforehand (defaulting to [`DeletionPolicy::SwapAndPop`]).
pub struct Registry {
    allocator: EntityAllocator,
    storages: FxHashMap<TypeId, Box<dyn AnyStorage>>,
    policies: FxHashMap<TypeId, DeletionPolicy>,
    page_size: usize,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            storages: FxHashMap::default(),
            policies: FxHashMap::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn create(&mut self) -> Entity {
        self.allocator.create()
    }

    /// Destroys `entity`, removing its component from every storage that
    /// has one before recycling the index.
    pub fn destroy(&mut self, entity: Entity) -> Result<()> {
        if !self.allocator.is_alive(entity) {
            return Err(EcsError::BadEntity(entity));
        }
        for storage in self.storages.values_mut() {
            storage.remove(entity);
        }
        log::trace!("destroying entity {entity:?}");
        self.allocator.destroy(entity)
    }

    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.allocator.len()
    }

    /// Sets the deletion policy used the first time a storage for `C` is
    /// created. Panics if that storage already exists, since changing
    /// policy after the fact would require re-laying-out live data.
    pub fn configure_storage<C: 'static>(&mut self, policy: DeletionPolicy) {
        let id = TypeId::of::<C>();
        assert!(
            !self.storages.contains_key(&id),
            "storage for this component type already exists; configure policy before first use"
        );
        log::debug!("configuring storage {id:?} with policy {policy:?}");
        self.policies.insert(id, policy);
    }

    fn storage_mut<C: 'static>(&mut self) -> &mut Storage<C> {
        let id = TypeId::of::<C>();
        let page_size = self.page_size;
        let policy = self.policies.get(&id).copied().unwrap_or(DeletionPolicy::SwapAndPop);
        let entry = self
            .storages
            .entry(id)
            .or_insert_with(|| Box::new(Storage::<C>::new(policy, page_size)));
        entry
            .as_any_mut()
            .downcast_mut::<Storage<C>>()
            .expect("TypeId-keyed storage map is internally consistent")
    }

    #[must_use]
    pub fn storage<C: 'static>(&self) -> Option<&Storage<C>> {
        self.storages.get(&TypeId::of::<C>()).map(|s| {
            s.as_any()
                .downcast_ref::<Storage<C>>()
                .expect("TypeId-keyed storage map is internally consistent")
        })
    }

    pub fn add_component<C: 'static>(&mut self, entity: Entity, value: C) -> Result<&mut C> {
        if !self.allocator.is_alive(entity) {
            return Err(EcsError::BadEntity(entity));
        }
        self.storage_mut::<C>().emplace(entity, value)
    }

    pub fn get_component<C: 'static>(&self, entity: Entity) -> Result<&C> {
        self.storage::<C>().ok_or(EcsError::MissingComponent(entity))?.get(entity)
    }

    pub fn get_component_mut<C: 'static>(&mut self, entity: Entity) -> Result<&mut C> {
        let id = TypeId::of::<C>();
        if !self.storages.contains_key(&id) {
            return Err(EcsError::MissingComponent(entity));
        }
        self.storage_mut::<C>().get_mut(entity)
    }

    pub fn remove_component<C: 'static>(&mut self, entity: Entity) -> Result<()> {
        let id = TypeId::of::<C>();
        if !self.storages.contains_key(&id) {
            return Err(EcsError::MissingComponent(entity));
        }
        self.storage_mut::<C>().remove(entity)
    }

    #[must_use]
    pub fn has_component<C: 'static>(&self, entity: Entity) -> bool {
        self.storage::<C>().is_some_and(|s| s.contains(entity))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destroy_recycles_index_with_bumped_version() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.create();
        alloc.destroy(a).unwrap();
        let b = alloc.create();
        assert_eq!(a.index(), b.index());
        assert_ne!(a.version(), b.version());
    }

    #[test]
    fn destroying_an_entity_drops_its_components() {
        let mut registry = Registry::new();
        let a = registry.create();
        registry.add_component(a, 99u32).unwrap();
        registry.destroy(a).unwrap();
        assert!(!registry.has_component::<u32>(a));
    }

    #[test]
    fn stale_entity_handle_cannot_access_recycled_slot_components() {
        let mut registry = Registry::new();
        let a = registry.create();
        registry.add_component(a, 1u32).unwrap();
        registry.destroy(a).unwrap();

        let b = registry.create();
        registry.add_component(b, 2u32).unwrap();

        assert_eq!(*registry.get_component::<u32>(b).unwrap(), 2);
        assert!(registry.get_component::<u32>(a).is_err());
    }

    #[test]
    fn bad_entity_on_unknown_handle() {
        let mut registry = Registry::new();
        let ghost = Entity::combine(500, 0);
        assert_eq!(registry.add_component(ghost, 1u32).unwrap_err(), EcsError::BadEntity(ghost));
    }
}
