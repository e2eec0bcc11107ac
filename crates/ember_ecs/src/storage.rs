//! Component storage: a [`SparseSet`] of entities paired with a
//! [`PagedArray`] of their values.
//!
//! Grounded in `libsbx-ecs/libsbx/ecs/storage.hpp`'s `basic_storage`: the
//! sparse set tracks *which* entities have the component, the paged array
//! holds the values, and every mutation to the former is mirrored into the
//! latter via the [`RemovalEffect`] the sparse set reports back. Unlike the
//! C++ template, a zero-sized `C` (a tag component) needs no special-cased
//! storage here: `PagedArray<()>` allocates nothing and every `write`/`get`
//! is a no-op, so the degenerate case falls out of the generic code for free.

use std::collections::HashMap;

use rustc_hash::FxHashMap;

use crate::entity::Entity;
use crate::error::{EcsError, Result};
use crate::paged::PagedArray;
use crate::sparse_set::{DeletionPolicy, RemovalEffect, SparseSet};

/// A named hook invoked whenever a component of this storage's type is
/// removed from an entity, e.g. to release a GPU resource handle embedded in
/// the component. Keyed by a caller-chosen tag so a storage can carry more
/// than one (logging, resource release, ...). Not `Send + Sync`: per spec.md
/// §5 the core runs single-threaded cooperative on the main frame loop, so
/// hooks never cross a thread boundary.
type MetaHook<C> = Box<dyn FnMut(Entity, &mut C)>;

/// Sparse-set-backed storage for a single component type.
pub struct Storage<C> {
    set: SparseSet,
    values: PagedArray<C>,
    meta: FxHashMap<&'static str, MetaHook<C>>,
}

impl<C> Storage<C> {
    #[must_use]
    pub fn new(policy: DeletionPolicy, page_size: usize) -> Self {
        Self {
            set: SparseSet::new(policy),
            values: PagedArray::new(page_size),
            meta: HashMap::default(),
        }
    }

    #[must_use]
    pub fn policy(&self) -> DeletionPolicy {
        self.set.policy()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.set.size()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.set.contains(entity)
    }

    pub fn reserve(&mut self, capacity: usize) {
        self.set.reserve(capacity);
        self.values.reserve(capacity);
    }

    /// Inserts `value` for `entity`, returning [`EcsError::AlreadyPresent`]
    /// if it already has this component.
    pub fn emplace(&mut self, entity: Entity, value: C) -> Result<&mut C> {
        let index = self.set.emplace(entity)?;
        self.values.write(index, value);
        // SAFETY: `write` above just initialized this slot.
        Ok(unsafe { self.values.get_mut(index) })
    }

    pub fn get(&self, entity: Entity) -> Result<&C> {
        let index = self.set.index(entity).map_err(|_| EcsError::MissingComponent(entity))?;
        // SAFETY: `index` came from the sparse set, which only ever reports
        // indices the storage has written a value into and not yet removed.
        Ok(unsafe { self.values.get(index) })
    }

    pub fn get_mut(&mut self, entity: Entity) -> Result<&mut C> {
        let index = self.set.index(entity).map_err(|_| EcsError::MissingComponent(entity))?;
        // SAFETY: see `get`.
        Ok(unsafe { self.values.get_mut(index) })
    }

    /// Applies `f` to the component in place, running any registered meta
    /// hooks is the caller's responsibility (patch is a plain mutation, not
    /// a removal).
    pub fn patch(&mut self, entity: Entity, f: impl FnOnce(&mut C)) -> Result<()> {
        f(self.get_mut(entity)?);
        Ok(())
    }

    /// Removes the component from `entity`, running every registered meta
    /// hook against it first, and mirrors the sparse set's deletion policy
    /// (move-and-pop or tombstone) into the value array.
    pub fn remove(&mut self, entity: Entity) -> Result<()> {
        let index = self.set.index(entity).map_err(|_| EcsError::MissingComponent(entity))?;
        for hook in self.meta.values_mut() {
            // SAFETY: `index` still holds a live value; hooks run before
            // the sparse-set removal below invalidates it.
            hook(entity, unsafe { self.values.get_mut(index) });
        }

        match self.set.remove(entity)? {
            RemovalEffect::Moved { from, to } => {
                if from == to {
                    // SAFETY: `to` (== `from`) held the last live value.
                    unsafe { self.values.drop_at(to) };
                } else {
                    // SAFETY: `from` holds the value being relocated, `to`
                    // is the vacated slot the sparse set just freed.
                    unsafe {
                        self.values.move_value(from, to);
                        self.values.drop_at(from);
                    }
                }
            }
            RemovalEffect::Tombstoned { at } => {
                // SAFETY: `at` held the value removed above.
                unsafe { self.values.drop_at(at) };
            }
        }

        Ok(())
    }

    /// Registers a named hook run against a component just before it is
    /// removed, e.g. to release a resource the component owns.
    pub fn add_meta(&mut self, tag: &'static str, hook: impl FnMut(Entity, &mut C) + 'static) {
        self.meta.insert(tag, Box::new(hook));
    }

    /// Invokes the hook registered under `tag` against `entity`'s component,
    /// if both exist. Returns `false` if either is missing.
    pub fn call_meta(&mut self, tag: &str, entity: Entity) -> bool {
        let Some(index) = self.set.index(entity).ok() else {
            return false;
        };
        let Some(hook) = self.meta.get_mut(tag) else {
            return false;
        };
        // SAFETY: `index` came from the sparse set and holds a live value.
        hook(entity, unsafe { self.values.get_mut(index) });
        true
    }

    /// Iterates `(entity, &component)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &C)> + '_ {
        self.set
            .iter_indexed()
            // SAFETY: `iter_indexed` only yields indices of currently-alive
            // entities, which always have an initialized value.
            .map(|(i, e)| (e, unsafe { self.values.get(i) }))
    }

    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        self.set.dense()
    }
}

impl<C> Drop for Storage<C> {
    fn drop(&mut self) {
        for (index, _) in self.set.iter_indexed() {
            // SAFETY: `iter_indexed` enumerates exactly the indices holding
            // an initialized value that hasn't been dropped yet.
            unsafe { self.values.drop_at(index) };
        }
    }
}
