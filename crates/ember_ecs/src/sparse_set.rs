//! Sparse set of entities: a dense array of alive entities plus a paged
//! sparse index mapping `entity.index() -> dense position`.
//!
//! Grounded in `libsbx-ecs/libsbx/ecs/storage.hpp`'s `basic_sparse_set`
//! (not itself in the retrieval pack, but its three deletion policies are
//! named by `basic_storage::storage_policy` and used throughout
//! `material_draw_list.hpp`/`static_mesh_subrenderer.hpp`).

use crate::entity::Entity;
use crate::error::{EcsError, Result};

const PAGE_SIZE: usize = 4096;
const UNSET: u32 = u32::MAX;

/// Deletion policy for a sparse set, chosen per storage at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionPolicy {
    /// Dense stays compact; removing an entity swaps the last entry into the
    /// removed slot and pops. Iteration order is not preserved.
    SwapAndPop,
    /// Dense slots are index-stable: removal leaves a [`Entity::TOMBSTONE`]
    /// in place, reused by a later `emplace`.
    InPlace,
    /// Used only by the entity allocator itself: the dense array never
    /// shrinks; alive entries occupy `[0, free_boundary)` and destroyed
    /// entries (with an already-bumped version, ready for reuse) occupy
    /// `[free_boundary, dense.len())`.
    SwapOnly,
}

struct Page(Box<[u32; PAGE_SIZE]>);

impl Page {
    fn new() -> Self {
        Page(Box::new([UNSET; PAGE_SIZE]))
    }
}

/// The sparse-set primitive shared by every component storage and by the
/// entity allocator (via [`DeletionPolicy::SwapOnly`]).
pub struct SparseSet {
    policy: DeletionPolicy,
    sparse: Vec<Option<Page>>,
    dense: Vec<Entity>,
    /// `InPlace` only: dense indices of tombstoned slots, available for reuse.
    free_slots: Vec<u32>,
    /// `SwapOnly` only: count of currently-alive entries at the front of `dense`.
    free_boundary: u32,
}

impl SparseSet {
    #[must_use]
    pub fn new(policy: DeletionPolicy) -> Self {
        Self {
            policy,
            sparse: Vec::new(),
            dense: Vec::new(),
            free_slots: Vec::new(),
            free_boundary: 0,
        }
    }

    #[must_use]
    pub fn policy(&self) -> DeletionPolicy {
        self.policy
    }

    /// Number of currently-alive entities (policy-dependent interpretation
    /// of the dense array).
    #[must_use]
    pub fn size(&self) -> usize {
        match self.policy {
            DeletionPolicy::SwapAndPop => self.dense.len(),
            DeletionPolicy::InPlace => self.dense.len() - self.free_slots.len(),
            DeletionPolicy::SwapOnly => self.free_boundary as usize,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// `SwapOnly` only: the free-list boundary `f`. Entries in `[0, f)` are
    /// alive, `[f, len)` are free (destroyed, ready for reuse).
    #[must_use]
    pub fn free_boundary(&self) -> usize {
        self.free_boundary as usize
    }

    /// Raw dense-array length (includes tombstones / recycled slots, unlike
    /// [`SparseSet::size`]).
    #[must_use]
    pub fn dense_len(&self) -> usize {
        self.dense.len()
    }

    #[must_use]
    pub fn dense(&self) -> &[Entity] {
        &self.dense
    }

    fn page_offset(index: u32) -> (usize, usize) {
        (index as usize / PAGE_SIZE, index as usize % PAGE_SIZE)
    }

    fn sparse_get(&self, index: u32) -> Option<u32> {
        let (page, offset) = Self::page_offset(index);
        let slot = self.sparse.get(page)?.as_ref()?.0[offset];
        (slot != UNSET).then_some(slot)
    }

    fn sparse_set(&mut self, index: u32, value: Option<u32>) {
        let (page, offset) = Self::page_offset(index);
        if page >= self.sparse.len() {
            self.sparse.resize_with(page + 1, || None);
        }
        let entry = self.sparse[page].get_or_insert_with(Page::new);
        entry.0[offset] = value.unwrap_or(UNSET);
    }

    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        match self.sparse_get(entity.index()) {
            Some(dense_index) => self.dense.get(dense_index as usize) == Some(&entity),
            None => false,
        }
    }

    pub fn index(&self, entity: Entity) -> Result<usize> {
        self.sparse_get(entity.index())
            .filter(|&i| self.dense.get(i as usize) == Some(&entity))
            .map(|i| i as usize)
            .ok_or(EcsError::BadEntity(entity))
    }

    /// Inserts `entity`, returning its new dense index. Not valid for
    /// [`DeletionPolicy::SwapOnly`] sets, which have their own
    /// generate/destroy dance (see [`SparseSet::push_new`],
    /// [`SparseSet::recycle_front`], [`SparseSet::destroy_swap_only`]) — the
    /// entity allocator is the only user of that policy and it never reaches
    /// for a generic `emplace`.
    pub fn emplace(&mut self, entity: Entity) -> Result<usize> {
        debug_assert_ne!(self.policy, DeletionPolicy::SwapOnly);
        if self.contains(entity) {
            return Err(EcsError::AlreadyPresent(entity));
        }

        let dense_index = match self.policy {
            DeletionPolicy::InPlace => {
                if let Some(slot) = self.free_slots.pop() {
                    self.dense[slot as usize] = entity;
                    slot as usize
                } else {
                    self.dense.push(entity);
                    self.dense.len() - 1
                }
            }
            DeletionPolicy::SwapAndPop | DeletionPolicy::SwapOnly => {
                self.dense.push(entity);
                self.dense.len() - 1
            }
        };

        self.sparse_set(entity.index(), Some(dense_index as u32));

        Ok(dense_index)
    }

    /// Removes `entity`, reporting the dense index the removal vacated and,
    /// for `SwapAndPop`, the entity that was moved into it (if any), so
    /// storages can mirror the same move/tombstone into their component
    /// arrays. Not valid for `SwapOnly` sets; use
    /// [`SparseSet::destroy_swap_only`] instead.
    pub fn remove(&mut self, entity: Entity) -> Result<RemovalEffect> {
        debug_assert_ne!(self.policy, DeletionPolicy::SwapOnly);
        let i = self.index(entity)?;

        let effect = match self.policy {
            DeletionPolicy::SwapAndPop => {
                let last = self.dense.len() - 1;
                if i != last {
                    self.dense[i] = self.dense[last];
                    self.sparse_set(self.dense[i].index(), Some(i as u32));
                }
                self.dense.pop();
                self.sparse_set(entity.index(), None);
                RemovalEffect::Moved { from: last, to: i }
            }
            DeletionPolicy::InPlace => {
                self.dense[i] = Entity::TOMBSTONE;
                self.sparse_set(entity.index(), None);
                self.free_slots.push(i as u32);
                RemovalEffect::Tombstoned { at: i }
            }
            DeletionPolicy::SwapOnly => unreachable!("SwapOnly uses destroy_swap_only"),
        };

        Ok(effect)
    }

    /// Iterates alive entities in dense order, skipping tombstones.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.iter_indexed().map(|(_, e)| e)
    }

    /// Iterates `(dense_index, entity)` pairs for every alive entity, so
    /// storages can pair each entity with its parallel component value.
    pub fn iter_indexed(&self) -> impl Iterator<Item = (usize, Entity)> + '_ {
        let bound = match self.policy {
            DeletionPolicy::SwapOnly => self.free_boundary as usize,
            _ => self.dense.len(),
        };
        self.dense[..bound]
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, e)| *e != Entity::TOMBSTONE)
    }

    pub fn reserve(&mut self, capacity: usize) {
        self.dense.reserve(capacity);
        let pages_needed = capacity.div_ceil(PAGE_SIZE);
        if pages_needed > self.sparse.len() {
            self.sparse.resize_with(pages_needed, || None);
        }
    }

    /// `SwapOnly` only: is there a destroyed entity sitting in
    /// `[free_boundary, len)` ready to be handed back out?
    #[must_use]
    pub fn has_recyclable(&self) -> bool {
        debug_assert_eq!(self.policy, DeletionPolicy::SwapOnly);
        (self.free_boundary as usize) < self.dense.len()
    }

    /// `SwapOnly` only: promotes the entity sitting at the free boundary
    /// (already carrying its bumped version from the `destroy` that retired
    /// it) back to alive, LIFO. Caller must have checked
    /// [`SparseSet::has_recyclable`] first.
    pub fn recycle_front(&mut self) -> Entity {
        debug_assert_eq!(self.policy, DeletionPolicy::SwapOnly);
        let entity = self.dense[self.free_boundary as usize];
        self.free_boundary += 1;
        entity
    }

    /// `SwapOnly` only: admits a brand-new entity (never seen before) as
    /// alive, appending it past the end of the dense array.
    pub fn push_new(&mut self, entity: Entity) {
        debug_assert_eq!(self.policy, DeletionPolicy::SwapOnly);
        debug_assert_eq!(self.free_boundary as usize, self.dense.len());
        self.dense.push(entity);
        self.sparse_set(entity.index(), Some(self.free_boundary));
        self.free_boundary += 1;
    }

    /// `SwapOnly` only: destroys `entity` (caller has already verified it is
    /// alive), swapping it to the end of the alive partition and bumping its
    /// version in place. Returns the bumped entity, which now occupies the
    /// slot immediately past the new boundary and is what
    /// [`SparseSet::recycle_front`] will hand out next.
    pub fn destroy_swap_only(&mut self, entity: Entity) -> Entity {
        debug_assert_eq!(self.policy, DeletionPolicy::SwapOnly);
        let i = self.index(entity).expect("entity must be alive; caller validates first");
        let last_alive = self.free_boundary as usize - 1;
        if i != last_alive {
            self.dense.swap(i, last_alive);
            self.sparse_set(self.dense[i].index(), Some(i as u32));
        }
        let bumped = entity.bump_version();
        self.dense[last_alive] = bumped;
        self.sparse_set(bumped.index(), Some(last_alive as u32));
        self.free_boundary -= 1;
        bumped
    }
}

/// What changed in the dense array as a result of [`SparseSet::remove`].
/// Component storages use this to mirror the same move/tombstone into
/// their parallel value array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalEffect {
    /// The entity previously at dense index `from` was moved to `to`
    /// (`from == to` when the removed element was already last/alone).
    Moved { from: usize, to: usize },
    /// The dense slot `at` now holds [`Entity::TOMBSTONE`]; no element moved.
    Tombstoned { at: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(index: u32, version: u32) -> Entity {
        Entity::combine(index, version)
    }

    #[test]
    fn swap_and_pop_keeps_sparse_dense_invariant() {
        let mut set = SparseSet::new(DeletionPolicy::SwapAndPop);
        let entities: Vec<_> = (0..5).map(|i| e(i, 0)).collect();
        for &ent in &entities {
            set.emplace(ent).unwrap();
        }
        set.remove(entities[1]).unwrap();

        assert!(!set.contains(entities[1]));
        for &ent in entities.iter().filter(|&&x| x != entities[1]) {
            let idx = set.index(ent).unwrap();
            assert_eq!(set.dense()[idx], ent);
        }
    }

    #[test]
    fn in_place_removal_leaves_tombstone_and_is_reused() {
        let mut set = SparseSet::new(DeletionPolicy::InPlace);
        let a = e(0, 0);
        let b = e(1, 0);
        let c = e(2, 0);
        set.emplace(a).unwrap();
        let b_index = set.emplace(b).unwrap();
        set.emplace(c).unwrap();

        set.remove(b).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![a, c]);

        let d = e(3, 0);
        let reused_index = set.emplace(d).unwrap();
        assert_eq!(reused_index, b_index, "the tombstoned slot must be reused");
    }

    #[test]
    fn swap_only_partitions_alive_and_free() {
        let mut set = SparseSet::new(DeletionPolicy::SwapOnly);
        let entities: Vec<_> = (0..4).map(|i| e(i, 0)).collect();
        for &ent in &entities {
            set.push_new(ent);
        }
        assert_eq!(set.size(), 4);

        set.destroy_swap_only(entities[1]);
        assert_eq!(set.size(), 3);
        assert_eq!(set.free_boundary(), 3);
        assert_eq!(set.dense_len(), 4);
        assert!(set.has_recyclable(), "the just-destroyed slot sits past the boundary, ready for reuse");
    }

    #[test]
    fn swap_only_recycles_destroyed_slot_with_bumped_version() {
        let mut set = SparseSet::new(DeletionPolicy::SwapOnly);
        let a = e(0, 0);
        set.push_new(a);
        set.push_new(e(1, 0));

        set.destroy_swap_only(a);
        assert!(set.has_recyclable());

        let recycled = set.recycle_front();
        assert_eq!(recycled.index(), a.index());
        assert_eq!(recycled.version(), 1, "recycled entity must carry a bumped version");
        assert!(!set.has_recyclable());
    }
}
