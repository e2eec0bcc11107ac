//! Entity handles.
//!
//! An [`Entity`] is a 32-bit value split into an *index* (low 20 bits) and a
//! *version* (high 12 bits). Destroying an entity bumps the version stored
//! at its index, which invalidates every outstanding handle pointing at
//! that index without having to touch them.

use std::fmt;

const INDEX_BITS: u32 = 20;
const VERSION_BITS: u32 = 12;

/// Largest index an entity can address.
pub const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;
/// Largest version an entity can carry before it wraps.
pub const VERSION_MASK: u32 = (1 << VERSION_BITS) - 1;

/// A 32-bit entity handle: `index` in the low 20 bits, `version` in the high 12.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Entity(u32);

impl Entity {
    /// The reserved "no entity" sentinel. Every bit set.
    pub const NULL: Entity = Entity(u32::MAX);

    /// The reserved tombstone sentinel used by `in_place` deletion to mark a
    /// dead dense slot. Distinct from [`Entity::NULL`] by its version so the
    /// two are never confused.
    pub const TOMBSTONE: Entity = Entity(INDEX_MASK);

    /// Builds an entity from a raw packed `u32`. Not validated against
    /// [`Entity::NULL`] / [`Entity::TOMBSTONE`] — callers that need that
    /// distinction check separately.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Entity(raw)
    }

    /// Combines an index and version into an entity handle.
    #[inline]
    #[must_use]
    pub const fn combine(index: u32, version: u32) -> Self {
        Entity((version << INDEX_BITS) | (index & INDEX_MASK))
    }

    /// The raw packed representation.
    #[inline]
    #[must_use]
    pub const fn to_raw(self) -> u32 {
        self.0
    }

    /// The low 20 bits: the index into the sparse table.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 & INDEX_MASK
    }

    /// The high 12 bits: the generation at this index.
    #[inline]
    #[must_use]
    pub const fn version(self) -> u32 {
        self.0 >> INDEX_BITS
    }

    /// Returns a handle to the same index with its version advanced by one,
    /// wrapping at [`VERSION_MASK`]. Wrapping back to the version the
    /// tombstone uses (all ones) skips it, since that version never denotes
    /// a live entity.
    #[inline]
    #[must_use]
    pub const fn bump_version(self) -> Self {
        let next = (self.version() + 1) & VERSION_MASK;
        let next = if next == VERSION_MASK { 0 } else { next };
        Entity::combine(self.index(), next)
    }

    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == Entity::NULL.0
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Entity(NULL)")
        } else {
            write!(f, "Entity(index={}, version={})", self.index(), self.version())
        }
    }
}

impl Default for Entity {
    fn default() -> Self {
        Entity::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_version_round_trip() {
        let e = Entity::combine(12345, 7);
        assert_eq!(e.index(), 12345);
        assert_eq!(e.version(), 7);
    }

    #[test]
    fn bump_version_wraps_skipping_tombstone_version() {
        let e = Entity::combine(3, VERSION_MASK - 1);
        let bumped = e.bump_version();
        assert_eq!(bumped.version(), 0, "version must wrap past the tombstone's all-ones version");
    }

    #[test]
    fn null_and_tombstone_are_distinct() {
        assert_ne!(Entity::NULL, Entity::TOMBSTONE);
        assert_eq!(Entity::TOMBSTONE.index(), INDEX_MASK);
        assert_eq!(Entity::TOMBSTONE.version(), 0);
    }
}
