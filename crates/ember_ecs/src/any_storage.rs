//! Type-erased storage vtable.
//!
//! The registry keeps one [`Storage<C>`] per component type behind a
//! `Box<dyn AnyStorage>`, keyed by [`TypeId`](std::any::TypeId). This is a
//! single flat vtable rather than a class hierarchy: every operation the
//! registry needs on a storage without knowing `C` — membership, blind
//! removal, meta-hook dispatch, bulk clear — lives here, and
//! [`Storage::as_any`]/`as_any_mut` is the escape hatch back to the typed
//! API once the caller knows `C`.

use std::any::Any;

use crate::entity::Entity;
use crate::sparse_set::DeletionPolicy;
use crate::storage::Storage;

pub trait AnyStorage: Any {
    fn contains(&self, entity: Entity) -> bool;

    /// Removes the entity's component if present. No-op (returns `false`) if
    /// the entity never had one — callers that need the stricter error
    /// behavior go through the typed [`Storage::remove`] instead.
    fn remove(&mut self, entity: Entity) -> bool;

    fn call_meta(&mut self, tag: &str, entity: Entity) -> bool;

    fn len(&self) -> usize;

    fn policy(&self) -> DeletionPolicy;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: 'static> AnyStorage for Storage<C> {
    fn contains(&self, entity: Entity) -> bool {
        Storage::contains(self, entity)
    }

    fn remove(&mut self, entity: Entity) -> bool {
        Storage::remove(self, entity).is_ok()
    }

    fn call_meta(&mut self, tag: &str, entity: Entity) -> bool {
        Storage::call_meta(self, tag, entity)
    }

    fn len(&self) -> usize {
        Storage::len(self)
    }

    fn policy(&self) -> DeletionPolicy {
        Storage::policy(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
