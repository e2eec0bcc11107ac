//! Error taxonomy for sparse sets, storages, and the registry.

use thiserror::Error;

use crate::entity::Entity;

pub type Result<T> = std::result::Result<T, EcsError>;

/// Errors produced by sparse sets, storages, and the registry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcsError {
    /// The entity handle is null, stale, or unknown to this set/registry.
    #[error("entity {0:?} is not alive")]
    BadEntity(Entity),

    /// The entity has no component of the requested type.
    #[error("entity {0:?} has no component of the requested type")]
    MissingComponent(Entity),

    /// `emplace` was called for an entity that already has the component.
    #[error("entity {0:?} already has a component of this type")]
    AlreadyPresent(Entity),
}
