//! Error Types
//!
//! This module defines the error type used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`EngineError`] aggregates the per-crate error enums
//! exposed by `ember_ecs`, `ember_graph`, and `ember_render` into one sum
//! type, so application code wiring the three together only needs to
//! propagate one `Result`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ember::errors::{EngineError, Result};
//!
//! fn build_frame() -> Result<()> {
//!     // Operations from any of the three crates propagate via `?`.
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The aggregated error type for the Ember engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Entity/storage/registry failure.
    #[error(transparent)]
    Ecs(#[from] ember_ecs::EcsError),

    /// Render-graph declaration or resolution failure.
    #[error(transparent)]
    Graph(#[from] ember_graph::GraphError),

    /// Pipeline, reflection, or frame-time GPU failure.
    #[error(transparent)]
    Render(#[from] ember_render::RenderError),
}

/// Alias for `Result<T, EngineError>`.
pub type Result<T> = std::result::Result<T, EngineError>;
