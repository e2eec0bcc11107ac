#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Entity-component storage and render-graph core of a realtime 3D
//! rendering engine.
//!
//! This crate is a thin umbrella over three independent libraries:
//! - [`ember_ecs`] — sparse-set entity/component storage and views.
//! - [`ember_graph`] — render-graph declaration, scheduling, and attachment
//!   resolution.
//! - [`ember_render`] — material-keyed draw lists, the subrenderer
//!   contract, and SPIR-V descriptor reflection.
//!
//! The GPU driver itself (device/swapchain/command submission), asset
//! loading, windowing, and the application's main-loop module registry are
//! external collaborators this crate does not implement; `wgpu`'s types are
//! the concrete seam `ember_graph`/`ember_render` are built against, and
//! compiled SPIR-V (`&[u32]`) is the seam a shader compiler plugs into.

pub mod errors;

pub use ember_ecs::{ComponentQuery, Entity, Registry, SparseSet, View};
pub use ember_graph::{Graph, GraphBuilder, PassDecl, PassId, Viewport};
pub use ember_render::{
    Bucket, MaterialDrawList, Subrenderer, SubrendererTable, Submission,
};
pub use errors::{EngineError, Result};
