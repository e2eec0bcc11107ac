//! Render-graph declaration, scheduling, and attachment resolution.
//!
//! Applications build a [`Graph`] via [`GraphBuilder`]: each pass declares
//! the attachments it produces and the ones it uses by name, and
//! [`GraphBuilder::build`] resolves execution order, attachment formats,
//! clear ops, blend states, and per-pass viewports.

mod attachment;
mod blend;
mod error;
mod graph;
mod transient;

pub use attachment::{AttachmentDecl, AttachmentExtent, AttachmentKind, ResolvedAttachment, ResolvedViewport, Viewport};
pub use blend::{derive_blend_state, forces_blend_disabled, BlendComponentKey, BlendStateKey};
pub use error::{GraphError, Result};
pub use graph::{Graph, GraphBuilder, PassDecl, PassId};
pub use transient::TransientPool;
