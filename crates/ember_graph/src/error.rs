//! Render-graph construction errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("no pass produces attachment \"{0}\"")]
    UnresolvedAttachment(String),

    #[error("attachment \"{0}\" is produced by more than one pass")]
    DuplicateProducer(String),

    #[error("render graph has a dependency cycle")]
    CyclicGraph,

    #[error("pass \"{0}\" declares a dynamic viewport but produces no non-swapchain attachment")]
    UndefinedViewport(String),
}
