//! Error taxonomy for pipeline creation, shader reflection, and the frame
//! loop's GPU-facing failure modes.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Slang compile/link failure; carries the compiler's diagnostics blob.
    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    /// Descriptor pool or device memory exhaustion.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Fatal GPU error; unwinds the frame loop.
    #[error("device lost: {0}")]
    DeviceLost(String),

    /// A pipeline definition declared a binding that reflection didn't find
    /// at the same `(set, binding)`, or found with a different type.
    #[error("binding mismatch at set {set}, binding {binding}: expected {expected}, found {actual}")]
    BindingMismatch {
        set: u32,
        binding: u32,
        expected: String,
        actual: String,
    },

    #[error("no pipeline registered for key {0}")]
    UnknownPipeline(u64),
}
