//! Error types for the compilation framework.

use thiserror::Error;

/// Errors that can occur while building or running a pass pipeline.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// A pass received a DAG it cannot operate on (wrong number of
    /// qubits, missing classical bits, etc.).
    #[error("pass '{pass}' failed: {reason}")]
    PassFailed { pass: String, reason: String },

    /// The underlying IR reported an error while a pass walked the DAG.
    #[error("ir error: {0}")]
    Ir(#[from] napp_ir::IrError),

    /// The mapping/scheduling engine reported an error.
    #[error("mapping error: {0}")]
    Map(#[from] napp_core::MapError),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
