//! Engine error types

use thiserror::Error;

/// Errors that abort an evaluation before any materializer call
///
/// Per-node materialization failures are not errors at this level; they
/// are collected in the [`EvaluationReport`](crate::EvaluationReport)
/// with the failing node attached.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Graph(#[from] strata_graph::GraphError),

    #[error(transparent)]
    Core(#[from] strata_core::CoreError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// An external materialization failure with the node identity attached
#[derive(Error, Debug, Clone, serde::Serialize, serde::Deserialize)]
#[error("Materialization of '{node}' failed: {message}")]
pub struct MaterializationError {
    /// Name of the failing node
    pub node: String,

    /// Message from the materializer (a timeout looks the same as any
    /// other provider failure)
    pub message: String,
}
