//! Graph builder error types

use thiserror::Error;

/// Errors raised while building the dependency graph
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Circular dependency detected: {0}")]
    CyclicDependency(String),

    #[error("Node '{node}' references unknown node #{index}")]
    UnknownReference { node: String, index: usize },
}

pub type Result<T> = std::result::Result<T, GraphError>;
