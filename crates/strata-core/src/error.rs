//! Core error types

use thiserror::Error;

/// Errors raised by the registry and resource model
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Resource already declared: {0}")]
    DuplicateName(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Output '{key}' of '{node}' is not yet resolved")]
    NotYetResolved { node: String, key: String },

    #[error("Node '{node}' resolved without an output named '{key}'")]
    MissingOutput { node: String, key: String },

    #[error("Outputs for '{0}' were already recorded")]
    AlreadyResolved(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
