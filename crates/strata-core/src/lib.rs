//! Strata resource model
//!
//! Core building blocks of the Strata deployment engine: resource nodes,
//! output references, derived-value expressions, and the registry that
//! owns them.
//!
//! Declarations populate a [`Registry`]; the graph and engine crates turn
//! it into an ordered, materialized deployment. Nothing here talks to a
//! provider.

pub mod error;
pub mod expr;
pub mod model;
pub mod registry;

// Re-exports
pub use error::{CoreError, Result};
pub use expr::{Expression, Segment};
pub use model::{
    EvaluationState, Input, Inputs, NodeHandle, NodeKind, OutputRef, Outputs, ResourceNode,
};
pub use registry::Registry;
