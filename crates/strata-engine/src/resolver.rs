//! Output resolver for derived nodes
//!
//! Renders [`Expression`]s once their referenced outputs are available
//! and memoizes the result, so the transform attached to an expression
//! runs at most once per process.

use std::sync::OnceLock;
use strata_core::{Expression, Registry};

/// Outcome of a resolution attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// All references were available; the rendered value
    Ready(serde_json::Value),
    /// At least one referenced output is not resolved yet
    Pending,
}

/// Memoizing resolver, one cell per node
#[derive(Debug)]
pub struct OutputResolver {
    cells: Vec<OnceLock<String>>,
}

impl OutputResolver {
    pub fn new(node_count: usize) -> Self {
        Self {
            cells: (0..node_count).map(|_| OnceLock::new()).collect(),
        }
    }

    /// Render the expression for node `index` against resolved outputs
    ///
    /// Returns [`Resolution::Pending`] while any reference is
    /// unavailable. The first successful render is cached; later calls
    /// return the cached value without re-running the interpolation or
    /// its transform.
    pub fn resolve(&self, index: usize, expr: &Expression, registry: &Registry) -> Resolution {
        if let Some(cached) = self.cells[index].get() {
            return Resolution::Ready(serde_json::Value::String(cached.clone()));
        }

        match expr.render(|reference| registry.resolve(reference).ok()) {
            Some(rendered) => {
                let value = self.cells[index].get_or_init(|| rendered).clone();
                Resolution::Ready(serde_json::Value::String(value))
            }
            None => Resolution::Pending,
        }
    }
}
