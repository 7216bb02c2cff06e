//! Resource node model
//!
//! A declared topology is a set of [`ResourceNode`]s. Inputs are either
//! literal JSON values or [`OutputRef`]s pointing at another node's output;
//! references are what the graph builder turns into edges.

use crate::expr::Expression;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Handle to a declared node, valid for the registry that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeHandle(pub(crate) usize);

impl NodeHandle {
    /// Position of the node in declaration order
    pub fn index(self) -> usize {
        self.0
    }

    /// Rebuild a handle from a declaration index
    ///
    /// The graph and evaluator work on plain indices; only indices that
    /// came out of the same registry are meaningful.
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// Reference to a single output of another node
///
/// Carries an ordering constraint only; the referenced node must be
/// resolved before the referencing node may start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRef {
    /// Node that produces the output
    pub node: NodeHandle,

    /// Output key on that node
    pub key: String,
}

/// A single input value: literal or reference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Input {
    /// Reference to another node's output
    Ref(OutputRef),
    /// Literal value passed through to the materializer unchanged
    Literal(serde_json::Value),
}

impl From<OutputRef> for Input {
    fn from(r: OutputRef) -> Self {
        Input::Ref(r)
    }
}

impl From<serde_json::Value> for Input {
    fn from(v: serde_json::Value) -> Self {
        Input::Literal(v)
    }
}

impl From<&str> for Input {
    fn from(s: &str) -> Self {
        Input::Literal(serde_json::Value::String(s.to_string()))
    }
}

impl From<String> for Input {
    fn from(s: String) -> Self {
        Input::Literal(serde_json::Value::String(s))
    }
}

/// Input map for a resource node, keyed by input name
pub type Inputs = BTreeMap<String, Input>;

/// Outputs produced by materializing a node
///
/// Write-once: recorded by the evaluator when the node resolves, then
/// immutable for the rest of the process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs(BTreeMap<String, serde_json::Value>);

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Convenience accessor for string-typed outputs
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.0.insert(key.into(), value);
    }

    pub fn with(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, serde_json::Value)> for Outputs {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Lifecycle state of a node during evaluation
///
/// `Resolving` is entered only once every referenced node is `Resolved`;
/// `Resolved` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationState {
    Pending,
    Resolving,
    Resolved,
    Failed,
}

impl std::fmt::Display for EvaluationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationState::Pending => write!(f, "pending"),
            EvaluationState::Resolving => write!(f, "resolving"),
            EvaluationState::Resolved => write!(f, "resolved"),
            EvaluationState::Failed => write!(f, "failed"),
        }
    }
}

/// What a node is: an external resource or a derived value
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Materialized through the external provider
    Resource {
        /// Resource type (e.g. "storage-account", "sql-server")
        resource_type: String,

        /// Declared inputs, literal or referencing
        inputs: Inputs,
    },

    /// Computed in-process from other nodes' outputs
    Derived(Expression),
}

/// A declared node, owned by the registry
#[derive(Debug, Clone)]
pub struct ResourceNode {
    /// Unique name within the registry
    pub name: String,

    /// Resource or derived-value definition
    pub kind: NodeKind,

    pub(crate) state: EvaluationState,
    pub(crate) outputs: Option<Outputs>,
}

impl ResourceNode {
    pub(crate) fn new(name: String, kind: NodeKind) -> Self {
        Self {
            name,
            kind,
            state: EvaluationState::Pending,
            outputs: None,
        }
    }

    pub fn state(&self) -> EvaluationState {
        self.state
    }

    /// Outputs, if the node has resolved
    pub fn outputs(&self) -> Option<&Outputs> {
        self.outputs.as_ref()
    }

    /// Resource type for resource nodes, `None` for derived nodes
    pub fn resource_type(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Resource { resource_type, .. } => Some(resource_type),
            NodeKind::Derived(_) => None,
        }
    }

    /// All output references this node carries, across inputs or expression
    pub fn references(&self) -> Vec<&OutputRef> {
        match &self.kind {
            NodeKind::Resource { inputs, .. } => inputs
                .values()
                .filter_map(|input| match input {
                    Input::Ref(r) => Some(r),
                    Input::Literal(_) => None,
                })
                .collect(),
            NodeKind::Derived(expr) => expr.references().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_conversions() {
        let lit: Input = "centralus".into();
        assert!(matches!(lit, Input::Literal(serde_json::Value::String(s)) if s == "centralus"));

        let r: Input = OutputRef {
            node: NodeHandle(0),
            key: "name".to_string(),
        }
        .into();
        assert!(matches!(r, Input::Ref(_)));
    }

    #[test]
    fn outputs_accessors() {
        let outputs = Outputs::new()
            .with("name", serde_json::json!("prod-rg"))
            .with("port", serde_json::json!(8080));

        assert_eq!(outputs.get_str("name"), Some("prod-rg"));
        assert_eq!(outputs.get_str("port"), None);
        assert_eq!(outputs.get("port"), Some(&serde_json::json!(8080)));
        assert_eq!(outputs.len(), 2);
    }
}
