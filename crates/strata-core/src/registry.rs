//! Resource node registry
//!
//! Exclusive owner of all declared nodes. Declarations happen up front;
//! the evaluator records states and outputs through the registry, and
//! callers read resolved values back through [`OutputRef`]s.

use crate::error::{CoreError, Result};
use crate::expr::Expression;
use crate::model::{
    EvaluationState, Inputs, NodeHandle, NodeKind, OutputRef, Outputs, ResourceNode,
};
use std::collections::HashMap;

/// Registry of declared resource and derived nodes
#[derive(Debug, Default)]
pub struct Registry {
    nodes: Vec<ResourceNode>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a resource node
    ///
    /// Fails with [`CoreError::DuplicateName`] if `name` is taken; nothing
    /// is registered in that case.
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        resource_type: impl Into<String>,
        inputs: impl IntoIterator<Item = (String, crate::model::Input)>,
    ) -> Result<NodeHandle> {
        self.push(
            name.into(),
            NodeKind::Resource {
                resource_type: resource_type.into(),
                inputs: inputs.into_iter().collect::<Inputs>(),
            },
        )
    }

    /// Declare a derived node computed from an expression
    ///
    /// Derived nodes live in the same graph as resources, so their
    /// references are ordered and failure-attributed like any other edge.
    pub fn derive(&mut self, name: impl Into<String>, expr: Expression) -> Result<NodeHandle> {
        self.push(name.into(), NodeKind::Derived(expr))
    }

    fn push(&mut self, name: String, kind: NodeKind) -> Result<NodeHandle> {
        if self.by_name.contains_key(&name) {
            return Err(CoreError::DuplicateName(name));
        }

        let index = self.nodes.len();
        self.by_name.insert(name.clone(), index);
        self.nodes.push(ResourceNode::new(name, kind));
        Ok(NodeHandle(index))
    }

    /// Lazy reference to an output of `handle`
    ///
    /// Valid to construct at declaration time; dereferencing through
    /// [`Registry::resolve`] before evaluation fails with
    /// [`CoreError::NotYetResolved`].
    pub fn output(&self, handle: NodeHandle, key: impl Into<String>) -> OutputRef {
        OutputRef {
            node: handle,
            key: key.into(),
        }
    }

    /// Dereference an output reference
    pub fn resolve(&self, reference: &OutputRef) -> Result<serde_json::Value> {
        let node = self
            .nodes
            .get(reference.node.index())
            .ok_or_else(|| CoreError::UnknownNode(format!("#{}", reference.node.index())))?;
        let outputs = node
            .outputs()
            .ok_or_else(|| CoreError::NotYetResolved {
                node: node.name.clone(),
                key: reference.key.clone(),
            })?;
        outputs
            .get(&reference.key)
            .cloned()
            .ok_or_else(|| CoreError::MissingOutput {
                node: node.name.clone(),
                key: reference.key.clone(),
            })
    }

    /// Look up a node by name
    pub fn get(&self, name: &str) -> Option<NodeHandle> {
        self.by_name.get(name).copied().map(NodeHandle)
    }

    pub fn node(&self, handle: NodeHandle) -> &ResourceNode {
        &self.nodes[handle.0]
    }

    /// Nodes in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &ResourceNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeHandle(index), node))
    }

    pub fn handles(&self) -> impl Iterator<Item = NodeHandle> + use<> {
        (0..self.nodes.len()).map(NodeHandle)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Move a node to `Resolving`
    ///
    /// Called by the evaluator once every referenced node is resolved.
    pub fn mark_resolving(&mut self, handle: NodeHandle) {
        self.nodes[handle.0].state = EvaluationState::Resolving;
    }

    /// Record outputs and move the node to `Resolved` (write-once)
    pub fn record_outputs(&mut self, handle: NodeHandle, outputs: Outputs) -> Result<()> {
        let node = &mut self.nodes[handle.0];
        if node.outputs.is_some() {
            return Err(CoreError::AlreadyResolved(node.name.clone()));
        }
        node.outputs = Some(outputs);
        node.state = EvaluationState::Resolved;
        Ok(())
    }

    /// Move a node to `Failed` (terminal)
    pub fn mark_failed(&mut self, handle: NodeHandle) {
        self.nodes[handle.0].state = EvaluationState::Failed;
    }
}
