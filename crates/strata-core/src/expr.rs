//! Derived-value expressions
//!
//! An [`Expression`] interleaves literal text with [`OutputRef`]s and may
//! finish with a pure post-transform. Expressions are attached to derived
//! nodes, so their references participate in the same dependency graph and
//! failure attribution as resource inputs.

use crate::model::OutputRef;
use std::fmt;
use std::sync::Arc;

type Transform = Arc<dyn Fn(String) -> String + Send + Sync>;

/// One piece of an interpolated expression
#[derive(Debug, Clone)]
pub enum Segment {
    /// Literal text copied verbatim
    Literal(String),
    /// Spliced from another node's output
    Output(OutputRef),
}

/// Interpolation over one or more output references
#[derive(Clone, Default)]
pub struct Expression {
    segments: Vec<Segment>,
    transform: Option<Transform>,
}

impl Expression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append literal text
    pub fn lit(mut self, text: impl Into<String>) -> Self {
        self.segments.push(Segment::Literal(text.into()));
        self
    }

    /// Append an output reference
    pub fn output(mut self, reference: OutputRef) -> Self {
        self.segments.push(Segment::Output(reference));
        self
    }

    /// Apply a pure transform to the rendered string
    ///
    /// Invoked exactly once; the rendered result is memoized by the
    /// evaluator.
    pub fn map(mut self, f: impl Fn(String) -> String + Send + Sync + 'static) -> Self {
        self.transform = Some(Arc::new(f));
        self
    }

    /// References this expression depends on
    pub fn references(&self) -> impl Iterator<Item = &OutputRef> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Output(r) => Some(r),
            Segment::Literal(_) => None,
        })
    }

    /// Render against resolved outputs
    ///
    /// Returns `None` if any referenced output is unavailable; the caller
    /// decides whether that means "still pending" or a hard error.
    pub fn render<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&OutputRef) -> Option<serde_json::Value>,
    {
        let mut rendered = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Output(r) => {
                    let value = lookup(r)?;
                    rendered.push_str(&value_fragment(&value));
                }
            }
        }

        match &self.transform {
            Some(f) => Some(f(rendered)),
            None => Some(rendered),
        }
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("segments", &self.segments)
            .field("transform", &self.transform.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// String form of an output value inside an interpolation
///
/// Strings splice without quotes; other values use their JSON form.
fn value_fragment(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
