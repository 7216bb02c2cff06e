//! Evaluation report types

use crate::error::MaterializationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strata_core::Outputs;

/// Result of evaluating a single node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeResult {
    /// Node name
    pub node: String,

    /// Resource type; `None` for derived nodes
    pub resource_type: Option<String>,

    /// Human-readable outcome
    pub message: String,

    /// Failure with node identity attached, if the node failed
    pub error: Option<MaterializationError>,
}

/// Result of one evaluation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Nodes that resolved, in completion order
    pub succeeded: Vec<NodeResult>,

    /// Nodes whose materialization failed
    pub failed: Vec<NodeResult>,

    /// Nodes never started: blocked behind a failure, or halted by
    /// fail-fast
    pub skipped: Vec<String>,

    /// Outputs of every resolved node, keyed by node name
    pub outputs: BTreeMap<String, Outputs>,

    /// When the evaluation started
    pub started_at: DateTime<Utc>,

    /// Total wall-clock time in milliseconds
    pub duration_ms: u64,
}

impl EvaluationReport {
    pub(crate) fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
            outputs: BTreeMap::new(),
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            resolved: self.succeeded.len(),
            failed: self.failed.len(),
            skipped: self.skipped.len(),
        }
    }
}

/// Counts for the one-line summary
#[derive(Debug, Clone, Copy)]
pub struct ReportSummary {
    pub resolved: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl std::fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} resolved, {} failed, {} skipped",
            self.resolved, self.failed, self.skipped
        )
    }
}
