//! Materializer abstraction
//!
//! The materializer is the external collaborator that turns a resource
//! declaration into a real provisioned entity. Provider SDKs, credential
//! handling and retry policy all live behind this trait; the evaluator
//! only sees resolved inputs going in and outputs (or an error) coming
//! back.

use async_trait::async_trait;
use std::collections::BTreeMap;
use strata_core::Outputs;
use tracing::debug;

/// Inputs with every reference substituted by its resolved value
pub type ResolvedInputs = BTreeMap<String, serde_json::Value>;

/// External provisioning capability
///
/// Timeouts and retries are the implementation's responsibility; a
/// timeout surfaces to the evaluator as an ordinary failure.
#[async_trait]
pub trait Materializer: Send + Sync {
    /// Provider name (e.g. "dry-run", "azure")
    fn name(&self) -> &str;

    /// Provision one resource and return its outputs
    async fn materialize(
        &self,
        resource_type: &str,
        name: &str,
        inputs: &ResolvedInputs,
    ) -> anyhow::Result<Outputs>;
}

/// Offline materializer that synthesizes deterministic outputs
///
/// Every resolved input is echoed back as an output, plus a `name` and a
/// fake `id`; a few resource types get the extra outputs downstream nodes
/// conventionally reference (signed blob URL, site hostname). Used by the
/// CLI when no real provider is wired up, and by tests.
#[derive(Debug, Default)]
pub struct DryRunMaterializer;

impl DryRunMaterializer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Materializer for DryRunMaterializer {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn materialize(
        &self,
        resource_type: &str,
        name: &str,
        inputs: &ResolvedInputs,
    ) -> anyhow::Result<Outputs> {
        debug!(resource_type, name, "Dry-run materialization");

        let mut outputs: Outputs = inputs
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        outputs.insert("name", serde_json::json!(name));
        outputs.insert(
            "id",
            serde_json::json!(format!("/dry-run/{resource_type}/{name}")),
        );

        match resource_type {
            "storage-zip-blob" => {
                let account = input_str(inputs, "storage_account_name").unwrap_or("account");
                let container = input_str(inputs, "storage_container_name").unwrap_or("container");
                outputs.insert(
                    "signed_url",
                    serde_json::json!(format!(
                        "https://{account}.blob.example.net/{container}/{name}?sig=dry-run"
                    )),
                );
            }
            "app-service" => {
                outputs.insert(
                    "default_site_hostname",
                    serde_json::json!(format!("{name}.azurewebsites.example")),
                );
            }
            _ => {}
        }

        Ok(outputs)
    }
}

fn input_str<'a>(inputs: &'a ResolvedInputs, key: &str) -> Option<&'a str> {
    inputs.get(key).and_then(|v| v.as_str())
}
