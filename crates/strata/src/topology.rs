//! Built-in web-app stack topology
//!
//! Declares the resources for a small cloud web application: resource
//! group, storage account with a private container holding the zipped
//! application code, an app service plan, SQL server and database, and
//! the app service wiring them together. The database connection string
//! and the public endpoint are derived nodes in the same graph.

use anyhow::Result;
use strata_config::Config;
use strata_core::{Expression, Input, NodeHandle, Registry};

/// Administrator login baked into the connection string
const SQL_USERNAME: &str = "strata";

/// Characters of the stack name used as resource-name prefix
const PREFIX_LEN: usize = 9;

/// Declared stack with handles to its exported values
#[derive(Debug)]
pub struct Topology {
    pub registry: Registry,

    /// Derived `https://<hostname>` endpoint
    pub endpoint: NodeHandle,

    /// Derived SQL connection string (fed into the app service)
    pub connection_string: NodeHandle,
}

/// Declare the web-app stack for `stack` into a fresh registry
///
/// Requires the `codeLocation` and `sqlPassword` configuration keys.
pub fn declare(config: &Config, stack: &str) -> Result<Topology> {
    let prefix: String = stack.chars().take(PREFIX_LEN).collect();
    let code_location = config.require("codeLocation")?;
    let sql_password = config.require("sqlPassword")?;

    let mut registry = Registry::new();

    let rg = registry.declare(
        format!("{prefix}-rg"),
        "resource-group",
        [input("location", "centralus")],
    )?;
    let rg_name = registry.output(rg, "name");
    let rg_location = registry.output(rg, "location");

    // Storage account names must be lowercase and free of dashes.
    let storage_account_name = format!("{}sa", prefix.to_lowercase().replace('-', ""));
    let sa = registry.declare(
        storage_account_name,
        "storage-account",
        [
            input("resource_group_name", rg_name.clone()),
            input("location", rg_location.clone()),
            input("account_kind", "StorageV2"),
            input("account_tier", "Standard"),
            input("account_replication_type", "LRS"),
        ],
    )?;

    let plan = registry.declare(
        format!("{prefix}-asp"),
        "app-service-plan",
        [
            input("resource_group_name", rg_name.clone()),
            input("location", rg_location.clone()),
            input("kind", "App"),
            input("sku_tier", "Basic"),
            input("sku_size", "B1"),
        ],
    )?;

    let container = registry.declare(
        format!("{prefix}-c"),
        "storage-container",
        [
            input("resource_group_name", rg_name.clone()),
            input("storage_account_name", registry.output(sa, "name")),
            input("container_access_type", "private"),
        ],
    )?;

    let blob = registry.declare(
        format!("{prefix}-b"),
        "storage-zip-blob",
        [
            input("resource_group_name", rg_name.clone()),
            input("storage_account_name", registry.output(sa, "name")),
            input("storage_container_name", registry.output(container, "name")),
            input("type", "block"),
            input("content", code_location),
        ],
    )?;

    let sql = registry.declare(
        format!("{prefix}-sql"),
        "sql-server",
        [
            input("resource_group_name", rg_name.clone()),
            input("location", rg_location.clone()),
            input("administrator_login", SQL_USERNAME),
            input("administrator_login_password", sql_password.clone()),
            input("version", "12.0"),
        ],
    )?;

    let db = registry.declare(
        format!("{prefix}-db"),
        "sql-database",
        [
            input("resource_group_name", rg_name.clone()),
            input("location", rg_location.clone()),
            input("server_name", registry.output(sql, "name")),
            input("requested_service_objective_name", "S0"),
        ],
    )?;

    let connection_string = registry.derive(
        "db-connection-string",
        Expression::new()
            .lit("Server=tcp:")
            .output(registry.output(sql, "name"))
            .lit(".database.windows.net;initial catalog=")
            .output(registry.output(db, "name"))
            .lit(format!(
                ";user ID={SQL_USERNAME};password={sql_password};\
                 Min Pool Size=0;Max Pool Size=30;Persist Security Info=true;"
            )),
    )?;

    let app = registry.declare(
        format!("{prefix}-as"),
        "app-service",
        [
            input("resource_group_name", rg_name),
            input("location", rg_location),
            input("app_service_plan_id", registry.output(plan, "id")),
            input("website_run_from_zip", registry.output(blob, "signed_url")),
            input(
                "connection_string_db",
                registry.output(connection_string, "value"),
            ),
        ],
    )?;

    let endpoint = registry.derive(
        "endpoint",
        Expression::new()
            .lit("https://")
            .output(registry.output(app, "default_site_hostname")),
    )?;

    Ok(Topology {
        registry,
        endpoint,
        connection_string,
    })
}

fn input(key: &str, value: impl Into<Input>) -> (String, Input) {
    (key.to_string(), value.into())
}
