use std::path::Path;

use anyhow::{bail, Result};
use enum_migration::ReplaceEnumValues;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

/// A list of enum replacements applied one after another.
///
/// ```toml
/// verify_existing_rows = true
///
/// [[migrations]]
/// table_name = "users"
/// column_name = "role"
/// default_value = "member"
/// new_values = ["admin", "member"]
/// ```
#[derive(Debug, Deserialize, Default)]
pub struct PlanConfig {
    #[serde(default)]
    pub migrations: Vec<ReplaceEnumValues>,
    /// Turns the stored value check on for every entry.
    #[serde(default)]
    pub verify_existing_rows: bool,
}

impl PlanConfig {
    pub fn entries(&self) -> Vec<ReplaceEnumValues> {
        self.migrations
            .iter()
            .cloned()
            .map(|migration| {
                let verify = migration.verify_existing_rows || self.verify_existing_rows;
                migration.check_existing_rows(verify)
            })
            .collect()
    }
}

/// Loads a plan file. Top level keys can be overridden with `ENUM_PLAN_` variables.
pub fn load_plan(path: &Path) -> Result<PlanConfig> {
    if !path.is_file() {
        bail!("Plan file {} does not exist", path.display());
    }

    let plan: PlanConfig = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("ENUM_PLAN_"))
        .extract()?;

    if plan.migrations.is_empty() {
        bail!("Plan file {} has no migrations", path.display());
    }

    Ok(plan)
}
