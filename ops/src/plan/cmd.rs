use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use enum_core::{connect, DatabaseArgs};
use log::info;
use sea_orm::DatabaseConnection;

use super::{load_plan, PlanConfig};

#[derive(Debug, Clone, Args)]
pub struct PlanCommand {
    /// Database configuration
    #[clap(flatten)]
    pub database: DatabaseArgs,
    /// TOML file listing the enum replacements to apply
    #[arg(long, env = "ENUM_PLAN_FILE")]
    pub file: PathBuf,
}

pub async fn subcommand(command: PlanCommand) -> Result<()> {
    let plan = load_plan(&command.file)?;
    let db = connect(command.database).await?;

    let applied = run_plan(&db, &plan).await?;
    info!("Applied {} enum replacements", applied);

    Ok(())
}

/// Applies every entry in order, each in its own transaction. Stops at the
/// first failure; earlier entries stay committed.
pub async fn run_plan(db: &DatabaseConnection, plan: &PlanConfig) -> Result<usize> {
    let entries = plan.entries();

    for (index, replace) in entries.iter().enumerate() {
        info!(
            "[{}/{}] {}.{}",
            index + 1,
            entries.len(),
            replace.table_name,
            replace.column_name
        );
        replace.exec(db).await.with_context(|| {
            format!(
                "plan entry {} ({}.{}) failed",
                index + 1,
                replace.table_name,
                replace.column_name
            )
        })?;
    }

    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use enum_migration::{EnumMigrationError, ReplaceEnumValues, Step};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn mock_db(successful_execs: usize) -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(
                (0..successful_execs)
                    .map(|_| MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    })
                    .collect(),
            )
            .into_connection()
    }

    fn plan() -> PlanConfig {
        PlanConfig {
            migrations: vec![
                ReplaceEnumValues::new("users", "role", "member", ["admin", "member"]),
                ReplaceEnumValues::new("orders", "state", "open", ["open", "closed"]),
                ReplaceEnumValues::new("tickets", "priority", "low", ["low", "high"]),
            ],
            verify_existing_rows: false,
        }
    }

    #[tokio::test]
    async fn applies_each_entry_in_its_own_transaction() {
        let db = mock_db(18);

        let applied = run_plan(&db, &plan()).await.unwrap();

        assert_eq!(applied, 3);
        assert_eq!(db.into_transaction_log().len(), 3);
    }

    #[tokio::test]
    async fn stops_at_the_first_failing_entry() {
        // The second entry fails on its drop type statement.
        let db = mock_db(9);

        let err = run_plan(&db, &plan()).await.unwrap_err();

        assert!(err.to_string().contains("plan entry 2 (orders.state)"));
        let cause = err.downcast_ref::<EnumMigrationError>().unwrap();
        assert_eq!(cause.step(), Some(Step::DropType));
        assert_eq!(db.into_transaction_log().len(), 2);
    }
}
