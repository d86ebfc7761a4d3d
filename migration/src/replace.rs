use std::collections::HashSet;

use log::{error, info, warn};
use sea_orm::{DatabaseTransaction, DbErr, TransactionTrait};
use serde::Deserialize;

use crate::{errors::EnumMigrationError, sql, step, step::Step};

/// Replaces the label set of a PostgreSQL enum column in place.
///
/// PostgreSQL cannot remove labels from an existing enum, so the replacement
/// creates `<enum_name>_new` with the requested labels, moves the column over
/// through a text cast, drops the old type and renames the new one into its
/// place. The column default is dropped first and restored last because it
/// cannot be cast between the two types.
///
/// The whole sequence runs in one transaction. Running it twice fails: either
/// the temporary type already exists or the old type is gone.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplaceEnumValues {
    pub table_name: String,
    pub column_name: String,
    pub default_value: String,
    pub new_values: Vec<String>,
    /// Defaults to `enum_<table_name>_<column_name>`.
    #[serde(default)]
    pub enum_name: Option<String>,
    /// Reject stored labels missing from `new_values` before touching the schema.
    #[serde(default)]
    pub verify_existing_rows: bool,
}

impl ReplaceEnumValues {
    pub fn new<I, S>(table_name: &str, column_name: &str, default_value: &str, new_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table_name: table_name.to_string(),
            column_name: column_name.to_string(),
            default_value: default_value.to_string(),
            new_values: new_values.into_iter().map(Into::into).collect(),
            enum_name: None,
            verify_existing_rows: false,
        }
    }

    pub fn with_enum_name(mut self, enum_name: &str) -> Self {
        self.enum_name = Some(enum_name.to_string());
        self
    }

    pub const fn check_existing_rows(mut self, verify: bool) -> Self {
        self.verify_existing_rows = verify;
        self
    }

    pub fn enum_name(&self) -> String {
        self.enum_name
            .clone()
            .unwrap_or_else(|| format!("enum_{}_{}", self.table_name, self.column_name))
    }

    pub fn temporary_enum_name(&self) -> String {
        format!("{}_new", self.enum_name())
    }

    pub fn validate(&self) -> Result<(), EnumMigrationError> {
        let names = [
            ("table name", self.table_name.as_str()),
            ("column name", self.column_name.as_str()),
        ];
        for (what, name) in names {
            if name.is_empty() {
                return Err(EnumMigrationError::InvalidInput(format!("{} is empty", what)));
            }
        }
        if matches!(&self.enum_name, Some(name) if name.is_empty()) {
            return Err(EnumMigrationError::InvalidInput(
                "enum name is empty".to_string(),
            ));
        }
        if self.new_values.is_empty() {
            return Err(EnumMigrationError::InvalidInput(
                "at least one enum value is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for value in &self.new_values {
            if !seen.insert(value.as_str()) {
                return Err(EnumMigrationError::InvalidInput(format!(
                    "duplicate enum value '{}'",
                    value
                )));
            }
        }

        if !seen.contains(self.default_value.as_str()) {
            return Err(EnumMigrationError::InvalidInput(format!(
                "default value '{}' is not one of the new enum values",
                self.default_value
            )));
        }

        Ok(())
    }

    /// The statements `exec` issues, in order. Nothing is executed.
    pub fn statements(&self) -> Vec<(Step, String)> {
        let enum_name = self.enum_name();
        let temporary = self.temporary_enum_name();
        let (table, column) = (self.table_name.as_str(), self.column_name.as_str());

        Step::ALL
            .iter()
            .map(|step| {
                let sql = match step {
                    Step::CreateType => sql::create_enum_type(&temporary, self.new_values.as_slice()),
                    Step::DropDefault => sql::drop_column_default(table, column),
                    Step::RetypeColumn => sql::retype_column(table, column, &temporary),
                    Step::DropType => sql::drop_type(&enum_name),
                    Step::RenameType => sql::rename_type(&temporary, &enum_name),
                    Step::SetDefault => {
                        sql::set_column_default(table, column, &self.default_value, &enum_name)
                    }
                };
                (*step, sql)
            })
            .collect()
    }

    /// Runs the replacement in its own transaction.
    ///
    /// The transaction is committed only if every step succeeds. The first
    /// failure rolls it back and is returned with the step that raised it.
    pub async fn exec<C: TransactionTrait>(&self, db: &C) -> Result<(), EnumMigrationError> {
        self.validate()?;

        let enum_name = self.enum_name();
        info!(
            "Replacing values of enum {} on {}.{}",
            enum_name, self.table_name, self.column_name
        );

        let txn = db.begin().await.map_err(EnumMigrationError::Transaction)?;
        match self.run_steps(&txn).await {
            Ok(()) => {
                txn.commit().await.map_err(EnumMigrationError::Transaction)?;
                info!("Enum {} now holds {:?}", enum_name, self.new_values);
                Ok(())
            }
            Err(err) => {
                warn!("Rolling back replacement of enum {}: {}", enum_name, err);
                Err(after_rollback(err, txn.rollback().await))
            }
        }
    }

    async fn run_steps(&self, txn: &DatabaseTransaction) -> Result<(), EnumMigrationError> {
        if self.verify_existing_rows {
            self.check_stored_values(txn).await?;
        }

        for (current, sql) in self.statements() {
            step::execute_sql(txn, sql).await.map_err(at(current))?;
        }

        Ok(())
    }

    async fn check_stored_values(&self, txn: &DatabaseTransaction) -> Result<(), EnumMigrationError> {
        let stored = step::stored_values(txn, &self.table_name, &self.column_name)
            .await
            .map_err(EnumMigrationError::Precheck)?;

        let mut missing = stored
            .into_iter()
            .filter(|value| !self.new_values.contains(value))
            .collect::<Vec<_>>();
        if missing.is_empty() {
            return Ok(());
        }

        missing.sort();
        Err(EnumMigrationError::ValuesInUse(missing))
    }
}

/// A failed rollback is logged; the caller still gets the step failure that caused it.
fn after_rollback(err: EnumMigrationError, rollback: Result<(), DbErr>) -> EnumMigrationError {
    if let Err(rollback_err) = rollback {
        error!("Rollback failed after {}: {}", err, rollback_err);
    }
    err
}

fn at(step: Step) -> impl FnOnce(DbErr) -> EnumMigrationError {
    move |source| EnumMigrationError::Database { step, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_role() -> ReplaceEnumValues {
        ReplaceEnumValues::new("users", "role", "admin", ["admin", "member"])
    }

    #[test]
    fn derives_enum_names_from_table_and_column() {
        let replace = users_role();
        assert_eq!(replace.enum_name(), "enum_users_role");
        assert_eq!(replace.temporary_enum_name(), "enum_users_role_new");

        let replace = replace.with_enum_name("user_role");
        assert_eq!(replace.enum_name(), "user_role");
        assert_eq!(replace.temporary_enum_name(), "user_role_new");
    }

    #[test]
    fn statements_follow_step_order() {
        let statements = users_role().statements();
        let steps = statements.iter().map(|(step, _)| *step).collect::<Vec<_>>();
        assert_eq!(steps, Step::ALL.to_vec());

        let sql = statements.into_iter().map(|(_, sql)| sql).collect::<Vec<_>>();
        assert_eq!(
            sql,
            vec![
                "CREATE TYPE \"enum_users_role_new\" AS ENUM ('admin', 'member')",
                "ALTER TABLE \"users\" ALTER COLUMN \"role\" DROP DEFAULT",
                "ALTER TABLE \"users\" ALTER COLUMN \"role\" TYPE \"enum_users_role_new\" USING (\"role\"::text::\"enum_users_role_new\")",
                "DROP TYPE \"enum_users_role\"",
                "ALTER TYPE \"enum_users_role_new\" RENAME TO \"enum_users_role\"",
                "ALTER TABLE \"users\" ALTER COLUMN \"role\" SET DEFAULT 'admin'::\"enum_users_role\"",
            ]
        );
    }

    #[test]
    fn failed_rollback_keeps_the_step_error() {
        let err = EnumMigrationError::Database {
            step: Step::RetypeColumn,
            source: DbErr::Custom("invalid input value for enum".to_string()),
        };

        let err = after_rollback(
            err,
            Err(DbErr::Custom("connection reset".to_string())),
        );

        assert_eq!(err.step(), Some(Step::RetypeColumn));
        assert!(err.to_string().contains("invalid input value for enum"));
        assert!(!err.to_string().contains("connection reset"));
    }

    #[test]
    fn rejects_default_outside_new_values() {
        let replace = ReplaceEnumValues::new("users", "role", "guest", ["admin", "member"]);
        assert!(matches!(
            replace.validate(),
            Err(EnumMigrationError::InvalidInput(msg)) if msg.contains("guest")
        ));
    }

    #[test]
    fn rejects_empty_and_duplicate_values() {
        let empty = ReplaceEnumValues::new("users", "role", "admin", Vec::<String>::new());
        assert!(empty.validate().is_err());

        let duplicate = ReplaceEnumValues::new("users", "role", "admin", ["admin", "admin"]);
        assert!(matches!(
            duplicate.validate(),
            Err(EnumMigrationError::InvalidInput(msg)) if msg.contains("duplicate")
        ));
    }

    #[test]
    fn rejects_empty_names() {
        assert!(ReplaceEnumValues::new("", "role", "admin", ["admin"])
            .validate()
            .is_err());
        assert!(ReplaceEnumValues::new("users", "", "admin", ["admin"])
            .validate()
            .is_err());
        assert!(users_role().with_enum_name("").validate().is_err());
        assert!(users_role().validate().is_ok());
    }
}
