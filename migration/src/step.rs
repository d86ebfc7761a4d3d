use std::fmt;

use log::debug;
use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, Statement};

use crate::sql;

/// The six statements of an enum replacement, in execution order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    CreateType,
    DropDefault,
    RetypeColumn,
    DropType,
    RenameType,
    SetDefault,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::CreateType,
        Step::DropDefault,
        Step::RetypeColumn,
        Step::DropType,
        Step::RenameType,
        Step::SetDefault,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Step::CreateType => "create_type",
            Step::DropDefault => "drop_default",
            Step::RetypeColumn => "retype_column",
            Step::DropType => "drop_type",
            Step::RenameType => "rename_type",
            Step::SetDefault => "set_default",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) async fn execute_sql<C: ConnectionTrait>(db: &C, sql: String) -> Result<(), DbErr> {
    debug!("{}", sql);
    db.execute(Statement::from_string(DatabaseBackend::Postgres, sql))
        .await
        .map(|_| ())
}

pub async fn create_type<C, S>(db: &C, name: &str, values: &[S]) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    S: AsRef<str>,
{
    execute_sql(db, sql::create_enum_type(name, values)).await
}

/// Never fails because the column has no default.
pub async fn drop_default<C: ConnectionTrait>(db: &C, table: &str, column: &str) -> Result<(), DbErr> {
    execute_sql(db, sql::drop_column_default(table, column)).await
}

/// Every stored value must textually match a label of `enum_name`, otherwise
/// the cast fails and the statement is rejected.
pub async fn retype_column<C: ConnectionTrait>(
    db: &C,
    table: &str,
    column: &str,
    enum_name: &str,
) -> Result<(), DbErr> {
    execute_sql(db, sql::retype_column(table, column, enum_name)).await
}

pub async fn drop_type<C: ConnectionTrait>(db: &C, name: &str) -> Result<(), DbErr> {
    execute_sql(db, sql::drop_type(name)).await
}

pub async fn rename_type<C: ConnectionTrait>(db: &C, old: &str, new: &str) -> Result<(), DbErr> {
    execute_sql(db, sql::rename_type(old, new)).await
}

pub async fn set_default<C: ConnectionTrait>(
    db: &C,
    table: &str,
    column: &str,
    value: &str,
    type_name: &str,
) -> Result<(), DbErr> {
    execute_sql(db, sql::set_column_default(table, column, value, type_name)).await
}

/// Distinct non-null labels stored in `table.column`, read as text.
pub async fn stored_values<C: ConnectionTrait>(
    db: &C,
    table: &str,
    column: &str,
) -> Result<Vec<String>, DbErr> {
    let sql = sql::distinct_column_values(table, column);
    debug!("{}", sql);
    let rows = db
        .query_all(Statement::from_string(DatabaseBackend::Postgres, sql))
        .await?;

    rows.iter()
        .map(|row| row.try_get::<String>("", "value"))
        .collect()
}
