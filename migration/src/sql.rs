//! Statement text for every step of an enum replacement.
//!
//! Identifiers are wrapped in double quotes and literals in single quotes.
//! Embedded quote characters are doubled, so plain labels produce exactly the
//! text PostgreSQL documents for each statement.

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub fn create_enum_type<S: AsRef<str>>(name: &str, values: &[S]) -> String {
    let labels = values
        .iter()
        .map(|value| quote_literal(value.as_ref()))
        .collect::<Vec<_>>()
        .join(", ");

    format!("CREATE TYPE {} AS ENUM ({})", quote_ident(name), labels)
}

pub fn drop_column_default(table: &str, column: &str) -> String {
    format!(
        "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT",
        quote_ident(table),
        quote_ident(column)
    )
}

/// The text cast bridges two enum types that PostgreSQL cannot cast between directly.
pub fn retype_column(table: &str, column: &str, enum_name: &str) -> String {
    let column = quote_ident(column);
    let enum_name = quote_ident(enum_name);

    format!(
        "ALTER TABLE {} ALTER COLUMN {column} TYPE {enum_name} USING ({column}::text::{enum_name})",
        quote_ident(table),
    )
}

pub fn drop_type(name: &str) -> String {
    format!("DROP TYPE {}", quote_ident(name))
}

pub fn rename_type(old: &str, new: &str) -> String {
    format!("ALTER TYPE {} RENAME TO {}", quote_ident(old), quote_ident(new))
}

pub fn set_column_default(table: &str, column: &str, value: &str, type_name: &str) -> String {
    format!(
        "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {}::{}",
        quote_ident(table),
        quote_ident(column),
        quote_literal(value),
        quote_ident(type_name)
    )
}

/// Labels currently stored in a column, as text. NULLs are skipped.
pub fn distinct_column_values(table: &str, column: &str) -> String {
    let column = quote_ident(column);

    format!(
        "SELECT DISTINCT {column}::text AS \"value\" FROM {} WHERE {column} IS NOT NULL",
        quote_ident(table)
    )
}
