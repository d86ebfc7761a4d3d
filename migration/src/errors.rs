use sea_orm::DbErr;
use thiserror::Error;

use crate::step::Step;

#[derive(Error, Debug)]
pub enum EnumMigrationError {
    #[error("Invalid enum replacement: {0}")]
    InvalidInput(String),
    #[error("Stored values are missing from the new enum labels: {}", .0.join(", "))]
    ValuesInUse(Vec<String>),
    #[error("Step '{step}' failed: {source}")]
    Database {
        step: Step,
        #[source]
        source: DbErr,
    },
    #[error("Reading stored values failed: {0}")]
    Precheck(#[source] DbErr),
    #[error("Transaction Error: {0}")]
    Transaction(#[source] DbErr),
}

impl EnumMigrationError {
    pub const fn step(&self) -> Option<Step> {
        match self {
            EnumMigrationError::Database { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Database failures surface unchanged so a migration reports the driver error.
impl From<EnumMigrationError> for DbErr {
    fn from(error: EnumMigrationError) -> DbErr {
        match error {
            EnumMigrationError::Database { source, .. } => source,
            EnumMigrationError::Precheck(source) => source,
            EnumMigrationError::Transaction(source) => source,
            other => DbErr::Custom(other.to_string()),
        }
    }
}
