pub use sea_orm_migration::prelude::*;

mod errors;
mod migration;
mod replace;
pub mod sql;
pub mod step;

pub use errors::EnumMigrationError;
pub use migration::ReplaceEnumMigration;
pub use replace::ReplaceEnumValues;
pub use step::Step;
