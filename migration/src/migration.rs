use sea_orm_migration::{prelude::*, MigrationName};

use crate::ReplaceEnumValues;

/// Registers an enum replacement in a `MigratorTrait` list.
///
/// `down` replays the previous label set when one is given; without it the
/// replacement cannot be reverted and `down` does nothing.
pub struct ReplaceEnumMigration {
    pub name: String,
    pub up: ReplaceEnumValues,
    pub down: Option<ReplaceEnumValues>,
}

impl ReplaceEnumMigration {
    pub fn new(name: &str, up: ReplaceEnumValues) -> Self {
        Self {
            name: name.to_string(),
            up,
            down: None,
        }
    }

    pub fn with_down(mut self, down: ReplaceEnumValues) -> Self {
        self.down = Some(down);
        self
    }
}

impl MigrationName for ReplaceEnumMigration {
    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait::async_trait]
impl MigrationTrait for ReplaceEnumMigration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.up.exec(manager.get_connection()).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if let Some(down) = &self.down {
            down.exec(manager.get_connection()).await?;
        }

        Ok(())
    }
}
