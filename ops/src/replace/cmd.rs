use anyhow::{Context, Result};
use clap::{Args, Parser};
use enum_core::{connect, DatabaseArgs};
use enum_migration::ReplaceEnumValues;
use log::info;
use sea_orm::DatabaseConnection;

#[derive(Debug, Parser, Clone)]
pub struct EnumArgs {
    /// Table holding the enum column
    #[arg(long)]
    pub table: String,
    /// The enum column
    #[arg(long)]
    pub column: String,
    /// Default restored on the column, must be one of --values
    #[arg(long = "default")]
    pub default_value: String,
    /// The complete, ordered label set of the enum after the replacement
    #[arg(long, value_delimiter = ',', required = true)]
    pub values: Vec<String>,
    /// Enum type name, defaults to enum_<table>_<column>
    #[arg(long)]
    pub enum_name: Option<String>,
    /// Fail before changing the schema if stored rows use a dropped label
    #[arg(long)]
    pub verify_existing_rows: bool,
}

impl From<EnumArgs> for ReplaceEnumValues {
    fn from(args: EnumArgs) -> Self {
        let replace = ReplaceEnumValues::new(
            &args.table,
            &args.column,
            &args.default_value,
            args.values,
        )
        .check_existing_rows(args.verify_existing_rows);

        match args.enum_name {
            Some(enum_name) => replace.with_enum_name(&enum_name),
            None => replace,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ReplaceCommand {
    /// Database configuration
    #[clap(flatten)]
    pub database: DatabaseArgs,
    #[clap(flatten)]
    pub replace: EnumArgs,
}

#[derive(Debug, Clone, Args)]
pub struct SqlCommand {
    #[clap(flatten)]
    pub replace: EnumArgs,
}

pub async fn replace(command: ReplaceCommand) -> Result<()> {
    let db = connect(command.database).await?;

    run(&db, command.replace.into()).await
}

pub async fn run(db: &DatabaseConnection, replace: ReplaceEnumValues) -> Result<()> {
    replace
        .exec(db)
        .await
        .with_context(|| format!("replacing enum {}", replace.enum_name()))?;
    info!("Replaced enum {}", replace.enum_name());

    Ok(())
}

/// The statements a replacement would run, one per line.
pub fn render_sql(replace: &ReplaceEnumValues) -> Result<String> {
    replace.validate()?;

    Ok(replace
        .statements()
        .into_iter()
        .map(|(_, sql)| format!("{};\n", sql))
        .collect())
}

pub fn sql(command: SqlCommand) -> Result<()> {
    print!("{}", render_sql(&command.replace.into())?);

    Ok(())
}
