use anyhow::Result;
use clap::{Parser, Subcommand};
use enum_ops::{
    plan::{subcommand as plan_subcommand, PlanCommand},
    replace::{replace, sql, ReplaceCommand, SqlCommand},
};

#[derive(Debug, Parser)]
#[clap(author, version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replace the label set of one enum column.
    #[clap(name = "replace")]
    Replace(ReplaceCommand),
    /// Print the statements of a replacement without connecting.
    #[clap(name = "sql")]
    Sql(SqlCommand),
    /// Apply every replacement listed in a plan file.
    #[clap(name = "plan")]
    Plan(PlanCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::init();
    match args.command {
        Command::Replace(subcommand) => replace(subcommand).await?,
        Command::Sql(subcommand) => sql(subcommand)?,
        Command::Plan(subcommand) => plan_subcommand(subcommand).await?,
    }

    Ok(())
}
