use clap::Parser;
use sea_orm::{DatabaseConnection, SqlxPostgresConnector};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

/// Schema changes run one statement at a time, so a single connection is the default.
#[derive(Debug, Parser, Clone)]
pub struct DatabaseArgs {
    /// The database URL.
    #[arg(long, env)]
    pub database_url: String,
    /// The maximum number of connections to the database.
    #[arg(long, env, default_value = "1")]
    pub database_max_connections: u32,
    /// The minimum number of connections to the database.
    #[arg(long, env, default_value = "1")]
    pub database_min_connections: u32,
}

impl DatabaseArgs {
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        self.database_url.parse()
    }
}

/// Opens the Postgres database a replacement runs against.
pub async fn connect(args: DatabaseArgs) -> Result<DatabaseConnection, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .min_connections(args.database_min_connections)
        .max_connections(args.database_max_connections)
        .connect_with(args.connect_options()?)
        .await?;

    Ok(SqlxPostgresConnector::from_sqlx_postgres_pool(pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_a_single_connection() {
        let args = DatabaseArgs::parse_from([
            "enum-ops",
            "--database-url",
            "postgres://localhost/app",
        ]);

        assert_eq!(args.database_url, "postgres://localhost/app");
        assert_eq!(args.database_max_connections, 1);
        assert_eq!(args.database_min_connections, 1);
        assert!(args.connect_options().is_ok());
    }

    #[test]
    fn rejects_urls_that_are_not_postgres() {
        let args = DatabaseArgs::parse_from([
            "enum-ops",
            "--database-url",
            "not a url",
        ]);

        assert!(args.connect_options().is_err());
    }
}
