pub(crate) mod models;
pub(crate) mod types;

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};

use crate::core::config::Settings;

pub(crate) async fn init_pool(settings: &Settings) -> Result<PgPool, sqlx::Error> {
    let database_url = settings.database().database_url();
    let connect_options: PgConnectOptions = database_url.parse()?;
    let connect_options = connect_options
        .application_name("learnhub")
        .log_statements(tracing::log::LevelFilter::Off);

    PgPoolOptions::new()
        .max_connections(settings.database().max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await
}

pub(crate) async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Postgres error code for a violated unique constraint.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres error code for a violated foreign key.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Name of the unique constraint a write tripped over, if that is what failed.
pub(crate) fn unique_violation(error: &sqlx::Error) -> Option<String> {
    constraint_with_code(error, UNIQUE_VIOLATION)
}

pub(crate) fn foreign_key_violation(error: &sqlx::Error) -> Option<String> {
    constraint_with_code(error, FOREIGN_KEY_VIOLATION)
}

fn constraint_with_code(error: &sqlx::Error, code: &str) -> Option<String> {
    match error {
        sqlx::Error::Database(db_error) if db_error.code().as_deref() == Some(code) => {
            Some(db_error.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}
