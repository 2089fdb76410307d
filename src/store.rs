//! PostgreSQL connection bootstrap shared by the document and relational backends.

use crate::config::{StoreConfig, DATABASE_URL_VAR};
use crate::error::{AppError, ConfigError};
use crate::sql::quoted;
use sqlx::postgres::PgPoolOptions;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

/// Ensure the database and schema exist, then open a pool sized from config.
pub async fn connect(config: &StoreConfig) -> Result<PgPool, AppError> {
    let url = config
        .database_url
        .as_deref()
        .ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;
    ensure_database_exists(url).await?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await?;
    ensure_schema(&pool, &config.schema).await?;
    tracing::info!(backend = %config.backend, schema = %config.schema, "connected");
    Ok(pool)
}

/// Create the schema holding collections and tables if it does not exist.
pub async fn ensure_schema(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(schema)))
        .execute(pool)
        .await?;
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| ConfigError::Validation(format!("invalid {}: {}", DATABASE_URL_VAR, e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url.rfind('/').ok_or_else(|| ConfigError::Validation(format!("{}: no database path", DATABASE_URL_VAR)))? + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}
