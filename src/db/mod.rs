//! Database module for PostgreSQL persistence

pub mod models;
pub mod repository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::env;

// Environment variable names
const ENV_POSTGRES_HOST: &str = "DGA_AGENT_POSTGRES_HOST";
const ENV_POSTGRES_PORT: &str = "DGA_AGENT_POSTGRES_PORT";
const ENV_POSTGRES_USER: &str = "DGA_AGENT_POSTGRES_USER";
const ENV_POSTGRES_PASSWORD: &str = "DGA_AGENT_POSTGRES_PASSWORD";
const ENV_POSTGRES_DB: &str = "DGA_AGENT_POSTGRES_DB";

// Default values
const DEFAULT_POSTGRES_HOST: &str = "127.0.0.1";
const DEFAULT_POSTGRES_PORT: &str = "5432";
const DEFAULT_POSTGRES_USER: &str = "dga_agent";
const DEFAULT_POSTGRES_PASSWORD: &str = "dga_agent";
const DEFAULT_POSTGRES_DB: &str = "dga_agent";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Create a new database connection pool
pub async fn create_pool() -> Result<PgPool, DbError> {
    let host = env::var(ENV_POSTGRES_HOST).unwrap_or_else(|_| DEFAULT_POSTGRES_HOST.to_string());
    let port = env::var(ENV_POSTGRES_PORT).unwrap_or_else(|_| DEFAULT_POSTGRES_PORT.to_string());
    let user = env::var(ENV_POSTGRES_USER).unwrap_or_else(|_| DEFAULT_POSTGRES_USER.to_string());
    let password =
        env::var(ENV_POSTGRES_PASSWORD).unwrap_or_else(|_| DEFAULT_POSTGRES_PASSWORD.to_string());
    let database = env::var(ENV_POSTGRES_DB).unwrap_or_else(|_| DEFAULT_POSTGRES_DB.to_string());

    let database_url = format!(
        "postgres://{}:{}@{}:{}/{}",
        user, password, host, port, database
    );

    tracing::debug!(host = %host, port = %port, database = %database, "Connecting to PostgreSQL");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    tracing::info!(host = %host, port = %port, "PostgreSQL connection established");

    Ok(pool)
}

/// Initialize database schema
pub async fn init_schema(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dga_results (
            id BIGSERIAL PRIMARY KEY,
            substation_id VARCHAR(50),
            transformer_id VARCHAR(50),
            testing_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            test_input_json JSONB NOT NULL DEFAULT '{}',
            ai_response TEXT,
            ai_reference_json JSONB NOT NULL DEFAULT '[]',
            report_text TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS substation_master (
            substation_short_id VARCHAR(50) PRIMARY KEY,
            substation_name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transformer_master (
            substation_short_id VARCHAR(50) NOT NULL,
            transformer_id VARCHAR(50) NOT NULL,
            transformer_name TEXT NOT NULL,
            transformer_capacity DOUBLE PRECISION,
            PRIMARY KEY (substation_short_id, transformer_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes separately
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_dga_results_transformer_id ON dga_results(transformer_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_dga_results_testing_date ON dga_results(testing_date)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database schema initialized");

    Ok(())
}
