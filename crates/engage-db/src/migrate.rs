//! Schema setup

use sqlx::PgPool;
use tracing::info;

const SCHEMA: &str = include_str!("../migrations/0001_engagement.sql");

/// Split the schema file into executable statements, dropping `--` comments
fn statements(sql: &str) -> Vec<String> {
    let without_comments: String = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    without_comments
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Apply the engagement schema. Every statement is idempotent, so this runs on each startup.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    let statements = statements(SCHEMA);
    info!(count = statements.len(), "Applying schema");

    for statement in &statements {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Schema up to date");
    Ok(())
}
