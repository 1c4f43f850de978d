use anyhow::Context;
use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::DatabaseConfig;
use crate::database::DatabaseManager;

pub async fn handle(database: &DatabaseConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(database)
        .await
        .context("failed to connect to the invoice database")?;
    DatabaseManager::migrate(&pool).await.context("migration failed")?;

    let target = DatabaseManager::redacted(database.url.as_deref().unwrap_or_default());
    output_success(
        output_format,
        &format!("Invoice schema is up to date on {}", target),
        Some(json!({ "database": target })),
    )
}
