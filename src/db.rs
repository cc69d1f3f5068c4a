use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fs;
use tracing::info;

use crate::config::Config;

pub type DbPool = SqlitePool;

/// Application state holding the database connection pool
pub struct AppState {
  pub db: DbPool,
}

/// Open (creating if needed) the database at `config.db_path` and run migrations
pub async fn initialize_db(config: &Config) -> Result<DbPool, Box<dyn std::error::Error + Send + Sync>> {
  let db_path = &config.db_path;

  // Create directory if it doesn't exist
  if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)
      .map_err(|e| format!("Failed to create data dir {}: {}", parent.display(), e))?;
  }

  let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
  info!(path = %db_path.display(), "Initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database initialized successfully");

  Ok(pool)
}
