//! JSON key-value store on SQLite
//!
//! Each logical collection (saved plans, workout logs, check-ins) is one JSON
//! document under a fixed key. A missing key reads as the type's default. A
//! document that no longer parses is reported, never overwritten.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

/// ---------------------------------------------------------------------------
/// Collection keys
/// ---------------------------------------------------------------------------

pub const SAVED_PLANS_KEY: &str = "nurturestrength_saved_plans_v1";
pub const WORKOUT_LOGS_KEY: &str = "nurturestrength_workout_logs_v1";
pub const CHECKINS_KEY: &str = "nurturestrength_checkins_v1";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(String),

  #[error("Corrupt data under {key}: {message}")]
  Corrupt { key: String, message: String },

  #[error("Serialization failed: {0}")]
  Serialize(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Import failed: {0}")]
  ImportFormat(String),
}

impl From<sqlx::Error> for StoreError {
  fn from(e: sqlx::Error) -> Self {
    StoreError::Database(e.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Ids
/// ---------------------------------------------------------------------------

/// `base`, or the first of `base_2`, `base_3`, ... that `taken` does not claim.
pub fn unique_id(base: &str, taken: impl Fn(&str) -> bool) -> String {
  if !taken(base) {
    return base.to_string();
  }
  (2u64..)
    .map(|n| format!("{}_{}", base, n))
    .find(|id| !taken(id))
    .unwrap_or_else(|| base.to_string())
}

/// ---------------------------------------------------------------------------
/// Load / Save
/// ---------------------------------------------------------------------------

/// Read the document under `key`, or `T::default()` when nothing is stored.
pub async fn load_json<T>(pool: &SqlitePool, key: &str) -> Result<T, StoreError>
where
  T: DeserializeOwned + Default,
{
  let row: Option<(String,)> = sqlx::query_as("SELECT value_json FROM kv_store WHERE key = ?1")
    .bind(key)
    .fetch_optional(pool)
    .await?;

  match row {
    Some((json,)) => serde_json::from_str(&json).map_err(|e| StoreError::Corrupt {
      key: key.to_string(),
      message: e.to_string(),
    }),
    None => Ok(T::default()),
  }
}

/// Replace the document under `key`.
pub async fn save_json<T>(pool: &SqlitePool, key: &str, value: &T) -> Result<(), StoreError>
where
  T: Serialize + ?Sized,
{
  let json = serde_json::to_string(value).map_err(|e| StoreError::Serialize(e.to_string()))?;
  let updated_at = Utc::now().to_rfc3339();

  sqlx::query(
    r#"
    INSERT INTO kv_store (key, value_json, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET
      value_json = excluded.value_json,
      updated_at = excluded.updated_at
    "#,
  )
  .bind(key)
  .bind(&json)
  .bind(&updated_at)
  .execute(pool)
  .await?;

  Ok(())
}
