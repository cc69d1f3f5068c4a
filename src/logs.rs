//! Workout log persistence

use sqlx::SqlitePool;
use tracing::info;

use crate::clock::Clock;
use crate::models::WorkoutLog;
use crate::store::{load_json, save_json, unique_id, StoreError, WORKOUT_LOGS_KEY};

pub fn new_log_id(clock: &dyn Clock) -> String {
  format!("log_{}", clock.now().timestamp_millis())
}

async fn load_all(pool: &SqlitePool) -> Result<Vec<WorkoutLog>, StoreError> {
  load_json(pool, WORKOUT_LOGS_KEY).await
}

/// Append and return the log as stored; a taken id gets a suffix.
pub async fn append_log(pool: &SqlitePool, mut log: WorkoutLog) -> Result<WorkoutLog, StoreError> {
  let mut all = load_all(pool).await?;
  log.id = unique_id(&log.id, |id| all.iter().any(|l| l.id == id));
  all.push(log.clone());
  save_json(pool, WORKOUT_LOGS_KEY, &all).await?;

  info!(log_id = %log.id, plan_id = %log.plan_id, "Logged workout");
  Ok(log)
}

/// Logs for one plan, most recent date first
pub async fn logs_for_plan(pool: &SqlitePool, plan_id: &str) -> Result<Vec<WorkoutLog>, StoreError> {
  let mut logs: Vec<WorkoutLog> = load_all(pool)
    .await?
    .into_iter()
    .filter(|l| l.plan_id == plan_id)
    .collect();
  logs.sort_by(|a, b| b.date.cmp(&a.date));
  Ok(logs)
}

pub async fn delete_log(pool: &SqlitePool, log_id: &str) -> Result<bool, StoreError> {
  let mut all = load_all(pool).await?;
  let before = all.len();
  all.retain(|l| l.id != log_id);
  let removed = all.len() != before;
  if removed {
    save_json(pool, WORKOUT_LOGS_KEY, &all).await?;
    info!(log_id, "Deleted workout log");
  }
  Ok(removed)
}
