//! Weekly check-in persistence
//!
//! At most one check-in per (plan, week); recording again replaces it.

use sqlx::SqlitePool;
use tracing::info;

use crate::models::CheckIn;
use crate::store::{load_json, save_json, StoreError, CHECKINS_KEY};

async fn load_all(pool: &SqlitePool) -> Result<Vec<CheckIn>, StoreError> {
  load_json(pool, CHECKINS_KEY).await
}

pub async fn upsert_checkin(pool: &SqlitePool, checkin: &CheckIn) -> Result<(), StoreError> {
  let mut all = load_all(pool).await?;
  all.retain(|c| !(c.plan_id == checkin.plan_id && c.week_index == checkin.week_index));
  all.push(checkin.clone());
  all.sort_by(|a, b| a.plan_id.cmp(&b.plan_id).then(a.week_index.cmp(&b.week_index)));
  save_json(pool, CHECKINS_KEY, &all).await?;

  info!(plan_id = %checkin.plan_id, week_index = checkin.week_index, "Recorded check-in");
  Ok(())
}

/// Check-ins of one plan, ordered by week
pub async fn checkins_for_plan(pool: &SqlitePool, plan_id: &str) -> Result<Vec<CheckIn>, StoreError> {
  let mut checkins: Vec<CheckIn> = load_all(pool)
    .await?
    .into_iter()
    .filter(|c| c.plan_id == plan_id)
    .collect();
  checkins.sort_by_key(|c| c.week_index);
  Ok(checkins)
}

/// Returns whether a check-in was removed.
pub async fn delete_checkin(pool: &SqlitePool, plan_id: &str, week_index: usize) -> Result<bool, StoreError> {
  let mut all = load_all(pool).await?;
  let before = all.len();
  all.retain(|c| !(c.plan_id == plan_id && c.week_index == week_index));
  let removed = all.len() != before;
  if removed {
    save_json(pool, CHECKINS_KEY, &all).await?;
    info!(plan_id, week_index, "Deleted check-in");
  }
  Ok(removed)
}

pub async fn delete_for_plan(pool: &SqlitePool, plan_id: &str) -> Result<usize, StoreError> {
  let mut all = load_all(pool).await?;
  let before = all.len();
  all.retain(|c| c.plan_id != plan_id);
  let removed = before - all.len();
  if removed > 0 {
    save_json(pool, CHECKINS_KEY, &all).await?;
    info!(plan_id, removed, "Deleted plan check-ins");
  }
  Ok(removed)
}

/// Drop check-ins whose plan is not in `live_plan_ids`; returns how many went.
pub async fn delete_orphaned(pool: &SqlitePool, live_plan_ids: &[String]) -> Result<usize, StoreError> {
  let mut all = load_all(pool).await?;
  let before = all.len();
  all.retain(|c| live_plan_ids.contains(&c.plan_id));
  let removed = before - all.len();
  if removed > 0 {
    save_json(pool, CHECKINS_KEY, &all).await?;
    info!(removed, "Deleted orphaned check-ins");
  }
  Ok(removed)
}
