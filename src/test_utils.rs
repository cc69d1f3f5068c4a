//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Profile, check-in and log factories
//! - A pinned clock
//! - Helper assertions

use chrono::{Duration, NaiveDate};
use sqlx::SqlitePool;

use crate::clock::FixedClock;
use crate::models::{CheckIn, LoggedBlock, LoggedSet, Profile, SavedEntry, WorkoutLog};
use crate::planner::generate_plan;
use crate::saved::{new_entry, save_entry};
use crate::taxonomy::Severity;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) so every query sees the same in-memory database
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Generate a plan for a mid-pregnancy profile and store it under `saved_id`
pub async fn seed_test_saved_plan(pool: &SqlitePool, saved_id: &str) -> SavedEntry {
  let profile = mock_pregnant_profile(20);
  let plan = generate_plan(&profile, &fixed_clock());
  let mut entry = new_entry(plan, profile, None, None, &fixed_clock());
  entry.saved_id = saved_id.to_string();

  save_entry(pool, entry)
    .await
    .expect("Failed to seed saved plan")
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

pub fn test_today() -> NaiveDate {
  NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date")
}

/// Clock pinned to noon UTC on `test_today()`
pub fn fixed_clock() -> FixedClock {
  FixedClock::on(test_today())
}

/// Default intake profile at the given week of pregnancy
pub fn mock_pregnant_profile(weeks_pregnant: u32) -> Profile {
  Profile::default().at_pregnancy_week(weeks_pregnant)
}

/// Postpartum profile planning `plan_weeks` weeks from `weeks_postpartum`
pub fn mock_postpartum_profile(weeks_postpartum: u32, plan_weeks: u32) -> Profile {
  let mut profile = Profile::default().at_postpartum_week(weeks_postpartum);
  profile.clearance_acknowledged = true;
  profile.stage.postpartum_plan_weeks = plan_weeks;
  profile
}

/// Check-in with every symptom at `severity`, full adherence
pub fn mock_checkin(plan_id: &str, week_index: usize, severity: Severity) -> CheckIn {
  let created_at = fixed_clock().0 + Duration::days(7 * week_index as i64);
  let mut checkin = CheckIn::new(plan_id, week_index, created_at);
  checkin.pelvic_pressure = severity;
  checkin.leakage = severity;
  checkin.doming = severity;
  checkin.pgp = severity;
  checkin.low_back = severity;
  checkin.fatigue = severity;
  checkin.adherence_pct = Some(100);
  checkin
}

/// Log of one goblet squat block (3 x 10) dated `days_in` days after `test_today()`
pub fn mock_workout_log(id: &str, plan_id: &str, days_in: i64) -> WorkoutLog {
  WorkoutLog {
    id: id.to_string(),
    date: test_today() + Duration::days(days_in),
    plan_id: plan_id.to_string(),
    week_label: "Week 1 · 20 weeks pregnant".to_string(),
    session_name: "Day 1".to_string(),
    blocks: vec![LoggedBlock {
      exercise: "Goblet Squat".to_string(),
      sets: vec![LoggedSet { reps: 10, weight: Some(12.0) }; 3],
      notes: String::new(),
    }],
  }
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::StageMode;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> =
      sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = 'kv_store'")
        .fetch_all(&pool)
        .await
        .expect("Failed to query tables");

    assert_eq!(tables.len(), 1);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_saved_plan_is_listed() {
    let pool = setup_test_db().await;

    let entry = seed_test_saved_plan(&pool, "saved_seed").await;
    let listed = crate::saved::list_entries(&pool).await.unwrap();
    assert_eq!(listed, vec![entry]);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let pregnant = mock_pregnant_profile(30);
    assert_eq!(pregnant.stage.mode, StageMode::Pregnant);
    assert!(pregnant.validate().is_ok());

    let postpartum = mock_postpartum_profile(14, 8);
    assert_eq!(postpartum.stage.mode, StageMode::Postpartum);
    assert_eq!(postpartum.stage.postpartum_plan_weeks, 8);

    let checkin = mock_checkin("plan_x", 2, Severity::Moderate);
    assert_eq!(checkin.pain_peak(), Severity::Moderate);

    let log = mock_workout_log("log_x", "plan_x", 0);
    assert_eq!(log.total_reps(), 30);
  }

  #[test]
  fn test_assert_approx_eq_macro() {
    crate::assert_approx_eq!(0.1_f64 + 0.2, 0.3, 1e-9);
  }
}
