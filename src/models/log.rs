use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One completed training session as the user recorded it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLog {
  pub id: String,
  pub date: NaiveDate,
  pub plan_id: String,
  pub week_label: String,
  pub session_name: String,
  #[serde(default)]
  pub blocks: Vec<LoggedBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedBlock {
  pub exercise: String,
  #[serde(default)]
  pub sets: Vec<LoggedSet>,
  #[serde(default)]
  pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoggedSet {
  pub reps: u32,
  /// Load in the user's unit; bodyweight work leaves this empty
  #[serde(default)]
  pub weight: Option<f64>,
}

impl WorkoutLog {
  pub fn total_reps(&self) -> u32 {
    self
      .blocks
      .iter()
      .flat_map(|b| b.sets.iter())
      .map(|s| s.reps)
      .sum()
  }
}
