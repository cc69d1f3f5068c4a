use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Profile;
use crate::planner::Plan;

/// A plan the user chose to keep, with the profile it was generated from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedEntry {
  pub saved_id: String,
  pub name: String,
  #[serde(default)]
  pub notes: String,
  pub created_at: DateTime<Utc>,
  pub plan: Plan,
  #[serde(default)]
  pub profile: Profile,
}

/// Export payload: a saved entry stamped with the export time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
  pub exported_at: DateTime<Utc>,
  #[serde(flatten)]
  pub entry: SavedEntry,
}
