//! Saved plans: persistence, export and import

use serde_json::Value;
use sqlx::SqlitePool;
use tracing::info;

use crate::clock::Clock;
use crate::models::saved::ExportPayload;
use crate::models::{Profile, SavedEntry};
use crate::planner::Plan;
use crate::store::{load_json, save_json, unique_id, StoreError, SAVED_PLANS_KEY};

/// ---------------------------------------------------------------------------
/// Entry construction
/// ---------------------------------------------------------------------------

/// "T2 – 3 days – 30 min"
pub fn default_save_name(plan: &Plan, profile: &Profile) -> String {
  let stage = plan
    .weeks
    .first()
    .map(|w| w.plan.stage_key.as_str().to_uppercase())
    .unwrap_or_else(|| profile.stage_key().as_str().to_uppercase());
  format!(
    "{} – {} days – {} min",
    stage, profile.schedule.days_per_week, profile.schedule.session_minutes
  )
}

pub fn new_entry(
  plan: Plan,
  profile: Profile,
  name: Option<&str>,
  notes: Option<&str>,
  clock: &dyn Clock,
) -> SavedEntry {
  let name = name
    .map(str::trim)
    .filter(|n| !n.is_empty())
    .map(str::to_string)
    .unwrap_or_else(|| default_save_name(&plan, &profile));

  SavedEntry {
    saved_id: format!("saved_{}", clock.now().timestamp_millis()),
    name,
    notes: notes.map(|n| n.trim().to_string()).unwrap_or_default(),
    created_at: plan.created_at,
    plan,
    profile,
  }
}

/// ---------------------------------------------------------------------------
/// Collection operations (newest first)
/// ---------------------------------------------------------------------------

pub async fn list_entries(pool: &SqlitePool) -> Result<Vec<SavedEntry>, StoreError> {
  load_json(pool, SAVED_PLANS_KEY).await
}

/// Insert at the front and return the entry as stored.
///
/// Ids come from the clock and can repeat. A taken saved id gets a suffix, and
/// so does a plan id already used by a different plan. An identical plan keeps
/// its id so its check-ins stay shared.
pub async fn save_entry(pool: &SqlitePool, mut entry: SavedEntry) -> Result<SavedEntry, StoreError> {
  let mut entries = list_entries(pool).await?;
  entry.saved_id = unique_id(&entry.saved_id, |id| entries.iter().any(|e| e.saved_id == id));
  if entries.iter().any(|e| e.plan.id == entry.plan.id && e.plan != entry.plan) {
    entry.plan.id = unique_id(&entry.plan.id, |id| entries.iter().any(|e| e.plan.id == id));
  }
  entries.insert(0, entry.clone());
  save_json(pool, SAVED_PLANS_KEY, &entries).await?;

  info!(saved_id = %entry.saved_id, plan_id = %entry.plan.id, "Saved plan");
  Ok(entry)
}

pub async fn get_entry(pool: &SqlitePool, saved_id: &str) -> Result<SavedEntry, StoreError> {
  list_entries(pool)
    .await?
    .into_iter()
    .find(|e| e.saved_id == saved_id)
    .ok_or_else(|| StoreError::NotFound(format!("saved plan {}", saved_id)))
}

pub async fn delete_entry(pool: &SqlitePool, saved_id: &str) -> Result<SavedEntry, StoreError> {
  let mut entries = list_entries(pool).await?;
  let idx = entries
    .iter()
    .position(|e| e.saved_id == saved_id)
    .ok_or_else(|| StoreError::NotFound(format!("saved plan {}", saved_id)))?;
  let removed = entries.remove(idx);
  save_json(pool, SAVED_PLANS_KEY, &entries).await?;

  info!(saved_id, "Deleted saved plan");
  Ok(removed)
}

/// Remove every saved plan; returns how many were removed.
pub async fn delete_all(pool: &SqlitePool) -> Result<usize, StoreError> {
  let count = list_entries(pool).await?.len();
  save_json(pool, SAVED_PLANS_KEY, &Vec::<SavedEntry>::new()).await?;

  info!(count, "Deleted all saved plans");
  Ok(count)
}

/// ---------------------------------------------------------------------------
/// Export / Import
/// ---------------------------------------------------------------------------

pub fn export_entry(entry: &SavedEntry, clock: &dyn Clock) -> ExportPayload {
  ExportPayload {
    exported_at: clock.now(),
    entry: entry.clone(),
  }
}

/// Accepts a full saved entry (optionally an export payload) or a bare
/// `{ plan, profile? }` document.
pub fn parse_import(text: &str, clock: &dyn Clock) -> Result<SavedEntry, StoreError> {
  let value: Value =
    serde_json::from_str(text).map_err(|e| StoreError::ImportFormat(format!("Could not parse JSON: {}", e)))?;

  let has = |field: &str| value.get(field).is_some_and(|v| !v.is_null());
  let (has_saved_id, has_plan) = (has("savedId"), has("plan"));

  if has_saved_id && has_plan {
    return serde_json::from_value(value)
      .map_err(|e| StoreError::ImportFormat(format!("Invalid saved entry: {}", e)));
  }
  if !has_plan {
    return Err(StoreError::ImportFormat("Unrecognized JSON format".to_string()));
  }

  let plan: Plan = serde_json::from_value(value["plan"].clone())
    .map_err(|e| StoreError::ImportFormat(format!("Invalid plan: {}", e)))?;
  let profile: Profile = match value.get("profile").filter(|v| !v.is_null()) {
    Some(p) => serde_json::from_value(p.clone())
      .map_err(|e| StoreError::ImportFormat(format!("Invalid profile: {}", e)))?,
    None => Profile::default(),
  };

  let template = plan
    .weeks
    .first()
    .map(|w| w.plan.template.clone())
    .unwrap_or_else(|| "Imported plan".to_string());

  Ok(SavedEntry {
    saved_id: format!("saved_{}", clock.now().timestamp_millis()),
    name: format!("{} (imported)", template),
    notes: String::new(),
    created_at: plan.created_at,
    plan,
    profile,
  })
}

pub async fn import_entry(pool: &SqlitePool, text: &str, clock: &dyn Clock) -> Result<SavedEntry, StoreError> {
  let entry = parse_import(text, clock)?;
  save_entry(pool, entry).await
}
