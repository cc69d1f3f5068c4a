use anyhow::{bail, Context, Result};
use clap::Subcommand;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::{emit, load_saved};
use crate::adaptive::WeekView;
use crate::checkins::{checkins_for_plan, delete_for_plan, delete_orphaned};
use crate::clock::Clock;
use crate::db::AppState;
use crate::models::{Profile, SavedEntry};
use crate::narrative::quick_view;
use crate::saved::{delete_all, delete_entry, export_entry, import_entry, list_entries, new_entry, save_entry};
use crate::session::AppSession;

#[derive(Subcommand, Debug)]
pub enum PlanCommands {
  /// Generate a plan from a profile JSON file and save it
  Generate {
    /// Path to the profile JSON
    #[arg(short, long)]
    profile: PathBuf,
    /// Name for the saved plan (defaults to "<STAGE> – <days> days – <minutes> min")
    #[arg(short, long)]
    name: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    /// Print the plan without saving it
    #[arg(long)]
    no_save: bool,
  },
  /// List saved plans, newest first
  List,
  /// Show a saved plan and its first week
  Show { saved_id: String },
  /// Show one week, adapted to the check-ins recorded before it
  Week {
    saved_id: String,
    /// Zero-based week index
    #[arg(short, long, default_value = "0")]
    week: usize,
  },
  /// Delete one saved plan
  Delete { saved_id: String },
  /// Delete every saved plan
  DeleteAll {
    /// Required confirmation
    #[arg(long)]
    yes: bool,
  },
  /// Export a saved plan as JSON
  Export {
    saved_id: String,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
  /// Import a saved plan (or a bare `{ plan, profile }` document)
  Import { file: PathBuf },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedSummary {
  saved_id: String,
  name: String,
  plan_id: String,
  created_at: String,
  weeks: usize,
}

impl From<&SavedEntry> for SavedSummary {
  fn from(entry: &SavedEntry) -> Self {
    Self {
      saved_id: entry.saved_id.clone(),
      name: entry.name.clone(),
      plan_id: entry.plan.id.clone(),
      created_at: entry.created_at.to_rfc3339(),
      weeks: entry.plan.weeks.len(),
    }
  }
}

pub async fn execute(cmd: PlanCommands, state: &AppState, clock: &dyn Clock, json: bool) -> Result<()> {
  match cmd {
    PlanCommands::Generate { profile, name, notes, no_save } => {
      let profile = read_profile(&profile)?;
      let session = AppSession::new(profile).generate(clock);
      let Some(plan) = session.plan.clone() else {
        bail!("Plan generation produced nothing");
      };

      if no_save {
        return emit(&plan, json, |p| {
          let mut out = format!("{} ({} weeks)", p.id, p.weeks.len());
          for warning in &p.warnings {
            out.push_str(&format!("\n! {}", warning));
          }
          out
        });
      }

      let entry = new_entry(plan, session.profile.clone(), name.as_deref(), notes.as_deref(), clock);
      let entry = save_entry(&state.db, entry).await.context("Failed to save plan")?;
      let session = session.mark_saved(&entry.saved_id);
      let summary = SavedSummary::from(&entry);
      emit(&summary, json, |s| {
        let mut out = format!("Saved '{}' as {} ({} weeks)", s.name, s.saved_id, s.weeks);
        if let Some(plan) = &session.plan {
          for warning in &plan.warnings {
            out.push_str(&format!("\n! {}", warning));
          }
        }
        out
      })
    }

    PlanCommands::List => {
      let entries = list_entries(&state.db).await.context("Failed to list saved plans")?;
      let summaries: Vec<SavedSummary> = entries.iter().map(SavedSummary::from).collect();
      emit(&summaries, json, |list| {
        if list.is_empty() {
          return "No saved plans.".to_string();
        }
        list
          .iter()
          .map(|s| format!("{:<22} {:<40} {:>3} weeks  {}", s.saved_id, s.name, s.weeks, &s.created_at[..10]))
          .collect::<Vec<_>>()
          .join("\n")
      })
    }

    PlanCommands::Show { saved_id } => {
      let entry = load_saved(state, &saved_id).await?;
      emit(&entry, json, |e| {
        let mut lines = vec![format!("{} [{}]", e.name, e.saved_id)];
        if !e.notes.is_empty() {
          lines.push(e.notes.clone());
        }
        for warning in &e.plan.warnings {
          lines.push(format!("! {}", warning));
        }
        lines.push(String::new());
        for (i, week) in e.plan.weeks.iter().enumerate() {
          lines.push(format!("{:>3}  {}  {}", i, week.start_date, week.label));
        }
        if let Some(first) = e.plan.weeks.first() {
          lines.push(String::new());
          lines.push(quick_view(&first.plan));
        }
        lines.join("\n")
      })
    }

    PlanCommands::Week { saved_id, week } => {
      let entry = load_saved(state, &saved_id).await?;
      let checkins = checkins_for_plan(&state.db, &entry.plan.id)
        .await
        .context("Failed to load check-ins")?;
      let session = AppSession::default().open_saved(entry).select_week(week)?;
      let Some(view) = session.current_view(&checkins) else {
        bail!("Week {} not found in plan", week);
      };

      let value = match &view {
        WeekView::Adaptive(adaptive) => serde_json::to_value(adaptive.as_ref())?,
        WeekView::Stored(stored) => serde_json::to_value(stored)?,
      };
      emit(&value, json, |_| render_week(&view))
    }

    PlanCommands::Delete { saved_id } => {
      let removed = delete_entry(&state.db, &saved_id)
        .await
        .with_context(|| format!("Failed to delete saved plan '{}'", saved_id))?;

      // Check-ins belong to the plan, which another saved entry may still reference
      let still_used = list_entries(&state.db)
        .await?
        .iter()
        .any(|e| e.plan.id == removed.plan.id);
      let checkins_removed = if still_used {
        0
      } else {
        delete_for_plan(&state.db, &removed.plan.id).await?
      };

      let summary = SavedSummary::from(&removed);
      emit(&summary, json, |s| {
        format!("Deleted '{}' ({} check-ins removed)", s.name, checkins_removed)
      })
    }

    PlanCommands::DeleteAll { yes } => {
      if !yes {
        bail!("Refusing to delete every saved plan without --yes");
      }
      let count = delete_all(&state.db).await.context("Failed to delete saved plans")?;
      let checkins_removed = delete_orphaned(&state.db, &[])
        .await
        .context("Failed to delete check-ins")?;
      emit(
        &serde_json::json!({ "deleted": count, "checkinsRemoved": checkins_removed }),
        json,
        |_| format!("Deleted {} saved plan(s) ({} check-ins removed)", count, checkins_removed),
      )
    }

    PlanCommands::Export { saved_id, output } => {
      let entry = load_saved(state, &saved_id).await?;
      let payload = export_entry(&entry, clock);
      let text = serde_json::to_string_pretty(&payload).context("Failed to serialize export")?;
      match output {
        Some(path) => {
          fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
          if !json {
            println!("Exported '{}' to {}", entry.name, path.display());
          }
        }
        None => println!("{}", text),
      }
      Ok(())
    }

    PlanCommands::Import { file } => {
      let text = fs::read_to_string(&file).with_context(|| format!("Failed to read {}", file.display()))?;
      let entry = import_entry(&state.db, &text, clock)
        .await
        .with_context(|| format!("Failed to import {}", file.display()))?;
      let summary = SavedSummary::from(&entry);
      emit(&summary, json, |s| format!("Imported '{}' as {}", s.name, s.saved_id))
    }
  }
}

fn read_profile(path: &Path) -> Result<Profile> {
  let text = fs::read_to_string(path).with_context(|| format!("Failed to read profile {}", path.display()))?;
  let profile: Profile =
    serde_json::from_str(&text).with_context(|| format!("Failed to parse profile {}", path.display()))?;
  profile
    .validate()
    .map_err(|e| anyhow::anyhow!("Invalid profile: {}", e))?;
  Ok(profile)
}

/// Human rendering of one week view
pub fn render_week(view: &WeekView<'_>) -> String {
  let mut lines = Vec::new();

  match view {
    WeekView::Adaptive(week) => {
      lines.push(format!("{} (starts {})", week.label, week.start_date));
      lines.push(format!("{}: {}", week.narrative.title, week.narrative.explanation));
    }
    WeekView::Stored(week) => {
      lines.push(format!("{} (starts {})", week.label, week.start_date));
      lines.push("Showing the stored week; no adaptive view available.".to_string());
    }
  }

  let plan = view.week_plan();
  lines.push(String::new());
  lines.push(format!(
    "Intensity: {} | RIR main: {} | RIR accessory: {}",
    plan.dosage.intensity, plan.dosage.rir_main, plan.dosage.rir_acc
  ));
  lines.push(format!("Rest: {}", plan.dosage.rest));
  for note in &plan.dosage.notes {
    lines.push(format!("  * {}", note));
  }
  for warning in &plan.warnings {
    lines.push(format!("! {}", warning));
  }

  lines.push(String::new());
  lines.push(quick_view(plan));

  if let WeekView::Adaptive(week) = view {
    if let Some(gate) = &week.running_gate {
      let status = if gate.ready { "ready" } else { "not yet" };
      lines.push(format!("Return to running: {}", status));
      for reason in &gate.reasons {
        lines.push(format!("  - {}", reason));
      }
      for step in &gate.weekly_plan {
        lines.push(format!("  > {}", step));
      }
    }
  }

  lines.join("\n")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adaptive::view_week;
  use crate::planner::generate_plan;
  use crate::checkins::upsert_checkin;
  use crate::taxonomy::Severity;
  use crate::test_utils::{
    fixed_clock, mock_checkin, mock_postpartum_profile, seed_test_saved_plan, setup_test_db, teardown_test_db,
  };

  #[tokio::test]
  async fn test_delete_all_removes_checkins() {
    let pool = setup_test_db().await;
    let entry = seed_test_saved_plan(&pool, "saved_1").await;
    upsert_checkin(&pool, &mock_checkin(&entry.plan.id, 0, Severity::Mild)).await.unwrap();
    upsert_checkin(&pool, &mock_checkin(&entry.plan.id, 1, Severity::None)).await.unwrap();
    let state = AppState { db: pool };

    execute(PlanCommands::DeleteAll { yes: true }, &state, &fixed_clock(), true)
      .await
      .unwrap();

    assert!(list_entries(&state.db).await.unwrap().is_empty());
    assert!(checkins_for_plan(&state.db, &entry.plan.id).await.unwrap().is_empty());

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_delete_all_requires_confirmation() {
    let pool = setup_test_db().await;
    seed_test_saved_plan(&pool, "saved_1").await;
    let state = AppState { db: pool };

    assert!(execute(PlanCommands::DeleteAll { yes: false }, &state, &fixed_clock(), true).await.is_err());
    assert_eq!(list_entries(&state.db).await.unwrap().len(), 1);

    teardown_test_db(state.db).await;
  }

  #[test]
  fn test_render_adaptive_week_includes_narrative_and_sessions() {
    let profile = mock_postpartum_profile(14, 4);
    let plan = generate_plan(&profile, &fixed_clock());

    let view = view_week(&plan, 1, &[]).unwrap();
    let text = render_week(&view);

    assert!(text.starts_with("Week 2 · 15 weeks postpartum"));
    assert!(text.contains("Intensity:"));
    assert!(text.contains(&plan.weeks[1].plan.template));
  }

  #[test]
  fn test_read_profile_rejects_out_of_range_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.json");
    fs::write(&path, r#"{"schedule":{"daysPerWeek":9}}"#).unwrap();

    let err = read_profile(&path).unwrap_err();
    assert!(err.to_string().contains("daysPerWeek 9 out of range"));
  }

  #[test]
  fn test_read_profile_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.json");
    fs::write(&path, r#"{"stage":{"mode":"postpartum","weeksPostpartum":10}}"#).unwrap();

    let profile = read_profile(&path).unwrap();
    assert_eq!(profile.stage.weeks_postpartum, 10);
    assert_eq!(profile.schedule.days_per_week, 3);
  }
}
