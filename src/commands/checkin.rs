use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;

use super::{emit, load_saved};
use crate::adaptive::{classify, WeekTrend};
use crate::checkins::{checkins_for_plan, delete_checkin, upsert_checkin};
use crate::clock::Clock;
use crate::db::AppState;
use crate::models::CheckIn;
use crate::taxonomy::Severity;

#[derive(Subcommand, Debug)]
pub enum CheckinCommands {
  /// Record (or replace) the check-in for one week of a saved plan
  Record {
    saved_id: String,
    /// Zero-based week index the check-in describes
    #[arg(short, long)]
    week: usize,
    #[arg(long, value_parser = parse_severity, default_value = "none")]
    pelvic_pressure: Severity,
    #[arg(long, value_parser = parse_severity, default_value = "none")]
    leakage: Severity,
    #[arg(long, value_parser = parse_severity, default_value = "none")]
    doming: Severity,
    #[arg(long, value_parser = parse_severity, default_value = "none")]
    pgp: Severity,
    #[arg(long, value_parser = parse_severity, default_value = "none")]
    low_back: Severity,
    #[arg(long, value_parser = parse_severity, default_value = "none")]
    fatigue: Severity,
    /// Symptoms showed up hours after training
    #[arg(long)]
    delayed: bool,
    /// Share of planned sessions completed
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    adherence: Option<u8>,
  },
  /// List the check-ins of a saved plan
  List { saved_id: String },
  /// Delete the check-in of one week
  Delete {
    saved_id: String,
    #[arg(short, long)]
    week: usize,
  },
}

/// none | mild | moderate | severe
pub fn parse_severity(raw: &str) -> Result<Severity, String> {
  serde_json::from_value(serde_json::Value::String(raw.trim().to_lowercase()))
    .map_err(|_| format!("'{}' is not one of none, mild, moderate, severe", raw))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckInRow {
  #[serde(flatten)]
  checkin: CheckIn,
  trend: WeekTrend,
}

pub async fn execute(cmd: CheckinCommands, state: &AppState, clock: &dyn Clock, json: bool) -> Result<()> {
  match cmd {
    CheckinCommands::Record {
      saved_id,
      week,
      pelvic_pressure,
      leakage,
      doming,
      pgp,
      low_back,
      fatigue,
      delayed,
      adherence,
    } => {
      let entry = load_saved(state, &saved_id).await?;
      if week >= entry.plan.weeks.len() {
        anyhow::bail!("Week {} not found in plan ({} weeks)", week, entry.plan.weeks.len());
      }

      let mut checkin = CheckIn::new(&entry.plan.id, week, clock.now());
      checkin.pelvic_pressure = pelvic_pressure;
      checkin.leakage = leakage;
      checkin.doming = doming;
      checkin.pgp = pgp;
      checkin.low_back = low_back;
      checkin.fatigue = fatigue;
      checkin.delayed_symptoms = delayed;
      checkin.adherence_pct = adherence;

      upsert_checkin(&state.db, &checkin).await.context("Failed to record check-in")?;
      let row = CheckInRow {
        trend: classify(&checkin),
        checkin,
      };
      emit(&row, json, |r| {
        format!("Recorded week {} check-in: {:?}", r.checkin.week_index, r.trend)
      })
    }

    CheckinCommands::List { saved_id } => {
      let entry = load_saved(state, &saved_id).await?;
      let rows: Vec<CheckInRow> = checkins_for_plan(&state.db, &entry.plan.id)
        .await
        .context("Failed to load check-ins")?
        .into_iter()
        .map(|checkin| CheckInRow {
          trend: classify(&checkin),
          checkin,
        })
        .collect();

      emit(&rows, json, |rows| {
        if rows.is_empty() {
          return "No check-ins recorded.".to_string();
        }
        rows
          .iter()
          .map(|r| {
            let symptoms: Vec<String> = r
              .checkin
              .reported_symptoms()
              .iter()
              .filter(|(_, s)| *s != Severity::None)
              .map(|(k, s)| format!("{}={:?}", k, s).to_lowercase())
              .collect();
            format!(
              "week {:>2}  {:<6} {}",
              r.checkin.week_index,
              format!("{:?}", r.trend).to_lowercase(),
              if symptoms.is_empty() { "-".to_string() } else { symptoms.join(" ") }
            )
          })
          .collect::<Vec<_>>()
          .join("\n")
      })
    }

    CheckinCommands::Delete { saved_id, week } => {
      let entry = load_saved(state, &saved_id).await?;
      let removed = delete_checkin(&state.db, &entry.plan.id, week)
        .await
        .context("Failed to delete check-in")?;
      emit(&serde_json::json!({ "deleted": removed }), json, |_| {
        if removed {
          format!("Deleted week {} check-in", week)
        } else {
          format!("No check-in recorded for week {}", week)
        }
      })
    }
  }
}
