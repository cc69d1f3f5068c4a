use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;

use super::{emit, load_saved};
use crate::clock::Clock;
use crate::db::AppState;
use crate::logs::{append_log, delete_log, logs_for_plan, new_log_id};
use crate::models::{LoggedBlock, LoggedSet, WorkoutLog};

#[derive(Subcommand, Debug)]
pub enum LogCommands {
  /// Log a completed session of a saved plan
  Add {
    saved_id: String,
    /// Zero-based week index
    #[arg(short, long)]
    week: usize,
    /// Session name, e.g. "Day 1"
    #[arg(short, long)]
    session: String,
    /// Defaults to today
    #[arg(short, long)]
    date: Option<NaiveDate>,
    /// One set as "Exercise:reps" or "Exercise:reps@weight"; repeat per set
    #[arg(long = "set", required = true)]
    sets: Vec<String>,
  },
  /// List workout logs of a saved plan
  List { saved_id: String },
  /// Delete one workout log
  Delete { log_id: String },
}

/// "Goblet Squat:10@12.5" -> ("Goblet Squat", 10 reps at 12.5)
pub fn parse_set(raw: &str) -> Result<(String, LoggedSet)> {
  let Some((exercise, rest)) = raw.rsplit_once(':') else {
    bail!("Set '{}' must look like Exercise:reps[@weight]", raw);
  };
  let exercise = exercise.trim();
  if exercise.is_empty() {
    bail!("Set '{}' has no exercise name", raw);
  }

  let (reps, weight) = match rest.split_once('@') {
    Some((reps, weight)) => {
      let weight: f64 = weight
        .trim()
        .parse()
        .with_context(|| format!("Invalid weight in set '{}'", raw))?;
      (reps, Some(weight))
    }
    None => (rest, None),
  };
  let reps: u32 = reps
    .trim()
    .parse()
    .with_context(|| format!("Invalid reps in set '{}'", raw))?;

  Ok((exercise.to_string(), LoggedSet { reps, weight }))
}

/// Consecutive sets of the same exercise form one block.
pub fn group_sets(sets: Vec<(String, LoggedSet)>) -> Vec<LoggedBlock> {
  let mut blocks: Vec<LoggedBlock> = Vec::new();
  for (exercise, set) in sets {
    match blocks.last_mut() {
      Some(block) if block.exercise == exercise => block.sets.push(set),
      _ => blocks.push(LoggedBlock {
        exercise,
        sets: vec![set],
        notes: String::new(),
      }),
    }
  }
  blocks
}

pub async fn execute(cmd: LogCommands, state: &AppState, clock: &dyn Clock, json: bool) -> Result<()> {
  match cmd {
    LogCommands::Add { saved_id, week, session, date, sets } => {
      let entry = load_saved(state, &saved_id).await?;
      let Some(plan_week) = entry.plan.weeks.get(week) else {
        bail!("Week {} not found in plan ({} weeks)", week, entry.plan.weeks.len());
      };

      let parsed = sets.iter().map(|s| parse_set(s)).collect::<Result<Vec<_>>>()?;
      let log = WorkoutLog {
        id: new_log_id(clock),
        date: date.unwrap_or_else(|| clock.today()),
        plan_id: entry.plan.id.clone(),
        week_label: plan_week.label.clone(),
        session_name: session,
        blocks: group_sets(parsed),
      };

      let log = append_log(&state.db, log).await.context("Failed to save workout log")?;
      emit(&log, json, |l| {
        format!("Logged {} ({} blocks, {} reps) as {}", l.session_name, l.blocks.len(), l.total_reps(), l.id)
      })
    }

    LogCommands::List { saved_id } => {
      let entry = load_saved(state, &saved_id).await?;
      let logs = logs_for_plan(&state.db, &entry.plan.id)
        .await
        .context("Failed to load workout logs")?;
      emit(&logs, json, |logs| {
        if logs.is_empty() {
          return "No workouts logged.".to_string();
        }
        let mut lines = Vec::new();
        for log in logs {
          lines.push(format!("{}  {}  {}  [{}]", log.date, log.week_label, log.session_name, log.id));
          for block in &log.blocks {
            let sets: Vec<String> = block
              .sets
              .iter()
              .map(|s| match s.weight {
                Some(w) => format!("{}@{}", s.reps, w),
                None => s.reps.to_string(),
              })
              .collect();
            lines.push(format!("    {}: {}", block.exercise, sets.join(", ")));
          }
        }
        lines.join("\n")
      })
    }

    LogCommands::Delete { log_id } => {
      let removed = delete_log(&state.db, &log_id).await.context("Failed to delete workout log")?;
      emit(&serde_json::json!({ "deleted": removed }), json, |_| {
        if removed {
          format!("Deleted {}", log_id)
        } else {
          format!("No workout log {}", log_id)
        }
      })
    }
  }
}
