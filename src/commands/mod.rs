pub mod checkin;
pub mod log;
pub mod plan;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::clock::Clock;
use crate::db::AppState;
use crate::models::SavedEntry;
use crate::saved::get_entry;

#[derive(Parser, Debug)]
#[command(name = "nurture-strength")]
#[command(about = "Adaptive strength plans for preconception, pregnancy and postpartum", long_about = None)]
#[command(version)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Output in JSON format
  #[arg(long, global = true)]
  pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Generate, inspect, export and import saved plans
  #[command(subcommand)]
  Plan(plan::PlanCommands),

  /// Record and review weekly check-ins
  #[command(subcommand)]
  Checkin(checkin::CheckinCommands),

  /// Record and review workout logs
  #[command(subcommand)]
  Log(log::LogCommands),
}

pub async fn dispatch(cli: Cli, state: &AppState, clock: &dyn Clock) -> Result<()> {
  match cli.command {
    Commands::Plan(cmd) => plan::execute(cmd, state, clock, cli.json).await,
    Commands::Checkin(cmd) => checkin::execute(cmd, state, clock, cli.json).await,
    Commands::Log(cmd) => log::execute(cmd, state, clock, cli.json).await,
  }
}

/// Print `value` as pretty JSON, or the human rendering of it.
pub(crate) fn emit<T, F>(value: &T, json: bool, human: F) -> Result<()>
where
  T: Serialize + ?Sized,
  F: FnOnce(&T) -> String,
{
  if json {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
  } else {
    println!("{}", human(value));
  }
  Ok(())
}

pub(crate) async fn load_saved(state: &AppState, saved_id: &str) -> Result<SavedEntry> {
  get_entry(&state.db, saved_id)
    .await
    .with_context(|| format!("Could not load saved plan '{}'", saved_id))
}
