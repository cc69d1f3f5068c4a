use chrono::NaiveDate;
use std::path::PathBuf;

use crate::clock::{Clock, FixedClock, SystemClock};

pub const DB_PATH_VAR: &str = "NURTURE_DB_PATH";
pub const LOG_VAR: &str = "NURTURE_LOG";
pub const TODAY_VAR: &str = "NURTURE_TODAY";

const DEFAULT_DB_PATH: &str = "nurture_strength.db";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid configuration: {0}")]
  Invalid(String),
}

/// Runtime settings, read from the environment (after `.env` is loaded)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
  pub db_path: PathBuf,
  pub log_filter: String,
  /// Pins "today" for reproducible plans
  pub today: Option<NaiveDate>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      db_path: PathBuf::from(DEFAULT_DB_PATH),
      log_filter: DEFAULT_LOG_FILTER.to_string(),
      today: None,
    }
  }
}

impl Config {
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_env_with(|key| std::env::var(key).ok())
  }

  pub fn from_env_with<F>(get: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let non_empty = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let db_path = non_empty(DB_PATH_VAR)
      .map(PathBuf::from)
      .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
    let log_filter = non_empty(LOG_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    let today = non_empty(TODAY_VAR)
      .map(|raw| {
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
          .map_err(|e| ConfigError::Invalid(format!("{} '{}': {}", TODAY_VAR, raw, e)))
      })
      .transpose()?;

    Ok(Self {
      db_path,
      log_filter,
      today,
    })
  }

  pub fn clock(&self) -> Box<dyn Clock> {
    match self.today {
      Some(date) => Box::new(FixedClock::on(date)),
      None => Box::new(SystemClock),
    }
  }
}
