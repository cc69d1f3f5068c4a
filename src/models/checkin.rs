use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::taxonomy::Severity;

/// Weekly subjective feedback, unique per (plan_id, week_index)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
  pub plan_id: String,
  pub week_index: usize,
  #[serde(rename = "pelvic_pressure", default)]
  pub pelvic_pressure: Severity,
  #[serde(default)]
  pub leakage: Severity,
  #[serde(default)]
  pub doming: Severity,
  #[serde(default)]
  pub pgp: Severity,
  #[serde(rename = "low_back", default)]
  pub low_back: Severity,
  #[serde(default)]
  pub fatigue: Severity,
  /// Symptoms that showed up hours after training rather than during it
  #[serde(default)]
  pub delayed_symptoms: bool,
  #[serde(default)]
  pub adherence_pct: Option<u8>,
  pub created_at: DateTime<Utc>,
}

impl CheckIn {
  /// A blank check-in (everything `none`) for the given plan week
  pub fn new(plan_id: &str, week_index: usize, created_at: DateTime<Utc>) -> Self {
    Self {
      plan_id: plan_id.to_string(),
      week_index,
      pelvic_pressure: Severity::None,
      leakage: Severity::None,
      doming: Severity::None,
      pgp: Severity::None,
      low_back: Severity::None,
      fatigue: Severity::None,
      delayed_symptoms: false,
      adherence_pct: None,
      created_at,
    }
  }

  /// Reported severities keyed by their symptom taxonomy key
  pub fn reported_symptoms(&self) -> [(&'static str, Severity); 6] {
    [
      ("pelvic_pressure", self.pelvic_pressure),
      ("leakage", self.leakage),
      ("doming", self.doming),
      ("pgp", self.pgp),
      ("low_back", self.low_back),
      ("fatigue", self.fatigue),
    ]
  }

  /// Worst of the pelvic floor / core signals
  pub fn pelvic_core_peak(&self) -> Severity {
    self.pelvic_pressure.max(self.leakage).max(self.doming)
  }

  /// Worst of the pain signals
  pub fn pain_peak(&self) -> Severity {
    self.pgp.max(self.low_back)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_checkin_json_field_names() {
    let created_at = DateTime::parse_from_rfc3339("2026-03-01T08:00:00Z")
      .unwrap()
      .with_timezone(&Utc);
    let mut checkin = CheckIn::new("plan_1", 2, created_at);
    checkin.pelvic_pressure = Severity::Mild;
    checkin.low_back = Severity::Moderate;
    checkin.adherence_pct = Some(80);

    let value = serde_json::to_value(&checkin).unwrap();
    assert_eq!(value["planId"], "plan_1");
    assert_eq!(value["weekIndex"], 2);
    assert_eq!(value["pelvic_pressure"], "mild");
    assert_eq!(value["low_back"], "moderate");
    assert_eq!(value["delayedSymptoms"], false);
    assert_eq!(value["adherencePct"], 80);
  }

  #[test]
  fn test_missing_severities_default_to_none() {
    let checkin: CheckIn = serde_json::from_str(
      r#"{"planId":"p","weekIndex":0,"leakage":"severe","createdAt":"2026-03-01T08:00:00Z"}"#,
    )
    .unwrap();

    assert_eq!(checkin.leakage, Severity::Severe);
    assert_eq!(checkin.doming, Severity::None);
    assert_eq!(checkin.adherence_pct, None);
    assert_eq!(checkin.pelvic_core_peak(), Severity::Severe);
    assert_eq!(checkin.pain_peak(), Severity::None);
  }
}
