use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::taxonomy::Severity;

/// ---------------------------------------------------------------------------
/// Profile
/// ---------------------------------------------------------------------------

/// Everything the user declared at intake.
///
/// Every sub-record carries `#[serde(default)]`, so a partial or older JSON
/// document resolves missing fields to the intake defaults below instead of
/// failing. Edits go through the `with_*` / `at_*` helpers, which return a new
/// value; week snapshots are plain clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
  pub clearance_acknowledged: bool,
  pub provider_restrictions: ProviderRestrictions,
  pub stage: Stage,
  pub schedule: Schedule,
  pub equipment: Equipment,
  pub training: Training,
  pub symptoms: BTreeMap<String, SymptomEntry>,
  pub diagnoses: BTreeSet<String>,
  pub hard_limits: HardLimits,
  pub goals: Vec<Goal>,
  pub difficulty: Difficulty,
  pub lifestyle: Lifestyle,
}

impl Default for Profile {
  fn default() -> Self {
    Self {
      clearance_acknowledged: false,
      provider_restrictions: ProviderRestrictions::default(),
      stage: Stage::default(),
      schedule: Schedule::default(),
      equipment: Equipment::default(),
      training: Training::default(),
      symptoms: BTreeMap::new(),
      diagnoses: BTreeSet::new(),
      hard_limits: HardLimits::default(),
      goals: vec![Goal::MaintainStrength, Goal::ReducePain],
      difficulty: Difficulty::Standard,
      lifestyle: Lifestyle::default(),
    }
  }
}

/// Only the first two goals are honoured.
pub const MAX_GOALS: usize = 2;

impl Profile {
  pub fn stage_key(&self) -> StageKey {
    self.stage.key()
  }

  pub fn has_diagnosis(&self, key: &str) -> bool {
    self.diagnoses.contains(key)
  }

  pub fn has_goal(&self, goal: Goal) -> bool {
    self.goals.iter().take(MAX_GOALS).any(|g| *g == goal)
  }

  /// Copy of this profile `weeks` further into pregnancy.
  pub fn at_pregnancy_week(&self, weeks_pregnant: u32) -> Self {
    let mut next = self.clone();
    next.stage.mode = StageMode::Pregnant;
    next.stage.weeks_pregnant = weeks_pregnant;
    next
  }

  /// Copy of this profile switched to postpartum at the given week.
  pub fn at_postpartum_week(&self, weeks_postpartum: u32) -> Self {
    let mut next = self.clone();
    next.stage.mode = StageMode::Postpartum;
    next.stage.weeks_postpartum = weeks_postpartum;
    next
  }

  /// Copy of this profile with one symptom (re)declared.
  pub fn with_symptom(&self, key: &str, severity: Severity) -> Self {
    let mut next = self.clone();
    next.symptoms.insert(
      key.to_string(),
      SymptomEntry {
        severity,
        worsens_with_exercise: Worsens::Unsure,
      },
    );
    next
  }

  pub fn with_diagnosis(&self, key: &str) -> Self {
    let mut next = self.clone();
    next.diagnoses.insert(key.to_string());
    next
  }

  /// Copy with goals truncated to two and schedule values pulled into range.
  pub fn normalized(&self) -> Self {
    let mut next = self.clone();
    next.goals.truncate(MAX_GOALS);
    next.schedule.days_per_week = next.schedule.days_per_week.min(6);
    next.stage.postpartum_plan_weeks = next.stage.postpartum_plan_weeks.min(MAX_PLAN_WEEKS);
    next
  }

  /// Reject values no intake form could have produced.
  pub fn validate(&self) -> Result<(), String> {
    self.validate_within(0)
  }

  /// Per-week snapshots advance the stage by up to `MAX_PLAN_WEEKS` past intake.
  pub fn validate_snapshot(&self) -> Result<(), String> {
    self.validate_within(MAX_PLAN_WEEKS)
  }

  fn validate_within(&self, extra_weeks: u32) -> Result<(), String> {
    let mut problems = Vec::new();
    if self.stage.weeks_pregnant > MAX_WEEKS_PREGNANT + extra_weeks {
      problems.push(format!("weeksPregnant {} out of range", self.stage.weeks_pregnant));
    }
    if self.stage.weeks_postpartum > MAX_WEEKS_POSTPARTUM + extra_weeks {
      problems.push(format!("weeksPostpartum {} out of range", self.stage.weeks_postpartum));
    }
    if self.schedule.days_per_week > 7 {
      problems.push(format!("daysPerWeek {} out of range", self.schedule.days_per_week));
    }
    if self.schedule.session_minutes > 240 {
      problems.push(format!("sessionMinutes {} out of range", self.schedule.session_minutes));
    }
    if self.hard_limits.pain_stop_at > 10 {
      problems.push(format!("painStopAt {} out of range", self.hard_limits.pain_stop_at));
    }
    if self.lifestyle.sleep_hours > 24 {
      problems.push(format!("sleepHours {} out of range", self.lifestyle.sleep_hours));
    }

    if problems.is_empty() {
      Ok(())
    } else {
      Err(problems.join(", "))
    }
  }
}

/// ---------------------------------------------------------------------------
/// Stage
/// ---------------------------------------------------------------------------

pub const MAX_PLAN_WEEKS: u32 = 104;
const MAX_WEEKS_PREGNANT: u32 = 45;
const MAX_WEEKS_POSTPARTUM: u32 = 520;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageMode {
  Preconception,
  #[default]
  Pregnant,
  Postpartum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
  #[default]
  Vaginal,
  CSection,
  Assisted,
  Vbac,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stage {
  pub mode: StageMode,
  pub weeks_pregnant: u32,
  pub due_date: Option<NaiveDate>,
  pub weeks_postpartum: u32,
  pub delivery_type: DeliveryType,
  pub breastfeeding: bool,
  /// Postpartum horizon: appended after a dated pregnancy, or the plan
  /// length in postpartum mode.
  pub postpartum_plan_weeks: u32,
}

impl Default for Stage {
  fn default() -> Self {
    Self {
      mode: StageMode::Pregnant,
      weeks_pregnant: 20,
      due_date: None,
      weeks_postpartum: 0,
      delivery_type: DeliveryType::Vaginal,
      breastfeeding: false,
      postpartum_plan_weeks: 0,
    }
  }
}

/// Discrete programming bucket derived from stage mode and week count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKey {
  #[serde(rename = "preconception")]
  Preconception,
  #[serde(rename = "t1")]
  T1,
  #[serde(rename = "t2")]
  T2,
  #[serde(rename = "t3")]
  T3,
  #[serde(rename = "pp0_6")]
  Pp0To6,
  #[serde(rename = "pp6_16")]
  Pp6To16,
  #[serde(rename = "pp4_12m")]
  Pp4To12m,
  #[serde(rename = "pp12m_plus")]
  Pp12mPlus,
}

impl StageKey {
  pub fn as_str(&self) -> &'static str {
    match self {
      StageKey::Preconception => "preconception",
      StageKey::T1 => "t1",
      StageKey::T2 => "t2",
      StageKey::T3 => "t3",
      StageKey::Pp0To6 => "pp0_6",
      StageKey::Pp6To16 => "pp6_16",
      StageKey::Pp4To12m => "pp4_12m",
      StageKey::Pp12mPlus => "pp12m_plus",
    }
  }

  pub fn is_postpartum(&self) -> bool {
    matches!(
      self,
      StageKey::Pp0To6 | StageKey::Pp6To16 | StageKey::Pp4To12m | StageKey::Pp12mPlus
    )
  }
}

impl std::fmt::Display for StageKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl Stage {
  pub fn key(&self) -> StageKey {
    match self.mode {
      StageMode::Preconception => StageKey::Preconception,
      StageMode::Pregnant => match self.weeks_pregnant {
        0..=13 => StageKey::T1,
        14..=27 => StageKey::T2,
        _ => StageKey::T3,
      },
      StageMode::Postpartum => match self.weeks_postpartum {
        0..=5 => StageKey::Pp0To6,
        6..=15 => StageKey::Pp6To16,
        16..=51 => StageKey::Pp4To12m,
        _ => StageKey::Pp12mPlus,
      },
    }
  }
}

/// ---------------------------------------------------------------------------
/// Schedule, equipment, background
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramStyle {
  #[default]
  FullBody,
  UpperLower,
  AbSplit,
  AbcRotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoachingTone {
  #[default]
  Direct,
  Supportive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Schedule {
  /// 0 means "use the template's default day count"
  pub days_per_week: u8,
  pub session_minutes: u32,
  pub style: ProgramStyle,
  pub tone: CoachingTone,
  pub preferred_days: Vec<String>,
}

impl Default for Schedule {
  fn default() -> Self {
    Self {
      days_per_week: 3,
      session_minutes: 30,
      style: ProgramStyle::FullBody,
      tone: CoachingTone::Direct,
      preferred_days: Vec::new(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSet {
  #[default]
  GymFull,
  Barbell,
  HomeDb,
  BandsOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardioOption {
  #[default]
  Walking,
  Bike,
  Rower,
  Treadmill,
  None,
}

impl CardioOption {
  pub fn as_str(&self) -> &'static str {
    match self {
      CardioOption::Walking => "brisk walking",
      CardioOption::Bike => "stationary bike",
      CardioOption::Rower => "rower",
      CardioOption::Treadmill => "incline treadmill walking",
      CardioOption::None => "brisk walking",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Equipment {
  pub set: EquipmentSet,
  pub cardio: CardioOption,
  pub balance_limit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Experience {
  Beginner,
  #[default]
  Intermediate,
  Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
  #[default]
  Confident,
  Unsure,
  Avoid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Training {
  pub experience: Experience,
  /// Keyed by squat / hinge / push / pull / carry
  pub confidence: BTreeMap<String, Confidence>,
  pub injuries: Vec<String>,
}

impl Default for Training {
  fn default() -> Self {
    let confidence = ["squat", "hinge", "push", "pull", "carry"]
      .iter()
      .map(|k| (k.to_string(), Confidence::Confident))
      .collect();
    Self {
      experience: Experience::Intermediate,
      confidence,
      injuries: Vec::new(),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Symptoms, limits, restrictions
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Worsens {
  Yes,
  No,
  #[default]
  Unsure,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SymptomEntry {
  pub severity: Severity,
  pub worsens_with_exercise: Worsens,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HardLimits {
  pub avoid_supine: bool,
  pub avoid_heavy: bool,
  pub avoid_impact: bool,
  pub avoid_barbell: bool,
  pub avoid_running: bool,
  /// Stop a set when pain reaches this score out of 10
  pub pain_stop_at: u8,
  pub stop_on_leakage: bool,
  pub stop_on_heaviness: bool,
  pub stop_on_doming: bool,
}

impl Default for HardLimits {
  fn default() -> Self {
    Self {
      avoid_supine: false,
      avoid_heavy: false,
      avoid_impact: true,
      avoid_barbell: false,
      avoid_running: false,
      pain_stop_at: 4,
      stop_on_leakage: true,
      stop_on_heaviness: true,
      stop_on_doming: true,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderRestrictions {
  pub has: bool,
  pub tags: BTreeSet<String>,
  pub notes: String,
}

impl ProviderRestrictions {
  /// Tags only count when the user said restrictions apply.
  pub fn is_active(&self, tag: &str) -> bool {
    self.has && self.tags.contains(tag)
  }

  pub fn active_tags(&self) -> impl Iterator<Item = &str> {
    self
      .tags
      .iter()
      .filter(move |_| self.has)
      .map(String::as_str)
  }
}

/// ---------------------------------------------------------------------------
/// Goals, preference, lifestyle
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
  MaintainStrength,
  BuildMuscle,
  ReducePain,
  PrepareDelivery,
  ReturnHeavy,
  ReturnRun,
  GlucoseControl,
  PostureEndurance,
  #[serde(other)]
  Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  #[default]
  Standard,
  SlightlyHarder,
  MuchHarder,
}

impl Difficulty {
  /// Intensity steps / RIR reduction asked for
  pub fn steps(&self) -> u8 {
    match self {
      Difficulty::Standard => 0,
      Difficulty::SlightlyHarder => 1,
      Difficulty::MuchHarder => 2,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
  Low,
  #[default]
  Moderate,
  High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkDemands {
  Sedentary,
  #[default]
  Mixed,
  OnFeet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Lifestyle {
  pub sleep_hours: u8,
  pub work_demands: WorkDemands,
  pub activity: Level,
  pub stress: Level,
  pub support: Level,
}

impl Default for Lifestyle {
  fn default() -> Self {
    Self {
      sleep_hours: 7,
      work_demands: WorkDemands::Mixed,
      activity: Level::Moderate,
      stress: Level::Moderate,
      support: Level::Moderate,
    }
  }
}

impl Lifestyle {
  /// Sleep hours, treating an unanswered 0 as the 7 hour default
  pub fn effective_sleep_hours(&self) -> u8 {
    if self.sleep_hours == 0 {
      7
    } else {
      self.sleep_hours
    }
  }
}
