//! Check-in driven adaptive regenerator
//!
//! A week's live view is always recomputed from its stored snapshot plus the
//! check-ins of the weeks before it. Nothing here is cached.
//!
//! Key principles:
//! - Feedback re-enters through the symptom map, so the dial engine sees it
//! - Red weeks reset the green streak; the week right after a red one regresses
//! - Every two green weeks earn one progression step, up to three
//! - Yellow weeks and weeks without a check-in hold the streak

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::dosage::AdaptiveSignal;
use crate::gate::{build_running_impact_gate, RunningGate};
use crate::models::{CheckIn, Profile};
use crate::narrative::{week_narrative, Narrative};
use crate::planner::{generate_week_plan, Plan, Week, WeekPlan};
use crate::taxonomy::Severity;

pub const MAX_PROGRESSION_STEP: u32 = 3;
pub const MIN_GREEN_ADHERENCE_PCT: u8 = 70;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdaptiveError {
    #[error("Week {0} not found in plan")]
    WeekNotFound(usize),
    #[error("Invalid week snapshot: {0}")]
    InvalidSnapshot(String),
}

// ---------------------------------------------------------------------------
/// Week trend: classification of one check-in
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekTrend {
    /// Pelvic floor / core symptoms reached moderate or worse
    Red,
    /// Neither red nor green
    Yellow,
    /// Everything quiet, no delayed onset, adherence on track
    Green,
}

pub fn classify(checkin: &CheckIn) -> WeekTrend {
    if checkin.pelvic_core_peak() >= Severity::Moderate {
        return WeekTrend::Red;
    }
    let adherence_ok = checkin
        .adherence_pct
        .map_or(true, |pct| pct >= MIN_GREEN_ADHERENCE_PCT);
    if checkin.pelvic_core_peak().is_minor()
        && checkin.pain_peak().is_minor()
        && !checkin.delayed_symptoms
        && adherence_ok
    {
        WeekTrend::Green
    } else {
        WeekTrend::Yellow
    }
}

// ---------------------------------------------------------------------------
/// Check-in history for one plan, restricted to weeks before a given week
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct CheckInHistory<'a> {
    by_week: BTreeMap<usize, &'a CheckIn>,
}

impl<'a> CheckInHistory<'a> {
    /// Keeps check-ins of `plan_id` for weeks `0..before_week`. If a week has
    /// more than one, the most recently created wins.
    pub fn new(plan_id: &str, checkins: &'a [CheckIn], before_week: usize) -> Self {
        let mut by_week: BTreeMap<usize, &'a CheckIn> = BTreeMap::new();
        for c in checkins
            .iter()
            .filter(|c| c.plan_id == plan_id && c.week_index < before_week)
        {
            match by_week.get(&c.week_index) {
                Some(existing) if existing.created_at >= c.created_at => {}
                _ => {
                    by_week.insert(c.week_index, c);
                }
            }
        }
        Self { by_week }
    }

    pub fn get(&self, week_index: usize) -> Option<&'a CheckIn> {
        self.by_week.get(&week_index).copied()
    }

    /// Check-ins from the `window` weeks before `week_index`, newest first
    pub fn recent(&self, week_index: usize, window: usize) -> Vec<&'a CheckIn> {
        let from = week_index.saturating_sub(window);
        self.by_week
            .range(from..week_index)
            .rev()
            .map(|(_, c)| *c)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_week.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_week.is_empty()
    }
}

// ---------------------------------------------------------------------------
/// Trend state: result of replaying the history
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendState {
    pub green_streak: u32,
    pub regress: bool,
    /// Trend of the week directly before the one being viewed
    pub previous: Option<WeekTrend>,
}

impl TrendState {
    pub fn signal(&self) -> AdaptiveSignal {
        let progression_step = if self.regress {
            0
        } else {
            (self.green_streak / 2).min(MAX_PROGRESSION_STEP) as u8
        };
        AdaptiveSignal {
            regress: self.regress,
            progression_step,
        }
    }
}

pub fn scan_history(history: &CheckInHistory<'_>, week_index: usize) -> TrendState {
    let mut state = TrendState::default();
    for week in 0..week_index {
        let trend = history.get(week).map(classify);
        let is_previous = week + 1 == week_index;
        match trend {
            Some(WeekTrend::Red) => {
                state.green_streak = 0;
                if is_previous {
                    state.regress = true;
                }
            }
            Some(WeekTrend::Green) => state.green_streak += 1,
            Some(WeekTrend::Yellow) | None => {}
        }
        if is_previous {
            state.previous = trend;
        }
    }
    state
}

/// Copy of `profile` with the check-in's reported severities declared as symptoms.
pub fn project_checkin(profile: &Profile, checkin: &CheckIn) -> Profile {
    let mut next = profile.clone();
    for (key, severity) in checkin.reported_symptoms() {
        if severity == Severity::None {
            continue;
        }
        next.symptoms.entry(key.to_string()).or_default().severity = severity;
    }
    next
}

// ---------------------------------------------------------------------------
/// Adaptive week view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveWeek {
    pub week_index: usize,
    pub label: String,
    pub start_date: NaiveDate,
    pub week_seed: i64,
    /// Working profile after check-in projection
    pub profile: Profile,
    pub trend: TrendState,
    pub signal: AdaptiveSignal,
    #[serde(flatten)]
    pub plan: WeekPlan,
    pub narrative: Narrative,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_gate: Option<RunningGate>,
}

pub fn get_adaptive_week(
    plan: &Plan,
    week_index: usize,
    checkins: &[CheckIn],
) -> Result<AdaptiveWeek, AdaptiveError> {
    let week = plan
        .weeks
        .get(week_index)
        .ok_or(AdaptiveError::WeekNotFound(week_index))?;
    week.profile_snapshot
        .validate_snapshot()
        .map_err(AdaptiveError::InvalidSnapshot)?;

    let history = CheckInHistory::new(&plan.id, checkins, week_index);

    let profile = match week_index.checked_sub(1).and_then(|prev| history.get(prev)) {
        Some(previous) => project_checkin(&week.profile_snapshot, previous),
        None => week.profile_snapshot.clone(),
    };

    let trend = scan_history(&history, week_index);
    let signal = trend.signal();
    debug!(
        plan_id = %plan.id,
        week_index,
        green_streak = trend.green_streak,
        regress = signal.regress,
        progression_step = signal.progression_step,
        "Adaptive signal computed"
    );

    let week_plan = generate_week_plan(&profile, week.week_seed, &signal);
    let narrative = week_narrative(&profile, week.start_date, trend.previous, &signal);
    let running_gate = build_running_impact_gate(&profile, week_index, &history);

    Ok(AdaptiveWeek {
        week_index,
        label: week.label.clone(),
        start_date: week.start_date,
        week_seed: week.week_seed,
        profile,
        trend,
        signal,
        plan: week_plan,
        narrative,
        running_gate,
    })
}

/// What the caller shows for a week: the live view, or the stored week when
/// the live view cannot be built.
#[derive(Debug, Clone, PartialEq)]
pub enum WeekView<'a> {
    Adaptive(Box<AdaptiveWeek>),
    Stored(&'a Week),
}

impl WeekView<'_> {
    pub fn week_plan(&self) -> &WeekPlan {
        match self {
            WeekView::Adaptive(week) => &week.plan,
            WeekView::Stored(week) => &week.plan,
        }
    }

    pub fn is_adaptive(&self) -> bool {
        matches!(self, WeekView::Adaptive(_))
    }
}

/// Adaptive view with fallback. `None` only when the plan has no such week.
pub fn view_week<'a>(plan: &'a Plan, week_index: usize, checkins: &[CheckIn]) -> Option<WeekView<'a>> {
    match get_adaptive_week(plan, week_index, checkins) {
        Ok(week) => Some(WeekView::Adaptive(Box::new(week))),
        Err(e) => {
            warn!(plan_id = %plan.id, week_index, error = %e, "No adaptive view available; showing stored week");
            plan.weeks.get(week_index).map(WeekView::Stored)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::profile::MAX_PLAN_WEEKS;
    use crate::planner::generate_plan;
    use crate::templates::RirRange;
    use chrono::{Duration, Utc};

    fn plan() -> Plan {
        let mut p = Profile::default().at_postpartum_week(20);
        p.stage.postpartum_plan_weeks = 8;
        p.hard_limits.avoid_impact = false;
        generate_plan(&p, &FixedClock::on(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()))
    }

    fn green(plan: &Plan, week: usize) -> CheckIn {
        let mut c = CheckIn::new(&plan.id, week, Utc::now());
        c.adherence_pct = Some(90);
        c
    }

    fn red(plan: &Plan, week: usize) -> CheckIn {
        let mut c = green(plan, week);
        c.leakage = Severity::Moderate;
        c
    }

    fn yellow(plan: &Plan, week: usize) -> CheckIn {
        let mut c = green(plan, week);
        c.adherence_pct = Some(50);
        c
    }

    #[test]
    fn test_classify() {
        let p = plan();
        assert_eq!(classify(&green(&p, 0)), WeekTrend::Green);
        assert_eq!(classify(&red(&p, 0)), WeekTrend::Red);
        assert_eq!(classify(&yellow(&p, 0)), WeekTrend::Yellow);

        let mut pain = green(&p, 0);
        pain.low_back = Severity::Moderate;
        assert_eq!(classify(&pain), WeekTrend::Yellow);

        let mut no_adherence = green(&p, 0);
        no_adherence.adherence_pct = None;
        assert_eq!(classify(&no_adherence), WeekTrend::Green);
    }

    #[test]
    fn test_four_green_weeks_earn_step_two() {
        let p = plan();
        let checkins: Vec<CheckIn> = (0..4).map(|w| green(&p, w)).collect();

        let week = get_adaptive_week(&p, 4, &checkins).unwrap();
        assert_eq!(week.trend.green_streak, 4);
        assert_eq!(week.signal.progression_step, 2);
        assert!(!week.signal.regress);
        assert_eq!(week.trend.previous, Some(WeekTrend::Green));
    }

    #[test]
    fn test_two_green_weeks_earn_step_one() {
        let p = plan();
        let checkins = vec![green(&p, 0), green(&p, 1)];
        let week = get_adaptive_week(&p, 2, &checkins).unwrap();
        assert_eq!(week.signal.progression_step, 1);
    }

    #[test]
    fn test_step_is_capped() {
        let p = plan();
        let checkins: Vec<CheckIn> = (0..8).map(|w| green(&p, w)).collect();
        let history = CheckInHistory::new(&p.id, &checkins, 8);
        assert_eq!(scan_history(&history, 8).signal().progression_step, 3);
    }

    #[test]
    fn test_red_previous_week_forces_regression() {
        let p = plan();
        let mut checkins: Vec<CheckIn> = (0..4).map(|w| green(&p, w)).collect();
        checkins.push(red(&p, 4));

        let week = get_adaptive_week(&p, 5, &checkins).unwrap();
        assert!(week.signal.regress);
        assert_eq!(week.signal.progression_step, 0);
        assert_eq!(week.trend.green_streak, 0);

        let stored = &p.weeks[5].plan.dosage;
        assert_eq!(week.plan.dosage.rir_acc, stored.rir_acc.shifted(1));
        assert!(week.narrative.explanation.contains("steps back"));
    }

    #[test]
    fn test_red_earlier_only_resets_streak() {
        let p = plan();
        let checkins = vec![red(&p, 0), green(&p, 1), green(&p, 2)];
        let week = get_adaptive_week(&p, 3, &checkins).unwrap();
        assert!(!week.signal.regress);
        assert_eq!(week.trend.green_streak, 2);
        assert_eq!(week.signal.progression_step, 1);
    }

    #[test]
    fn test_yellow_and_missing_weeks_hold_streak() {
        let p = plan();
        let checkins = vec![green(&p, 0), yellow(&p, 1), green(&p, 3)];
        let week = get_adaptive_week(&p, 4, &checkins).unwrap();
        assert_eq!(week.trend.green_streak, 2);
        assert_eq!(week.signal.progression_step, 1);
    }

    #[test]
    fn test_previous_checkin_projects_onto_symptoms() {
        let p = plan();
        let mut c = green(&p, 2);
        c.doming = Severity::Mild;
        c.fatigue = Severity::Severe;
        let checkins = vec![c];

        let week = get_adaptive_week(&p, 3, &checkins).unwrap();
        assert_eq!(week.profile.symptoms["doming"].severity, Severity::Mild);
        assert_eq!(week.profile.symptoms["fatigue"].severity, Severity::Severe);
        assert!(!week.profile.symptoms.contains_key("leakage"));
        assert!(week.plan.dials.fatigue > p.weeks[3].plan.dials.fatigue);

        // stored snapshot untouched
        assert!(p.weeks[3].profile_snapshot.symptoms.is_empty());
    }

    #[test]
    fn test_regeneration_is_deterministic_and_replays_edits() {
        let p = plan();
        let mut checkins = vec![green(&p, 0), red(&p, 1)];
        let a = get_adaptive_week(&p, 2, &checkins).unwrap();
        let b = get_adaptive_week(&p, 2, &checkins).unwrap();
        assert_eq!(a, b);

        checkins.pop();
        let after_delete = get_adaptive_week(&p, 2, &checkins).unwrap();
        assert!(!after_delete.signal.regress);
    }

    #[test]
    fn test_without_history_matches_stored_week() {
        let p = plan();
        let week = get_adaptive_week(&p, 2, &[]).unwrap();
        assert_eq!(week.plan, p.weeks[2].plan);
        assert_eq!(week.trend, TrendState::default());
    }

    #[test]
    fn test_other_plans_and_later_weeks_are_ignored() {
        let p = plan();
        let mut foreign = red(&p, 1);
        foreign.plan_id = "plan_other".to_string();
        let later = red(&p, 3);
        let checkins = vec![foreign, later];

        let week = get_adaptive_week(&p, 2, &checkins).unwrap();
        assert!(!week.signal.regress);
        assert_eq!(week.plan, p.weeks[2].plan);
    }

    #[test]
    fn test_latest_duplicate_checkin_wins() {
        let p = plan();
        let mut older = red(&p, 1);
        older.created_at = Utc::now() - Duration::days(2);
        let newer = green(&p, 1);
        let checkins = vec![newer, older];

        let history = CheckInHistory::new(&p.id, &checkins, 2);
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(1).map(classify), Some(WeekTrend::Green));
    }

    #[test]
    fn test_missing_week_is_an_error() {
        let p = plan();
        assert_eq!(
            get_adaptive_week(&p, 99, &[]).unwrap_err(),
            AdaptiveError::WeekNotFound(99)
        );
        assert!(view_week(&p, 99, &[]).is_none());
    }

    #[test]
    fn test_malformed_snapshot_falls_back_to_stored_week() {
        let mut p = plan();
        p.weeks[1].profile_snapshot.stage.weeks_postpartum = 9999;

        let err = get_adaptive_week(&p, 1, &[]).unwrap_err();
        assert!(matches!(err, AdaptiveError::InvalidSnapshot(_)));

        let view = view_week(&p, 1, &[]).unwrap();
        assert!(!view.is_adaptive());
        assert_eq!(view.week_plan(), &p.weeks[1].plan);
    }

    #[test]
    fn test_every_week_near_intake_limits_is_adaptive() {
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());

        let late = generate_plan(&Profile::default().at_pregnancy_week(44), &clock);
        assert!(late.weeks.len() > 1);
        for week in 0..late.weeks.len() {
            assert!(get_adaptive_week(&late, week, &[]).is_ok(), "pregnancy week {}", week);
        }

        let mut long_pp = Profile::default().at_postpartum_week(500);
        long_pp.stage.postpartum_plan_weeks = MAX_PLAN_WEEKS;
        let long = generate_plan(&long_pp, &clock);
        assert_eq!(long.weeks.len(), MAX_PLAN_WEEKS as usize);
        for week in 0..long.weeks.len() {
            let adaptive = get_adaptive_week(&long, week, &[]);
            assert!(adaptive.is_ok(), "postpartum week {}", week);
            assert!(view_week(&long, week, &[]).unwrap().is_adaptive());
        }
    }

    #[test]
    fn test_adaptive_view_serializes_flat() {
        let p = plan();
        let week = get_adaptive_week(&p, 0, &[]).unwrap();
        let value = serde_json::to_value(&week).unwrap();
        assert!(value.get("sessions").is_some());
        assert!(value.get("narrative").is_some());
        assert_eq!(value["signal"]["progressionStep"], 0);
        assert_eq!(week.plan.dosage.rir_main, RirRange::new(2, 4));
    }
}
