//! Return-to-running readiness gate
//!
//! Only applies postpartum, when running is a goal and not ruled out. Two
//! conditions must both hold: enough time since delivery, and two recent
//! quiet check-ins.

use serde::{Deserialize, Serialize};

use crate::adaptive::CheckInHistory;
use crate::models::profile::StageMode;
use crate::models::{Goal, Profile};

pub const MIN_WEEKS_POSTPARTUM: u32 = 12;
/// How many preceding weeks count as "recent"
pub const RECENT_WINDOW: usize = 3;
pub const REQUIRED_CHECKINS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningGate {
    pub ready: bool,
    pub reasons: Vec<String>,
    pub weekly_plan: Vec<String>,
}

pub fn build_running_impact_gate(
    profile: &Profile,
    week_index: usize,
    history: &CheckInHistory<'_>,
) -> Option<RunningGate> {
    let applies = profile.stage.mode == StageMode::Postpartum
        && profile.has_goal(Goal::ReturnRun)
        && !profile.hard_limits.avoid_running;
    if !applies {
        return None;
    }

    let mut reasons = Vec::new();

    let weeks_pp = profile.stage.weeks_postpartum;
    let time_ok = weeks_pp >= MIN_WEEKS_POSTPARTUM;
    if !time_ok {
        reasons.push(format!(
            "Time gate: running waits until at least {} weeks postpartum (currently {}).",
            MIN_WEEKS_POSTPARTUM, weeks_pp
        ));
    }

    let recent = history.recent(week_index, RECENT_WINDOW);
    let symptoms_ok = if recent.len() < REQUIRED_CHECKINS {
        reasons.push(format!(
            "Check-in gate: log at least {} weekly check-ins in the last {} weeks (found {}).",
            REQUIRED_CHECKINS,
            RECENT_WINDOW,
            recent.len()
        ));
        false
    } else {
        let quiet = recent.iter().take(REQUIRED_CHECKINS).all(|c| {
            c.pelvic_core_peak().is_minor() && c.pain_peak().is_minor() && !c.delayed_symptoms
        });
        if !quiet {
            reasons.push(
                "Symptom gate: the two most recent check-ins need pelvic/core symptoms and pain at none or mild, with no delayed symptoms."
                    .to_string(),
            );
        }
        quiet
    };

    let ready = time_ok && symptoms_ok;
    if ready {
        reasons.push("Time and symptom gates are both met.".to_string());
    }

    let weekly_plan = if ready {
        vec![
            "3 run/walk sessions of 20–25 min on non-consecutive days.".to_string(),
            "Start at 1 min easy jog / 2 min walk × 6–8; add jog time only if the next day is symptom-free.".to_string(),
            "Keep single-leg and calf strength twice a week.".to_string(),
            "Drop back a step if leakage, heaviness or pain above your limit shows up.".to_string(),
        ]
    } else {
        vec![
            format!(
                "Low-impact cardio 2–3×/week for 20–30 min ({}).",
                profile.equipment.cardio.as_str()
            ),
            "Calf raises 3×12–15 and single-leg strength (split squat, step-ups) twice a week.".to_string(),
            "Keep logging weekly check-ins; the gate re-checks every week.".to_string(),
        ]
    };

    Some(RunningGate {
        ready,
        reasons,
        weekly_plan,
    })
}
