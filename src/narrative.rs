//! Week narrative and plain-text summaries

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::adaptive::WeekTrend;
use crate::dosage::AdaptiveSignal;
use crate::models::profile::{CoachingTone, StageMode};
use crate::models::{Profile, StageKey};
use crate::planner::WeekPlan;

/// Days before the due date at which the taper takes over
pub const TAPER_WINDOW_DAYS: i64 = 14;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub title: String,
    pub explanation: String,
}

fn phase(key: StageKey) -> (&'static str, &'static str) {
    match key {
        StageKey::Preconception => (
            "Build phase",
            "Progressive strength while you have the most room to push; bank capacity now.",
        ),
        StageKey::T1 => (
            "Foundation",
            "Keep your strength habits going while energy and nausea allow; consistency beats intensity.",
        ),
        StageKey::T2 => (
            "Maintain & adapt",
            "Hold strength with slightly easier effort; swap positions as your bump and balance change.",
        ),
        StageKey::T3 => (
            "Preserve & prepare",
            "Shorter, supported sessions that keep you moving and breathing well toward delivery.",
        ),
        StageKey::Pp0To6 => (
            "Reconnect",
            "Breathing, pelvic floor reconnection and gentle movement only, within your clearance.",
        ),
        StageKey::Pp6To16 => (
            "Rebuild",
            "Reintroduce the main patterns with light loads and watch how your pelvic floor responds.",
        ),
        StageKey::Pp4To12m => (
            "Reload",
            "Loads climb again in small steps while symptoms stay quiet.",
        ),
        StageKey::Pp12mPlus => (
            "Perform",
            "Back to regular progressive training with your check-ins as the guardrail.",
        ),
    }
}

fn in_taper(profile: &Profile, week_start: NaiveDate) -> bool {
    if profile.stage.mode != StageMode::Pregnant {
        return false;
    }
    match profile.stage.due_date {
        Some(due) => (due - week_start).num_days() <= TAPER_WINDOW_DAYS,
        None => false,
    }
}

fn trend_remark(trend: WeekTrend, signal: &AdaptiveSignal, tone: CoachingTone) -> String {
    match (trend, tone) {
        (WeekTrend::Red, CoachingTone::Direct) => {
            "Last week's check-in flagged pelvic floor or core symptoms: this week steps back.".to_string()
        }
        (WeekTrend::Red, CoachingTone::Supportive) => {
            "Last week your body sent some pelvic floor or core signals, so this week eases off a little. That's the plan working, not a setback.".to_string()
        }
        (WeekTrend::Yellow, CoachingTone::Direct) => {
            "Last week was mixed: repeat this week's loads and hold.".to_string()
        }
        (WeekTrend::Yellow, CoachingTone::Supportive) => {
            "Last week was a mixed bag, which is normal. Let's hold steady and repeat.".to_string()
        }
        (WeekTrend::Green, tone) if signal.progression_step > 0 => match tone {
            CoachingTone::Direct => format!(
                "Stable check-ins: progression step {} unlocked.",
                signal.progression_step
            ),
            CoachingTone::Supportive => format!(
                "You've strung together stable weeks. Nice work; you've earned progression step {}.",
                signal.progression_step
            ),
        },
        (WeekTrend::Green, CoachingTone::Direct) => "Last week was stable. Keep going.".to_string(),
        (WeekTrend::Green, CoachingTone::Supportive) => {
            "Last week felt good. Keep doing what you're doing.".to_string()
        }
    }
}

/// Title and explanation for one week.
///
/// `trend` is the classification of the previous week's check-in, if any.
pub fn week_narrative(
    profile: &Profile,
    week_start: NaiveDate,
    trend: Option<WeekTrend>,
    signal: &AdaptiveSignal,
) -> Narrative {
    let (title, mut explanation) = if in_taper(profile, week_start) {
        (
            "Finish-line taper".to_string(),
            "Your due date is close: keep sessions short, easy and optional, and favour breathing, walking and rest."
                .to_string(),
        )
    } else {
        let (title, text) = phase(profile.stage_key());
        (title.to_string(), text.to_string())
    };

    if let Some(trend) = trend {
        explanation.push(' ');
        explanation.push_str(&trend_remark(trend, signal, profile.schedule.tone));
    }

    Narrative { title, explanation }
}

/// Plain-text summary of one materialised week.
pub fn quick_view(week: &WeekPlan) -> String {
    let mut lines = vec![
        format!("{} ({})", week.template, week.stage_key.as_str().to_uppercase()),
        format!("Intensity: {} | RIR main: {}", week.dosage.intensity, week.dosage.rir_main),
        String::new(),
    ];
    for session in &week.sessions {
        lines.push(session.name.clone());
        for block in &session.blocks {
            lines.push(format!("  - {}: {}", block.title, block.exercise));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}
