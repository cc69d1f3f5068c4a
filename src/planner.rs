//! Week plan generator and trajectory planner
//!
//! A week plan materialises one profile snapshot: template, dials, dosage and
//! concrete exercises. The trajectory planner expands a root profile into one
//! snapshot per week across the relevant stage horizon.
//!
//! Key properties:
//! - Deterministic given (snapshot, week seed, adaptive signal)
//! - Snapshots are owned copies; later edits to the root never reach them
//! - Bed rest short-circuits everything into a single restricted session

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Pattern;
use crate::clock::Clock;
use crate::dials::{compute_dials, DialVector};
use crate::dosage::{adjust_dosage, AdaptiveSignal, DosageGuidance};
use crate::models::profile::{Stage, StageMode, MAX_PLAN_WEEKS};
use crate::models::{Profile, StageKey};
use crate::selector::pick_exercise;
use crate::taxonomy::{self, RiskClass};
use crate::templates::{
    base_template, build_template, BaseDosage, BaseTemplate, Block, IntensityBand, RirRange, SessionTemplate,
};

pub const DEFAULT_PREGNANCY_WEEKS: u32 = 4;
pub const PRECONCEPTION_WEEKS: u32 = 12;
pub const DEFAULT_SESSION_MINUTES: u32 = 30;

pub const HIGH_RISK_WARNING: &str = "Your selections include a higher-risk condition. Use clinician restrictions as primary constraint; consider pelvic/OB clearance before resistance work.";
pub const BED_REST_WARNING: &str =
    "Bed rest / limited activity is selected. This app cannot prescribe training. Use medical guidance first.";

// ---------------------------------------------------------------------------
/// Materialised plan types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBlock {
    pub title: String,
    pub pattern: Pattern,
    pub exercise: String,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    pub dosage: BaseDosage,
    pub blocks: Vec<ResolvedBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPlan {
    pub template: String,
    pub stage_key: StageKey,
    pub dials: DialVector,
    pub dosage: DosageGuidance,
    pub sessions: Vec<Session>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub label: String,
    pub start_date: NaiveDate,
    pub stage_snapshot: Stage,
    pub profile_snapshot: Profile,
    pub week_seed: i64,
    #[serde(flatten)]
    pub plan: WeekPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub weeks: Vec<Week>,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Week plan generation
// ---------------------------------------------------------------------------

fn bed_rest_plan(meta: &BaseTemplate, key: StageKey, dials: DialVector) -> WeekPlan {
    let block = |title: &str, pattern, exercise: &str| ResolvedBlock {
        title: title.to_string(),
        pattern,
        exercise: exercise.to_string(),
        optional: false,
    };

    WeekPlan {
        template: meta.name.to_string(),
        stage_key: key,
        dials,
        dosage: DosageGuidance {
            intensity: IntensityBand::VeryLow,
            rir_main: RirRange::new(8, 10),
            rir_acc: RirRange::new(8, 10),
            base: BaseDosage::new("Breathing + gentle mobility only", "—", "as needed"),
            rest: "as needed".to_string(),
            notes: vec![
                "Bed rest / limited activity selected: follow clinician restrictions as primary constraint.".to_string(),
                "Use only clinician-approved movement (often breathing, gentle mobility, short walks if cleared)."
                    .to_string(),
            ],
        },
        sessions: vec![Session {
            name: "Clinician-restricted day".to_string(),
            dosage: BaseDosage::new("Breathing + mobility only", "—", "as needed"),
            blocks: vec![
                block("Breathing (stack + relaxation)", Pattern::Mobility, "90/90 Breathing (rib stack)"),
                block("Gentle mobility", Pattern::Mobility, "Cat-Cow (gentle)"),
            ],
        }],
        warnings: vec![BED_REST_WARNING.to_string()],
    }
}

/// Training days for this snapshot: the user's choice, or the template default
pub fn training_days(profile: &Profile, meta: &BaseTemplate) -> u8 {
    let requested = match profile.schedule.days_per_week {
        0 => meta.default_days,
        n => n,
    };
    requested.clamp(1, 6)
}

/// Template blocks that fit the session length, with their original positions.
fn trim_for_minutes(blocks: &[Block], minutes: u32) -> Vec<(usize, &Block)> {
    let indexed = blocks.iter().enumerate();
    if minutes <= 20 {
        indexed.filter(|(_, b)| !b.optional).take(5).collect()
    } else if minutes <= 30 {
        indexed
            .filter(|(_, b)| !(b.optional && b.pattern == Pattern::Accessories))
            .collect()
    } else {
        indexed.collect()
    }
}

fn push_unique(warnings: &mut Vec<String>, warning: String) {
    if !warnings.contains(&warning) {
        warnings.push(warning);
    }
}

/// Pick exercises for the blocks that survive trimming. Placeholder warnings
/// only name blocks the user will actually see.
fn resolve_session(
    template: &SessionTemplate,
    day: usize,
    profile: &Profile,
    dials: &DialVector,
    week_seed: i64,
    minutes: u32,
    warnings: &mut Vec<String>,
) -> Session {
    let blocks = trim_for_minutes(&template.blocks, minutes)
        .into_iter()
        .map(|(idx, block)| {
            let seed = week_seed + 10 * day as i64 + idx as i64;
            let pick = pick_exercise(block.pattern, profile, dials, block.forced.as_deref(), seed);
            if pick.is_fallback() {
                push_unique(
                    warnings,
                    format!(
                        "No exercise fits your constraints for \"{}\" ({}); \"{}\" is shown as a placeholder. Skip it or ask your clinician for an alternative.",
                        block.title,
                        block.pattern,
                        pick.name()
                    ),
                );
            }
            ResolvedBlock {
                title: block.title.clone(),
                pattern: block.pattern,
                exercise: pick.name().to_string(),
                optional: block.optional,
            }
        })
        .collect();

    Session {
        name: template.name.clone(),
        dosage: template.dosage.clone(),
        blocks,
    }
}

pub fn generate_week_plan(profile: &Profile, week_seed: i64, signal: &AdaptiveSignal) -> WeekPlan {
    let key = profile.stage_key();
    let meta = base_template(key);
    let dials = compute_dials(profile);

    if dials.bedrest {
        return bed_rest_plan(&meta, key, dials);
    }

    let days = training_days(profile, &meta);
    let minutes = match profile.schedule.session_minutes {
        0 => DEFAULT_SESSION_MINUTES,
        m => m,
    };
    let templates = build_template(days, meta.variant, profile.schedule.style);
    let mut warnings = Vec::new();

    let sessions: Vec<Session> = templates
        .iter()
        .enumerate()
        .map(|(day, template)| resolve_session(template, day, profile, &dials, week_seed, minutes, &mut warnings))
        .collect();

    let base = templates
        .first()
        .map(|t| t.dosage.clone())
        .unwrap_or_else(|| meta.variant.base_dosage());
    let dosage = adjust_dosage(&base, profile, &dials, &meta, signal);

    let high_risk = profile
        .diagnoses
        .iter()
        .filter_map(|k| taxonomy::find_diagnosis(k))
        .any(|dx| dx.class == RiskClass::Red);
    if high_risk {
        warnings.insert(0, HIGH_RISK_WARNING.to_string());
    }

    WeekPlan {
        template: meta.name.to_string(),
        stage_key: key,
        dials,
        dosage,
        sessions,
        warnings,
    }
}

// ---------------------------------------------------------------------------
// Trajectory
// ---------------------------------------------------------------------------

/// Whole weeks left until `due`, rounded up, never below one
pub fn weeks_until(today: NaiveDate, due: NaiveDate) -> u32 {
    let days = (due - today).num_days().max(0);
    let weeks = (days + 6) / 7;
    (weeks.max(1) as u32).min(MAX_PLAN_WEEKS)
}

/// One profile per week, in trajectory order.
pub fn expand_snapshots(profile: &Profile, today: NaiveDate) -> Vec<Profile> {
    let stage = &profile.stage;
    match stage.mode {
        StageMode::Pregnant => {
            let weeks = stage
                .due_date
                .map(|due| weeks_until(today, due))
                .unwrap_or(DEFAULT_PREGNANCY_WEEKS);
            let mut snapshots: Vec<Profile> = (0..weeks)
                .map(|i| profile.at_pregnancy_week(stage.weeks_pregnant + i))
                .collect();
            if stage.due_date.is_some() {
                let horizon = stage.postpartum_plan_weeks.min(MAX_PLAN_WEEKS);
                snapshots.extend((0..horizon).map(|i| profile.at_postpartum_week(i)));
            }
            snapshots
        }
        StageMode::Postpartum => {
            let weeks = stage.postpartum_plan_weeks.clamp(1, MAX_PLAN_WEEKS);
            (0..weeks)
                .map(|i| profile.at_postpartum_week(stage.weeks_postpartum + i))
                .collect()
        }
        StageMode::Preconception => (0..PRECONCEPTION_WEEKS).map(|_| profile.clone()).collect(),
    }
}

pub fn week_label(index: usize, snapshot: &Profile) -> String {
    let stage = &snapshot.stage;
    match stage.mode {
        StageMode::Pregnant => format!("Week {} · {} weeks pregnant", index + 1, stage.weeks_pregnant),
        StageMode::Postpartum => format!("Week {} · {} weeks postpartum", index + 1, stage.weeks_postpartum),
        StageMode::Preconception => format!("Week {} · preconception", index + 1),
    }
}

pub fn generate_plan(profile: &Profile, clock: &dyn Clock) -> Plan {
    let now = clock.now();
    let today = clock.today();
    let root = profile.normalized();

    let weeks: Vec<Week> = expand_snapshots(&root, today)
        .into_iter()
        .enumerate()
        .map(|(index, snapshot)| {
            let week_seed = index as i64;
            let plan = generate_week_plan(&snapshot, week_seed, &AdaptiveSignal::neutral());
            Week {
                label: week_label(index, &snapshot),
                start_date: today + Duration::days(7 * index as i64),
                stage_snapshot: snapshot.stage.clone(),
                profile_snapshot: snapshot,
                week_seed,
                plan,
            }
        })
        .collect();

    let mut warnings = Vec::new();
    for week in &weeks {
        for warning in &week.plan.warnings {
            push_unique(&mut warnings, warning.clone());
        }
    }

    Plan {
        id: format!("plan_{}", now.timestamp_millis()),
        created_at: now,
        weeks,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::profile::ProgramStyle;
    use crate::taxonomy::{BED_REST, CERCLAGE};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock::on(today())
    }

    #[test]
    fn test_due_date_ten_days_out_gives_two_weeks() {
        let mut p = Profile::default().at_pregnancy_week(38);
        p.stage.due_date = Some(today() + Duration::days(10));

        let plan = generate_plan(&p, &clock());
        assert_eq!(plan.weeks.len(), 2);
        assert!(plan.weeks.iter().all(|w| w.stage_snapshot.mode == StageMode::Pregnant));
        assert_eq!(plan.weeks[1].profile_snapshot.stage.weeks_pregnant, 39);
        assert_eq!(plan.weeks[1].start_date, today() + Duration::days(7));
    }

    #[test]
    fn test_pregnancy_without_due_date_defaults_to_four_weeks() {
        let mut p = Profile::default().at_pregnancy_week(20);
        p.stage.postpartum_plan_weeks = 8;
        let plan = generate_plan(&p, &clock());
        assert_eq!(plan.weeks.len(), 4);
    }

    #[test]
    fn test_pregnancy_continues_into_postpartum_horizon() {
        let mut p = Profile::default().at_pregnancy_week(36);
        p.stage.due_date = Some(today() + Duration::days(21));
        p.stage.postpartum_plan_weeks = 3;

        let plan = generate_plan(&p, &clock());
        assert_eq!(plan.weeks.len(), 6);
        let seeds: Vec<i64> = plan.weeks.iter().map(|w| w.week_seed).collect();
        assert_eq!(seeds, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(plan.weeks[3].stage_snapshot.mode, StageMode::Postpartum);
        assert_eq!(plan.weeks[3].stage_snapshot.weeks_postpartum, 0);
        assert_eq!(plan.weeks[5].stage_snapshot.weeks_postpartum, 2);
        assert_eq!(plan.weeks[3].plan.stage_key, StageKey::Pp0To6);
    }

    #[test]
    fn test_past_due_date_still_yields_one_week() {
        let mut p = Profile::default().at_pregnancy_week(41);
        p.stage.due_date = Some(today() - Duration::days(3));
        assert_eq!(generate_plan(&p, &clock()).weeks.len(), 1);
    }

    #[test]
    fn test_postpartum_horizon_is_clamped() {
        let mut p = Profile::default().at_postpartum_week(10);
        p.stage.postpartum_plan_weeks = 0;
        assert_eq!(generate_plan(&p, &clock()).weeks.len(), 1);

        p.stage.postpartum_plan_weeks = 500;
        let plan = generate_plan(&p, &clock());
        assert_eq!(plan.weeks.len(), MAX_PLAN_WEEKS as usize);
        assert_eq!(plan.weeks[2].stage_snapshot.weeks_postpartum, 12);
    }

    #[test]
    fn test_preconception_is_twelve_identical_weeks() {
        let mut p = Profile::default();
        p.stage.mode = StageMode::Preconception;
        let plan = generate_plan(&p, &clock());
        assert_eq!(plan.weeks.len(), 12);
        assert!(plan.weeks.iter().all(|w| w.profile_snapshot == plan.weeks[0].profile_snapshot));
        assert_eq!(plan.weeks[0].plan.template, "Preconception Base");
    }

    #[test]
    fn test_snapshots_are_independent_of_root() {
        let mut p = Profile::default().at_postpartum_week(20);
        p.stage.postpartum_plan_weeks = 2;
        let plan = generate_plan(&p, &clock());

        p.diagnoses.insert("anemia".to_string());
        assert!(plan.weeks.iter().all(|w| !w.profile_snapshot.has_diagnosis("anemia")));
    }

    #[test]
    fn test_week_plan_is_deterministic() {
        let p = Profile::default().at_pregnancy_week(18);
        let a = generate_week_plan(&p, 3, &AdaptiveSignal::neutral());
        let b = generate_week_plan(&p, 3, &AdaptiveSignal::neutral());
        assert_eq!(a, b);
    }

    #[test]
    fn test_bed_rest_short_circuit() {
        let mut p = Profile::default().at_pregnancy_week(26);
        p.provider_restrictions.has = true;
        p.provider_restrictions.tags.insert(BED_REST.to_string());

        let week = generate_week_plan(&p, 0, &AdaptiveSignal::neutral());
        assert_eq!(week.sessions.len(), 1);
        assert_eq!(week.sessions[0].name, "Clinician-restricted day");
        assert_eq!(week.warnings, vec![BED_REST_WARNING.to_string()]);
        assert_eq!(week.dosage.intensity, IntensityBand::VeryLow);
        assert!(week.dials.bedrest);
    }

    #[test]
    fn test_short_sessions_are_trimmed() {
        let mut p = Profile::default().at_pregnancy_week(18);
        p.schedule.session_minutes = 20;
        let week = generate_week_plan(&p, 0, &AdaptiveSignal::neutral());
        for s in &week.sessions {
            assert!(s.blocks.len() <= 5);
            assert!(s.blocks.iter().all(|b| !b.optional));
        }

        p.schedule.session_minutes = 30;
        let week = generate_week_plan(&p, 0, &AdaptiveSignal::neutral());
        for s in &week.sessions {
            assert!(!s.blocks.iter().any(|b| b.optional && b.pattern == Pattern::Accessories));
            // mobility finisher survives
            assert!(s.blocks.iter().any(|b| b.optional && b.pattern == Pattern::Mobility));
        }

        p.schedule.session_minutes = 60;
        let week = generate_week_plan(&p, 0, &AdaptiveSignal::neutral());
        assert!(week.sessions[0].blocks.iter().any(|b| b.pattern == Pattern::Accessories));
    }

    #[test]
    fn test_days_per_week_defaults_and_clamps() {
        let mut p = Profile::default().at_pregnancy_week(30);
        p.schedule.days_per_week = 0;
        assert_eq!(generate_week_plan(&p, 0, &AdaptiveSignal::neutral()).sessions.len(), 2);

        p.schedule.days_per_week = 7;
        p.schedule.style = ProgramStyle::AbcRotation;
        assert_eq!(generate_week_plan(&p, 0, &AdaptiveSignal::neutral()).sessions.len(), 6);
    }

    #[test]
    fn test_high_risk_warning_is_deduplicated_across_weeks() {
        let mut p = Profile::default().at_pregnancy_week(30).with_diagnosis(CERCLAGE);
        p.hard_limits.avoid_supine = true;
        let plan = generate_plan(&p, &clock());
        assert_eq!(plan.weeks.len(), 4);
        assert_eq!(plan.warnings, vec![HIGH_RISK_WARNING.to_string()]);
    }

    #[test]
    fn test_fallback_surfaces_warning() {
        let mut p = Profile::default().at_pregnancy_week(30).with_diagnosis(CERCLAGE);
        p.hard_limits.avoid_supine = true;
        p.equipment.set = crate::models::profile::EquipmentSet::BandsOnly;
        let week = generate_week_plan(&p, 0, &AdaptiveSignal::neutral());
        assert!(week.warnings.iter().any(|w| w.contains("Upper Push")));
    }

    #[test]
    fn test_trimmed_blocks_raise_no_placeholder_warning() {
        let mut p = Profile::default().at_pregnancy_week(30).with_diagnosis(CERCLAGE);
        p.hard_limits.avoid_supine = true;
        p.equipment.set = crate::models::profile::EquipmentSet::BandsOnly;
        let dials = compute_dials(&p);
        let template = SessionTemplate {
            name: "Day A".to_string(),
            blocks: vec![
                Block {
                    title: "Lower body".to_string(),
                    pattern: Pattern::Squat,
                    forced: None,
                    optional: false,
                },
                Block {
                    title: "Extra push (optional)".to_string(),
                    pattern: Pattern::Push,
                    forced: None,
                    optional: true,
                },
            ],
            dosage: BaseDosage::new("2–3", "8–12", "60–90s"),
        };

        let mut warnings = Vec::new();
        let short = resolve_session(&template, 0, &p, &dials, 0, 20, &mut warnings);
        assert_eq!(short.blocks.len(), 1);
        assert!(!warnings.iter().any(|w| w.contains("Extra push")));

        let full = resolve_session(&template, 0, &p, &dials, 0, 60, &mut warnings);
        assert_eq!(full.blocks.len(), 2);
        assert!(warnings.iter().any(|w| w.contains("Extra push")));
    }

    #[test]
    fn test_week_json_is_flattened() {
        let plan = generate_plan(&Profile::default(), &clock());
        let value = serde_json::to_value(&plan.weeks[0]).unwrap();
        for key in [
            "label",
            "startDate",
            "stageSnapshot",
            "profileSnapshot",
            "weekSeed",
            "template",
            "stageKey",
            "dials",
            "dosage",
            "sessions",
            "warnings",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert!(plan.id.starts_with("plan_"));

        let back: Week = serde_json::from_value(value).unwrap();
        assert_eq!(back, plan.weeks[0]);
    }
}
