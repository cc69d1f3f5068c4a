//! Exercise selector
//!
//! Maps a movement pattern plus constraints onto one catalog exercise.
//!
//! Key properties:
//! - Hard exclusions remove an exercise outright; soft penalties only rank it lower
//! - Variety comes from a deterministic seed over the near-best pool, never randomness
//! - Forced names bypass scoring entirely

use crate::catalog::{self, Exercise, Pattern, Position};
use crate::dials::DialVector;
use crate::models::profile::StageMode;
use crate::models::Profile;
use crate::taxonomy::{CERCLAGE, PELVIC_REST};

/// Candidates within this many points of the best score share the pool
pub const NEAR_BEST_TOLERANCE: f64 = 0.75;

// ---------------------------------------------------------------------------
/// Pick: outcome of a selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick {
    /// Caller-supplied override
    Forced(String),
    /// Chosen from the near-best pool
    Ranked(&'static str),
    /// Every option was excluded; this is the pattern's first catalog entry
    Fallback(&'static str),
}

impl Pick {
    pub fn name(&self) -> &str {
        match self {
            Pick::Forced(name) => name,
            Pick::Ranked(name) | Pick::Fallback(name) => name,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Pick::Fallback(_))
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

fn high_upright_restriction(profile: &Profile) -> bool {
    profile.has_diagnosis(CERCLAGE) || profile.provider_restrictions.is_active(PELVIC_REST)
}

/// Abdominal wall pressure ceiling for the current gestational week.
fn abdominal_pressure_excluded(profile: &Profile, level: Option<u8>) -> bool {
    if profile.stage.mode != StageMode::Pregnant {
        return false;
    }
    let Some(level) = level else {
        return false;
    };
    let week = profile.stage.weeks_pregnant;
    (week >= 28 && level >= 1) || (week >= 20 && level >= 2)
}

/// Score one exercise, or `None` when it is hard-excluded.
pub fn score(exercise: &Exercise, profile: &Profile, dials: &DialVector) -> Option<f64> {
    let limits = &profile.hard_limits;
    let demand = &exercise.demand;

    if !exercise.fits(catalog::equipment_tags(profile.equipment.set)) {
        return None;
    }
    if limits.avoid_supine && exercise.position == Position::Supine {
        return None;
    }
    if limits.avoid_barbell && exercise.uses_barbell() {
        return None;
    }
    if limits.avoid_impact && demand.impact >= 2 {
        return None;
    }
    if dials.isometric >= 4 && demand.isometric >= 2 {
        return None;
    }
    if high_upright_restriction(profile) && exercise.position == Position::Standing {
        return None;
    }
    if abdominal_pressure_excluded(profile, demand.abdominal_pressure) {
        return None;
    }

    let dial = |v: i32| v as f64;
    let mut s = 0.0;

    if exercise.position == Position::Supine {
        s -= 2.0 * dial(dials.position.max(0));
    }

    s -= f64::from(demand.iap) * dial(dials.iap) / 3.0;
    s -= f64::from(demand.axial) * dial(dials.axial) / 3.0;
    s -= f64::from(demand.balance) * dial(dials.bal) / 3.0;
    s -= f64::from(demand.grip) * dial(dials.grip) / 3.0;
    if exercise.position == Position::Standing {
        s -= dial(dials.upright) / 2.5;
    }
    s -= f64::from(demand.carry) * dial(dials.carry) / 3.0;
    s -= f64::from(demand.impact) * dial(dials.impact) / 3.0;
    s -= f64::from(demand.isometric) * dial(dials.isometric) / 3.0;

    if exercise.position.is_supported() {
        s += dial(dials.bal + dials.iap + dials.upright) / 12.0;
    }

    Some(s)
}

/// Admissible exercises of a pattern, best first. Ties keep catalog order.
pub fn ranked(pattern: Pattern, profile: &Profile, dials: &DialVector) -> Vec<(&'static Exercise, f64)> {
    let mut scored: Vec<_> = catalog::exercises_for(pattern)
        .filter_map(|e| score(e, profile, dials).map(|s| (e, s)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
}

/// Every admissible exercise within tolerance of the best score.
pub fn near_best_pool(pattern: Pattern, profile: &Profile, dials: &DialVector) -> Vec<&'static Exercise> {
    let ranked = ranked(pattern, profile, dials);
    let Some(best) = ranked.first().map(|(_, s)| *s) else {
        return Vec::new();
    };
    ranked
        .into_iter()
        .take_while(|(_, s)| best - s <= NEAR_BEST_TOLERANCE)
        .map(|(e, _)| e)
        .collect()
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

pub fn pick_exercise(
    pattern: Pattern,
    profile: &Profile,
    dials: &DialVector,
    forced: Option<&str>,
    seed: i64,
) -> Pick {
    if let Some(name) = forced {
        return Pick::Forced(name.to_string());
    }

    let pool = near_best_pool(pattern, profile, dials);
    if pool.is_empty() {
        let first = catalog::exercises_for(pattern).next().map(|e| e.name).unwrap_or("—");
        return Pick::Fallback(first);
    }

    let idx = seed.rem_euclid(pool.len() as i64) as usize;
    Pick::Ranked(pool[idx].name)
}
