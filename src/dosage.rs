//! Dosage adjuster
//!
//! Starts from the stage template's intensity band and RIR ranges, then lets
//! dial thresholds, diagnoses, the user's difficulty preference and the
//! adaptive signal move them. Every adjustment leaves a note.

use serde::{Deserialize, Serialize};

use crate::dials::DialVector;
use crate::models::{Profile, StageKey};
use crate::taxonomy::{CERCLAGE, GESTATIONAL_DIABETES, PLACENTA_PREVIA, SUBCHORIONIC_HEMATOMA};
use crate::templates::{BaseDosage, BaseTemplate, IntensityBand, RirRange};

pub const REST_WIDENED: &str = "increase rest; avoid circuits";
pub const REST_DENSE: &str = "60–120s; gentle circuits acceptable (not exhausting)";

/// Floors applied when pressure or hemodynamic dials run high
const CAPPED_INTENSITY: IntensityBand = IntensityBand::Low;
const CAPPED_RIR_MAIN: RirRange = RirRange::new(4, 6);
const CAPPED_RIR_ACC: RirRange = RirRange::new(5, 7);

// ---------------------------------------------------------------------------
/// Adaptive signal: produced by the regenerator from check-in history
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveSignal {
    pub regress: bool,
    /// 0..=3; ignored whenever `regress` is set
    pub progression_step: u8,
}

impl AdaptiveSignal {
    pub fn neutral() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DosageGuidance {
    pub intensity: IntensityBand,
    pub rir_main: RirRange,
    pub rir_acc: RirRange,
    pub base: BaseDosage,
    pub rest: String,
    pub notes: Vec<String>,
}

pub fn adjust_dosage(
    base: &BaseDosage,
    profile: &Profile,
    dials: &DialVector,
    meta: &BaseTemplate,
    signal: &AdaptiveSignal,
) -> DosageGuidance {
    let mut intensity = meta.intensity;
    let mut rir_main = meta.rir_main;
    let mut rir_acc = meta.rir_acc;
    let mut notes: Vec<String> = Vec::new();
    let mut note = |s: &str| notes.push(s.to_string());

    let capped = dials.iap >= 5 || dials.hemo >= 5;
    if capped {
        intensity = intensity.min(CAPPED_INTENSITY);
        rir_main = rir_main.max(CAPPED_RIR_MAIN);
        rir_acc = rir_acc.max(CAPPED_RIR_ACC);
        note("Keep breathing continuous; no breath holds or grinders.");
    }
    if dials.fatigue >= 6 {
        note("Reduce total sets by ~25–40% this week; prioritize main patterns.");
    }
    if dials.bal >= 5 {
        note("Prefer machines/seated/supported variants; avoid unstable setups.");
    }
    if profile.stage_key() == StageKey::T3 {
        note("Keep sessions 20–45 min; stop 1–2 reps earlier than you think you need to.");
    }
    if profile.has_diagnosis(GESTATIONAL_DIABETES) {
        note("Short post-meal sessions (10–20 min) are a high-value add for glucose control.");
    }
    if profile.has_diagnosis(SUBCHORIONIC_HEMATOMA) || profile.has_diagnosis(PLACENTA_PREVIA) {
        note("Avoid impact and high IAP; treat training as submaximal skill + circulation.");
    }
    if dials.impact >= 4 || profile.hard_limits.avoid_impact {
        note("Keep work low-impact: no jumping/running; favor controlled strength movements.");
    }
    if dials.isometric >= 4 {
        note("Limit long isometric holds; use dynamic reps with continuous breathing.");
    }
    if profile.has_diagnosis(CERCLAGE) {
        note("High-risk profile: keep work seated/supported only and follow clinician restrictions.");
    }

    let rest = if dials.density >= 2 || dials.fatigue >= 6 {
        REST_WIDENED.to_string()
    } else if dials.density <= -1 && dials.fatigue <= 4 {
        REST_DENSE.to_string()
    } else {
        base.rest.clone()
    };

    // Downward RIR moves never cross the pressure floors
    let floor_main = |r: RirRange| if capped { r.max(CAPPED_RIR_MAIN) } else { r };
    let floor_acc = |r: RirRange| if capped { r.max(CAPPED_RIR_ACC) } else { r };

    let steps = profile.difficulty.steps();
    if steps > 0 && !signal.regress {
        let wanted = intensity.step_up(steps);
        intensity = if capped { wanted.min(CAPPED_INTENSITY) } else { wanted };
        rir_main = floor_main(rir_main.shifted(-i32::from(steps)));
        rir_acc = floor_acc(rir_acc.shifted(-i32::from(steps)));
        if capped {
            notes.push(format!(
                "Harder preference noted: intensity held at {} by current constraints; RIR stays at or above {}.",
                intensity, CAPPED_RIR_MAIN
            ));
        } else {
            notes.push(format!(
                "Harder preference: intensity nudged up {} step(s) and RIR lowered by {}.",
                steps, steps
            ));
        }
    }

    if signal.regress {
        rir_main = rir_main.shifted(1);
        rir_acc = rir_acc.shifted(1);
        notes.push(
            "Last week's check-in flagged pelvic/core symptoms: adding 1 rep in reserve and holding progression this week."
                .to_string(),
        );
    } else if signal.progression_step >= 1 {
        rir_main = floor_main(rir_main.shifted(-1));
        notes.push(format!(
            "Stable check-ins (progression step {}): main lifts may finish 1 rep closer to failure.",
            signal.progression_step
        ));
    }

    DosageGuidance {
        intensity,
        rir_main,
        rir_acc,
        base: base.clone(),
        rest,
        notes,
    }
}
