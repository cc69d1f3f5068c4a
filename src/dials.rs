//! Constraint dial engine
//!
//! Turns a heterogeneous profile (stage, limits, provider restrictions,
//! symptoms, diagnoses, lifestyle) into a fixed vector of stressor scores.
//! Higher dial = reduce that stressor more.
//!
//! Key properties:
//! - Pure and total: every profile yields a vector, unknown keys are skipped
//! - Additive: contributions are summed in any order, then clamped once
//! - Every ordinary dial ends in [-3, 10]; BEDREST is a separate flag

use serde::{Deserialize, Serialize};

use crate::models::profile::Level;
use crate::models::{Profile, StageKey};
use crate::taxonomy::{self, BED_REST};

// ---------------------------------------------------------------------------
/// Dial: one named stressor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dial {
    Iap,
    Axial,
    Rom,
    Asym,
    Bal,
    Fatigue,
    Hemo,
    Position,
    Grip,
    Upright,
    Impact,
    Carry,
    Isometric,
    Density,
    Freq,
}

impl Dial {
    pub const ALL: [Dial; 15] = [
        Dial::Iap,
        Dial::Axial,
        Dial::Rom,
        Dial::Asym,
        Dial::Bal,
        Dial::Fatigue,
        Dial::Hemo,
        Dial::Position,
        Dial::Grip,
        Dial::Upright,
        Dial::Impact,
        Dial::Carry,
        Dial::Isometric,
        Dial::Density,
        Dial::Freq,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dial::Iap => "IAP",
            Dial::Axial => "AXIAL",
            Dial::Rom => "ROM",
            Dial::Asym => "ASYM",
            Dial::Bal => "BAL",
            Dial::Fatigue => "FATIGUE",
            Dial::Hemo => "HEMO",
            Dial::Position => "POSITION",
            Dial::Grip => "GRIP",
            Dial::Upright => "UPRIGHT",
            Dial::Impact => "IMPACT",
            Dial::Carry => "CARRY",
            Dial::Isometric => "ISOMETRIC",
            Dial::Density => "DENSITY",
            Dial::Freq => "FREQ",
        }
    }

    /// Plain-language reading of a high value
    pub fn meaning(&self) -> &'static str {
        match self {
            Dial::Iap => "Reduce intra-abdominal pressure spikes (breath holds, grinders).",
            Dial::Axial => "Reduce axial loading (spine/compression).",
            Dial::Rom => "Reduce range of motion or avoid end-range under load.",
            Dial::Asym => "Reduce asymmetrical loading (PGP/SPD, SI sensitivity).",
            Dial::Bal => "Reduce balance demands (machines/supported work).",
            Dial::Fatigue => "Reduce volume/density (sleep, anemia, late pregnancy).",
            Dial::Hemo => "Reduce hemodynamic strain (BP spikes, dizziness).",
            Dial::Position => "Modify positions (avoid supine, reflux, comfort).",
            Dial::Grip => "Reduce grip strain (carpal tunnel).",
            Dial::Upright => "Limit prolonged upright loading (previa/varicosities).",
            Dial::Impact => "Avoid impact/ballistic work.",
            Dial::Carry => "Limit carries/loaded walking.",
            Dial::Isometric => "Limit long isometric holds.",
            Dial::Density => "Avoid dense circuits; negative allows denser work.",
            Dial::Freq => "Limit session frequency; negative allows more frequent short sessions.",
        }
    }
}

impl std::fmt::Display for Dial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
/// DialVector: fixed-schema stressor scores
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DialVector {
    pub iap: i32,
    pub axial: i32,
    pub rom: i32,
    pub asym: i32,
    pub bal: i32,
    pub fatigue: i32,
    pub hemo: i32,
    pub position: i32,
    pub grip: i32,
    pub upright: i32,
    pub impact: i32,
    pub carry: i32,
    pub isometric: i32,
    pub density: i32,
    pub freq: i32,
    /// Clinician-ordered bed rest; supersedes all selection and dosage logic
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bedrest: bool,
}

impl DialVector {
    pub const MIN: i32 = -3;
    pub const MAX: i32 = 10;

    pub fn get(&self, dial: Dial) -> i32 {
        match dial {
            Dial::Iap => self.iap,
            Dial::Axial => self.axial,
            Dial::Rom => self.rom,
            Dial::Asym => self.asym,
            Dial::Bal => self.bal,
            Dial::Fatigue => self.fatigue,
            Dial::Hemo => self.hemo,
            Dial::Position => self.position,
            Dial::Grip => self.grip,
            Dial::Upright => self.upright,
            Dial::Impact => self.impact,
            Dial::Carry => self.carry,
            Dial::Isometric => self.isometric,
            Dial::Density => self.density,
            Dial::Freq => self.freq,
        }
    }

    fn slot(&mut self, dial: Dial) -> &mut i32 {
        match dial {
            Dial::Iap => &mut self.iap,
            Dial::Axial => &mut self.axial,
            Dial::Rom => &mut self.rom,
            Dial::Asym => &mut self.asym,
            Dial::Bal => &mut self.bal,
            Dial::Fatigue => &mut self.fatigue,
            Dial::Hemo => &mut self.hemo,
            Dial::Position => &mut self.position,
            Dial::Grip => &mut self.grip,
            Dial::Upright => &mut self.upright,
            Dial::Impact => &mut self.impact,
            Dial::Carry => &mut self.carry,
            Dial::Isometric => &mut self.isometric,
            Dial::Density => &mut self.density,
            Dial::Freq => &mut self.freq,
        }
    }

    pub fn add(&mut self, dial: Dial, amount: i32) {
        *self.slot(dial) += amount;
    }

    fn add_all(&mut self, deltas: &[(Dial, i32)]) {
        for (dial, amount) in deltas {
            self.add(*dial, *amount);
        }
    }

    /// Copy with every ordinary dial pulled into [MIN, MAX]
    pub fn clamped(mut self) -> Self {
        for dial in Dial::ALL {
            let slot = self.slot(dial);
            *slot = (*slot).clamp(Self::MIN, Self::MAX);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dial, i32)> + '_ {
        Dial::ALL.into_iter().map(move |d| (d, self.get(d)))
    }
}

// ---------------------------------------------------------------------------
// Dial computation
// ---------------------------------------------------------------------------

/// Aggregate every declared constraint into a clamped dial vector.
pub fn compute_dials(profile: &Profile) -> DialVector {
    let mut d = DialVector::default();

    // Stage baseline
    match profile.stage_key() {
        StageKey::T2 => d.add_all(&[(Dial::Iap, 1), (Dial::Bal, 1), (Dial::Rom, 1)]),
        StageKey::T3 => d.add_all(&[
            (Dial::Iap, 2),
            (Dial::Bal, 2),
            (Dial::Rom, 2),
            (Dial::Axial, 1),
            (Dial::Upright, 1),
        ]),
        key if key.is_postpartum() => {
            d.add_all(&[(Dial::Iap, 1), (Dial::Fatigue, 1)]);
            if profile.stage.breastfeeding {
                d.add(Dial::Fatigue, 1);
            }
        }
        _ => {}
    }

    // Hard limits
    let limits = &profile.hard_limits;
    if limits.avoid_supine {
        d.add(Dial::Position, 2);
    }
    if limits.avoid_heavy {
        d.add_all(&[(Dial::Iap, 3), (Dial::Axial, 3), (Dial::Hemo, 2), (Dial::Fatigue, 1)]);
    }
    if limits.avoid_impact {
        d.add(Dial::Impact, 3);
    }
    if profile.equipment.balance_limit {
        d.add(Dial::Bal, 2);
    }

    // Provider restrictions
    for tag in profile.provider_restrictions.active_tags() {
        if let Some(restriction) = taxonomy::find_restriction(tag) {
            d.add_all(restriction.modifies);
        }
        if tag == BED_REST {
            d.bedrest = true;
        }
    }

    // Symptoms: severity rank onto every affected dial
    for (key, entry) in &profile.symptoms {
        let Some(symptom) = taxonomy::find_symptom(key) else {
            continue;
        };
        let rank = entry.severity.rank();
        if rank == 0 {
            continue;
        }
        for dial in symptom.affects {
            d.add(*dial, rank);
        }
    }

    // Diagnoses
    for key in &profile.diagnoses {
        if let Some(dx) = taxonomy::find_diagnosis(key) {
            d.add_all(dx.modifies);
        }
    }

    // Lifestyle
    if profile.lifestyle.effective_sleep_hours() < 6 {
        d.add(Dial::Fatigue, 2);
    }
    if profile.lifestyle.stress == Level::High {
        d.add(Dial::Fatigue, 1);
    }

    d.clamped()
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::StageMode;
    use crate::taxonomy::Severity;

    fn base_profile() -> Profile {
        let mut p = Profile::default();
        p.hard_limits.avoid_impact = false;
        p
    }

    #[test]
    fn test_first_trimester_baseline_is_zero() {
        let p = base_profile().at_pregnancy_week(10);
        let d = compute_dials(&p);
        assert!(d.iter().all(|(_, v)| v == 0), "expected all zero, got {:?}", d);
        assert!(!d.bedrest);
    }

    #[test]
    fn test_third_trimester_baseline() {
        let d = compute_dials(&base_profile().at_pregnancy_week(30));
        assert_eq!(d.iap, 2);
        assert_eq!(d.bal, 2);
        assert_eq!(d.rom, 2);
        assert_eq!(d.axial, 1);
        assert_eq!(d.upright, 1);
    }

    #[test]
    fn test_postpartum_breastfeeding_adds_fatigue() {
        let mut p = base_profile().at_postpartum_week(8);
        assert_eq!(compute_dials(&p).fatigue, 1);
        p.stage.breastfeeding = true;
        let d = compute_dials(&p);
        assert_eq!(d.fatigue, 2);
        assert_eq!(d.iap, 1);
    }

    #[test]
    fn test_cerclage_late_pregnancy_example() {
        let mut p = base_profile().at_pregnancy_week(30).with_diagnosis("cerclage");
        p.hard_limits.avoid_supine = true;

        let d = compute_dials(&p);
        assert!(d.iap >= 5, "IAP {}", d.iap);
        assert!(d.upright >= 4, "UPRIGHT {}", d.upright);
        assert_eq!(d.position, 2);
    }

    #[test]
    fn test_symptom_severity_maps_to_affected_dials() {
        let p = base_profile()
            .at_pregnancy_week(10)
            .with_symptom("pelvic_pressure", Severity::Moderate)
            .with_symptom("carpal_tunnel", Severity::Severe);

        let d = compute_dials(&p);
        assert_eq!(d.iap, 2);
        assert_eq!(d.rom, 2);
        assert_eq!(d.fatigue, 2);
        assert_eq!(d.grip, 3);
    }

    #[test]
    fn test_gdm_licenses_denser_work() {
        let d = compute_dials(&base_profile().at_pregnancy_week(10).with_diagnosis("gdm"));
        assert_eq!(d.freq, -1);
        assert_eq!(d.density, -1);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let p = base_profile()
            .at_pregnancy_week(10)
            .with_symptom("hiccups", Severity::Severe)
            .with_diagnosis("not_a_diagnosis");
        assert_eq!(compute_dials(&p), compute_dials(&base_profile().at_pregnancy_week(10)));
    }

    #[test]
    fn test_bed_rest_sets_flag_and_clamps() {
        let mut p = base_profile().at_pregnancy_week(30);
        p.provider_restrictions.tags.insert(BED_REST.to_string());
        assert!(!compute_dials(&p).bedrest, "tag without the restriction flag is inactive");

        p.provider_restrictions.has = true;
        p.provider_restrictions.tags.insert("pelvic_rest".to_string());
        let d = compute_dials(&p);
        assert!(d.bedrest);
        assert_eq!(d.iap, DialVector::MAX);
        assert_eq!(d.upright, DialVector::MAX);
        assert_eq!(d.fatigue, DialVector::MAX);
    }

    #[test]
    fn test_all_dials_stay_in_range_under_stacking() {
        let mut p = base_profile().at_postpartum_week(2);
        p.stage.breastfeeding = true;
        p.hard_limits.avoid_heavy = true;
        p.hard_limits.avoid_supine = true;
        p.hard_limits.avoid_impact = true;
        p.lifestyle.sleep_hours = 4;
        p.lifestyle.stress = Level::High;
        p.provider_restrictions.has = true;
        for r in taxonomy::RESTRICTIONS {
            p.provider_restrictions.tags.insert(r.key.to_string());
        }
        for s in taxonomy::SYMPTOMS {
            p = p.with_symptom(s.key, Severity::Severe);
        }
        for dx in taxonomy::DIAGNOSES {
            p = p.with_diagnosis(dx.key);
        }

        let d = compute_dials(&p);
        for (dial, value) in d.iter() {
            assert!(
                (DialVector::MIN..=DialVector::MAX).contains(&value),
                "{} = {} out of range",
                dial,
                value
            );
        }
    }

    #[test]
    fn test_negative_floor() {
        let mut p = base_profile();
        p.stage.mode = StageMode::Preconception;
        let mut d = compute_dials(&p);
        d.add(Dial::Density, -20);
        assert_eq!(d.clamped().density, DialVector::MIN);
    }

    #[test]
    fn test_json_uses_upper_case_names() {
        let mut d = DialVector::default();
        d.iap = 4;
        let value = serde_json::to_value(d).unwrap();
        assert_eq!(value["IAP"], 4);
        assert!(value.get("BEDREST").is_none());

        d.bedrest = true;
        let value = serde_json::to_value(d).unwrap();
        assert_eq!(value["BEDREST"], true);
    }

    #[test]
    fn test_low_sleep_and_stress() {
        let mut p = base_profile().at_pregnancy_week(10);
        p.lifestyle.sleep_hours = 5;
        p.lifestyle.stress = Level::High;
        assert_eq!(compute_dials(&p).fatigue, 3);

        p.lifestyle.sleep_hours = 0;
        p.lifestyle.stress = Level::Moderate;
        assert_eq!(compute_dials(&p).fatigue, 0, "unanswered sleep uses the 7h default");
    }
}
