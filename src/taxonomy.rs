//! Symptom, diagnosis and provider-restriction reference tables
//!
//! Keys here are the stable identifiers stored in profiles. Anything a profile
//! mentions that is not listed is ignored by the dial engine.

use serde::{Deserialize, Serialize};

use crate::dials::Dial;

// ---------------------------------------------------------------------------
/// Severity: none < mild < moderate < severe
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    None,
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Rank added to each affected dial (none = 0 .. severe = 3)
    pub fn rank(&self) -> i32 {
        match self {
            Self::None => 0,
            Self::Mild => 1,
            Self::Moderate => 2,
            Self::Severe => 3,
        }
    }

    /// Mild or nothing at all
    pub fn is_minor(&self) -> bool {
        *self <= Self::Mild
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Mild => write!(f, "mild"),
            Self::Moderate => write!(f, "moderate"),
            Self::Severe => write!(f, "severe"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "mild" => Ok(Self::Mild),
            "moderate" => Ok(Self::Moderate),
            "severe" => Ok(Self::Severe),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
/// Symptoms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct SymptomDef {
    pub key: &'static str,
    pub label: &'static str,
    pub affects: &'static [Dial],
}

pub const SYMPTOMS: &[SymptomDef] = &[
    SymptomDef { key: "pelvic_pressure", label: "Pelvic heaviness/pressure", affects: &[Dial::Iap, Dial::Rom, Dial::Fatigue] },
    SymptomDef { key: "leakage", label: "Leaking with effort/cough/sneeze", affects: &[Dial::Iap, Dial::Fatigue] },
    SymptomDef { key: "doming", label: "Abdominal doming/coning with exertion", affects: &[Dial::Iap, Dial::Rom] },
    SymptomDef { key: "pgp", label: "Pelvic girdle pain (PGP/SPD)", affects: &[Dial::Asym, Dial::Rom] },
    SymptomDef { key: "low_back", label: "Low back pain", affects: &[Dial::Rom, Dial::Fatigue] },
    SymptomDef { key: "si_pain", label: "SI joint pain", affects: &[Dial::Asym, Dial::Rom] },
    SymptomDef { key: "round_lig", label: "Round ligament pain", affects: &[Dial::Rom, Dial::Bal] },
    SymptomDef { key: "carpal_tunnel", label: "Carpal tunnel / wrist symptoms", affects: &[Dial::Grip] },
    SymptomDef { key: "varicose", label: "Varicose/pelvic congestion symptoms", affects: &[Dial::Upright, Dial::Fatigue] },
    SymptomDef { key: "reflux", label: "Reflux / GERD", affects: &[Dial::Position] },
    SymptomDef { key: "dizziness", label: "Dizziness/orthostatic symptoms", affects: &[Dial::Hemo, Dial::Bal] },
    SymptomDef { key: "fatigue", label: "Severe fatigue / poor sleep", affects: &[Dial::Fatigue] },
    SymptomDef { key: "nausea", label: "Nausea/vomiting limiting training", affects: &[Dial::Fatigue] },
    SymptomDef { key: "breathless", label: "Breathlessness limiting exertion", affects: &[Dial::Iap, Dial::Hemo] },
    SymptomDef { key: "headaches", label: "Headaches/migraines", affects: &[Dial::Hemo, Dial::Fatigue] },
];

pub fn find_symptom(key: &str) -> Option<&'static SymptomDef> {
    SYMPTOMS.iter().find(|s| s.key == key)
}

// ---------------------------------------------------------------------------
/// Diagnoses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskClass {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy)]
pub struct DiagnosisDef {
    pub key: &'static str,
    pub label: &'static str,
    pub class: RiskClass,
    /// Per-dial deltas; negative values license slightly denser work
    pub modifies: &'static [(Dial, i32)],
}

pub const CERCLAGE: &str = "cerclage";
pub const GESTATIONAL_DIABETES: &str = "gdm";
pub const SUBCHORIONIC_HEMATOMA: &str = "sch";
pub const PLACENTA_PREVIA: &str = "previa";

pub const DIAGNOSES: &[DiagnosisDef] = &[
    DiagnosisDef {
        key: SUBCHORIONIC_HEMATOMA,
        label: "Subchorionic hematoma / bleeding history",
        class: RiskClass::Yellow,
        modifies: &[(Dial::Iap, 2), (Dial::Fatigue, 2), (Dial::Bal, 1), (Dial::Impact, 3), (Dial::Isometric, 2)],
    },
    DiagnosisDef {
        key: PLACENTA_PREVIA,
        label: "Placenta previa / low-lying placenta",
        class: RiskClass::Yellow,
        modifies: &[(Dial::Iap, 2), (Dial::Upright, 2), (Dial::Rom, 1), (Dial::Carry, 2)],
    },
    DiagnosisDef {
        key: "htn",
        label: "Hypertension / gestational hypertension",
        class: RiskClass::Yellow,
        modifies: &[(Dial::Hemo, 2), (Dial::Iap, 1), (Dial::Isometric, 2)],
    },
    DiagnosisDef {
        key: GESTATIONAL_DIABETES,
        label: "Gestational diabetes",
        class: RiskClass::Green,
        modifies: &[(Dial::Freq, -1), (Dial::Density, -1)],
    },
    DiagnosisDef {
        key: "anemia",
        label: "Anemia",
        class: RiskClass::Yellow,
        modifies: &[(Dial::Fatigue, 2), (Dial::Density, 2)],
    },
    DiagnosisDef {
        key: CERCLAGE,
        label: "Cervical insufficiency / cerclage",
        class: RiskClass::Red,
        modifies: &[(Dial::Iap, 3), (Dial::Upright, 3), (Dial::Carry, 3), (Dial::Rom, 2)],
    },
    DiagnosisDef {
        key: "preterm_history",
        label: "History of preterm labor",
        class: RiskClass::Yellow,
        modifies: &[(Dial::Fatigue, 2), (Dial::Iap, 1), (Dial::Impact, 3)],
    },
    DiagnosisDef {
        key: "multiples",
        label: "Multiple pregnancy (twins+)",
        class: RiskClass::Yellow,
        modifies: &[(Dial::Fatigue, 2), (Dial::Bal, 2), (Dial::Iap, 1), (Dial::Axial, 1)],
    },
    DiagnosisDef {
        key: "other",
        label: "Other (write in notes)",
        class: RiskClass::Yellow,
        modifies: &[],
    },
];

pub fn find_diagnosis(key: &str) -> Option<&'static DiagnosisDef> {
    DIAGNOSES.iter().find(|d| d.key == key)
}

// ---------------------------------------------------------------------------
/// Provider restriction tags
// ---------------------------------------------------------------------------

pub const BED_REST: &str = "bed_rest";
pub const PELVIC_REST: &str = "pelvic_rest";

#[derive(Debug, Clone, Copy)]
pub struct RestrictionDef {
    pub key: &'static str,
    pub label: &'static str,
    pub modifies: &'static [(Dial, i32)],
}

pub const RESTRICTIONS: &[RestrictionDef] = &[
    RestrictionDef {
        key: "no_strenuous",
        label: "No strenuous exercise",
        modifies: &[(Dial::Fatigue, 3), (Dial::Hemo, 2), (Dial::Iap, 2), (Dial::Axial, 2)],
    },
    RestrictionDef {
        key: PELVIC_REST,
        label: "Pelvic rest",
        modifies: &[(Dial::Iap, 4), (Dial::Upright, 3), (Dial::Carry, 3)],
    },
    RestrictionDef {
        key: "no_lift_cap",
        label: "No lifting above a cap",
        modifies: &[(Dial::Iap, 3), (Dial::Axial, 3), (Dial::Hemo, 2)],
    },
    RestrictionDef {
        key: "hr_cap",
        label: "Heart rate cap",
        modifies: &[(Dial::Hemo, 3), (Dial::Density, 2)],
    },
    RestrictionDef {
        key: "bp_cap",
        label: "Blood pressure cap",
        modifies: &[(Dial::Hemo, 3), (Dial::Iap, 1)],
    },
    RestrictionDef {
        key: BED_REST,
        label: "Bed rest / limited activity",
        modifies: &[(Dial::Iap, 10), (Dial::Upright, 10), (Dial::Fatigue, 10)],
    },
];

pub fn find_restriction(key: &str) -> Option<&'static RestrictionDef> {
    RESTRICTIONS.iter().find(|r| r.key == key)
}
