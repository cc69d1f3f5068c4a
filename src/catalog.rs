//! Exercise catalog
//!
//! Static reference data: every exercise belongs to one movement pattern and
//! carries its physical demands and compatible equipment. Order within a
//! pattern matters; the first entry is the selector's last resort.

use serde::{Deserialize, Serialize};

use crate::models::profile::EquipmentSet;

// ---------------------------------------------------------------------------
/// Movement pattern
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    Squat,
    Hinge,
    Push,
    Pull,
    CarryCore,
    Accessories,
    Mobility,
}

impl Pattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::Squat => "squat",
            Pattern::Hinge => "hinge",
            Pattern::Push => "push",
            Pattern::Pull => "pull",
            Pattern::CarryCore => "carry_core",
            Pattern::Accessories => "accessories",
            Pattern::Mobility => "mobility",
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Standing,
    Seated,
    Supine,
    Incline,
    Supported,
    Side,
    Quadruped,
}

impl Position {
    /// Positions that take load off balance, the trunk and the pelvic floor
    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            Position::Seated | Position::Supported | Position::Incline | Position::Side
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentTag {
    GymFull,
    Barbell,
    Dumbbells,
    HomeDb,
    BandsOnly,
}

/// Tags a profile's equipment access unlocks.
pub fn equipment_tags(set: EquipmentSet) -> &'static [EquipmentTag] {
    match set {
        EquipmentSet::GymFull => &[EquipmentTag::GymFull, EquipmentTag::Barbell, EquipmentTag::Dumbbells],
        EquipmentSet::Barbell => &[EquipmentTag::Barbell, EquipmentTag::GymFull],
        EquipmentSet::HomeDb => &[EquipmentTag::HomeDb, EquipmentTag::Dumbbells],
        EquipmentSet::BandsOnly => &[EquipmentTag::BandsOnly],
    }
}

// ---------------------------------------------------------------------------
/// Demand: per-attribute stress an exercise puts on the body
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Demand {
    pub axial: u8,
    pub iap: u8,
    pub balance: u8,
    pub grip: u8,
    pub carry: u8,
    /// 0 none, 1 low, 2 moderate, 3 high
    pub impact: u8,
    /// 0 none, 1 brief, 2 moderate, 3 sustained
    pub isometric: u8,
    /// Abdominal wall pressure level; only rated for trunk flexion/plank work
    pub abdominal_pressure: Option<u8>,
}

impl Demand {
    /// Resolution for any attribute an entry leaves out
    pub const UNSPECIFIED: Demand = Demand {
        axial: 1,
        iap: 1,
        balance: 1,
        grip: 1,
        carry: 0,
        impact: 0,
        isometric: 0,
        abdominal_pressure: None,
    };

    const NONE: Demand = Demand {
        axial: 0,
        iap: 0,
        balance: 0,
        grip: 0,
        carry: 0,
        impact: 0,
        isometric: 0,
        abdominal_pressure: None,
    };
}

#[derive(Debug, Clone, Copy)]
pub struct Exercise {
    pub name: &'static str,
    pub pattern: Pattern,
    pub position: Position,
    pub demand: Demand,
    pub equipment: &'static [EquipmentTag],
}

impl Exercise {
    pub fn fits(&self, available: &[EquipmentTag]) -> bool {
        self.equipment.iter().any(|tag| available.contains(tag))
    }

    pub fn uses_barbell(&self) -> bool {
        self.equipment.contains(&EquipmentTag::Barbell)
    }
}

const fn ex(
    name: &'static str,
    pattern: Pattern,
    position: Position,
    demand: Demand,
    equipment: &'static [EquipmentTag],
) -> Exercise {
    Exercise {
        name,
        pattern,
        position,
        demand,
        equipment,
    }
}

use EquipmentTag::{Barbell, BandsOnly, Dumbbells, GymFull, HomeDb};
use Pattern::*;
use Position::*;

const BARBELL: &[EquipmentTag] = &[Barbell, GymFull];
const DB: &[EquipmentTag] = &[Dumbbells, GymFull, HomeDb];
const GYM: &[EquipmentTag] = &[GymFull];
const GYM_HOME: &[EquipmentTag] = &[GymFull, HomeDb];
const ANY: &[EquipmentTag] = &[BandsOnly, HomeDb, GymFull];

const U: Demand = Demand::UNSPECIFIED;
const Z: Demand = Demand::NONE;

// ---------------------------------------------------------------------------
/// Catalog
// ---------------------------------------------------------------------------

pub static CATALOG: &[Exercise] = &[
    // Squat
    ex("Back Squat (barbell)", Squat, Standing, Demand { axial: 3, iap: 3, balance: 2, ..U }, BARBELL),
    ex("Front Squat (barbell)", Squat, Standing, Demand { axial: 3, iap: 3, balance: 2, ..U }, BARBELL),
    ex("Goblet Squat", Squat, Standing, Demand { axial: 2, iap: 2, balance: 2, ..U }, DB),
    ex("Box Goblet Squat", Squat, Standing, Demand { axial: 1, iap: 2, balance: 1, ..U }, DB),
    ex("Leg Press (machine)", Squat, Seated, Demand { axial: 1, iap: 1, balance: 0, ..U }, GYM),
    ex("Sit-to-Stand (bench)", Squat, Seated, Demand { axial: 0, iap: 0, balance: 0, ..U }, ANY),
    // Hinge
    ex("Deadlift (barbell)", Hinge, Standing, Demand { axial: 2, iap: 3, balance: 2, ..U }, BARBELL),
    ex("Trap Bar Deadlift", Hinge, Standing, Demand { axial: 2, iap: 3, balance: 2, ..U }, GYM),
    ex("Romanian Deadlift (DB)", Hinge, Standing, Demand { axial: 1, iap: 2, balance: 2, ..U }, DB),
    ex("Supported DB RDL (hands on bench)", Hinge, Standing, Demand { axial: 1, iap: 1, balance: 1, ..U }, DB),
    ex("Cable Pull-Through", Hinge, Standing, Demand { axial: 0, iap: 1, balance: 1, ..U }, GYM),
    ex("Hip Hinge Drill (dowel/wall)", Hinge, Standing, Demand { axial: 0, iap: 0, balance: 0, ..U }, ANY),
    ex("Seated Hip Hinge (band)", Hinge, Seated, Demand { axial: 0, iap: 0, balance: 0, grip: 0, ..U }, ANY),
    // Push
    ex("Bench Press (barbell)", Push, Supine, Demand { iap: 2, grip: 2, ..U }, BARBELL),
    ex("Incline DB Press", Push, Incline, Demand { iap: 1, grip: 2, ..U }, DB),
    ex("Landmine Press", Push, Standing, Demand { iap: 1, grip: 1, ..U }, GYM),
    ex("Seated Machine Press", Push, Seated, Demand { iap: 1, grip: 1, ..U }, GYM),
    ex("Push-up (incline)", Push, Standing, Demand { iap: 1, grip: 1, isometric: 1, ..U }, ANY),
    // Pull
    ex("Barbell Row", Pull, Standing, Demand { iap: 2, balance: 2, grip: 2, ..U }, BARBELL),
    ex("Chest-Supported Row", Pull, Supported, Demand { iap: 1, balance: 0, grip: 2, ..U }, GYM_HOME),
    ex("Seated Cable Row", Pull, Seated, Demand { iap: 1, balance: 0, grip: 1, ..U }, GYM),
    ex("Lat Pulldown", Pull, Seated, Demand { iap: 1, balance: 0, grip: 1, ..U }, GYM),
    ex("Band Row", Pull, Standing, Demand { iap: 0, balance: 0, grip: 0, ..U }, ANY),
    ex("Seated Band Row", Pull, Seated, Demand { iap: 0, balance: 0, grip: 0, ..U }, ANY),
    // Core / carry
    ex("Suitcase Carry", CarryCore, Standing, Demand { iap: 2, carry: 2, grip: 2, ..U }, DB),
    ex("Farmer Carry (light)", CarryCore, Standing, Demand { iap: 2, carry: 2, grip: 2, ..U }, DB),
    ex("Pallof Press (anti-rotation)", CarryCore, Standing, Demand { iap: 0, grip: 0, isometric: 1, ..U }, ANY),
    ex(
        "Side Plank (modified)",
        CarryCore,
        Side,
        Demand { iap: 1, grip: 0, isometric: 2, abdominal_pressure: Some(2), ..U },
        ANY,
    ),
    ex("Dead Bug (no doming)", CarryCore, Supine, Demand { iap: 0, grip: 0, abdominal_pressure: Some(1), ..U }, ANY),
    ex("Seated Pallof Press", CarryCore, Seated, Demand { iap: 0, grip: 0, balance: 0, isometric: 1, ..U }, ANY),
    // Accessories
    ex("Hip Thrust (bench)", Accessories, Supine, Demand { iap: 1, ..U }, GYM_HOME),
    ex("Glute Bridge", Accessories, Supine, Demand { iap: 0, ..U }, ANY),
    ex("Glute Bridge Hold (short)", Accessories, Supine, Demand { iap: 0, isometric: 2, ..U }, ANY),
    ex("Step-ups (low)", Accessories, Standing, Demand { iap: 1, balance: 2, impact: 1, ..U }, GYM_HOME),
    ex("Split Squat (short ROM)", Accessories, Standing, Demand { iap: 2, balance: 2, ..U }, GYM_HOME),
    ex("Wall Sit (short)", Accessories, Standing, Demand { iap: 1, isometric: 3, ..U }, ANY),
    ex("Band Pull-Aparts", Accessories, Standing, Demand { iap: 0, ..U }, ANY),
    ex("Face Pull", Accessories, Standing, Demand { iap: 0, ..U }, GYM),
    ex("Seated Band Abduction", Accessories, Seated, Demand { iap: 0, balance: 0, grip: 0, ..U }, ANY),
    ex("Side-lying Clam", Accessories, Side, Demand { iap: 0, balance: 0, grip: 0, axial: 0, ..U }, ANY),
    // Mobility
    ex("90/90 Breathing (rib stack)", Mobility, Supine, Z, ANY),
    ex("Cat-Cow (gentle)", Mobility, Quadruped, Demand { grip: 1, ..Z }, ANY),
    ex("Side-lying Open Book", Mobility, Side, Z, ANY),
    ex("Supported Hip Flexor Stretch", Mobility, Supported, Demand { balance: 1, ..Z }, ANY),
    ex("Seated Thoracic Rotation", Mobility, Seated, Z, ANY),
];

pub fn exercises_for(pattern: Pattern) -> impl Iterator<Item = &'static Exercise> {
    CATALOG.iter().filter(move |e| e.pattern == pattern)
}

pub fn find(name: &str) -> Option<&'static Exercise> {
    CATALOG.iter().find(|e| e.name == name)
}
