//! Stage templates and session structure
//!
//! Each stage key owns a base template (name, default day count, intensity
//! band, RIR ranges, variant). The variant and the user's structural style
//! decide which blocks each training day carries.

use serde::{Deserialize, Serialize};

use crate::catalog::Pattern;
use crate::models::profile::ProgramStyle;
use crate::models::StageKey;

// ---------------------------------------------------------------------------
/// Intensity band: ordered from gentlest to hardest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityBand {
    VeryLow,
    Low,
    LowToModerate,
    Moderate,
    ModerateToHigh,
    High,
}

impl IntensityBand {
    const ORDER: [IntensityBand; 6] = [
        IntensityBand::VeryLow,
        IntensityBand::Low,
        IntensityBand::LowToModerate,
        IntensityBand::Moderate,
        IntensityBand::ModerateToHigh,
        IntensityBand::High,
    ];

    /// Move `steps` bands harder, stopping at `High`
    pub fn step_up(self, steps: u8) -> Self {
        let idx = Self::ORDER.iter().position(|b| *b == self).unwrap_or(0);
        let next = (idx + steps as usize).min(Self::ORDER.len() - 1);
        Self::ORDER[next]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntensityBand::VeryLow => "very_low",
            IntensityBand::Low => "low",
            IntensityBand::LowToModerate => "low_to_moderate",
            IntensityBand::Moderate => "moderate",
            IntensityBand::ModerateToHigh => "moderate_to_high",
            IntensityBand::High => "high",
        }
    }
}

impl std::fmt::Display for IntensityBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
/// RIR range, stored as "low-high"
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RirRange {
    pub low: u8,
    pub high: u8,
}

impl RirRange {
    pub const fn new(low: u8, high: u8) -> Self {
        Self { low, high }
    }

    /// Shift both ends; negative moves closer to failure, floored at 0
    pub fn shifted(self, delta: i32) -> Self {
        let shift = |v: u8| (i32::from(v) + delta).clamp(0, i32::from(u8::MAX)) as u8;
        Self::new(shift(self.low), shift(self.high))
    }
}

impl std::fmt::Display for RirRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

impl std::str::FromStr for RirRange {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (low, high) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid RIR range: {}", s))?;
        let low: u8 = low.trim().parse().map_err(|_| format!("Invalid RIR range: {}", s))?;
        let high: u8 = high.trim().parse().map_err(|_| format!("Invalid RIR range: {}", s))?;
        if low > high {
            return Err(format!("Invalid RIR range: {}", s));
        }
        Ok(Self::new(low, high))
    }
}

impl TryFrom<String> for RirRange {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RirRange> for String {
    fn from(value: RirRange) -> Self {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
/// Base dosage text and template variants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseDosage {
    pub main: String,
    pub accessory: String,
    pub rest: String,
}

impl BaseDosage {
    pub fn new(main: &str, accessory: &str, rest: &str) -> Self {
        Self {
            main: main.to_string(),
            accessory: accessory.to_string(),
            rest: rest.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateVariant {
    Preconception,
    Pregnancy,
    PregnancyMin,
    PostpartumRecon,
    PostpartumReload,
    Performance,
    Rehab,
}

impl TemplateVariant {
    pub fn base_dosage(&self) -> BaseDosage {
        match self {
            Self::Preconception => {
                BaseDosage::new("3-5 sets x 3-8 reps", "2-4 sets x 8-15 reps", "2-3 min main, 60-90s accessory")
            }
            Self::Pregnancy => {
                BaseDosage::new("2-4 sets x 5-10 reps", "1-3 sets x 8-15 reps", "90-150s main, 60-90s accessory")
            }
            Self::PregnancyMin => {
                BaseDosage::new("2-3 sets x 6-12 reps", "1-2 sets x 10-15 reps", "as needed; keep sessions 20–45 min")
            }
            Self::PostpartumRecon => BaseDosage::new("2-4 sets x 6-10 reps", "1-3 sets x 10-15 reps", "90-150s"),
            Self::PostpartumReload => {
                BaseDosage::new("3-5 sets x 4-8 reps", "2-4 sets x 8-15 reps", "2-3 min main, 60-120s accessory")
            }
            Self::Performance => BaseDosage::new(
                "3-6 sets x 3-6 reps (plus back-off)",
                "2-5 sets x 6-15 reps",
                "2-4 min main, 60-120s accessory",
            ),
            Self::Rehab => BaseDosage::new("2 sets x 6-10 reps @ easy (RIR 6-8)", "1-2 sets x 8-12 reps @ easy", "as needed"),
        }
    }

    /// Variants that open every session with a forced breathing warm-up:
    /// all pregnancy and postpartum ones
    fn has_breathing_warmup(&self) -> bool {
        !matches!(self, Self::Preconception | Self::Rehab)
    }
}

/// Stage-level template metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseTemplate {
    pub name: &'static str,
    pub default_days: u8,
    pub intensity: IntensityBand,
    pub rir_main: RirRange,
    pub rir_acc: RirRange,
    pub variant: TemplateVariant,
}

const fn t(
    name: &'static str,
    default_days: u8,
    intensity: IntensityBand,
    rir_main: RirRange,
    rir_acc: RirRange,
    variant: TemplateVariant,
) -> BaseTemplate {
    BaseTemplate {
        name,
        default_days,
        intensity,
        rir_main,
        rir_acc,
        variant,
    }
}

pub fn base_template(key: StageKey) -> BaseTemplate {
    use IntensityBand::*;
    match key {
        StageKey::Preconception => t(
            "Preconception Base",
            4,
            ModerateToHigh,
            RirRange::new(1, 3),
            RirRange::new(2, 4),
            TemplateVariant::Preconception,
        ),
        StageKey::T1 => t(
            "Pregnancy – 1st trimester",
            3,
            Moderate,
            RirRange::new(2, 4),
            RirRange::new(3, 5),
            TemplateVariant::Pregnancy,
        ),
        StageKey::T2 => t(
            "Pregnancy – 2nd trimester",
            3,
            LowToModerate,
            RirRange::new(3, 5),
            RirRange::new(3, 6),
            TemplateVariant::Pregnancy,
        ),
        StageKey::T3 => t(
            "Pregnancy – 3rd trimester",
            2,
            Low,
            RirRange::new(4, 6),
            RirRange::new(5, 7),
            TemplateVariant::PregnancyMin,
        ),
        StageKey::Pp0To6 => t(
            "Postpartum – 0 to 6 weeks (if cleared)",
            2,
            VeryLow,
            RirRange::new(6, 8),
            RirRange::new(6, 8),
            TemplateVariant::Rehab,
        ),
        StageKey::Pp6To16 => t(
            "Postpartum – 6 to 16 weeks",
            3,
            Low,
            RirRange::new(4, 6),
            RirRange::new(4, 7),
            TemplateVariant::PostpartumRecon,
        ),
        StageKey::Pp4To12m => t(
            "Postpartum – 4 to 12 months",
            3,
            Moderate,
            RirRange::new(2, 4),
            RirRange::new(2, 5),
            TemplateVariant::PostpartumReload,
        ),
        StageKey::Pp12mPlus => t(
            "Postpartum – 12+ months",
            4,
            ModerateToHigh,
            RirRange::new(1, 3),
            RirRange::new(2, 4),
            TemplateVariant::Performance,
        ),
    }
}

// ---------------------------------------------------------------------------
/// Blocks and session templates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub title: String,
    pub pattern: Pattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forced: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

impl Block {
    fn scored(title: &str, pattern: Pattern) -> Self {
        Self {
            title: title.to_string(),
            pattern,
            forced: None,
            optional: false,
        }
    }

    fn forced(title: &str, pattern: Pattern, exercise: &str) -> Self {
        Self {
            forced: Some(exercise.to_string()),
            ..Self::scored(title, pattern)
        }
    }

    fn optional(title: &str, pattern: Pattern) -> Self {
        Self {
            optional: true,
            ..Self::scored(title, pattern)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTemplate {
    pub name: String,
    pub blocks: Vec<Block>,
    pub dosage: BaseDosage,
}

pub const BREATHING_DRILL: &str = "90/90 Breathing (rib stack)";
pub const LATE_PREGNANCY_STRETCHES: [&str; 2] = ["Cat-Cow (gentle)", "Side-lying Open Book"];

fn core_carry() -> Block {
    Block::scored("Core / Carry", Pattern::CarryCore)
}

fn full_body_day() -> (Option<&'static str>, Vec<Block>) {
    (
        None,
        vec![
            Block::scored("Main Lift 1 (Squat pattern)", Pattern::Squat),
            Block::scored("Main Lift 2 (Hinge pattern)", Pattern::Hinge),
            Block::scored("Upper Push", Pattern::Push),
            Block::scored("Upper Pull", Pattern::Pull),
            core_carry(),
            Block::optional("Accessory (optional)", Pattern::Accessories),
        ],
    )
}

fn upper_lower_day(day: usize) -> (Option<&'static str>, Vec<Block>) {
    if day % 2 == 0 {
        (
            Some("Upper"),
            vec![
                Block::scored("Upper Push", Pattern::Push),
                Block::scored("Upper Pull", Pattern::Pull),
                Block::optional("Upper Accessory (optional)", Pattern::Accessories),
                core_carry(),
            ],
        )
    } else {
        (
            Some("Lower"),
            vec![
                Block::scored("Squat pattern", Pattern::Squat),
                Block::scored("Hinge pattern", Pattern::Hinge),
                Block::optional("Lower Accessory (optional)", Pattern::Accessories),
                core_carry(),
            ],
        )
    }
}

fn session_a(with_accessory: bool) -> (Option<&'static str>, Vec<Block>) {
    let mut blocks = vec![
        Block::scored("Squat pattern", Pattern::Squat),
        Block::scored("Upper Push", Pattern::Push),
        Block::scored("Upper Pull", Pattern::Pull),
        core_carry(),
    ];
    if with_accessory {
        blocks.push(Block::optional("Accessory (optional)", Pattern::Accessories));
    }
    (Some("Session A"), blocks)
}

fn session_b(with_accessory: bool) -> (Option<&'static str>, Vec<Block>) {
    let mut blocks = vec![
        Block::scored("Hinge pattern", Pattern::Hinge),
        Block::scored("Upper Push (variation)", Pattern::Push),
        Block::scored("Upper Pull (variation)", Pattern::Pull),
        core_carry(),
    ];
    if with_accessory {
        blocks.push(Block::optional("Accessory (optional)", Pattern::Accessories));
    }
    (Some("Session B"), blocks)
}

fn session_c() -> (Option<&'static str>, Vec<Block>) {
    (
        Some("Session C"),
        vec![
            Block::scored("Lower accessory / pump", Pattern::Accessories),
            Block::scored("Upper Pull (focus)", Pattern::Pull),
            Block::scored("Upper Push (focus)", Pattern::Push),
            core_carry(),
            Block::optional("Accessory (optional)", Pattern::Accessories),
        ],
    )
}

fn rehab_blocks() -> Vec<Block> {
    vec![
        Block::forced("Breathing + stack", Pattern::CarryCore, "Dead Bug (no doming)"),
        Block::forced("Sit-to-Stand / light squat", Pattern::Squat, "Sit-to-Stand (bench)"),
        Block::scored("Supported row", Pattern::Pull),
        Block::forced("Glute bridge", Pattern::Accessories, "Glute Bridge"),
        Block::forced("Anti-rotation", Pattern::CarryCore, "Pallof Press (anti-rotation)"),
    ]
}

/// Session templates for `days` training days.
///
/// The rehab variant ignores `style`. Warm-up and stretch blocks are added
/// around the structural blocks according to the variant.
pub fn build_template(days: u8, variant: TemplateVariant, style: ProgramStyle) -> Vec<SessionTemplate> {
    let dosage = variant.base_dosage();

    (0..days as usize)
        .map(|day| {
            let label = format!("Day {}", day + 1);

            if variant == TemplateVariant::Rehab {
                return SessionTemplate {
                    name: label,
                    blocks: rehab_blocks(),
                    dosage: dosage.clone(),
                };
            }

            let (suffix, mut blocks) = match style {
                ProgramStyle::FullBody => full_body_day(),
                ProgramStyle::UpperLower => upper_lower_day(day),
                ProgramStyle::AbSplit if day % 2 == 0 => session_a(true),
                ProgramStyle::AbSplit => session_b(true),
                ProgramStyle::AbcRotation => match day % 3 {
                    0 => session_a(false),
                    1 => session_b(false),
                    _ => session_c(),
                },
            };

            if variant.has_breathing_warmup() {
                blocks.insert(
                    0,
                    Block::forced("Warm-up: breathing + stack", Pattern::Mobility, BREATHING_DRILL),
                );
            }
            match variant {
                TemplateVariant::PregnancyMin => blocks.push(Block::forced(
                    "Stretch (gentle)",
                    Pattern::Mobility,
                    LATE_PREGNANCY_STRETCHES[day % 2],
                )),
                TemplateVariant::Pregnancy => {
                    blocks.push(Block::optional("Mobility finisher (optional)", Pattern::Mobility))
                }
                _ => {}
            }

            let name = match suffix {
                Some(suffix) => format!("{} ({})", label, suffix),
                None => label,
            };
            SessionTemplate {
                name,
                blocks,
                dosage: dosage.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(session: &SessionTemplate) -> Vec<&str> {
        session.blocks.iter().map(|b| b.title.as_str()).collect()
    }

    #[test]
    fn test_full_body_preconception_has_no_extras() {
        let sessions = build_template(3, TemplateVariant::Preconception, ProgramStyle::FullBody);
        assert_eq!(sessions.len(), 3);
        assert_eq!(sessions[1].name, "Day 2");
        assert_eq!(
            titles(&sessions[0]),
            vec![
                "Main Lift 1 (Squat pattern)",
                "Main Lift 2 (Hinge pattern)",
                "Upper Push",
                "Upper Pull",
                "Core / Carry",
                "Accessory (optional)"
            ]
        );
        assert!(sessions[0].blocks[5].optional);
    }

    #[test]
    fn test_upper_lower_alternates() {
        let sessions = build_template(4, TemplateVariant::Performance, ProgramStyle::UpperLower);
        assert_eq!(sessions[0].name, "Day 1 (Upper)");
        assert_eq!(sessions[1].name, "Day 2 (Lower)");
        assert_eq!(sessions[2].blocks[1].pattern, Pattern::Push);
        assert_eq!(sessions[3].blocks[1].pattern, Pattern::Squat);
        for s in &sessions {
            assert!(s.blocks.iter().any(|b| b.pattern == Pattern::CarryCore));
            assert!(s.blocks.iter().any(|b| b.pattern == Pattern::Accessories));
        }
    }

    #[test]
    fn test_ab_split_and_abc_rotation_cycle() {
        let ab = build_template(3, TemplateVariant::Preconception, ProgramStyle::AbSplit);
        assert_eq!(ab[0].name, "Day 1 (Session A)");
        assert_eq!(ab[1].name, "Day 2 (Session B)");
        assert_eq!(ab[2].name, "Day 3 (Session A)");
        assert_eq!(ab[0].blocks, ab[2].blocks);

        let abc = build_template(4, TemplateVariant::Preconception, ProgramStyle::AbcRotation);
        assert_eq!(abc[2].name, "Day 3 (Session C)");
        assert_eq!(abc[3].name, "Day 4 (Session A)");
        assert_eq!(abc[2].blocks[0].title, "Lower accessory / pump");
        assert_eq!(abc[0].blocks.len(), 4);
    }

    #[test]
    fn test_rehab_ignores_style() {
        let sessions = build_template(2, TemplateVariant::Rehab, ProgramStyle::AbcRotation);
        for s in &sessions {
            assert_eq!(s.blocks.len(), 5);
            assert_eq!(s.blocks.iter().filter(|b| b.forced.is_some()).count(), 4);
            assert_eq!(s.blocks[2].pattern, Pattern::Pull);
            assert!(s.blocks[2].forced.is_none());
        }
        assert_eq!(sessions[0].name, "Day 1");
        assert_eq!(sessions[0].dosage.rest, "as needed");
    }

    #[test]
    fn test_pregnancy_variants_add_warmup_and_stretches() {
        let late = build_template(2, TemplateVariant::PregnancyMin, ProgramStyle::FullBody);
        for s in &late {
            assert_eq!(s.blocks[0].forced.as_deref(), Some(BREATHING_DRILL));
        }
        assert_eq!(late[0].blocks.last().unwrap().forced.as_deref(), Some("Cat-Cow (gentle)"));
        assert_eq!(late[1].blocks.last().unwrap().forced.as_deref(), Some("Side-lying Open Book"));

        let mid = build_template(1, TemplateVariant::Pregnancy, ProgramStyle::FullBody);
        let finisher = mid[0].blocks.last().unwrap();
        assert_eq!(finisher.pattern, Pattern::Mobility);
        assert!(finisher.optional);
        assert!(finisher.forced.is_none());

        let recon = build_template(1, TemplateVariant::PostpartumRecon, ProgramStyle::FullBody);
        assert_eq!(recon[0].blocks[0].forced.as_deref(), Some(BREATHING_DRILL));
        assert_eq!(recon[0].blocks.last().unwrap().pattern, Pattern::Accessories);

        let late_pp = build_template(3, TemplateVariant::Performance, ProgramStyle::AbcRotation);
        for s in &late_pp {
            assert_eq!(s.blocks[0].forced.as_deref(), Some(BREATHING_DRILL));
        }
        let rehab = build_template(1, TemplateVariant::Rehab, ProgramStyle::FullBody);
        assert_eq!(rehab[0].blocks.len(), 5);
    }

    #[test]
    fn test_base_template_table() {
        let t3 = base_template(StageKey::T3);
        assert_eq!(t3.default_days, 2);
        assert_eq!(t3.variant, TemplateVariant::PregnancyMin);
        assert_eq!(t3.rir_acc, RirRange::new(5, 7));
        assert_eq!(base_template(StageKey::Pp0To6).variant, TemplateVariant::Rehab);
        assert_eq!(base_template(StageKey::Pp12mPlus).intensity, IntensityBand::ModerateToHigh);
    }

    #[test]
    fn test_rir_range_text_form() {
        let r: RirRange = "4-6".parse().unwrap();
        assert_eq!(r, RirRange::new(4, 6));
        assert_eq!(serde_json::to_value(r).unwrap(), "4-6");
        assert!("6-4".parse::<RirRange>().is_err());
        assert!("four".parse::<RirRange>().is_err());
        assert_eq!(RirRange::new(1, 3).shifted(-2), RirRange::new(0, 1));
    }

    #[test]
    fn test_intensity_steps() {
        assert_eq!(IntensityBand::Low.step_up(1), IntensityBand::LowToModerate);
        assert_eq!(IntensityBand::ModerateToHigh.step_up(2), IntensityBand::High);
        assert!(IntensityBand::VeryLow < IntensityBand::High);
    }
}
