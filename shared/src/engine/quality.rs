//! Quality and advisory report
//!
//! Threshold-driven warnings plus visual/process guidance. Both lists keep
//! generation order and never repeat an entry.

use rust_decimal::Decimal;
use serde::Serialize;

use super::additives::AdditivesResult;
use super::fatty_acids::{FattyAcidMetrics, QualityScores};
use super::lye_water::LyeWaterResult;
use crate::models::OilInput;
use crate::types::{percent_of, QualityAxis};

pub const IODINE_MAX: i64 = 70;
pub const INS_MIN: i64 = 136;
pub const INS_MAX: i64 = 170;
pub const PUFA_MAX_PERCENT: i64 = 15;
pub const LAURIC_MYRISTIC_MAX_PERCENT: i64 = 35;
pub const LAURIC_MYRISTIC_GUIDANCE_PERCENT: i64 = 30;
pub const SUPERFAT_HIGH_PERCENT: i64 = 15;
pub const CONCENTRATION_LOW_PERCENT: i64 = 27;
pub const CONCENTRATION_HIGH_PERCENT: i64 = 40;
pub const FRAGRANCE_MAX_PERCENT: i64 = 3;
pub const DOMINANT_OIL_PERCENT: i64 = 90;

pub const NO_GUIDANCE: &str = "No visual or process flags for this formula.";

/// Recommended range for a quality score
pub fn recommended_range(axis: QualityAxis) -> (Decimal, Decimal) {
    let (min, max) = match axis {
        QualityAxis::Hardness => (29, 54),
        QualityAxis::Cleansing => (12, 22),
        QualityAxis::Conditioning => (44, 69),
        QualityAxis::Bubbly => (14, 46),
        QualityAxis::Creamy => (16, 48),
    };
    (Decimal::from(min), Decimal::from(max))
}

/// Append `item` unless already present
pub(crate) fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

/// Combined quality picture of a formula
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QualityReport {
    pub iodine: Decimal,
    /// SAP average minus iodine, 0 unless both are positive
    pub ins: Decimal,
    pub sap_avg_koh: Decimal,
    pub qualities: QualityScores,
    pub saturated_pct: Decimal,
    pub unsaturated_pct: Decimal,
    pub lauric_myristic_pct: Decimal,
    pub polyunsaturated_pct: Decimal,
    /// Share of the oils mass that carried a fatty acid profile
    pub profile_coverage_pct: Decimal,
    /// Share of the oils mass that carried an iodine value
    pub iodine_coverage_pct: Decimal,
    pub warnings: Vec<String>,
    pub guidance: Vec<String>,
}

/// Everything the report reads
pub struct ReportInputs<'a> {
    pub oils: &'a [OilInput],
    pub fatty_acids: &'a FattyAcidMetrics,
    pub lye_water: &'a LyeWaterResult,
    pub superfat_percent: Decimal,
    pub additives: &'a AdditivesResult,
}

pub fn ins_value(sap_avg_koh: Decimal, iodine: Decimal) -> Decimal {
    if sap_avg_koh > Decimal::ZERO && iodine > Decimal::ZERO {
        sap_avg_koh - iodine
    } else {
        Decimal::ZERO
    }
}

/// Build the report
pub fn build(inputs: &ReportInputs<'_>) -> QualityReport {
    let fatty = inputs.fatty_acids;
    let lye_water = inputs.lye_water;
    let total_oils_g = lye_water.total_oils_g;

    let ins = ins_value(lye_water.sap_avg_koh, fatty.iodine);
    let lauric_myristic_pct = fatty.blend.lauric_myristic();
    let polyunsaturated_pct = fatty.blend.polyunsaturated();

    let warnings = collect_warnings(inputs, ins, lauric_myristic_pct, polyunsaturated_pct);
    let guidance = collect_guidance(inputs, lauric_myristic_pct);

    QualityReport {
        iodine: fatty.iodine,
        ins,
        sap_avg_koh: lye_water.sap_avg_koh,
        qualities: fatty.qualities,
        saturated_pct: fatty.saturated_pct,
        unsaturated_pct: fatty.unsaturated_pct,
        lauric_myristic_pct,
        polyunsaturated_pct,
        profile_coverage_pct: percent_of(fatty.profile_coverage_g, total_oils_g),
        iodine_coverage_pct: percent_of(fatty.iodine_coverage_g, total_oils_g),
        warnings,
        guidance,
    }
}

fn collect_warnings(
    inputs: &ReportInputs<'_>,
    ins: Decimal,
    lauric_myristic_pct: Decimal,
    polyunsaturated_pct: Decimal,
) -> Vec<String> {
    let fatty = inputs.fatty_acids;
    let lye_water = inputs.lye_water;
    let additives = inputs.additives;
    let mut warnings = Vec::new();

    if fatty.has_iodine() && fatty.iodine > Decimal::from(IODINE_MAX) {
        push_unique(
            &mut warnings,
            format!(
                "Iodine value {:.1} is above {}; expect a softer bar with a shorter shelf life.",
                fatty.iodine, IODINE_MAX
            ),
        );
    }

    if ins > Decimal::ZERO && (ins < Decimal::from(INS_MIN) || ins > Decimal::from(INS_MAX)) {
        push_unique(
            &mut warnings,
            format!("INS {:.1} is outside the {}-{} range.", ins, INS_MIN, INS_MAX),
        );
    }

    if fatty.has_profile() {
        let scores = &fatty.qualities;
        if polyunsaturated_pct > Decimal::from(PUFA_MAX_PERCENT) {
            push_unique(
                &mut warnings,
                format!(
                    "Linoleic + linolenic is {:.1}% of the blend; above {}% the bar is prone to rancidity (DOS).",
                    polyunsaturated_pct, PUFA_MAX_PERCENT
                ),
            );
        }

        let (hardness_min, _) = recommended_range(QualityAxis::Hardness);
        if scores.hardness < hardness_min {
            push_unique(
                &mut warnings,
                format!(
                    "Hardness {:.1} is below {}; the bar may be soft and slow to unmold.",
                    scores.hardness, hardness_min
                ),
            );
        }

        let (_, cleansing_max) = recommended_range(QualityAxis::Cleansing);
        if scores.cleansing > cleansing_max {
            push_unique(
                &mut warnings,
                format!(
                    "Cleansing {:.1} is above {}; the bar may feel drying.",
                    scores.cleansing, cleansing_max
                ),
            );
        }

        let (bubbly_min, _) = recommended_range(QualityAxis::Bubbly);
        if scores.bubbly < bubbly_min {
            push_unique(
                &mut warnings,
                format!(
                    "Bubbly {:.1} is below {}; expect little lather.",
                    scores.bubbly, bubbly_min
                ),
            );
        }

        if lauric_myristic_pct > Decimal::from(LAURIC_MYRISTIC_MAX_PERCENT) {
            push_unique(
                &mut warnings,
                format!(
                    "Lauric + myristic is {:.1}%; consider a higher superfat to offset harshness.",
                    lauric_myristic_pct
                ),
            );
        }
    }

    if inputs.superfat_percent >= Decimal::from(SUPERFAT_HIGH_PERCENT) {
        push_unique(
            &mut warnings,
            format!(
                "Superfat of {}% is high; the bar may be soft or turn rancid sooner.",
                inputs.superfat_percent.normalize()
            ),
        );
    }

    if lye_water.lye_adjusted_g > Decimal::ZERO {
        let concentration = lye_water.lye_concentration_pct;
        if concentration < Decimal::from(CONCENTRATION_LOW_PERCENT) {
            push_unique(
                &mut warnings,
                format!(
                    "Lye concentration {:.1}% is below {}%; extra water lengthens the cure and can cause soda ash.",
                    concentration, CONCENTRATION_LOW_PERCENT
                ),
            );
        } else if concentration > Decimal::from(CONCENTRATION_HIGH_PERCENT) {
            push_unique(
                &mut warnings,
                format!(
                    "Lye concentration {:.1}% is above {}%; the solution is strong and may seize or overheat.",
                    concentration, CONCENTRATION_HIGH_PERCENT
                ),
            );
        }
    }

    if additives.fragrance_total_pct > Decimal::from(FRAGRANCE_MAX_PERCENT) {
        push_unique(
            &mut warnings,
            format!(
                "Fragrance load is {:.1}% of oils, above {}%; check the supplier's usage rate.",
                additives.fragrance_total_pct, FRAGRANCE_MAX_PERCENT
            ),
        );
    }

    if additives.citric.is_present() {
        push_unique(
            &mut warnings,
            format!(
                "Citric acid consumes {:.2} g of extra lye ({} x citric acid mass); it is already added to the lye total.",
                additives.citric_lye_g,
                additives.citric_lye_factor.normalize()
            ),
        );
    }

    let weighed: Vec<&OilInput> = inputs.oils.iter().filter(|oil| oil.has_mass()).collect();
    if weighed.len() == 1 {
        push_unique(
            &mut warnings,
            format!(
                "Single-oil formula ({}); consider blending for a more balanced bar.",
                weighed[0].name
            ),
        );
    } else if let Some(dominant) = weighed.iter().find(|oil| {
        percent_of(oil.mass_g, lye_water.total_oils_g) > Decimal::from(DOMINANT_OIL_PERCENT)
    }) {
        push_unique(
            &mut warnings,
            format!(
                "{} makes up {:.1}% of the oils; a formula this dominated by one oil behaves like a single-oil soap.",
                dominant.name,
                percent_of(dominant.mass_g, lye_water.total_oils_g)
            ),
        );
    }

    warnings
}

fn collect_guidance(inputs: &ReportInputs<'_>, lauric_myristic_pct: Decimal) -> Vec<String> {
    let lye_water = inputs.lye_water;
    let additives = inputs.additives;
    let mut guidance = Vec::new();

    if lye_water.lye_adjusted_g > Decimal::ZERO {
        if lye_water.lye_concentration_pct < Decimal::from(CONCENTRATION_LOW_PERCENT) {
            push_unique(
                &mut guidance,
                "Water-rich batter: expect slower trace, a longer gel and a longer cure; watch for soda ash on top."
                    .to_string(),
            );
        } else if lye_water.lye_concentration_pct > Decimal::from(CONCENTRATION_HIGH_PERCENT) {
            push_unique(
                &mut guidance,
                "Strong lye solution: trace arrives quickly and the batter may overheat or crack; soap at cooler temperatures."
                    .to_string(),
            );
        }
    }

    if additives.sugar.is_present() {
        push_unique(
            &mut guidance,
            "Sugar boosts lather but adds heat; soap cooler or skip insulation to avoid cracking."
                .to_string(),
        );
    }

    if additives.salt.is_present() {
        push_unique(
            &mut guidance,
            "Salt hardens the bar quickly; plan to unmold and cut sooner than usual.".to_string(),
        );
    }

    if additives.lactate.is_present() {
        push_unique(
            &mut guidance,
            "Sodium lactate firms the bar for easier unmolding; add it to cooled lye water."
                .to_string(),
        );
    }

    if lauric_myristic_pct >= Decimal::from(LAURIC_MYRISTIC_GUIDANCE_PERCENT) {
        push_unique(
            &mut guidance,
            "High lauric/myristic content heats up fast and sets hard; cut within 12-24 hours to avoid crumbling."
                .to_string(),
        );
    }

    if guidance.is_empty() {
        guidance.push(NO_GUIDANCE.to_string());
    }
    guidance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{additives, fatty_acids, lye_water};
    use crate::models::{
        AdditiveSettings, FattyAcidProfile, FragranceInput, LyeSettings, WaterSettings,
    };
    use crate::types::LyeChoice;

    fn olive(grams: i64) -> OilInput {
        OilInput::new("Olive oil", Decimal::from(grams), Decimal::from(190))
            .with_iodine(Decimal::from(85))
            .with_fatty_acids(
                FattyAcidProfile::new()
                    .with("palmitic", Decimal::from(14))
                    .with("stearic", Decimal::from(3))
                    .with("oleic", Decimal::from(69))
                    .with("linoleic", Decimal::from(12))
                    .with("linolenic", Decimal::ONE),
            )
    }

    fn coconut(grams: i64) -> OilInput {
        OilInput::new("Coconut oil", Decimal::from(grams), Decimal::from(257))
            .with_iodine(Decimal::from(10))
            .with_fatty_acids(
                FattyAcidProfile::new()
                    .with("lauric", Decimal::from(48))
                    .with("myristic", Decimal::from(19))
                    .with("palmitic", Decimal::from(9))
                    .with("stearic", Decimal::from(3))
                    .with("oleic", Decimal::from(8))
                    .with("linoleic", Decimal::from(2)),
            )
    }

    fn report_for(
        oils: &[OilInput],
        superfat: i64,
        water: WaterSettings,
        settings: AdditiveSettings,
        fragrances: &[FragranceInput],
    ) -> QualityReport {
        let lye = LyeSettings::new(
            LyeChoice::SodiumHydroxide,
            Decimal::from(superfat),
            Decimal::from(100),
        );
        let lye_water = lye_water::compute(oils, &lye, &water);
        let additives =
            additives::compute(lye_water.total_oils_g, lye.lye_type, &settings, fragrances);
        let fatty_acids = fatty_acids::compute(oils);
        build(&ReportInputs {
            oils,
            fatty_acids: &fatty_acids,
            lye_water: &lye_water,
            superfat_percent: lye.superfat_percent,
            additives: &additives,
        })
    }

    #[test]
    fn test_single_oil_warning() {
        let report = report_for(
            &[olive(1000)],
            5,
            WaterSettings::concentration(Decimal::from(33)),
            AdditiveSettings::default(),
            &[],
        );
        assert!(report.warnings.iter().any(|w| w.starts_with("Single-oil formula")));
        assert!(report.warnings.iter().any(|w| w.starts_with("Iodine value 85.0")));
        assert!(report.warnings.iter().any(|w| w.starts_with("Hardness")));
    }

    #[test]
    fn test_dominant_oil_warning() {
        let report = report_for(
            &[olive(950), coconut(50)],
            5,
            WaterSettings::concentration(Decimal::from(33)),
            AdditiveSettings::default(),
            &[],
        );
        assert!(report.warnings.iter().any(|w| w.starts_with("Olive oil makes up 95.0%")));
        assert!(!report.warnings.iter().any(|w| w.starts_with("Single-oil")));
    }

    #[test]
    fn test_coconut_heavy_warnings_and_guidance() {
        let report = report_for(
            &[olive(300), coconut(700)],
            20,
            WaterSettings::concentration(Decimal::from(45)),
            AdditiveSettings::default(),
            &[],
        );
        assert!(report.warnings.iter().any(|w| w.starts_with("Cleansing")));
        assert!(report.warnings.iter().any(|w| w.starts_with("Lauric + myristic")));
        assert!(report.warnings.iter().any(|w| w.starts_with("Superfat of 20%")));
        assert!(report
            .warnings
            .iter()
            .any(|w| w.starts_with("Lye concentration") && w.contains("above 40%")));
        assert!(report.guidance.iter().any(|g| g.starts_with("Strong lye solution")));
        assert!(report.guidance.iter().any(|g| g.starts_with("High lauric/myristic")));
    }

    #[test]
    fn test_additive_guidance_and_warnings() {
        let settings = AdditiveSettings {
            sugar_percent: Decimal::ONE,
            salt_percent: Decimal::ONE,
            citric_percent: Decimal::ONE,
            ..Default::default()
        };
        let fragrances = vec![FragranceInput::by_percent("Lavender", Decimal::from(5))];
        let report = report_for(
            &[olive(600), coconut(400)],
            5,
            WaterSettings::concentration(Decimal::from(33)),
            settings,
            &fragrances,
        );
        assert!(report.warnings.iter().any(|w| w.starts_with("Fragrance load is 5.0%")));
        assert!(report.warnings.iter().any(|w| w.starts_with("Citric acid consumes 6.24 g")));
        assert!(report.guidance[0].starts_with("Sugar"));
        assert!(report.guidance.iter().any(|g| g.starts_with("Salt")));
    }

    #[test]
    fn test_no_flags_fallback() {
        let bare = vec![
            OilInput::new("Oil A", Decimal::from(500), Decimal::from(190)),
            OilInput::new("Oil B", Decimal::from(500), Decimal::from(190)),
        ];
        let report = report_for(
            &bare,
            5,
            WaterSettings::concentration(Decimal::from(33)),
            AdditiveSettings::default(),
            &[],
        );
        assert_eq!(report.guidance, vec![NO_GUIDANCE.to_string()]);
        assert!(report.warnings.is_empty());
        assert_eq!(report.profile_coverage_pct, Decimal::ZERO);
        assert_eq!(report.ins, Decimal::ZERO);
    }

    #[test]
    fn test_polyunsaturated_warning() {
        let sunflower = OilInput::new("Sunflower oil", Decimal::from(500), Decimal::from(189))
            .with_fatty_acids(
                FattyAcidProfile::new()
                    .with("palmitic", Decimal::from(6))
                    .with("stearic", Decimal::from(4))
                    .with("oleic", Decimal::from(30))
                    .with("linoleic", Decimal::from(60)),
            );
        let report = report_for(
            &[sunflower, olive(500)],
            5,
            WaterSettings::concentration(Decimal::from(33)),
            AdditiveSettings::default(),
            &[],
        );
        assert!(report.polyunsaturated_pct > Decimal::from(PUFA_MAX_PERCENT));
        assert!(report.warnings.iter().any(|w| w.starts_with("Linoleic + linolenic")));
    }

    #[test]
    fn test_ins_range_warning() {
        let low = report_for(
            &[olive(1000)],
            5,
            WaterSettings::concentration(Decimal::from(33)),
            AdditiveSettings::default(),
            &[],
        );
        assert_eq!(low.ins, Decimal::from(105));
        assert!(low.warnings.iter().any(|w| w.starts_with("INS ") && w.contains("136-170")));

        let mid = OilInput::new("Oil A", Decimal::from(1000), Decimal::from(190))
            .with_iodine(Decimal::from(40));
        let report = report_for(
            &[mid],
            5,
            WaterSettings::concentration(Decimal::from(33)),
            AdditiveSettings::default(),
            &[],
        );
        assert_eq!(report.ins, Decimal::from(150));
        assert!(!report.warnings.iter().any(|w| w.starts_with("INS ")));
    }

    #[test]
    fn test_bubbly_floor() {
        let flat = report_for(
            &[olive(500), olive(500)],
            5,
            WaterSettings::concentration(Decimal::from(33)),
            AdditiveSettings::default(),
            &[],
        );
        assert!(flat.warnings.iter().any(|w| w.starts_with("Bubbly")));

        let at_floor = OilInput::new("Oil A", Decimal::from(1000), Decimal::from(190))
            .with_fatty_acids(
                FattyAcidProfile::new()
                    .with("lauric", Decimal::from(14))
                    .with("palmitic", Decimal::from(20))
                    .with("oleic", Decimal::from(60)),
            );
        let report = report_for(
            &[at_floor],
            5,
            WaterSettings::concentration(Decimal::from(33)),
            AdditiveSettings::default(),
            &[],
        );
        assert_eq!(report.qualities.bubbly, Decimal::from(14));
        assert!(!report.warnings.iter().any(|w| w.starts_with("Bubbly")));
    }

    #[test]
    fn test_low_concentration_warning_and_guidance() {
        let report = report_for(
            &[olive(600), coconut(400)],
            5,
            WaterSettings::concentration(Decimal::from(20)),
            AdditiveSettings::default(),
            &[],
        );
        assert!(report
            .warnings
            .iter()
            .any(|w| w.starts_with("Lye concentration") && w.contains("below 27%")));
        assert!(report.guidance.iter().any(|g| g.starts_with("Water-rich batter")));
        assert!(!report.guidance.iter().any(|g| g.starts_with("Strong lye solution")));
    }

    #[test]
    fn test_ins_requires_both_values() {
        assert_eq!(ins_value(Decimal::from(190), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(ins_value(Decimal::ZERO, Decimal::from(50)), Decimal::ZERO);
        assert_eq!(ins_value(Decimal::from(190), Decimal::from(50)), Decimal::from(140));
    }

    #[test]
    fn test_report_is_deterministic() {
        let oils = [olive(700), coconut(300)];
        let water = WaterSettings::percent(Decimal::from(38));
        let first = report_for(&oils, 5, water.clone(), AdditiveSettings::default(), &[]);
        let second = report_for(&oils, 5, water, AdditiveSettings::default(), &[]);
        assert_eq!(first.warnings, second.warnings);
        assert_eq!(first.guidance, second.guidance);
    }

    #[test]
    fn test_push_unique() {
        let mut list = Vec::new();
        push_unique(&mut list, "a".to_string());
        push_unique(&mut list, "b".to_string());
        push_unique(&mut list, "a".to_string());
        assert_eq!(list, vec!["a".to_string(), "b".to_string()]);
    }
}
