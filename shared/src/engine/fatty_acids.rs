//! Fatty acid aggregation: iodine, blended profile, quality scores

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{acids, FattyAcidProfile, OilInput};
use crate::types::{safe_div, QualityAxis};

/// The five hardness-family scores, each on the 0-100 acid-percent scale
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
pub struct QualityScores {
    pub hardness: Decimal,
    pub cleansing: Decimal,
    pub conditioning: Decimal,
    pub bubbly: Decimal,
    pub creamy: Decimal,
}

impl QualityScores {
    pub fn from_profile(profile: &FattyAcidProfile) -> Self {
        let lauric = profile.get(acids::LAURIC);
        let myristic = profile.get(acids::MYRISTIC);
        let palmitic = profile.get(acids::PALMITIC);
        let stearic = profile.get(acids::STEARIC);
        let ricinoleic = profile.get(acids::RICINOLEIC);

        Self {
            hardness: lauric + myristic + palmitic + stearic,
            cleansing: lauric + myristic,
            conditioning: profile.get(acids::OLEIC)
                + profile.get(acids::LINOLEIC)
                + profile.get(acids::LINOLENIC)
                + ricinoleic,
            bubbly: lauric + myristic + ricinoleic,
            creamy: palmitic + stearic + ricinoleic,
        }
    }

    pub fn get(&self, axis: QualityAxis) -> Decimal {
        match axis {
            QualityAxis::Hardness => self.hardness,
            QualityAxis::Cleansing => self.cleansing,
            QualityAxis::Conditioning => self.conditioning,
            QualityAxis::Bubbly => self.bubbly,
            QualityAxis::Creamy => self.creamy,
        }
    }
}

/// Aggregated fatty acid metrics for a formula
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct FattyAcidMetrics {
    /// Mass-weighted iodine over oils that supplied one
    pub iodine: Decimal,
    pub iodine_coverage_g: Decimal,
    /// Mass-weighted acid percentages over oils that supplied a profile
    pub blend: FattyAcidProfile,
    pub profile_coverage_g: Decimal,
    pub qualities: QualityScores,
    /// Lauric + myristic + palmitic + stearic
    pub saturated_pct: Decimal,
    /// Ricinoleic + oleic + linoleic + linolenic
    pub unsaturated_pct: Decimal,
}

impl FattyAcidMetrics {
    pub fn has_profile(&self) -> bool {
        self.profile_coverage_g > Decimal::ZERO
    }

    pub fn has_iodine(&self) -> bool {
        self.iodine_coverage_g > Decimal::ZERO
    }
}

/// Mass-weighted blend of the oils that carry a profile.
///
/// Returns the blend and the mass it covers. Oils without a profile carry no
/// weight at all; they are not counted as all-zero profiles.
pub fn blend_profile<'a, I>(rows: I) -> (FattyAcidProfile, Decimal)
where
    I: IntoIterator<Item = (Decimal, &'a FattyAcidProfile)>,
{
    let mut sums: std::collections::BTreeMap<String, Decimal> = std::collections::BTreeMap::new();
    let mut coverage = Decimal::ZERO;

    for (mass_g, profile) in rows {
        if mass_g <= Decimal::ZERO {
            continue;
        }
        coverage += mass_g;
        for (acid, percent) in profile.iter() {
            *sums.entry(acid.clone()).or_insert(Decimal::ZERO) += mass_g * *percent;
        }
    }

    let mut blend = FattyAcidProfile::new();
    for (acid, weighted) in sums {
        blend.set(&acid, safe_div(weighted, coverage));
    }
    (blend, coverage)
}

/// Blended quality scores for arbitrary per-oil masses
pub fn qualities_for<'a, I>(rows: I) -> QualityScores
where
    I: IntoIterator<Item = (Decimal, &'a FattyAcidProfile)>,
{
    let (blend, _) = blend_profile(rows);
    QualityScores::from_profile(&blend)
}

/// Run the fatty acid stage
pub fn compute(oils: &[OilInput]) -> FattyAcidMetrics {
    let mut iodine_coverage_g = Decimal::ZERO;
    let mut iodine_weighted = Decimal::ZERO;
    for oil in oils.iter().filter(|oil| oil.has_mass()) {
        if let Some(iodine) = oil.iodine {
            iodine_coverage_g += oil.mass_g;
            iodine_weighted += oil.mass_g * iodine;
        }
    }

    let (blend, profile_coverage_g) = blend_profile(
        oils.iter()
            .filter_map(|oil| oil.fatty_acids.as_ref().map(|profile| (oil.mass_g, profile))),
    );
    let qualities = QualityScores::from_profile(&blend);

    let saturated_pct = blend.lauric_myristic() + blend.palmitic_stearic();
    let unsaturated_pct = blend.get(acids::RICINOLEIC)
        + blend.get(acids::OLEIC)
        + blend.get(acids::LINOLEIC)
        + blend.get(acids::LINOLENIC);

    FattyAcidMetrics {
        iodine: safe_div(iodine_weighted, iodine_coverage_g),
        iodine_coverage_g,
        blend,
        profile_coverage_g,
        qualities,
        saturated_pct,
        unsaturated_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn olive() -> OilInput {
        OilInput::new("Olive oil", Decimal::from(700), Decimal::from(190))
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

    fn coconut() -> OilInput {
        OilInput::new("Coconut oil", Decimal::from(300), Decimal::from(257))
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

    #[test]
    fn test_quality_formulas() {
        let profile = FattyAcidProfile::new()
            .with("lauric", Decimal::from(10))
            .with("myristic", Decimal::from(5))
            .with("palmitic", Decimal::from(20))
            .with("stearic", Decimal::from(4))
            .with("ricinoleic", Decimal::from(3))
            .with("oleic", Decimal::from(40))
            .with("linoleic", Decimal::from(7))
            .with("linolenic", Decimal::ONE);
        let scores = QualityScores::from_profile(&profile);
        assert_eq!(scores.hardness, Decimal::from(39));
        assert_eq!(scores.cleansing, Decimal::from(15));
        assert_eq!(scores.conditioning, Decimal::from(51));
        assert_eq!(scores.bubbly, Decimal::from(18));
        assert_eq!(scores.creamy, Decimal::from(27));
    }

    #[test]
    fn test_blend_is_mass_weighted() {
        let metrics = compute(&[olive(), coconut()]);
        // oleic: (700*69 + 300*8) / 1000
        assert_eq!(metrics.blend.get(acids::OLEIC), "50.7".parse::<Decimal>().unwrap());
        assert_eq!(metrics.profile_coverage_g, Decimal::from(1000));
        assert_eq!(metrics.iodine, "62.5".parse::<Decimal>().unwrap());
        assert_eq!(
            metrics.saturated_pct,
            metrics.qualities.hardness
        );
    }

    #[test]
    fn test_oil_without_profile_is_excluded() {
        let bare = OilInput::new("Mystery", Decimal::from(1000), Decimal::from(190));
        let with_bare = compute(&[olive(), bare]);
        let without = compute(&[olive()]);
        assert_eq!(with_bare.blend, without.blend);
        assert_eq!(with_bare.profile_coverage_g, Decimal::from(700));
        assert_eq!(with_bare.iodine_coverage_g, Decimal::from(700));
    }

    #[test]
    fn test_empty_oils() {
        let metrics = compute(&[]);
        assert_eq!(metrics.iodine, Decimal::ZERO);
        assert!(!metrics.has_profile());
        assert_eq!(metrics.qualities, QualityScores::default());
    }

    #[test]
    fn test_zero_mass_oil_is_ignored() {
        let mut idle = coconut();
        idle.mass_g = Decimal::ZERO;
        let metrics = compute(&[olive(), idle]);
        assert_eq!(metrics.blend.get(acids::LAURIC), Decimal::ZERO);
    }
}
