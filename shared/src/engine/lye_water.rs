//! Lye and water calculation
//!
//! Converts oil masses and SAP values into lye mass, applies superfat and
//! purity, then sizes the water by the selected method. The adjusted lye mass
//! never depends on the water method.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{LyeSettings, OilInput, WaterSettings};
use crate::types::{safe_div, LyeType, WaterMethod};

/// Converts a KOH-basis SAP value into its NaOH equivalent.
///
/// Not the citric acid neutralization factor; see `additives::CITRIC_LYE_FACTOR_*`.
pub const KOH_TO_NAOH_SAP_FACTOR: Decimal = Decimal::from_parts(713, 0, 0, false, 3);

/// Grams of NaOH per gram of oil when no oil carries a usable SAP value
pub const FALLBACK_NAOH_PER_GRAM: Decimal = Decimal::from_parts(138, 0, 0, false, 3);

/// Grams of KOH per gram of oil when no oil carries a usable SAP value
pub const FALLBACK_KOH_PER_GRAM: Decimal = Decimal::from_parts(194, 0, 0, false, 3);

const MG_PER_G: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Output of the lye/water stage
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LyeWaterResult {
    pub total_oils_g: Decimal,
    pub lye_type: LyeType,
    /// Stoichiometric lye before superfat
    pub lye_total_g: Decimal,
    /// After superfat
    pub lye_pure_g: Decimal,
    /// After superfat and purity; the base lye mass to weigh out
    pub lye_adjusted_g: Decimal,
    pub water_g: Decimal,
    pub lye_concentration_pct: Decimal,
    pub water_lye_ratio: Decimal,
    /// Mass-weighted average SAP (mg KOH/g) over oils with a usable SAP
    pub sap_avg_koh: Decimal,
    pub used_sap_fallback: bool,
    /// Stoichiometric lye per oil row, same order as the input
    pub per_oil_lye_g: Vec<Decimal>,
}

/// Grams of lye needed per gram of an oil with this SAP value
pub fn lye_per_gram(sap_koh: Decimal, lye_type: LyeType) -> Decimal {
    match lye_type {
        LyeType::KOH => sap_koh / MG_PER_G,
        LyeType::NaOH => sap_koh * KOH_TO_NAOH_SAP_FACTOR / MG_PER_G,
    }
}

pub fn fallback_per_gram(lye_type: LyeType) -> Decimal {
    match lye_type {
        LyeType::NaOH => FALLBACK_NAOH_PER_GRAM,
        LyeType::KOH => FALLBACK_KOH_PER_GRAM,
    }
}

/// Water mass for the selected method
///
/// The percent method is anchored to the oils; the other two to the adjusted lye.
pub fn water_for(water: &WaterSettings, total_oils_g: Decimal, lye_adjusted_g: Decimal) -> Decimal {
    match water.method {
        WaterMethod::Percent => total_oils_g * water.water_percent / Decimal::ONE_HUNDRED,
        WaterMethod::Concentration => {
            if lye_adjusted_g.is_zero() || water.lye_concentration.is_zero() {
                Decimal::ZERO
            } else {
                lye_adjusted_g * (Decimal::ONE_HUNDRED - water.lye_concentration)
                    / water.lye_concentration
            }
        }
        WaterMethod::Ratio => lye_adjusted_g * water.water_lye_ratio,
    }
}

/// Run the lye/water stage
pub fn compute(oils: &[OilInput], lye: &LyeSettings, water: &WaterSettings) -> LyeWaterResult {
    let lye_type = lye.lye_type;
    let total_oils_g: Decimal = oils.iter().map(|oil| oil.mass_g).sum();

    let mut per_oil_lye_g = Vec::with_capacity(oils.len());
    let mut lye_total_g = Decimal::ZERO;
    let mut sap_mass = Decimal::ZERO;
    let mut sap_weighted = Decimal::ZERO;

    for oil in oils {
        if oil.has_mass() && oil.sap_koh > Decimal::ZERO {
            let lye_g = oil.mass_g * lye_per_gram(oil.sap_koh, lye_type);
            lye_total_g += lye_g;
            sap_mass += oil.mass_g;
            sap_weighted += oil.mass_g * oil.sap_koh;
            per_oil_lye_g.push(lye_g);
        } else {
            per_oil_lye_g.push(Decimal::ZERO);
        }
    }

    let mut used_sap_fallback = false;
    if total_oils_g > Decimal::ZERO && lye_total_g.is_zero() {
        let factor = fallback_per_gram(lye_type);
        tracing::warn!(
            %total_oils_g,
            %factor,
            "no oil carries a usable SAP value; applying fallback lye factor"
        );
        lye_total_g = total_oils_g * factor;
        per_oil_lye_g = oils.iter().map(|oil| oil.mass_g * factor).collect();
        used_sap_fallback = true;
    }

    let sap_avg_koh = safe_div(sap_weighted, sap_mass);
    let lye_pure_g =
        lye_total_g * (Decimal::ONE - lye.superfat_percent / Decimal::ONE_HUNDRED);
    let lye_adjusted_g = safe_div(lye_pure_g, lye.purity_percent / Decimal::ONE_HUNDRED);

    let water_g = water_for(water, total_oils_g, lye_adjusted_g);
    let lye_concentration_pct =
        safe_div(lye_adjusted_g, lye_adjusted_g + water_g) * Decimal::ONE_HUNDRED;
    let water_lye_ratio = safe_div(water_g, lye_adjusted_g);

    debug_assert!(lye_adjusted_g >= Decimal::ZERO, "negative lye mass");
    debug_assert!(water_g >= Decimal::ZERO, "negative water mass");

    LyeWaterResult {
        total_oils_g,
        lye_type,
        lye_total_g,
        lye_pure_g,
        lye_adjusted_g,
        water_g,
        lye_concentration_pct,
        water_lye_ratio,
        sap_avg_koh,
        used_sap_fallback,
        per_oil_lye_g,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LyeChoice;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn olive_coconut() -> Vec<OilInput> {
        vec![
            OilInput::new("Olive oil", Decimal::from(500), Decimal::from(190)),
            OilInput::new("Coconut oil", Decimal::from(150), Decimal::from(180)),
        ]
    }

    fn naoh_5() -> LyeSettings {
        LyeSettings::new(LyeChoice::SodiumHydroxide, Decimal::from(5), Decimal::from(100))
    }

    #[test]
    fn test_olive_coconut_percent_method() {
        let water = WaterSettings::percent(Decimal::from(33));
        let result = compute(&olive_coconut(), &naoh_5(), &water);

        assert_eq!(result.total_oils_g, Decimal::from(650));
        assert_eq!(result.water_g, dec("214.5"));
        // (500*190 + 150*180) * 0.713 / 1000 = 86.986
        assert_eq!(result.lye_total_g, dec("86.986"));
        assert_eq!(result.lye_adjusted_g, dec("82.6367"));
        assert!(!result.used_sap_fallback);
    }

    #[test]
    fn test_methods_agree_on_lye() {
        let oils = olive_coconut();
        let lye = naoh_5();
        let by_percent = compute(&oils, &lye, &WaterSettings::percent(Decimal::from(33)));
        let by_concentration =
            compute(&oils, &lye, &WaterSettings::concentration(Decimal::from(30)));
        let by_ratio = compute(&oils, &lye, &WaterSettings::ratio(dec("2.5")));

        assert_eq!(by_percent.lye_adjusted_g, by_concentration.lye_adjusted_g);
        assert_eq!(by_percent.lye_adjusted_g, by_ratio.lye_adjusted_g);
    }

    #[test]
    fn test_concentration_method_round_trips() {
        let water = WaterSettings::concentration(Decimal::from(30));
        let result = compute(&olive_coconut(), &naoh_5(), &water);
        let diff = (result.lye_concentration_pct - Decimal::from(30)).abs();
        assert!(diff < dec("0.000001"));
    }

    #[test]
    fn test_ratio_method() {
        let water = WaterSettings::ratio(Decimal::from(2));
        let result = compute(&olive_coconut(), &naoh_5(), &water);
        assert_eq!(result.water_g, result.lye_adjusted_g * Decimal::from(2));
        assert_eq!(result.water_lye_ratio, Decimal::from(2));
    }

    #[test]
    fn test_koh_uses_raw_sap() {
        let lye = LyeSettings::new(
            LyeChoice::PotassiumHydroxide,
            Decimal::ZERO,
            Decimal::ONE_HUNDRED,
        );
        let oils = vec![OilInput::new("Olive oil", Decimal::from(100), Decimal::from(190))];
        let result = compute(&oils, &lye, &WaterSettings::percent(Decimal::from(33)));
        assert_eq!(result.lye_adjusted_g, Decimal::from(19));
    }

    #[test]
    fn test_purity_scales_up_lye() {
        let lye = LyeSettings::new(
            LyeChoice::PotassiumHydroxide90,
            Decimal::ZERO,
            Decimal::ONE_HUNDRED,
        );
        let oils = vec![OilInput::new("Olive oil", Decimal::from(90), Decimal::from(200))];
        let result = compute(&oils, &lye, &WaterSettings::percent(Decimal::from(33)));
        // 90 * 0.2 = 18 pure, / 0.9 = 20
        assert_eq!(result.lye_pure_g, Decimal::from(18));
        assert_eq!(result.lye_adjusted_g, Decimal::from(20));
    }

    #[test]
    fn test_fallback_naoh() {
        let oils = vec![OilInput::new("Unknown butter", Decimal::from(400), Decimal::ZERO)];
        let lye = LyeSettings::new(LyeChoice::SodiumHydroxide, Decimal::ZERO, Decimal::ONE_HUNDRED);
        let result = compute(&oils, &lye, &WaterSettings::percent(Decimal::from(33)));
        assert!(result.used_sap_fallback);
        assert_eq!(result.lye_total_g, Decimal::from(400) * FALLBACK_NAOH_PER_GRAM);
        assert_eq!(result.lye_adjusted_g, dec("55.2"));
    }

    #[test]
    fn test_fallback_koh() {
        let oils = vec![OilInput::new("Unknown butter", Decimal::from(100), Decimal::ZERO)];
        let lye = LyeSettings::new(
            LyeChoice::PotassiumHydroxide,
            Decimal::ZERO,
            Decimal::ONE_HUNDRED,
        );
        let result = compute(&oils, &lye, &WaterSettings::percent(Decimal::from(33)));
        assert!(result.used_sap_fallback);
        assert_eq!(result.lye_adjusted_g, dec("19.4"));
    }

    #[test]
    fn test_zero_oils_are_safe() {
        for water in [
            WaterSettings::percent(Decimal::from(33)),
            WaterSettings::concentration(Decimal::from(33)),
            WaterSettings::ratio(Decimal::from(2)),
        ] {
            let result = compute(&[], &naoh_5(), &water);
            assert_eq!(result.total_oils_g, Decimal::ZERO);
            assert_eq!(result.lye_adjusted_g, Decimal::ZERO);
            assert_eq!(result.water_g, Decimal::ZERO);
            assert_eq!(result.lye_concentration_pct, Decimal::ZERO);
            assert_eq!(result.water_lye_ratio, Decimal::ZERO);
            assert!(!result.used_sap_fallback);
        }
    }

    #[test]
    fn test_zero_mass_oils_are_safe() {
        let oils = vec![OilInput::new("Olive oil", Decimal::ZERO, Decimal::from(190))];
        let result = compute(&oils, &naoh_5(), &WaterSettings::concentration(Decimal::from(33)));
        assert_eq!(result.lye_adjusted_g, Decimal::ZERO);
        assert_eq!(result.sap_avg_koh, Decimal::ZERO);
    }

    #[test]
    fn test_sap_average_is_mass_weighted() {
        let water = WaterSettings::percent(Decimal::from(33));
        let result = compute(&olive_coconut(), &naoh_5(), &water);
        // (500*190 + 150*180) / 650
        let expected = Decimal::from(122000) / Decimal::from(650);
        assert_eq!(result.sap_avg_koh, expected);
    }
}
