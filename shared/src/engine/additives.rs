//! Fragrance and additive masses, plus the extra lye citric acid consumes

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{AdditiveSettings, FragranceInput};
use crate::types::{percent_of, LyeType};

/// Grams of KOH consumed per gram of citric acid.
///
/// Not the SAP conversion constant; see `lye_water::KOH_TO_NAOH_SAP_FACTOR`.
pub const CITRIC_LYE_FACTOR_KOH: Decimal = Decimal::from_parts(71, 0, 0, false, 2);

/// Grams of NaOH consumed per gram of citric acid.
pub const CITRIC_LYE_FACTOR_NAOH: Decimal = Decimal::from_parts(624, 0, 0, false, 3);

pub fn citric_lye_factor(lye_type: LyeType) -> Decimal {
    match lye_type {
        LyeType::KOH => CITRIC_LYE_FACTOR_KOH,
        LyeType::NaOH => CITRIC_LYE_FACTOR_NAOH,
    }
}

/// A fragrance row with both sides resolved
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FragranceRow {
    pub name: String,
    pub mass_g: Decimal,
    pub percent_of_oils: Decimal,
}

/// One percent-of-oils additive
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdditiveAmount {
    pub name: String,
    pub percent_of_oils: Decimal,
    pub mass_g: Decimal,
}

impl AdditiveAmount {
    fn from_percent(name: &str, percent: Decimal, total_oils_g: Decimal) -> Self {
        Self {
            name: name.to_string(),
            percent_of_oils: percent,
            mass_g: total_oils_g * percent / Decimal::ONE_HUNDRED,
        }
    }

    pub fn is_present(&self) -> bool {
        self.mass_g > Decimal::ZERO
    }
}

/// Output of the additives stage
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdditivesResult {
    pub fragrances: Vec<FragranceRow>,
    pub fragrance_total_g: Decimal,
    pub fragrance_total_pct: Decimal,
    pub lactate: AdditiveAmount,
    pub sugar: AdditiveAmount,
    pub salt: AdditiveAmount,
    pub citric: AdditiveAmount,
    /// Multiplier applied to the citric acid mass
    pub citric_lye_factor: Decimal,
    /// Extra lye needed to neutralize the citric acid
    pub citric_lye_g: Decimal,
}

impl AdditivesResult {
    /// Additives in display order
    pub fn amounts(&self) -> [&AdditiveAmount; 4] {
        [&self.lactate, &self.sugar, &self.salt, &self.citric]
    }
}

/// Resolve a fragrance row against the oils total; rows with neither side are dropped
pub fn resolve_fragrance(row: &FragranceInput, total_oils_g: Decimal) -> Option<FragranceRow> {
    let (mass_g, percent_of_oils) = match (row.mass_g, row.percent_of_oils) {
        (Some(mass), Some(percent)) => (mass, percent),
        (Some(mass), None) => (mass, percent_of(mass, total_oils_g)),
        (None, Some(percent)) => (total_oils_g * percent / Decimal::ONE_HUNDRED, percent),
        (None, None) => return None,
    };
    Some(FragranceRow {
        name: row.name.clone(),
        mass_g,
        percent_of_oils,
    })
}

/// Run the additives stage
pub fn compute(
    total_oils_g: Decimal,
    lye_type: LyeType,
    settings: &AdditiveSettings,
    fragrances: &[FragranceInput],
) -> AdditivesResult {
    let fragrances: Vec<FragranceRow> = fragrances
        .iter()
        .filter_map(|row| resolve_fragrance(row, total_oils_g))
        .collect();
    let fragrance_total_g = fragrances.iter().map(|row| row.mass_g).sum();
    let fragrance_total_pct = fragrances.iter().map(|row| row.percent_of_oils).sum();

    let lactate = AdditiveAmount::from_percent(
        &settings.lactate_name,
        settings.lactate_percent,
        total_oils_g,
    );
    let sugar =
        AdditiveAmount::from_percent(&settings.sugar_name, settings.sugar_percent, total_oils_g);
    let salt =
        AdditiveAmount::from_percent(&settings.salt_name, settings.salt_percent, total_oils_g);
    let citric =
        AdditiveAmount::from_percent(&settings.citric_name, settings.citric_percent, total_oils_g);

    let citric_lye_factor = citric_lye_factor(lye_type);
    let citric_lye_g = citric.mass_g * citric_lye_factor;

    AdditivesResult {
        fragrances,
        fragrance_total_g,
        fragrance_total_pct,
        lactate,
        sugar,
        salt,
        citric,
        citric_lye_factor,
        citric_lye_g,
    }
}
