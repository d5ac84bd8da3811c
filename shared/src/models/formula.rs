//! Formula request models

use rust_decimal::Decimal;
use serde::Serialize;

use super::oil::{bounded_mass, OilInput};
use crate::types::{DisplayUnit, LyeChoice, LyeType, WaterMethod};

pub const SUPERFAT_MAX_PERCENT: i64 = 20;
pub const PURITY_MIN_PERCENT: i64 = 90;
pub const CONCENTRATION_MIN_PERCENT: i64 = 20;
pub const CONCENTRATION_MAX_PERCENT: i64 = 50;
pub const RATIO_MIN: i64 = 1;
pub const RATIO_MAX: i64 = 4;
pub const WATER_PERCENT_MAX: i64 = 1000;

fn clamp(value: Decimal, min: i64, max: i64) -> Decimal {
    value.clamp(Decimal::from(min), Decimal::from(max))
}

/// A fragrance or essential oil row
///
/// Either side may be missing; the additives stage derives it from the oils total.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FragranceInput {
    pub name: String,
    pub mass_g: Option<Decimal>,
    pub percent_of_oils: Option<Decimal>,
}

impl FragranceInput {
    pub fn by_mass(name: impl Into<String>, mass_g: Decimal) -> Self {
        Self {
            name: name.into(),
            mass_g: Some(bounded_mass(mass_g)),
            percent_of_oils: None,
        }
    }

    pub fn by_percent(name: impl Into<String>, percent: Decimal) -> Self {
        Self {
            name: name.into(),
            mass_g: None,
            percent_of_oils: Some(clamp(percent, 0, 100)),
        }
    }
}

/// Percent-of-oils additive knobs
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdditiveSettings {
    pub lactate_percent: Decimal,
    pub sugar_percent: Decimal,
    pub salt_percent: Decimal,
    pub citric_percent: Decimal,
    pub lactate_name: String,
    pub sugar_name: String,
    pub salt_name: String,
    pub citric_name: String,
}

impl Default for AdditiveSettings {
    fn default() -> Self {
        Self {
            lactate_percent: Decimal::ZERO,
            sugar_percent: Decimal::ZERO,
            salt_percent: Decimal::ZERO,
            citric_percent: Decimal::ZERO,
            lactate_name: "Sodium lactate".to_string(),
            sugar_name: "Sugar".to_string(),
            salt_name: "Salt".to_string(),
            citric_name: "Citric acid".to_string(),
        }
    }
}

impl AdditiveSettings {
    /// Clamp every percentage to 0-100
    pub fn clamped(mut self) -> Self {
        self.lactate_percent = clamp(self.lactate_percent, 0, 100);
        self.sugar_percent = clamp(self.sugar_percent, 0, 100);
        self.salt_percent = clamp(self.salt_percent, 0, 100);
        self.citric_percent = clamp(self.citric_percent, 0, 100);
        self
    }
}

/// Lye selection after normalization
///
/// `lye_type` and `purity_percent` are the resolved values; a 90% KOH
/// choice always carries a purity of 90.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LyeSettings {
    pub choice: LyeChoice,
    pub lye_type: LyeType,
    pub superfat_percent: Decimal,
    pub purity_percent: Decimal,
}

impl LyeSettings {
    pub fn new(choice: LyeChoice, superfat_percent: Decimal, purity_percent: Decimal) -> Self {
        let superfat_percent = clamp(superfat_percent, 0, SUPERFAT_MAX_PERCENT);
        let purity_percent = clamp(purity_percent, PURITY_MIN_PERCENT, 100);
        let (lye_type, purity_percent) = choice.resolve(purity_percent);
        Self {
            choice,
            lye_type,
            superfat_percent,
            purity_percent,
        }
    }
}

/// Water specification, one value per method
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WaterSettings {
    pub method: WaterMethod,
    pub water_percent: Decimal,
    pub lye_concentration: Decimal,
    pub water_lye_ratio: Decimal,
}

impl WaterSettings {
    pub fn new(
        method: WaterMethod,
        water_percent: Decimal,
        lye_concentration: Decimal,
        water_lye_ratio: Decimal,
    ) -> Self {
        Self {
            method,
            water_percent: clamp(water_percent, 0, WATER_PERCENT_MAX),
            lye_concentration: clamp(
                lye_concentration,
                CONCENTRATION_MIN_PERCENT,
                CONCENTRATION_MAX_PERCENT,
            ),
            water_lye_ratio: clamp(water_lye_ratio, RATIO_MIN, RATIO_MAX),
        }
    }

    pub fn percent(water_percent: Decimal) -> Self {
        Self::new(
            WaterMethod::Percent,
            water_percent,
            Decimal::from(33),
            Decimal::from(2),
        )
    }

    pub fn concentration(lye_concentration: Decimal) -> Self {
        Self::new(
            WaterMethod::Concentration,
            Decimal::from(33),
            lye_concentration,
            Decimal::from(2),
        )
    }

    pub fn ratio(water_lye_ratio: Decimal) -> Self {
        Self::new(
            WaterMethod::Ratio,
            Decimal::from(33),
            Decimal::from(33),
            water_lye_ratio,
        )
    }
}

/// Everything one calculation needs, built once by the parse boundary
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComputeRequest {
    pub oils: Vec<OilInput>,
    pub fragrances: Vec<FragranceInput>,
    pub additives: AdditiveSettings,
    pub lye: LyeSettings,
    pub water: WaterSettings,
    pub unit: DisplayUnit,
}
