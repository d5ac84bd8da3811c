//! Common types used across the formulation engine

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lye option as chosen by the user
///
/// The 90% KOH option is a distinct choice because it pins purity; see
/// [`LyeChoice::resolve`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LyeChoice {
    #[default]
    SodiumHydroxide,
    PotassiumHydroxide,
    PotassiumHydroxide90,
}

impl LyeChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            LyeChoice::SodiumHydroxide => "naoh",
            LyeChoice::PotassiumHydroxide => "koh",
            LyeChoice::PotassiumHydroxide90 => "koh90",
        }
    }

    /// Accepts the short codes plus the long chemical names
    pub fn from_str(s: &str) -> Option<Self> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "naoh" | "sodiumhydroxide" | "sodium" => Some(LyeChoice::SodiumHydroxide),
            "koh" | "potassiumhydroxide" | "potassium" => Some(LyeChoice::PotassiumHydroxide),
            "koh90" | "koh90percent" | "potassiumhydroxide90" => {
                Some(LyeChoice::PotassiumHydroxide90)
            }
            _ => None,
        }
    }

    /// Normalize the choice into the chemical used and the purity that applies.
    ///
    /// Runs once when the request is built. The 90% KOH option always yields a
    /// purity of exactly 90 regardless of what was requested.
    pub fn resolve(&self, requested_purity: Decimal) -> (LyeType, Decimal) {
        match self {
            LyeChoice::SodiumHydroxide => (LyeType::NaOH, requested_purity),
            LyeChoice::PotassiumHydroxide => (LyeType::KOH, requested_purity),
            LyeChoice::PotassiumHydroxide90 => (LyeType::KOH, Decimal::from(90)),
        }
    }
}

impl std::fmt::Display for LyeChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LyeChoice::SodiumHydroxide => write!(f, "Sodium hydroxide (NaOH)"),
            LyeChoice::PotassiumHydroxide => write!(f, "Potassium hydroxide (KOH)"),
            LyeChoice::PotassiumHydroxide90 => write!(f, "Potassium hydroxide (KOH, 90%)"),
        }
    }
}

/// Lye chemical actually used in the calculation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LyeType {
    #[serde(rename = "naoh")]
    NaOH,
    #[serde(rename = "koh")]
    KOH,
}

impl LyeType {
    pub fn is_potassium(&self) -> bool {
        matches!(self, LyeType::KOH)
    }
}

impl std::fmt::Display for LyeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LyeType::NaOH => write!(f, "NaOH"),
            LyeType::KOH => write!(f, "KOH"),
        }
    }
}

/// How the water amount is specified
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WaterMethod {
    /// Water as a percentage of total oils
    #[default]
    Percent,
    /// Lye as a percentage of the lye solution
    Concentration,
    /// Water mass per unit of lye mass
    Ratio,
}

impl WaterMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaterMethod::Percent => "percent",
            WaterMethod::Concentration => "concentration",
            WaterMethod::Ratio => "ratio",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "percent" | "water_percent" | "percent_of_oils" => Some(WaterMethod::Percent),
            "concentration" | "lye_concentration" => Some(WaterMethod::Concentration),
            "ratio" | "water_lye_ratio" | "water_to_lye_ratio" => Some(WaterMethod::Ratio),
            _ => None,
        }
    }
}

impl std::fmt::Display for WaterMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaterMethod::Percent => write!(f, "Water as % of oils"),
            WaterMethod::Concentration => write!(f, "Lye concentration"),
            WaterMethod::Ratio => write!(f, "Water : lye ratio"),
        }
    }
}

/// Unit used for displayed and exported quantities
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    #[default]
    Gram,
    Ounce,
    Pound,
}

impl DisplayUnit {
    pub fn code(&self) -> &'static str {
        match self {
            DisplayUnit::Gram => "g",
            DisplayUnit::Ounce => "oz",
            DisplayUnit::Pound => "lb",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "g" | "gram" | "grams" => Some(DisplayUnit::Gram),
            "oz" | "ounce" | "ounces" => Some(DisplayUnit::Ounce),
            "lb" | "lbs" | "pound" | "pounds" => Some(DisplayUnit::Pound),
            _ => None,
        }
    }

    /// Grams per one display unit
    pub fn grams_per_unit(&self) -> Decimal {
        match self {
            DisplayUnit::Gram => Decimal::ONE,
            DisplayUnit::Ounce => Decimal::new(283495, 4),
            DisplayUnit::Pound => Decimal::new(453592, 3),
        }
    }

    /// Convert an internal gram value into this unit
    pub fn from_grams(&self, grams: Decimal) -> Decimal {
        grams / self.grams_per_unit()
    }

    /// Decimal places shown for quantities in this unit
    pub fn display_precision(&self) -> u32 {
        match self {
            DisplayUnit::Gram | DisplayUnit::Ounce => 2,
            DisplayUnit::Pound => 3,
        }
    }
}

/// The five blended quality scores a formula can be steered on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QualityAxis {
    Hardness,
    Cleansing,
    Conditioning,
    Bubbly,
    Creamy,
}

impl QualityAxis {
    pub const ALL: [QualityAxis; 5] = [
        QualityAxis::Hardness,
        QualityAxis::Cleansing,
        QualityAxis::Conditioning,
        QualityAxis::Bubbly,
        QualityAxis::Creamy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityAxis::Hardness => "hardness",
            QualityAxis::Cleansing => "cleansing",
            QualityAxis::Conditioning => "conditioning",
            QualityAxis::Bubbly => "bubbly",
            QualityAxis::Creamy => "creamy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        QualityAxis::ALL
            .into_iter()
            .find(|axis| axis.as_str() == s.trim().to_lowercase())
    }
}

impl std::fmt::Display for QualityAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityAxis::Hardness => write!(f, "Hardness"),
            QualityAxis::Cleansing => write!(f, "Cleansing"),
            QualityAxis::Conditioning => write!(f, "Conditioning"),
            QualityAxis::Bubbly => write!(f, "Bubbly"),
            QualityAxis::Creamy => write!(f, "Creamy"),
        }
    }
}

/// Division that yields zero instead of faulting on a zero denominator
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Share of `part` in `whole`, 0-100
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    safe_div(part, whole) * Decimal::ONE_HUNDRED
}
