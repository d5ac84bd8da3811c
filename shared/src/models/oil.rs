//! Oil rows and fatty-acid profiles

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fatty acid keys the quality formulas read
pub mod acids {
    pub const LAURIC: &str = "lauric";
    pub const MYRISTIC: &str = "myristic";
    pub const PALMITIC: &str = "palmitic";
    pub const STEARIC: &str = "stearic";
    pub const RICINOLEIC: &str = "ricinoleic";
    pub const OLEIC: &str = "oleic";
    pub const LINOLEIC: &str = "linoleic";
    pub const LINOLENIC: &str = "linolenic";

    pub const KNOWN: [&str; 8] = [
        LAURIC, MYRISTIC, PALMITIC, STEARIC, RICINOLEIC, OLEIC, LINOLEIC, LINOLENIC,
    ];
}

/// SAP values at or below this are read as decimal (g lye per g oil) and scaled by 1000.
///
/// A value of exactly 1.0 is ambiguous: it is treated as decimal, giving 1000 mg/g.
pub const DECIMAL_SAP_THRESHOLD: Decimal = Decimal::ONE;

/// Largest mass accepted for any single row, in grams
pub const MAX_MASS_G: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);
/// Masses are held to the microgram
pub const MASS_DP: u32 = 6;
/// Largest SAP accepted, mg KOH/g
pub const MAX_SAP_KOH: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);
/// SAP values are held to 0.001 mg KOH/g
pub const SAP_DP: u32 = 3;
pub const MAX_IODINE: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);

/// Clamp a mass to `0..=MAX_MASS_G` and round it to the microgram
pub fn bounded_mass(mass_g: Decimal) -> Decimal {
    mass_g.clamp(Decimal::ZERO, MAX_MASS_G).round_dp(MASS_DP)
}

/// Fatty acid weight percentages for one oil (or a blend)
///
/// Acids that are not present read as zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct FattyAcidProfile(BTreeMap<String, Decimal>);

impl FattyAcidProfile {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set an acid percentage; the key is lowercased and the value clamped to 0-100
    pub fn set(&mut self, acid: &str, percent: Decimal) {
        let percent = percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        self.0.insert(acid.trim().to_lowercase(), percent);
    }

    pub fn with(mut self, acid: &str, percent: Decimal) -> Self {
        self.set(acid, percent);
        self
    }

    pub fn get(&self, acid: &str) -> Decimal {
        self.0.get(acid).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Decimal)> {
        self.0.iter()
    }

    pub fn lauric_myristic(&self) -> Decimal {
        self.get(acids::LAURIC) + self.get(acids::MYRISTIC)
    }

    pub fn palmitic_stearic(&self) -> Decimal {
        self.get(acids::PALMITIC) + self.get(acids::STEARIC)
    }

    /// Linoleic + linolenic
    pub fn polyunsaturated(&self) -> Decimal {
        self.get(acids::LINOLEIC) + self.get(acids::LINOLENIC)
    }
}

/// One oil row of a formula
///
/// Build through [`OilInput::new`] so the SAP value is normalized to mg KOH/g.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OilInput {
    pub name: String,
    pub mass_g: Decimal,
    /// mg KOH per gram, already up-scaled when supplied in decimal form
    pub sap_koh: Decimal,
    /// The SAP value arrived as a decimal and was multiplied by 1000
    pub sap_was_decimal: bool,
    pub iodine: Option<Decimal>,
    pub fatty_acids: Option<FattyAcidProfile>,
    /// Catalog reference, echoed and never interpreted
    pub ingredient_id: Option<String>,
    /// Catalog source tag, echoed and never interpreted
    pub source: Option<String>,
}

impl OilInput {
    pub fn new(name: impl Into<String>, mass_g: Decimal, sap: Decimal) -> Self {
        let (sap_koh, sap_was_decimal) = normalize_sap_koh(sap);
        Self {
            name: name.into(),
            mass_g: bounded_mass(mass_g),
            sap_koh,
            sap_was_decimal,
            iodine: None,
            fatty_acids: None,
            ingredient_id: None,
            source: None,
        }
    }

    pub fn with_iodine(mut self, iodine: Decimal) -> Self {
        self.iodine = Some(iodine.clamp(Decimal::ZERO, MAX_IODINE));
        self
    }

    /// Attach a profile; an empty profile counts as no profile
    pub fn with_fatty_acids(mut self, profile: FattyAcidProfile) -> Self {
        self.fatty_acids = if profile.is_empty() { None } else { Some(profile) };
        self
    }

    pub fn with_catalog_refs(
        mut self,
        ingredient_id: Option<String>,
        source: Option<String>,
    ) -> Self {
        self.ingredient_id = ingredient_id;
        self.source = source;
        self
    }

    pub fn has_mass(&self) -> bool {
        self.mass_g > Decimal::ZERO
    }
}

/// Bring a SAP value onto the mg KOH/g scale.
///
/// Returns the scaled value and whether the decimal form was detected.
/// Values above [`MAX_SAP_KOH`] are capped there; values that round to zero read as missing.
pub fn normalize_sap_koh(raw: Decimal) -> (Decimal, bool) {
    if raw <= Decimal::ZERO {
        return (Decimal::ZERO, false);
    }
    let (scaled, was_decimal) = if raw <= DECIMAL_SAP_THRESHOLD {
        (raw * Decimal::from(1000), true)
    } else {
        (raw.min(MAX_SAP_KOH), false)
    };
    let scaled = scaled.round_dp(SAP_DP);
    if scaled <= Decimal::ZERO {
        (Decimal::ZERO, false)
    } else {
        (scaled, was_decimal)
    }
}
