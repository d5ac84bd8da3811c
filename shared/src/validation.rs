//! Parse boundary for loosely typed formula payloads
//!
//! Every field is read by one function with a documented default. Malformed,
//! missing or out-of-range values degrade to that default; nothing here fails.
//! Untyped JSON never travels past this module.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::engine::NudgeRequest;
use crate::models::{
    bounded_mass, AdditiveSettings, ComputeRequest, FattyAcidProfile, FragranceInput, LyeSettings,
    OilInput, WaterSettings, MAX_IODINE, MAX_MASS_G, MAX_SAP_KOH, WATER_PERCENT_MAX,
};
use crate::types::{DisplayUnit, LyeChoice, QualityAxis, WaterMethod};

pub const DEFAULT_SUPERFAT_PERCENT: i64 = 5;
pub const DEFAULT_PURITY_PERCENT: i64 = 100;
pub const DEFAULT_WATER_PERCENT: i64 = 33;
pub const DEFAULT_LYE_CONCENTRATION: i64 = 33;
pub const DEFAULT_WATER_LYE_RATIO: i64 = 2;

// ============================================================================
// Scalars
// ============================================================================

/// Read a number from a JSON number or a numeric string
pub fn parse_decimal(value: Option<&Value>) -> Option<Decimal> {
    let text = match value? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// A number no larger than `max`; anything above it is malformed
pub fn parse_bounded(value: Option<&Value>, max: Decimal) -> Option<Decimal> {
    parse_decimal(value).filter(|number| *number <= max)
}

/// Number with a default when missing or malformed
pub fn decimal_or(value: Option<&Value>, default: Decimal) -> Decimal {
    parse_decimal(value).unwrap_or(default)
}

/// Mass in grams; missing, malformed, negative or oversized values read as 0
pub fn parse_mass(value: Option<&Value>) -> Decimal {
    parse_bounded(value, MAX_MASS_G).map_or(Decimal::ZERO, bounded_mass)
}

/// Trimmed non-empty text
pub fn parse_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First key present and non-null in an object
fn field<'a>(object: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn section<'a>(payload: &'a Value, key: &str) -> &'a Value {
    static EMPTY: Value = Value::Null;
    payload.get(key).unwrap_or(&EMPTY)
}

/// Object entries of an array field; anything else in the array is skipped
fn items<'a>(payload: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|item| item.is_object())
}

// ============================================================================
// Oils and fragrance
// ============================================================================

/// Acid -> percent object; non-numeric entries are skipped
pub fn parse_fatty_acids(value: Option<&Value>) -> Option<FattyAcidProfile> {
    let object = value?.as_object()?;
    let mut profile = FattyAcidProfile::new();
    for (acid, percent) in object {
        if let Some(percent) = parse_decimal(Some(percent)) {
            profile.set(acid, percent);
        }
    }
    if profile.is_empty() {
        None
    } else {
        Some(profile)
    }
}

pub fn parse_oil(value: &Value, index: usize) -> OilInput {
    let name = parse_text(field(value, &["name"])).unwrap_or_else(|| format!("Oil {}", index + 1));
    let mass_g = parse_mass(field(value, &["grams", "mass_g", "weight"]));
    let sap = parse_bounded(field(value, &["sap_koh", "sap"]), MAX_SAP_KOH).unwrap_or_default();

    let mut oil = OilInput::new(name, mass_g, sap).with_catalog_refs(
        parse_text(field(value, &["ingredient_id"])),
        parse_text(field(value, &["source"])),
    );
    if let Some(iodine) = parse_bounded(field(value, &["iodine"]), MAX_IODINE) {
        oil = oil.with_iodine(iodine);
    }
    let profile = parse_fatty_acids(field(value, &["fatty_acids", "fatty_acid_profile"]));
    if let Some(profile) = profile {
        oil = oil.with_fatty_acids(profile);
    }
    if oil.sap_was_decimal {
        tracing::debug!(
            oil = %oil.name,
            sap_koh = %oil.sap_koh,
            "decimal SAP value scaled to mg KOH/g"
        );
    }
    oil
}

pub fn parse_oils(payload: &Value) -> Vec<OilInput> {
    items(payload, "oils")
        .enumerate()
        .map(|(index, value)| parse_oil(value, index))
        .collect()
}

pub fn parse_fragrance(value: &Value, index: usize) -> FragranceInput {
    FragranceInput {
        name: parse_text(field(value, &["name"]))
            .unwrap_or_else(|| format!("Fragrance {}", index + 1)),
        mass_g: parse_bounded(field(value, &["grams", "mass_g"]), MAX_MASS_G).map(bounded_mass),
        percent_of_oils: parse_decimal(field(value, &["percent", "percent_of_oils"]))
            .map(|p| p.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)),
    }
}

pub fn parse_fragrances(payload: &Value) -> Vec<FragranceInput> {
    items(payload, "fragrances")
        .enumerate()
        .map(|(index, value)| parse_fragrance(value, index))
        .collect()
}

// ============================================================================
// Settings
// ============================================================================

/// Additive percents default to 0, names to the built-in labels
pub fn parse_additives(value: &Value) -> AdditiveSettings {
    let defaults = AdditiveSettings::default();
    AdditiveSettings {
        lactate_percent: decimal_or(value.get("lactate_percent"), Decimal::ZERO),
        sugar_percent: decimal_or(value.get("sugar_percent"), Decimal::ZERO),
        salt_percent: decimal_or(value.get("salt_percent"), Decimal::ZERO),
        citric_percent: decimal_or(value.get("citric_percent"), Decimal::ZERO),
        lactate_name: parse_text(value.get("lactate_name")).unwrap_or(defaults.lactate_name),
        sugar_name: parse_text(value.get("sugar_name")).unwrap_or(defaults.sugar_name),
        salt_name: parse_text(value.get("salt_name")).unwrap_or(defaults.salt_name),
        citric_name: parse_text(value.get("citric_name")).unwrap_or(defaults.citric_name),
    }
    .clamped()
}

/// Lye type defaults to NaOH, superfat to 5%, purity to 100%
pub fn parse_lye(value: &Value) -> LyeSettings {
    let choice = value
        .get("type")
        .and_then(Value::as_str)
        .and_then(LyeChoice::from_str)
        .unwrap_or_default();
    LyeSettings::new(
        choice,
        decimal_or(value.get("superfat_percent"), Decimal::from(DEFAULT_SUPERFAT_PERCENT)),
        decimal_or(value.get("purity_percent"), Decimal::from(DEFAULT_PURITY_PERCENT)),
    )
}

/// Water method defaults to percent of oils
pub fn parse_water(value: &Value) -> WaterSettings {
    let method = value
        .get("method")
        .and_then(Value::as_str)
        .and_then(WaterMethod::from_str)
        .unwrap_or_default();
    WaterSettings::new(
        method,
        parse_bounded(value.get("water_percent"), Decimal::from(WATER_PERCENT_MAX))
            .unwrap_or_else(|| Decimal::from(DEFAULT_WATER_PERCENT)),
        decimal_or(value.get("lye_concentration"), Decimal::from(DEFAULT_LYE_CONCENTRATION)),
        decimal_or(value.get("water_lye_ratio"), Decimal::from(DEFAULT_WATER_LYE_RATIO)),
    )
}

/// Display unit if the payload names a known one
pub fn parse_unit(payload: &Value) -> Option<DisplayUnit> {
    field(payload, &["unit", "display_unit"])
        .and_then(Value::as_str)
        .and_then(DisplayUnit::from_str)
}

// ============================================================================
// Requests
// ============================================================================

/// Build a request, using `default_unit` when the payload names none
pub fn parse_compute_request_with_unit(
    payload: &Value,
    default_unit: DisplayUnit,
) -> ComputeRequest {
    ComputeRequest {
        oils: parse_oils(payload),
        fragrances: parse_fragrances(payload),
        additives: parse_additives(section(payload, "additives")),
        lye: parse_lye(section(payload, "lye")),
        water: parse_water(section(payload, "water")),
        unit: parse_unit(payload).unwrap_or(default_unit),
    }
}

pub fn parse_compute_request(payload: &Value) -> ComputeRequest {
    parse_compute_request_with_unit(payload, DisplayUnit::default())
}

/// Axis -> target object; unknown axes and non-numeric targets are skipped
pub fn parse_quality_targets(value: Option<&Value>) -> BTreeMap<QualityAxis, Decimal> {
    let mut targets = BTreeMap::new();
    let Some(object) = value.and_then(Value::as_object) else {
        return targets;
    };
    for (key, target) in object {
        let axis = QualityAxis::from_str(key);
        if let (Some(axis), Some(target)) = (axis, parse_decimal(Some(target))) {
            targets.insert(axis, target.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED));
        }
    }
    targets
}

pub fn parse_nudge_request(payload: &Value) -> NudgeRequest {
    NudgeRequest {
        oils: parse_oils(payload),
        targets: parse_quality_targets(field(payload, &["targets", "quality_targets"])),
        target_oils_total: parse_bounded(field(payload, &["target_oils_total"]), MAX_MASS_G)
            .map(bounded_mass)
            .filter(|total| *total > Decimal::ZERO),
    }
}
