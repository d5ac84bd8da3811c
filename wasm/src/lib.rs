//! WebAssembly bindings for the formulation engine
//!
//! Lets a browser run the same calculation offline:
//! - Full formula calculation (JSON in, JSON out)
//! - Quality-target nudge
//! - CSV export and printable sheet
//! - Quick single-oil lye lookup

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use shared::engine::lye_water;
use shared::{calculate_raw, nudge_response, parse_nudge_request, render_html};
use shared::{LyeChoice, LyeSettings, OilInput, WaterSettings};

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

fn parse_payload(payload_json: &str) -> Result<Value, JsValue> {
    serde_json::from_str(payload_json).map_err(|e| js_error("Invalid payload JSON", e))
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

/// Calculate a full formula; returns the result as JSON
#[wasm_bindgen]
pub fn calculate_formula(payload_json: &str) -> Result<String, JsValue> {
    let payload = parse_payload(payload_json)?;
    let result = calculate_raw(&payload).map_err(|e| js_error("Calculation failed", e))?;
    serde_json::to_string(&result).map_err(|e| js_error("Serialization failed", e))
}

/// Propose oil masses toward quality targets; failures come back as `ok: false`
#[wasm_bindgen]
pub fn nudge_formula(payload_json: &str) -> Result<String, JsValue> {
    let payload = parse_payload(payload_json)?;
    let response = nudge_response(&parse_nudge_request(&payload));
    serde_json::to_string(&response).map_err(|e| js_error("Serialization failed", e))
}

/// CSV export of a formula
#[wasm_bindgen]
pub fn export_formula_csv(payload_json: &str) -> Result<String, JsValue> {
    let payload = parse_payload(payload_json)?;
    let result = calculate_raw(&payload).map_err(|e| js_error("Calculation failed", e))?;
    Ok(result.export.csv)
}

/// Printable HTML sheet of a formula
#[wasm_bindgen]
pub fn render_formula_sheet(
    payload_json: &str,
    title: Option<String>,
    prepared_on: Option<String>,
) -> Result<String, JsValue> {
    let payload = parse_payload(payload_json)?;
    let result = calculate_raw(&payload).map_err(|e| js_error("Calculation failed", e))?;
    let mut sheet = result.export.sheet;
    if let Some(title) = title {
        sheet = sheet.with_title(title);
    }
    if let Some(date) = prepared_on {
        sheet = sheet.with_prepared_on(date);
    }
    Ok(render_html(&sheet))
}

/// Lye in grams for one oil at 100% purity
#[wasm_bindgen]
pub fn lye_for_single_oil(grams: f64, sap: f64, koh: bool, superfat: f64) -> f64 {
    let choice = if koh {
        LyeChoice::PotassiumHydroxide
    } else {
        LyeChoice::SodiumHydroxide
    };
    let oil = OilInput::new("Oil", to_decimal(grams), to_decimal(sap));
    let lye = LyeSettings::new(choice, to_decimal(superfat), Decimal::ONE_HUNDRED);
    let result = lye_water::compute(&[oil], &lye, &WaterSettings::percent(Decimal::from(33)));
    result.lye_adjusted_g.to_f64().unwrap_or(0.0)
}
