//! Orchestrator
//!
//! Single entry point: runs lye/water, additives, fatty acids, the quality
//! report, blend tips and the export builder in order and assembles one
//! [`ComputeResult`].

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use super::additives::{self, AdditivesResult};
use super::blend_tips;
use super::export::{self, ExportPayload};
use super::fatty_acids::{self, FattyAcidMetrics};
use super::lye_water;
use super::quality::{self, QualityReport, ReportInputs};
use crate::error::CalcError;
use crate::models::ComputeRequest;
use crate::types::{percent_of, DisplayUnit, LyeChoice, LyeType, WaterMethod};
use crate::validation;

/// Echo of one input oil with its derived figures
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OilRow {
    pub index: usize,
    pub name: String,
    pub mass_g: Decimal,
    pub percent_of_oils: Decimal,
    pub sap_koh: Decimal,
    pub sap_was_decimal: bool,
    pub iodine: Option<Decimal>,
    /// Stoichiometric lye this oil accounts for, before superfat
    pub lye_g: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Full output of one calculation
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComputeResult {
    pub total_oils_g: Decimal,
    pub lye_choice: LyeChoice,
    pub lye_type: LyeType,
    pub superfat_percent: Decimal,
    pub purity_percent: Decimal,
    /// Before superfat
    pub lye_stoich_g: Decimal,
    /// After superfat, before purity
    pub lye_pure_g: Decimal,
    /// After superfat and purity, without the citric acid offset
    pub lye_base_g: Decimal,
    pub citric_lye_g: Decimal,
    /// Lye to weigh out: base plus citric acid offset
    pub lye_adjusted_g: Decimal,
    pub water_method: WaterMethod,
    pub water_g: Decimal,
    pub lye_concentration_pct: Decimal,
    pub water_lye_ratio: Decimal,
    pub sap_avg_koh: Decimal,
    pub used_sap_fallback: bool,
    pub oils: Vec<OilRow>,
    pub additives: AdditivesResult,
    pub fatty_acids: FattyAcidMetrics,
    pub report: QualityReport,
    pub blend_tips: Vec<String>,
    pub unit: DisplayUnit,
    pub export: ExportPayload,
}

/// Run every stage over an already-normalized request
pub fn calculate(request: &ComputeRequest) -> Result<ComputeResult, CalcError> {
    let lye_water = lye_water::compute(&request.oils, &request.lye, &request.water);
    let additives = additives::compute(
        lye_water.total_oils_g,
        lye_water.lye_type,
        &request.additives,
        &request.fragrances,
    );
    let fatty_acids = fatty_acids::compute(&request.oils);
    let report = quality::build(&ReportInputs {
        oils: &request.oils,
        fatty_acids: &fatty_acids,
        lye_water: &lye_water,
        superfat_percent: request.lye.superfat_percent,
        additives: &additives,
    });
    let blend_tips = blend_tips::collect(&request.oils);

    let oils = request
        .oils
        .iter()
        .zip(&lye_water.per_oil_lye_g)
        .enumerate()
        .map(|(index, (oil, lye_g))| OilRow {
            index,
            name: oil.name.clone(),
            mass_g: oil.mass_g,
            percent_of_oils: percent_of(oil.mass_g, lye_water.total_oils_g),
            sap_koh: oil.sap_koh,
            sap_was_decimal: oil.sap_was_decimal,
            iodine: oil.iodine,
            lye_g: *lye_g,
            ingredient_id: oil.ingredient_id.clone(),
            source: oil.source.clone(),
        })
        .collect();

    let lye_adjusted_g = lye_water.lye_adjusted_g + additives.citric_lye_g;
    debug_assert!(lye_adjusted_g >= Decimal::ZERO, "negative total lye");

    tracing::debug!(
        oils = request.oils.len(),
        total_oils_g = %lye_water.total_oils_g,
        lye_type = %lye_water.lye_type,
        %lye_adjusted_g,
        warnings = report.warnings.len(),
        "formula calculated"
    );

    let mut result = ComputeResult {
        total_oils_g: lye_water.total_oils_g,
        lye_choice: request.lye.choice,
        lye_type: lye_water.lye_type,
        superfat_percent: request.lye.superfat_percent,
        purity_percent: request.lye.purity_percent,
        lye_stoich_g: lye_water.lye_total_g,
        lye_pure_g: lye_water.lye_pure_g,
        lye_base_g: lye_water.lye_adjusted_g,
        citric_lye_g: additives.citric_lye_g,
        lye_adjusted_g,
        water_method: request.water.method,
        water_g: lye_water.water_g,
        lye_concentration_pct: lye_water.lye_concentration_pct,
        water_lye_ratio: lye_water.water_lye_ratio,
        sap_avg_koh: lye_water.sap_avg_koh,
        used_sap_fallback: lye_water.used_sap_fallback,
        oils,
        additives,
        fatty_acids,
        report,
        blend_tips,
        unit: request.unit,
        export: ExportPayload::default(),
    };
    result.export = export::build(&result)?;
    Ok(result)
}

/// Normalize a loosely typed payload and calculate
pub fn calculate_raw(payload: &Value) -> Result<ComputeResult, CalcError> {
    calculate(&validation::parse_compute_request(payload))
}
