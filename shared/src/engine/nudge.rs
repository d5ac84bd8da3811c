//! Quality-target nudge
//!
//! Proposes new oil masses that move the blended quality scores toward
//! caller-supplied targets. Best effort: there is no guarantee the targets are
//! reached, only that the blend moves toward them while the total mass is kept.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use super::fatty_acids::{qualities_for, QualityScores};
use crate::models::{OilInput, MAX_MASS_G};
use crate::types::{percent_of, QualityAxis};

/// How strongly the adjustment signal moves a mass
pub const NUDGE_GAIN: Decimal = Decimal::from_parts(8, 0, 0, false, 1);
pub const FACTOR_MIN: Decimal = Decimal::from_parts(2, 0, 0, false, 1);
pub const FACTOR_MAX: Decimal = Decimal::from_parts(18, 0, 0, false, 1);

/// A nudge request after parsing
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct NudgeRequest {
    pub oils: Vec<OilInput>,
    /// Target value per requested axis, 0-100
    pub targets: BTreeMap<QualityAxis, Decimal>,
    /// Total oils mass for the proposal; the current total when absent, capped at [`MAX_MASS_G`]
    pub target_oils_total: Option<Decimal>,
}

/// Reasons a nudge cannot be proposed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NudgeError {
    #[error("No quality targets were supplied")]
    NoTargets,

    #[error("No oil has a positive mass")]
    NoOils,

    #[error("None of the oils carry a fatty acid profile, so there is no basis for adjustment")]
    NoProfiles,
}

/// Proposed mass for one input oil
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdjustedOilRow {
    /// Position in the request's oil list
    pub index: usize,
    pub name: String,
    pub original_g: Decimal,
    pub grams: Decimal,
    pub percent: Decimal,
}

/// A successful nudge
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NudgeProposal {
    pub warnings: Vec<String>,
    pub adjusted_rows: Vec<AdjustedOilRow>,
    pub target_total_g: Decimal,
    pub current_qualities: QualityScores,
    pub projected_qualities: QualityScores,
}

/// Wire form of a nudge outcome
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NudgeResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub warnings: Vec<String>,
    pub adjusted_rows: Vec<AdjustedOilRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_total_g: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_qualities: Option<QualityScores>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_qualities: Option<QualityScores>,
}

impl From<Result<NudgeProposal, NudgeError>> for NudgeResponse {
    fn from(result: Result<NudgeProposal, NudgeError>) -> Self {
        match result {
            Ok(proposal) => Self {
                ok: true,
                error: None,
                warnings: proposal.warnings,
                adjusted_rows: proposal.adjusted_rows,
                target_total_g: Some(proposal.target_total_g),
                current_qualities: Some(proposal.current_qualities),
                projected_qualities: Some(proposal.projected_qualities),
            },
            Err(err) => Self {
                ok: false,
                error: Some(err.to_string()),
                warnings: Vec::new(),
                adjusted_rows: Vec::new(),
                target_total_g: None,
                current_qualities: None,
                projected_qualities: None,
            },
        }
    }
}

fn normalized_delta(target: Decimal, current: Decimal) -> Decimal {
    ((target - current) / Decimal::ONE_HUNDRED).clamp(-Decimal::ONE, Decimal::ONE)
}

/// Multiplicative mass factor for a scalar adjustment signal
pub fn mass_factor(signal: Decimal) -> Decimal {
    (Decimal::ONE + signal * NUDGE_GAIN).clamp(FACTOR_MIN, FACTOR_MAX)
}

/// Propose adjusted oil masses
pub fn nudge(request: &NudgeRequest) -> Result<NudgeProposal, NudgeError> {
    if request.targets.is_empty() {
        return Err(NudgeError::NoTargets);
    }

    let original_total: Decimal = request
        .oils
        .iter()
        .filter(|oil| oil.has_mass())
        .map(|oil| oil.mass_g)
        .sum();
    if original_total <= Decimal::ZERO {
        return Err(NudgeError::NoOils);
    }

    let unprofiled: Vec<&str> = request
        .oils
        .iter()
        .filter(|oil| oil.has_mass() && oil.fatty_acids.is_none())
        .map(|oil| oil.name.as_str())
        .collect();
    let profiled_count = request
        .oils
        .iter()
        .filter(|oil| oil.has_mass() && oil.fatty_acids.is_some())
        .count();
    if profiled_count == 0 {
        return Err(NudgeError::NoProfiles);
    }

    let mut warnings = Vec::new();
    if !unprofiled.is_empty() {
        warnings.push(format!(
            "No fatty acid profile for: {}. These oils keep their share and are not adjusted.",
            unprofiled.join(", ")
        ));
    }

    let current_qualities = qualities_for(
        request
            .oils
            .iter()
            .filter_map(|oil| oil.fatty_acids.as_ref().map(|p| (oil.mass_g, p))),
    );

    let deltas: Vec<(QualityAxis, Decimal)> = request
        .targets
        .iter()
        .map(|(axis, target)| (*axis, normalized_delta(*target, current_qualities.get(*axis))))
        .collect();
    if deltas.iter().all(|(_, delta)| delta.is_zero()) {
        warnings.push("The blend already sits on every requested target.".to_string());
    }
    let weight = Decimal::ONE / Decimal::from(deltas.len());

    let candidates: Vec<Decimal> = request
        .oils
        .iter()
        .map(|oil| match (&oil.fatty_acids, oil.has_mass()) {
            (Some(profile), true) => {
                let contribution = QualityScores::from_profile(profile);
                let signal: Decimal = deltas
                    .iter()
                    .map(|(axis, delta)| {
                        weight * *delta * contribution.get(*axis) / Decimal::ONE_HUNDRED
                    })
                    .sum();
                oil.mass_g * mass_factor(signal)
            }
            (_, true) => oil.mass_g,
            (_, false) => Decimal::ZERO,
        })
        .collect();

    let candidate_total: Decimal = candidates.iter().copied().sum();
    let target_total_g = match request.target_oils_total {
        Some(total) if total > Decimal::ZERO => total.min(MAX_MASS_G),
        _ => original_total,
    };
    // candidate_total > 0: every positive mass keeps at least FACTOR_MIN of itself
    let scale = target_total_g / candidate_total;

    let adjusted_rows: Vec<AdjustedOilRow> = request
        .oils
        .iter()
        .zip(candidates)
        .enumerate()
        .map(|(index, (oil, candidate))| {
            let grams = candidate * scale;
            debug_assert!(grams >= Decimal::ZERO, "negative nudged mass");
            AdjustedOilRow {
                index,
                name: oil.name.clone(),
                original_g: oil.mass_g,
                grams,
                percent: percent_of(grams, target_total_g),
            }
        })
        .collect();

    let projected_qualities = qualities_for(
        request
            .oils
            .iter()
            .zip(&adjusted_rows)
            .filter_map(|(oil, row)| oil.fatty_acids.as_ref().map(|p| (row.grams, p))),
    );

    Ok(NudgeProposal {
        warnings,
        adjusted_rows,
        target_total_g,
        current_qualities,
        projected_qualities,
    })
}

/// Run the nudge and convert to the wire form, logging rejections
pub fn nudge_response(request: &NudgeRequest) -> NudgeResponse {
    let result = nudge(request);
    if let Err(err) = &result {
        tracing::debug!(error = %err, "quality nudge rejected");
    }
    result.into()
}
