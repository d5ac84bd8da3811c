//! Formula calculation, nudge and export handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use chrono::Utc;
use serde_json::Value;
use shared::{ComputeResult, NudgeResponse};

use crate::error::AppResult;
use crate::AppState;

/// Calculate a formula
pub async fn calculate_formula(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<ComputeResult>> {
    let Json(payload) = payload?;
    let result = state.formulas.calculate(&payload)?;
    Ok(Json(result))
}

/// Propose oil masses toward quality targets
pub async fn nudge_formula(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<NudgeResponse>> {
    let Json(payload) = payload?;
    let response = state.formulas.nudge(&payload)?;
    Ok(Json(response))
}

/// Download a formula as CSV
pub async fn export_formula_csv(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let csv = state.formulas.export_csv(&payload)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"formula.csv\""),
        ],
        csv,
    ))
}

/// Printable formula sheet
pub async fn formula_sheet(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Html<String>> {
    let Json(payload) = payload?;
    let html = state
        .formulas
        .sheet_html(&payload, Utc::now().date_naive())?;
    Ok(Html(html))
}
