//! Formula service: applies host defaults and runs the engine

use chrono::NaiveDate;
use serde_json::Value;
use shared::{
    calculate, nudge_response, parse_compute_request_with_unit, parse_nudge_request,
    render_html, ComputeResult, DisplayUnit, NudgeResponse,
};

use crate::config::FormulaConfig;
use crate::error::{AppError, AppResult};

/// Formula service wrapping the pure engine with host configuration
#[derive(Clone)]
pub struct FormulaService {
    default_unit: DisplayUnit,
    sheet_title: String,
}

impl FormulaService {
    pub fn new(config: &FormulaConfig) -> Self {
        Self {
            default_unit: config.display_unit(),
            sheet_title: config.sheet_title.clone(),
        }
    }

    fn require_object(payload: &Value) -> AppResult<()> {
        if payload.is_object() {
            Ok(())
        } else {
            Err(AppError::Validation {
                field: "body".to_string(),
                message: "Payload must be a JSON object".to_string(),
            })
        }
    }

    /// Calculate a full formula
    pub fn calculate(&self, payload: &Value) -> AppResult<ComputeResult> {
        Self::require_object(payload)?;
        let request = parse_compute_request_with_unit(payload, self.default_unit);
        let result = calculate(&request)?;

        tracing::info!(
            oils = request.oils.len(),
            total_oils_g = %result.total_oils_g,
            lye_type = %result.lye_type,
            unit = result.unit.code(),
            "Formula calculated"
        );
        Ok(result)
    }

    /// Propose masses toward quality targets; rejections are an `ok: false` body
    pub fn nudge(&self, payload: &Value) -> AppResult<NudgeResponse> {
        Self::require_object(payload)?;
        let request = parse_nudge_request(payload);
        let response = nudge_response(&request);

        tracing::info!(
            oils = request.oils.len(),
            targets = request.targets.len(),
            ok = response.ok,
            "Quality nudge proposed"
        );
        Ok(response)
    }

    /// CSV export of a formula
    pub fn export_csv(&self, payload: &Value) -> AppResult<String> {
        Ok(self.calculate(payload)?.export.csv)
    }

    /// Printable HTML sheet stamped with the given date
    pub fn sheet_html(&self, payload: &Value, prepared_on: NaiveDate) -> AppResult<String> {
        let result = self.calculate(payload)?;
        let sheet = result
            .export
            .sheet
            .with_title(self.sheet_title.clone())
            .with_prepared_on(prepared_on.format("%Y-%m-%d").to_string());
        Ok(render_html(&sheet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service(unit: &str) -> FormulaService {
        FormulaService::new(&FormulaConfig {
            default_unit: unit.to_string(),
            sheet_title: "Test batch".to_string(),
        })
    }

    fn payload() -> Value {
        json!({
            "oils": [
                { "name": "Olive oil", "grams": 500, "sap_koh": 190 },
                { "name": "Coconut oil", "grams": 150, "sap_koh": 180 }
            ]
        })
    }

    #[test]
    fn test_default_unit_applies_when_missing() {
        let result = service("oz").calculate(&payload()).unwrap();
        assert_eq!(result.unit, DisplayUnit::Ounce);

        let mut explicit = payload();
        explicit["unit"] = json!("lb");
        let result = service("oz").calculate(&explicit).unwrap();
        assert_eq!(result.unit, DisplayUnit::Pound);
    }

    #[test]
    fn test_non_object_payload_is_rejected() {
        let err = service("g").calculate(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_sheet_is_titled_and_dated() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let html = service("g").sheet_html(&payload(), date).unwrap();
        assert!(html.contains("<h1>Test batch</h1>"));
        assert!(html.contains("Prepared 2024-03-09"));
    }

    #[test]
    fn test_nudge_rejection_is_not_an_error() {
        let response = service("g").nudge(&payload()).unwrap();
        assert!(!response.ok);
    }
}
