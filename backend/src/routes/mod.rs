//! Route definitions for the formulation server

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/formulas", formula_routes())
}

/// Formula calculation and export routes
fn formula_routes() -> Router<AppState> {
    Router::new()
        .route("/calculate", post(handlers::calculate_formula))
        .route("/nudge", post(handlers::nudge_formula))
        .route("/export.csv", post(handlers::export_formula_csv))
        .route("/sheet", post(handlers::formula_sheet))
}
