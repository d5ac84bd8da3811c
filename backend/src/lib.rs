//! Soap formulation server
//!
//! HTTP host for the formulation engine: calculation, quality nudge, CSV
//! export and printable formula sheets.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;

pub use crate::config::Config;
use services::FormulaService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub formulas: FormulaService,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let formulas = FormulaService::new(&config.formula);
        Self {
            config: Arc::new(config),
            formulas,
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Soap Formulation Calculator API v1.0"
}
