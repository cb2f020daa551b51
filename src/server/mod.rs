//! # HTTP API
//!
//! | Route | Body | Response |
//! |-------|------|----------|
//! | `GET /health` | | `{"status": "ok"}` |
//! | `GET /unit-group` | | unit groups |
//! | `GET /flow`, `/product-flow`, `/elementary-flow`, `/waste-flow` | | flows |
//! | `GET /process` | | processes |
//! | `POST /process/{uid}/impact` | `{impact_method_uid, amount?}` | `{data: {process, impact_result}}` |
//! | `POST /ventum-acv` | questionnaire record | the five impact lists |
//!
//! Failures answer with `{"error": "..."}` and a status from [`ApiError::status`].

mod error;
mod handlers;

pub use error::ApiError;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::assessment::AssessmentService;
use crate::clients::OlcaClient;
use crate::lifecycle::LcaSystem;

#[derive(Clone)]
pub struct AppState {
    pub client: OlcaClient,
    pub assessment: Arc<AssessmentService>,
}

impl From<&LcaSystem> for AppState {
    fn from(system: &LcaSystem) -> Self {
        Self {
            client: system.client.clone(),
            assessment: system.assessment.clone(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/unit-group", get(handlers::unit_groups))
        .route("/flow", get(handlers::flows))
        .route("/product-flow", get(handlers::product_flows))
        .route("/elementary-flow", get(handlers::elementary_flows))
        .route("/waste-flow", get(handlers::waste_flows))
        .route("/process", get(handlers::processes))
        .route("/process/{uid}/impact", post(handlers::process_impact))
        .route("/ventum-acv", post(handlers::ventum_acv))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
