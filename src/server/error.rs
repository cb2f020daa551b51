use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::warn;

use crate::assessment::AssessmentError;
use crate::framework::EngineError;

/// Error body returned by every route: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub AssessmentError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AssessmentError::Mapping(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AssessmentError::Engine(e) => match e {
                EngineError::LookupMiss { .. } => StatusCode::NOT_FOUND,
                EngineError::Unavailable(_)
                | EngineError::ActorClosed
                | EngineError::ActorDropped => StatusCode::SERVICE_UNAVAILABLE,
                EngineError::CalculationFailed { .. }
                | EngineError::Rejected { .. }
                | EngineError::Decode { .. } => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(%status, error = %self.0, "Request failed");
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<AssessmentError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
