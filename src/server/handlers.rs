use axum::extract::{Json, Path, State};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ApiError, AppState};
use crate::assessment::{AssessmentReport, ProcessImpact};
use crate::model::{AcvInput, Flow, Process, UnitGroup};

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub(super) struct ProcessImpactRequest {
    impact_method_uid: String,
    #[serde(default = "default_amount")]
    amount: f64,
}

fn default_amount() -> f64 {
    1.0
}

pub(super) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(super) async fn unit_groups(State(state): State<AppState>) -> ApiResult<Vec<UnitGroup>> {
    Ok(Json(state.client.get_all_unit_groups().await?))
}

pub(super) async fn flows(State(state): State<AppState>) -> ApiResult<Vec<Flow>> {
    Ok(Json(state.client.get_all_flows().await?))
}

pub(super) async fn product_flows(State(state): State<AppState>) -> ApiResult<Vec<Flow>> {
    Ok(Json(state.client.get_all_product_flows().await?))
}

pub(super) async fn elementary_flows(State(state): State<AppState>) -> ApiResult<Vec<Flow>> {
    Ok(Json(state.client.get_all_elementary_flows().await?))
}

pub(super) async fn waste_flows(State(state): State<AppState>) -> ApiResult<Vec<Flow>> {
    Ok(Json(state.client.get_all_waste_flows().await?))
}

pub(super) async fn processes(State(state): State<AppState>) -> ApiResult<Vec<Process>> {
    Ok(Json(state.client.get_all_processes().await?))
}

pub(super) async fn process_impact(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(request): Json<ProcessImpactRequest>,
) -> Result<Json<Value>, ApiError> {
    let impact: ProcessImpact = state
        .assessment
        .process_impact(&uid, &request.impact_method_uid, request.amount)
        .await?;
    Ok(Json(json!({ "data": impact })))
}

pub(super) async fn ventum_acv(
    State(state): State<AppState>,
    Json(input): Json<AcvInput>,
) -> ApiResult<AssessmentReport> {
    Ok(Json(state.assessment.assess(&input).await?))
}
