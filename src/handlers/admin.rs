use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::use_cases::VerificationAction;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub action: VerificationAction,
}

pub async fn pending_campaigns(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.verification.pending().await?))
}

pub async fn verify_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<VerifyRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.verification.verify(id, request.action).await?))
}

pub async fn dashboard_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.verification.stats().await?))
}

pub async fn all_donations(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let donations = state
        .verification
        .all_donations(pagination.limit, pagination.offset)
        .await?;
    Ok(Json(donations))
}
