use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::use_cases::RedirectDecision;
use crate::AppState;

/// `{"donor_id": .., "action": "redirect", "target_campaign_id": .., "amount": ..}`
/// or `{"donor_id": .., "action": "skip"}`.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub donor_id: Uuid,
    #[serde(flatten)]
    pub decision: RedirectDecision,
}

pub async fn get_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.reconciler.get_offer(id).await?))
}

pub async fn resolve_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolveRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .reconciler
        .resolve(id, request.donor_id, request.decision)
        .await?;
    Ok(Json(outcome))
}
