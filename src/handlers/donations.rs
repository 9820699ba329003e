use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DonorQuery {
    pub donor_id: Uuid,
}

pub async fn get_donation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.ledger.get(id).await?))
}

pub async fn cancel_donation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DonorQuery>,
) -> Result<impl IntoResponse, AppError> {
    let cancelled = state.ledger.cancel(id, query.donor_id).await?;
    Ok(Json(serde_json::json!({
        "message": "Donation cancelled",
        "donation": cancelled,
    })))
}
