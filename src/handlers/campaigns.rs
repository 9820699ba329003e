use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::use_cases::{CampaignInput, DonationRequest};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub verified: Option<bool>,
}

pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let campaigns = state.registry.list(query.verified.unwrap_or(true)).await?;
    Ok(Json(campaigns))
}

pub async fn create_campaign(
    State(state): State<AppState>,
    Json(input): Json<CampaignInput>,
) -> Result<impl IntoResponse, AppError> {
    let campaign = state.registry.create(&input).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.registry.detail(id).await?))
}

pub async fn update_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CampaignInput>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.registry.update(id, &input).await?))
}

pub async fn redirect_candidates(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.registry.get(id).await?;
    let candidates = state.directory.list_fundable_campaigns(id).await?;
    Ok(Json(candidates))
}

pub async fn donate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DonationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let receipt = state.intake.submit(id, &request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn supporters(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.following.supporters(id).await?))
}
