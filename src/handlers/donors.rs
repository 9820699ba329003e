use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

pub async fn donor_donations(
    State(state): State<AppState>,
    Path(donor_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.ledger.donations_for(donor_id).await?))
}

pub async fn supported_campaigns(
    State(state): State<AppState>,
    Path(donor_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.ledger.supported_campaigns(donor_id).await?))
}

pub async fn followed_campaigns(
    State(state): State<AppState>,
    Path(donor_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.following.followed(donor_id).await?))
}

pub async fn follow(
    State(state): State<AppState>,
    Path((donor_id, campaign_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    state.following.follow(donor_id, campaign_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Successfully followed campaign" })),
    ))
}

pub async fn unfollow(
    State(state): State<AppState>,
    Path((donor_id, campaign_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    state.following.unfollow(donor_id, campaign_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn follow_status(
    State(state): State<AppState>,
    Path((donor_id, campaign_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let following = state.following.is_following(donor_id, campaign_id).await?;
    Ok(Json(json!({ "is_following": following })))
}
