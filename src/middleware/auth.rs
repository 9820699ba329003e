use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::AppError;

/// The key admin requests must present.
#[derive(Clone)]
pub struct AdminKey(pub Arc<str>);

/// Accepts `Authorization: Bearer <key>` or the raw key.
pub async fn admin_auth(State(key): State<AdminKey>, req: Request, next: Next) -> Response {
    let authorized = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(|auth| auth.strip_prefix("Bearer ").unwrap_or(auth) == &*key.0)
        .unwrap_or(false);

    if authorized {
        return next.run(req).await;
    }

    tracing::warn!(uri = %req.uri(), "Rejected admin request");
    AppError::Unauthorized("Admin API key required".to_string()).into_response()
}
