// src/handlers/analytics.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::PgPool;

use crate::{error::AppError, services::analytics, utils::jwt::Claims};

/// Live performance summary, computed from result history on every call.
pub async fn get_summary(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let summary = analytics::summary(&pool, user_id).await?;

    Ok(Json(summary))
}

/// Recomputes the caller's stored analytics, then re-ranks every user.
pub async fn recalculate(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let snapshot = analytics::recalculate(&pool, user_id).await?;

    Ok(Json(snapshot))
}

/// Runs a global rank pass on its own.
/// Admin only.
pub async fn rerank(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let pass = analytics::run_rank_pass(&pool).await?;

    Ok(Json(pass))
}
