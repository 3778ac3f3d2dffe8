// src/handlers/leaderboard.rs

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::{Config, LEADERBOARD_SIZE},
    error::AppError,
    models::leaderboard::LeaderboardParams,
    services::leaderboard::{self, Period},
    utils::jwt::optional_claims,
};

/// Ranks users by total score over the filtered result history.
///
/// Public. When a valid bearer token is present, the caller's own entry is
/// flagged with `is_current_user`.
pub async fn get_leaderboard(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    headers: HeaderMap,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;

    let period = params
        .period
        .as_deref()
        .map(str::parse::<Period>)
        .transpose()?;

    let requester = optional_claims(&headers, &config.jwt_secret).and_then(|c| c.user_id().ok());

    let entries = leaderboard::leaderboard(
        &pool,
        params.category.as_deref(),
        period,
        requester,
        chrono::Utc::now(),
        LEADERBOARD_SIZE,
    )
    .await?;

    Ok(Json(entries))
}
