// src/handlers/gamification.rs

use std::collections::HashSet;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::achievement::{AchievementType, CatalogEntry},
    services::{rewards, streak},
    utils::jwt::Claims,
};

/// Current user's streak. Users with no activity get zeros.
pub async fn get_streak(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let streak = streak::get_streak(&pool, user_id).await?;

    Ok(Json(streak))
}

pub async fn list_badges(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let badges = rewards::list_badges(&pool, user_id).await?;

    Ok(Json(badges))
}

pub async fn list_achievements(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let achievements = rewards::list_achievements(&pool, user_id).await?;

    Ok(Json(achievements))
}

/// Every achievement type, flagged with whether the user holds it in any category.
pub async fn achievement_catalog(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let earned: HashSet<String> = rewards::list_achievements(&pool, user_id)
        .await?
        .into_iter()
        .map(|a| a.achievement_type)
        .collect();

    let catalog: Vec<CatalogEntry> = AchievementType::ALL
        .into_iter()
        .map(|kind| CatalogEntry {
            achievement_type: kind,
            title: kind.title(),
            earned: earned.contains(kind.as_str()),
        })
        .collect();

    Ok(Json(catalog))
}
