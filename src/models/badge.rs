// src/models/badge.rs

use serde::Serialize;
use sqlx::FromRow;

/// Coarse, permanent milestones. At most one of each per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BadgeType {
    #[serde(rename = "score_90")]
    Score90,
    #[serde(rename = "streak_7")]
    Streak7,
    #[serde(rename = "attempt_10")]
    Attempt10,
}

impl BadgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeType::Score90 => "score_90",
            BadgeType::Streak7 => "streak_7",
            BadgeType::Attempt10 => "attempt_10",
        }
    }
}

/// Represents the 'badges' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Badge {
    pub id: i64,
    pub user_id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub badge_type: String,
    pub date_awarded: chrono::DateTime<chrono::Utc>,
}
