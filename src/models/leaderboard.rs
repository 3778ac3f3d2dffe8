// src/models/leaderboard.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Aggregated leaderboard row. Computed per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub username: String,
    pub total_score: f64,
    pub quizzes_taken: i64,
    pub average_score: f64,
    pub profile_picture: Option<String>,
    pub is_current_user: bool,
}

/// Query parameters for the leaderboard.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LeaderboardParams {
    #[validate(length(min = 1))]
    pub category: Option<String>,

    /// 'daily', 'weekly' or 'monthly'; all time when absent.
    pub period: Option<String>,
}
