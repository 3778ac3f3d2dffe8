// src/models/analytics.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

/// Per-category breakdown inside a user's analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub count: i64,
    pub avg_score: f64,
    pub best_score: f64,
}

/// Represents the 'user_analytics' table. One row per user, fully
/// overwritten on every recompute.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserAnalytics {
    pub user_id: i64,
    pub total_quizzes: i64,
    pub total_questions_answered: i64,
    pub average_score: f64,
    pub best_category: Option<String>,
    pub worst_category: Option<String>,
    pub category_stats: Json<BTreeMap<String, CategoryStat>>,
    /// 1-based global rank by average score; unset until a rank pass has seen the row.
    pub rank: Option<i32>,
    pub rank_epoch: i64,
    pub version: i64,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

/// Outcome of a global rank pass.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RankPass {
    pub epoch: i64,
    pub changed: usize,
}

/// Count, mean and best score for one category, used by the live summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicStat {
    pub category: String,
    pub count: i64,
    pub avg_score: f64,
    pub best_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreakSummary {
    pub current_streak: i32,
    pub longest_streak: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct BadgeSummary {
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub badge_type: String,
    pub date_awarded: chrono::DateTime<chrono::Utc>,
}

/// Live (non-persisted) analytics view for the current user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total_quizzes: i64,
    pub average_score: f64,
    pub category_stats: Vec<TopicStat>,
    pub recent_scores: Vec<f64>,
    pub weak_topics: Vec<TopicStat>,
    pub streak: StreakSummary,
    pub badges: Vec<BadgeSummary>,
}
