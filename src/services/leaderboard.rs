// src/services/leaderboard.rs

use std::{collections::HashMap, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, PgPool};

use crate::{
    config::{MONTHLY_WINDOW_DAYS, WEEKLY_WINDOW_DAYS},
    error::AppError,
    models::leaderboard::LeaderboardEntry,
};

/// Time window a leaderboard is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Same UTC calendar date as now.
    Daily,
    /// The last 7 days.
    Weekly,
    /// The last 30 days.
    Monthly,
}

impl FromStr for Period {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            other => Err(AppError::BadRequest(format!(
                "Unknown period '{}', expected daily, weekly or monthly",
                other
            ))),
        }
    }
}

impl Period {
    /// Earliest `created_at` included in the window ending at `now`.
    pub fn window_start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Period::Daily => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc())
                .unwrap_or(now),
            Period::Weekly => now - Duration::days(WEEKLY_WINDOW_DAYS),
            Period::Monthly => now - Duration::days(MONTHLY_WINDOW_DAYS),
        }
    }
}

/// One result row after category/window filtering.
#[derive(Debug, Clone, FromRow)]
pub struct ScoreRow {
    pub user_id: i64,
    pub username: String,
    pub profile_picture: Option<String>,
    pub score: f64,
}

struct Standing {
    user_id: i64,
    username: String,
    profile_picture: Option<String>,
    total_score: f64,
    quizzes_taken: i64,
}

/// Aggregates filtered results per user and ranks them by total score.
///
/// Ties on total score go to the lower user id. At most `limit` entries.
pub fn rank_entries(
    rows: Vec<ScoreRow>,
    requester: Option<i64>,
    limit: usize,
) -> Vec<LeaderboardEntry> {
    let mut standings: HashMap<i64, Standing> = HashMap::new();
    for row in rows {
        let standing = standings.entry(row.user_id).or_insert_with(|| Standing {
            user_id: row.user_id,
            username: row.username,
            profile_picture: row.profile_picture,
            total_score: 0.0,
            quizzes_taken: 0,
        });
        standing.total_score += row.score;
        standing.quizzes_taken += 1;
    }

    let mut ordered: Vec<Standing> = standings.into_values().collect();
    ordered.sort_by(|a, b| {
        b.total_score
            .total_cmp(&a.total_score)
            .then(a.user_id.cmp(&b.user_id))
    });
    ordered.truncate(limit);

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, s)| LeaderboardEntry {
            rank: i + 1,
            average_score: s.total_score / s.quizzes_taken as f64,
            is_current_user: requester == Some(s.user_id),
            username: s.username,
            total_score: s.total_score,
            quizzes_taken: s.quizzes_taken,
            profile_picture: s.profile_picture,
        })
        .collect()
}

/// Builds the leaderboard from result history. Nothing is cached.
pub async fn leaderboard(
    pool: &PgPool,
    category: Option<&str>,
    period: Option<Period>,
    requester: Option<i64>,
    now: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    let since = period.map(|p| p.window_start(now));

    let rows = sqlx::query_as::<_, ScoreRow>(
        r#"
        SELECT r.user_id, u.username, u.profile_picture, r.score
        FROM results r
        JOIN users u ON u.id = r.user_id
        JOIN quizzes q ON q.id = r.quiz_id
        WHERE ($1::TEXT IS NULL OR q.category = $1)
          AND ($2::TIMESTAMPTZ IS NULL OR r.created_at >= $2)
        "#,
    )
    .bind(category)
    .bind(since)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch leaderboard rows: {:?}", e);
        AppError::from(e)
    })?;

    Ok(rank_entries(rows, requester, limit))
}
