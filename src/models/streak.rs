// src/models/streak.rs

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

/// Represents the 'streaks' table. One row per user.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Streak {
    pub user_id: i64,
    pub current_streak: i32,
    /// Never decreases; always >= `current_streak`.
    pub longest_streak: i32,
    pub last_active_date: Option<NaiveDate>,
}

impl Streak {
    /// State of a user who has never submitted anything.
    pub fn empty(user_id: i64) -> Self {
        Self {
            user_id,
            current_streak: 0,
            longest_streak: 0,
            last_active_date: None,
        }
    }
}
