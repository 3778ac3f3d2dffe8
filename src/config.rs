// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Maximum number of rows returned by the leaderboard.
pub const LEADERBOARD_SIZE: usize = 50;

/// Length of the `weekly` and `monthly` leaderboard windows, in days.
pub const WEEKLY_WINDOW_DAYS: i64 = 7;
pub const MONTHLY_WINDOW_DAYS: i64 = 30;

/// Badge thresholds.
pub const HIGH_SCORE_THRESHOLD: f64 = 90.0;
pub const ATTEMPT_MILESTONE: i64 = 10;
pub const STREAK_MILESTONE: i32 = 7;

/// Results scoring below this count towards `weak_topics` in the analytics summary.
pub const WEAK_TOPIC_THRESHOLD: f64 = 50.0;

/// Number of most recent scores shown in the analytics summary.
pub const RECENT_SCORES_WINDOW: i64 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub port: u16,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|n| n.parse().ok())
            .unwrap_or(5);

        Self {
            database_url,
            jwt_secret,
            rust_log,
            port,
            max_connections,
        }
    }
}
