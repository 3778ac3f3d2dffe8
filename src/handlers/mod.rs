// src/handlers/mod.rs

pub mod analytics;
pub mod gamification;
pub mod leaderboard;
pub mod results;
