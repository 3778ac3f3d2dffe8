// src/models/mod.rs

pub mod achievement;
pub mod analytics;
pub mod badge;
pub mod leaderboard;
pub mod question;
pub mod quiz;
pub mod result;
pub mod streak;
