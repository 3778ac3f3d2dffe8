// src/services/mod.rs
//
// Submission pipeline: scoring -> streak -> rewards, driven by `gamification`.
// `analytics` and `leaderboard` are read/recompute paths over the same results.

pub mod analytics;
pub mod gamification;
pub mod leaderboard;
pub mod rewards;
pub mod scoring;
pub mod streak;
