// src/models/achievement.rs

use serde::Serialize;
use sqlx::FromRow;

/// Fine-grained milestones. Unique per (user, type, category); the category is
/// empty for types that are not tied to a quiz category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementType {
    FirstQuiz,
    PerfectScore,
    CategoryExpert,
    StreakWarrior,
    FastLearner,
    Bookworm,
    Helpful,
    Consistent,
    QuizMaster,
}

impl AchievementType {
    pub const ALL: [AchievementType; 9] = [
        AchievementType::FirstQuiz,
        AchievementType::PerfectScore,
        AchievementType::CategoryExpert,
        AchievementType::StreakWarrior,
        AchievementType::FastLearner,
        AchievementType::Bookworm,
        AchievementType::Helpful,
        AchievementType::Consistent,
        AchievementType::QuizMaster,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementType::FirstQuiz => "first_quiz",
            AchievementType::PerfectScore => "perfect_score",
            AchievementType::CategoryExpert => "category_expert",
            AchievementType::StreakWarrior => "streak_warrior",
            AchievementType::FastLearner => "fast_learner",
            AchievementType::Bookworm => "bookworm",
            AchievementType::Helpful => "helpful",
            AchievementType::Consistent => "consistent",
            AchievementType::QuizMaster => "quiz_master",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AchievementType::FirstQuiz => "First Quiz",
            AchievementType::PerfectScore => "Perfect Score",
            AchievementType::CategoryExpert => "Category Expert",
            AchievementType::StreakWarrior => "Streak Warrior",
            AchievementType::FastLearner => "Fast Learner",
            AchievementType::Bookworm => "Bookworm",
            AchievementType::Helpful => "Helpful",
            AchievementType::Consistent => "Consistent",
            AchievementType::QuizMaster => "Quiz Master",
        }
    }
}

/// Represents the 'achievements' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Achievement {
    pub id: i64,
    pub user_id: i64,
    pub achievement_type: String,
    pub category: String,
    pub date_earned: chrono::DateTime<chrono::Utc>,
}

/// One entry of the achievement catalogue, with the caller's progress.
#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    pub achievement_type: AchievementType,
    pub title: &'static str,
    pub earned: bool,
}
