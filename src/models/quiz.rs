// src/models/quiz.rs

use serde::Serialize;
use sqlx::FromRow;

/// Represents the 'quizzes' table in the database.
/// Quizzes are managed elsewhere; scoring only reads them.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub topic: String,

    /// Category label such as 'GK', 'Nepali', 'English' or 'IT'.
    pub category: String,

    /// Declared question count. Scoring counts the live question set instead.
    pub total_questions: i32,

    /// Duration in minutes.
    pub duration: i32,
}

/// Quiz header embedded in result views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizHeader {
    pub id: i64,
    pub title: String,
    pub category: String,
}

impl From<Quiz> for QuizHeader {
    fn from(quiz: Quiz) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title,
            category: quiz.category,
        }
    }
}
