// src/models/question.rs

use serde::Serialize;
use sqlx::{prelude::FromRow, types::Json};

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,

    /// The text content of the question.
    pub question_text: String,

    /// List of options (e.g., ["Option A", "Option B"]).
    /// Stored as a JSON array in the database.
    pub options: Json<Vec<String>>,

    /// Zero-based index into `options`.
    pub correct_option: i32,

    /// Explanation of the correct answer.
    pub explanation: String,

    /// 'easy', 'medium' or 'hard'.
    pub difficulty: String,
}

/// The slice of a question needed to score a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct AnswerKey {
    pub id: i64,
    pub correct_option: i32,
}
