// src/models/result.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;
use sqlx::{FromRow, types::Json};
use validator::Validate;

/// Canonical form of a submitted answer map.
///
/// Clients may send question ids as JSON strings (`"12"`) and option indexes
/// as numbers, numeric strings or `null`. Everything is normalized here, once,
/// into `question id -> option index`; unanswered questions are simply absent.
/// Serializes back as `{"12": 0}`, which is also the stored representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnswerSheet(BTreeMap<i64, i64>);

impl AnswerSheet {
    /// Submitted option index for a question, if one was given.
    pub fn get(&self, question_id: i64) -> Option<i64> {
        self.0.get(&question_id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Normalizes a raw JSON object into an `AnswerSheet`.
    pub fn from_raw(raw: &serde_json::Map<String, Value>) -> Result<Self, String> {
        let mut sheet = BTreeMap::new();
        for (key, value) in raw {
            let question_id = key
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("invalid question id '{}'", key))?;
            if let Some(option) = coerce_option_index(value)
                .ok_or_else(|| format!("invalid option index for question {}: {}", key, value))?
            {
                sheet.insert(question_id, option);
            }
        }
        Ok(Self(sheet))
    }
}

impl FromIterator<(i64, i64)> for AnswerSheet {
    fn from_iter<I: IntoIterator<Item = (i64, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// `None` means the value is malformed; `Some(None)` means "no answer".
fn coerce_option_index(value: &Value) -> Option<Option<i64>> {
    match value {
        Value::Null => Some(None),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Some(i)),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| Some(f as i64)),
        },
        Value::String(s) => s.trim().parse::<i64>().ok().map(Some),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for AnswerSheet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        AnswerSheet::from_raw(&raw).map_err(de::Error::custom)
    }
}

/// Represents the 'results' table. One row per submission, never updated
/// after creation apart from the gamification bookkeeping timestamp.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizResult {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub score: f64,
    pub correct_count: i32,
    pub wrong_count: i32,
    pub answers: Json<AnswerSheet>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip)]
    pub gamified_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A result joined with its quiz header, for the caller's history view.
#[derive(Debug, Serialize, FromRow)]
pub struct ResultListItem {
    pub id: i64,
    pub quiz_id: i64,
    pub quiz_title: String,
    pub quiz_category: String,
    pub score: f64,
    pub correct_count: i32,
    pub wrong_count: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitResultRequest {
    #[validate(range(min = 1, message = "quiz_id must be a positive integer"))]
    pub quiz_id: i64,

    /// Key: question id, value: selected option index.
    #[serde(default)]
    pub answers: AnswerSheet,
}

/// Per-question breakdown in the result detail view.
#[derive(Debug, Serialize, PartialEq)]
pub struct QuestionReview {
    pub id: i64,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_option: i32,
    pub user_answer: Option<i64>,
    pub is_correct: bool,
    pub explanation: String,
    pub difficulty: String,
}

#[derive(Debug, Serialize)]
pub struct ResultDetail {
    pub id: i64,
    pub quiz: crate::models::quiz::QuizHeader,
    pub score: f64,
    pub correct_count: i32,
    pub wrong_count: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub questions: Vec<QuestionReview>,
}
