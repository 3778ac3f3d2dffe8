// src/services/scoring.rs

use sqlx::{PgPool, types::Json};

use crate::{
    error::AppError,
    models::{
        question::{AnswerKey, Question},
        quiz::Quiz,
        result::{AnswerSheet, QuestionReview, QuizResult},
    },
};

/// Counts derived from one submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scorecard {
    pub correct_count: i32,
    pub wrong_count: i32,
    pub total_questions: i32,
    pub score: f64,
}

/// Scores a submission against the quiz's answer keys.
///
/// Every key is visited exactly once, so `correct + wrong == keys.len()`.
/// Missing answers and out-of-range indexes both count as wrong; answers to
/// question ids outside the quiz are ignored.
pub fn score_answers(keys: &[AnswerKey], answers: &AnswerSheet) -> Scorecard {
    let mut correct_count = 0;
    let mut wrong_count = 0;

    for key in keys {
        match answers.get(key.id) {
            Some(choice) if choice == i64::from(key.correct_option) => correct_count += 1,
            _ => wrong_count += 1,
        }
    }

    let total_questions = keys.len() as i32;
    let score = if total_questions == 0 {
        0.0
    } else {
        correct_count as f64 / total_questions as f64 * 100.0
    };

    Scorecard {
        correct_count,
        wrong_count,
        total_questions,
        score,
    }
}

/// Builds the per-question review for the result detail view.
pub fn review_questions(questions: Vec<Question>, answers: &AnswerSheet) -> Vec<QuestionReview> {
    questions
        .into_iter()
        .map(|q| {
            let user_answer = answers.get(q.id);
            QuestionReview {
                is_correct: user_answer == Some(i64::from(q.correct_option)),
                id: q.id,
                question_text: q.question_text,
                options: q.options.0,
                correct_option: q.correct_option,
                user_answer,
                explanation: q.explanation,
                difficulty: q.difficulty,
            }
        })
        .collect()
}

pub async fn find_quiz(pool: &PgPool, quiz_id: i64) -> Result<Quiz, AppError> {
    sqlx::query_as::<_, Quiz>(
        "SELECT id, title, topic, category, total_questions, duration FROM quizzes WHERE id = $1",
    )
    .bind(quiz_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))
}

/// Live question set of a quiz, ordered by id.
pub async fn quiz_questions(pool: &PgPool, quiz_id: i64) -> Result<Vec<Question>, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, quiz_id, question_text, options, correct_option, explanation, difficulty
        FROM questions
        WHERE quiz_id = $1
        ORDER BY id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    Ok(questions)
}

/// Scores a submission and persists it as a new `results` row.
///
/// Fails with `NotFound` before writing anything if the quiz does not exist.
pub async fn record_submission(
    pool: &PgPool,
    user_id: i64,
    quiz_id: i64,
    answers: &AnswerSheet,
) -> Result<QuizResult, AppError> {
    let quiz = find_quiz(pool, quiz_id).await?;

    let keys = sqlx::query_as::<_, AnswerKey>(
        "SELECT id, correct_option FROM questions WHERE quiz_id = $1 ORDER BY id",
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    if keys.len() as i32 != quiz.total_questions {
        tracing::debug!(
            quiz_id,
            declared = quiz.total_questions,
            live = keys.len(),
            "Quiz question count differs from its declared total; scoring the live set"
        );
    }

    let card = score_answers(&keys, answers);

    let result = sqlx::query_as::<_, QuizResult>(
        r#"
        INSERT INTO results (user_id, quiz_id, score, correct_count, wrong_count, answers)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, quiz_id, score, correct_count, wrong_count, answers, created_at, gamified_at
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .bind(card.score)
    .bind(card.correct_count)
    .bind(card.wrong_count)
    .bind(Json(answers))
    .fetch_one(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to insert result: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!(
        result_id = result.id,
        user_id,
        quiz_id,
        score = card.score,
        correct = card.correct_count,
        wrong = card.wrong_count,
        "Quiz submission scored"
    );

    Ok(result)
}
