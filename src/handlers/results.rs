// src/handlers/results.rs

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::result::{QuizResult, ResultDetail, ResultListItem, SubmitResultRequest},
    services::{gamification, scoring},
    utils::jwt::Claims,
};

/// Submits answers for a quiz.
///
/// * Scores the answers against the quiz's live question set.
/// * Stores the result; this is the durable outcome of the request.
/// * Applies streak, badge and achievement effects. Failures there are logged
///   and left for a retry; the response still reports the stored result.
pub async fn submit_result(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<SubmitResultRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;
    let user_id = claims.user_id()?;

    let result = scoring::record_submission(&pool, user_id, req.quiz_id, &req.answers).await?;

    if let Err(e) = gamification::apply_for_result(&pool, &result).await {
        tracing::warn!(
            result_id = result.id,
            user_id,
            "Gamification deferred for result: {}",
            e
        );
    }

    Ok((StatusCode::CREATED, Json(result)))
}

/// Lists the current user's results, newest first.
pub async fn list_results(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let results = sqlx::query_as::<_, ResultListItem>(
        r#"
        SELECT
            r.id, r.quiz_id, q.title as quiz_title, q.category as quiz_category,
            r.score, r.correct_count, r.wrong_count, r.created_at
        FROM results r
        JOIN quizzes q ON q.id = r.quiz_id
        WHERE r.user_id = $1
        ORDER BY r.created_at DESC, r.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(results))
}

/// Shows one of the current user's results question by question.
/// Results belonging to other users are reported as not found.
pub async fn result_details(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(result_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let result = sqlx::query_as::<_, QuizResult>(
        r#"
        SELECT id, user_id, quiz_id, score, correct_count, wrong_count, answers, created_at, gamified_at
        FROM results
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(result_id)
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Result not found".to_string()))?;

    let quiz = scoring::find_quiz(&pool, result.quiz_id).await?;
    let questions = scoring::quiz_questions(&pool, result.quiz_id).await?;

    Ok(Json(ResultDetail {
        id: result.id,
        quiz: quiz.into(),
        score: result.score,
        correct_count: result.correct_count,
        wrong_count: result.wrong_count,
        created_at: result.created_at,
        questions: scoring::review_questions(questions, &result.answers.0),
    }))
}

/// Re-applies gamification for any of the user's results that missed it.
pub async fn retry_gamification(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let processed = gamification::retry_pending(&pool, user_id).await?;

    Ok(Json(serde_json::json!({ "processed": processed })))
}
