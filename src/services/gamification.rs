// src/services/gamification.rs

use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{result::QuizResult, streak::Streak},
    services::{
        rewards::{self, Reward, RewardContext},
        streak,
    },
};

#[derive(Debug)]
pub struct GamificationOutcome {
    pub streak: Streak,
    pub granted: Vec<Reward>,
}

/// Applies the streak and reward effects of one stored result.
///
/// Runs in its own transaction, after the result itself is committed.
/// The user's streak row is locked first, so submissions from the same user
/// are processed one at a time. Returns `None` if the result was already
/// processed, which makes this safe to call again for retries.
pub async fn apply_for_result(
    pool: &PgPool,
    result: &QuizResult,
) -> Result<Option<GamificationOutcome>, AppError> {
    let mut tx = pool.begin().await?;

    let current = streak::lock_streak(&mut *tx, result.user_id).await?;

    let pending = sqlx::query_scalar::<_, bool>(
        "SELECT gamified_at IS NULL FROM results WHERE id = $1 FOR UPDATE",
    )
    .bind(result.id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Result not found".to_string()))?;

    if !pending {
        return Ok(None);
    }

    // Results processed late (retries) may predate the last recorded activity.
    let day = result.created_at.date_naive();
    let updated = if current.last_active_date.is_some_and(|last| day < last) {
        streak::record_backdated(&mut *tx, &current, day).await?
    } else {
        streak::record_activity(&mut *tx, &current, day).await?
    };

    let lifetime_results = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM results WHERE user_id = $1 AND id <= $2",
    )
    .bind(result.user_id)
    .bind(result.id)
    .fetch_one(&mut *tx)
    .await?;

    let ctx = RewardContext {
        score: result.score,
        lifetime_results,
        current_streak: updated.current_streak,
    };
    let granted = rewards::grant_rewards(&mut *tx, result.user_id, &ctx).await?;

    sqlx::query("UPDATE results SET gamified_at = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(result.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Some(GamificationOutcome {
        streak: updated,
        granted,
    }))
}

/// Processes the user's results whose gamification never completed, oldest
/// first. Stops at the first failure; the remaining results stay pending.
pub async fn retry_pending(pool: &PgPool, user_id: i64) -> Result<usize, AppError> {
    let pending = sqlx::query_as::<_, QuizResult>(
        r#"
        SELECT id, user_id, quiz_id, score, correct_count, wrong_count, answers, created_at, gamified_at
        FROM results
        WHERE user_id = $1 AND gamified_at IS NULL
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut processed = 0;
    for result in &pending {
        if apply_for_result(pool, result).await?.is_some() {
            processed += 1;
        }
    }

    if processed > 0 {
        tracing::info!(user_id, processed, "Pending gamification applied");
    }

    Ok(processed)
}
