// src/services/analytics.rs

use std::collections::BTreeMap;

use sqlx::{FromRow, PgPool, types::Json};

use crate::{
    config::{RECENT_SCORES_WINDOW, WEAK_TOPIC_THRESHOLD},
    error::AppError,
    models::{
        analytics::{
            AnalyticsSummary, BadgeSummary, CategoryStat, RankPass, StreakSummary, TopicStat,
            UserAnalytics,
        },
        streak::Streak,
    },
    services::streak,
};

/// One result, reduced to what aggregation needs.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ScoredAttempt {
    pub category: String,
    pub score: f64,
    pub correct_count: i32,
    pub wrong_count: i32,
}

/// Freshly computed per-user statistics, before they are written.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSnapshot {
    pub total_quizzes: i64,
    pub total_questions_answered: i64,
    pub average_score: f64,
    pub best_category: Option<String>,
    pub worst_category: Option<String>,
    pub category_stats: BTreeMap<String, CategoryStat>,
}

fn mean(sum: f64, count: i64) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Groups attempts by category. Categories come out in ascending order.
fn group_by_category<'a>(
    attempts: impl IntoIterator<Item = &'a ScoredAttempt>,
) -> BTreeMap<String, CategoryStat> {
    let mut sums: BTreeMap<String, (i64, f64, f64)> = BTreeMap::new();
    for attempt in attempts {
        let entry = sums
            .entry(attempt.category.clone())
            .or_insert((0, 0.0, f64::MIN));
        entry.0 += 1;
        entry.1 += attempt.score;
        entry.2 = entry.2.max(attempt.score);
    }

    sums.into_iter()
        .map(|(category, (count, sum, best))| {
            let stat = CategoryStat {
                count,
                avg_score: mean(sum, count),
                best_score: best,
            };
            (category, stat)
        })
        .collect()
}

/// Computes a user's statistics from all of their results.
///
/// best/worst category ties go to the category that sorts first.
pub fn summarize(attempts: &[ScoredAttempt]) -> AnalyticsSnapshot {
    let total_quizzes = attempts.len() as i64;
    let total_questions_answered = attempts
        .iter()
        .map(|a| i64::from(a.correct_count) + i64::from(a.wrong_count))
        .sum();
    let average_score = mean(attempts.iter().map(|a| a.score).sum(), total_quizzes);
    let category_stats = group_by_category(attempts);

    let mut best: Option<(&String, f64)> = None;
    let mut worst: Option<(&String, f64)> = None;
    for (category, stat) in &category_stats {
        if best.is_none_or(|(_, avg)| stat.avg_score > avg) {
            best = Some((category, stat.avg_score));
        }
        if worst.is_none_or(|(_, avg)| stat.avg_score < avg) {
            worst = Some((category, stat.avg_score));
        }
    }

    AnalyticsSnapshot {
        total_quizzes,
        total_questions_answered,
        average_score,
        best_category: best.map(|(c, _)| c.clone()),
        worst_category: worst.map(|(c, _)| c.clone()),
        category_stats,
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct RankRow {
    pub user_id: i64,
    pub average_score: f64,
    pub rank: Option<i32>,
}

/// Orders users by average score (descending) and returns the
/// `(user_id, rank)` pairs whose rank differs from the stored one.
///
/// Ties keep their previous relative order: previously ranked users by old
/// rank, then never-ranked users by id.
pub fn assign_ranks(mut rows: Vec<RankRow>) -> Vec<(i64, i32)> {
    rows.sort_by_key(|r| (r.rank.is_none(), r.rank, r.user_id));
    rows.sort_by(|a, b| b.average_score.total_cmp(&a.average_score));

    rows.iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let rank = i as i32 + 1;
            (row.rank != Some(rank)).then_some((row.user_id, rank))
        })
        .collect()
}

/// Builds the live analytics summary. `attempts` must be ordered newest first.
pub fn build_summary(
    attempts: &[ScoredAttempt],
    streak: &Streak,
    badges: Vec<BadgeSummary>,
) -> AnalyticsSummary {
    let snapshot = summarize(attempts);

    let to_topics = |stats: BTreeMap<String, CategoryStat>| -> Vec<TopicStat> {
        stats
            .into_iter()
            .map(|(category, stat)| TopicStat {
                category,
                count: stat.count,
                avg_score: round2(stat.avg_score),
                best_score: stat.best_score,
            })
            .collect()
    };

    let weak = group_by_category(attempts.iter().filter(|a| a.score < WEAK_TOPIC_THRESHOLD));

    AnalyticsSummary {
        total_quizzes: snapshot.total_quizzes,
        average_score: round2(snapshot.average_score),
        category_stats: to_topics(snapshot.category_stats),
        recent_scores: attempts
            .iter()
            .take(RECENT_SCORES_WINDOW as usize)
            .map(|a| a.score)
            .collect(),
        weak_topics: to_topics(weak),
        streak: StreakSummary {
            current_streak: streak.current_streak,
            longest_streak: streak.longest_streak,
        },
        badges,
    }
}

async fn user_attempts(pool: &PgPool, user_id: i64) -> Result<Vec<ScoredAttempt>, AppError> {
    let attempts = sqlx::query_as::<_, ScoredAttempt>(
        r#"
        SELECT q.category, r.score, r.correct_count, r.wrong_count
        FROM results r
        JOIN quizzes q ON q.id = r.quiz_id
        WHERE r.user_id = $1
        ORDER BY r.created_at DESC, r.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(attempts)
}

pub async fn fetch_analytics(pool: &PgPool, user_id: i64) -> Result<UserAnalytics, AppError> {
    sqlx::query_as::<_, UserAnalytics>(
        r#"
        SELECT user_id, total_quizzes, total_questions_answered, average_score,
               best_category, worst_category, category_stats, rank, rank_epoch,
               version, last_updated
        FROM user_analytics
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Analytics not computed yet".to_string()))
}

/// Recomputes and overwrites one user's analytics row.
///
/// The row is locked for the duration, so concurrent recomputes for the same
/// user apply one after the other. Does not touch ranks.
pub async fn recalculate_user(pool: &PgPool, user_id: i64) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO user_analytics (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let version = sqlx::query_scalar::<_, i64>(
        "SELECT version FROM user_analytics WHERE user_id = $1 FOR UPDATE",
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    let attempts = sqlx::query_as::<_, ScoredAttempt>(
        r#"
        SELECT q.category, r.score, r.correct_count, r.wrong_count
        FROM results r
        JOIN quizzes q ON q.id = r.quiz_id
        WHERE r.user_id = $1
        ORDER BY r.id
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await?;

    let snapshot = summarize(&attempts);

    sqlx::query(
        r#"
        UPDATE user_analytics
        SET total_quizzes = $2,
            total_questions_answered = $3,
            average_score = $4,
            best_category = $5,
            worst_category = $6,
            category_stats = $7,
            version = $8,
            last_updated = CURRENT_TIMESTAMP
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(snapshot.total_quizzes)
    .bind(snapshot.total_questions_answered)
    .bind(snapshot.average_score)
    .bind(&snapshot.best_category)
    .bind(&snapshot.worst_category)
    .bind(Json(&snapshot.category_stats))
    .bind(version + 1)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(user_id, version = version + 1, "User analytics recomputed");
    Ok(())
}

/// Reassigns the global rank of every analytics row.
///
/// Bumping the singleton epoch row takes its row lock, so only one pass runs
/// at a time; a second caller waits and then ranks the newer data.
pub async fn run_rank_pass(pool: &PgPool) -> Result<RankPass, AppError> {
    let mut tx = pool.begin().await?;

    let epoch = sqlx::query_scalar::<_, i64>(
        "UPDATE rank_epochs SET epoch = epoch + 1 WHERE id RETURNING epoch",
    )
    .fetch_one(&mut *tx)
    .await?;

    let rows = sqlx::query_as::<_, RankRow>(
        "SELECT user_id, average_score, rank FROM user_analytics",
    )
    .fetch_all(&mut *tx)
    .await?;

    let changes = assign_ranks(rows);
    let changed = changes.len();

    if !changes.is_empty() {
        let (user_ids, ranks): (Vec<i64>, Vec<i32>) = changes.into_iter().unzip();
        sqlx::query(
            r#"
            UPDATE user_analytics AS ua
            SET rank = c.rank, rank_epoch = $3
            FROM UNNEST($1::BIGINT[], $2::INTEGER[]) AS c(user_id, rank)
            WHERE ua.user_id = c.user_id
            "#,
        )
        .bind(&user_ids)
        .bind(&ranks)
        .bind(epoch)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(epoch, changed, "Rank pass complete");
    Ok(RankPass { epoch, changed })
}

/// Recompute for one user followed by a global rank pass.
pub async fn recalculate(pool: &PgPool, user_id: i64) -> Result<UserAnalytics, AppError> {
    recalculate_user(pool, user_id).await?;
    run_rank_pass(pool).await?;
    fetch_analytics(pool, user_id).await
}

pub async fn summary(pool: &PgPool, user_id: i64) -> Result<AnalyticsSummary, AppError> {
    let attempts = user_attempts(pool, user_id).await?;
    let streak = streak::get_streak(pool, user_id).await?;
    let badges = sqlx::query_as::<_, BadgeSummary>(
        "SELECT type, date_awarded FROM badges WHERE user_id = $1 ORDER BY date_awarded DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(build_summary(&attempts, &streak, badges))
}
