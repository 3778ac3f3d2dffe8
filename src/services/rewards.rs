// src/services/rewards.rs

use sqlx::{PgConnection, PgPool};

use crate::{
    config::{ATTEMPT_MILESTONE, HIGH_SCORE_THRESHOLD, STREAK_MILESTONE},
    error::AppError,
    models::{
        achievement::{Achievement, AchievementType},
        badge::{Badge, BadgeType},
    },
};

/// Facts about a submission that reward rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardContext {
    pub score: f64,
    /// Results the user has submitted up to and including this one.
    pub lifetime_results: i64,
    pub current_streak: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reward {
    Badge(BadgeType),
    /// Not tied to a quiz category; stored with an empty category.
    Achievement(AchievementType),
}

pub struct RewardRule {
    pub reward: Reward,
    pub applies: fn(&RewardContext) -> bool,
}

fn scored_high(ctx: &RewardContext) -> bool {
    ctx.score >= HIGH_SCORE_THRESHOLD
}

fn reached_attempt_milestone(ctx: &RewardContext) -> bool {
    ctx.lifetime_results >= ATTEMPT_MILESTONE
}

fn reached_streak_milestone(ctx: &RewardContext) -> bool {
    ctx.current_streak >= STREAK_MILESTONE
}

fn is_first_result(ctx: &RewardContext) -> bool {
    ctx.lifetime_results == 1
}

fn is_perfect(ctx: &RewardContext) -> bool {
    ctx.score >= 100.0
}

/// Every reward the submission pipeline can grant. Evaluated in order after
/// each submission; adding a rule here is all a new trigger needs.
pub const RULES: &[RewardRule] = &[
    RewardRule { reward: Reward::Badge(BadgeType::Score90), applies: scored_high },
    RewardRule { reward: Reward::Badge(BadgeType::Attempt10), applies: reached_attempt_milestone },
    RewardRule { reward: Reward::Badge(BadgeType::Streak7), applies: reached_streak_milestone },
    RewardRule { reward: Reward::Achievement(AchievementType::FirstQuiz), applies: is_first_result },
    RewardRule { reward: Reward::Achievement(AchievementType::PerfectScore), applies: is_perfect },
];

pub fn eligible_rewards(ctx: &RewardContext) -> Vec<Reward> {
    RULES
        .iter()
        .filter(|rule| (rule.applies)(ctx))
        .map(|rule| rule.reward)
        .collect()
}

/// Grants a badge. Returns `false` if the user already holds it.
pub async fn award_badge(
    conn: &mut PgConnection,
    user_id: i64,
    badge: BadgeType,
) -> Result<bool, AppError> {
    let inserted = sqlx::query(
        "INSERT INTO badges (user_id, type) VALUES ($1, $2) ON CONFLICT (user_id, type) DO NOTHING",
    )
    .bind(user_id)
    .bind(badge.as_str())
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(inserted == 1)
}

/// Grants an achievement. Returns `false` if the (type, category) pair is already held.
pub async fn award_achievement(
    conn: &mut PgConnection,
    user_id: i64,
    kind: AchievementType,
    category: &str,
) -> Result<bool, AppError> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO achievements (user_id, achievement_type, category)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, achievement_type, category) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(kind.as_str())
    .bind(category)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(inserted == 1)
}

/// Grants every eligible reward, returning the ones that were new.
pub async fn grant_rewards(
    conn: &mut PgConnection,
    user_id: i64,
    ctx: &RewardContext,
) -> Result<Vec<Reward>, AppError> {
    let mut granted = Vec::new();

    for reward in eligible_rewards(ctx) {
        let created = match reward {
            Reward::Badge(badge) => award_badge(conn, user_id, badge).await?,
            Reward::Achievement(kind) => award_achievement(conn, user_id, kind, "").await?,
        };
        if created {
            tracing::info!(user_id, ?reward, "Reward granted");
            granted.push(reward);
        }
    }

    Ok(granted)
}

pub async fn list_badges(pool: &PgPool, user_id: i64) -> Result<Vec<Badge>, AppError> {
    let badges = sqlx::query_as::<_, Badge>(
        "SELECT id, user_id, type, date_awarded FROM badges WHERE user_id = $1 ORDER BY date_awarded DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(badges)
}

pub async fn list_achievements(pool: &PgPool, user_id: i64) -> Result<Vec<Achievement>, AppError> {
    let achievements = sqlx::query_as::<_, Achievement>(
        r#"
        SELECT id, user_id, achievement_type, category, date_earned
        FROM achievements
        WHERE user_id = $1
        ORDER BY date_earned DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(achievements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(score: f64, lifetime_results: i64, current_streak: i32) -> RewardContext {
        RewardContext {
            score,
            lifetime_results,
            current_streak,
        }
    }

    #[test]
    fn test_first_perfect_submission() {
        let rewards = eligible_rewards(&ctx(100.0, 1, 1));
        assert_eq!(
            rewards,
            vec![
                Reward::Badge(BadgeType::Score90),
                Reward::Achievement(AchievementType::FirstQuiz),
                Reward::Achievement(AchievementType::PerfectScore),
            ]
        );
    }

    #[test]
    fn test_average_submission_earns_nothing() {
        assert!(eligible_rewards(&ctx(50.0, 3, 2)).is_empty());
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let rewards = eligible_rewards(&ctx(90.0, 10, 7));
        assert!(rewards.contains(&Reward::Badge(BadgeType::Score90)));
        assert!(rewards.contains(&Reward::Badge(BadgeType::Attempt10)));
        assert!(rewards.contains(&Reward::Badge(BadgeType::Streak7)));
        assert!(!rewards.contains(&Reward::Achievement(AchievementType::PerfectScore)));

        let below = eligible_rewards(&ctx(89.9, 9, 6));
        assert!(below.is_empty());
    }

    #[test]
    fn test_streak_badge_stays_eligible_past_seven() {
        // Re-grants are absorbed by the unique constraint.
        for streak in 7..12 {
            assert!(eligible_rewards(&ctx(0.0, 2, streak)).contains(&Reward::Badge(BadgeType::Streak7)));
        }
    }
}
