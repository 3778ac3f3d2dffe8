// src/services/streak.rs

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};

use crate::{error::AppError, models::streak::Streak};

/// Where a user's streak stands relative to the day being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakPhase {
    /// No activity recorded yet.
    Uninitialized,
    /// Already active on this day; further submissions change nothing.
    ActiveToday,
    /// Last active the previous day; the streak continues.
    ActiveYesterday,
    /// Gap of more than a day, or a last-active date in the future.
    Lapsed,
}

pub fn phase(streak: &Streak, today: NaiveDate) -> StreakPhase {
    match streak.last_active_date {
        None => StreakPhase::Uninitialized,
        Some(last) if last == today => StreakPhase::ActiveToday,
        Some(last) if today.pred_opt() == Some(last) => StreakPhase::ActiveYesterday,
        Some(_) => StreakPhase::Lapsed,
    }
}

/// Applies one day of activity to a streak.
pub fn advance(streak: &Streak, today: NaiveDate) -> (Streak, StreakPhase) {
    let phase = phase(streak, today);
    let mut next = streak.clone();

    match phase {
        StreakPhase::ActiveToday => {}
        StreakPhase::Uninitialized | StreakPhase::Lapsed => {
            next.current_streak = 1;
            next.longest_streak = next.longest_streak.max(1);
            next.last_active_date = Some(today);
        }
        StreakPhase::ActiveYesterday => {
            next.current_streak += 1;
            next.longest_streak = next.longest_streak.max(next.current_streak);
            next.last_active_date = Some(today);
        }
    }

    (next, phase)
}

/// Applies a day that is older than the streak's last active day, as happens
/// when a result is processed after newer ones.
///
/// The day only matters if it sits right before the current run, which then
/// grows by one. Any other older day leaves the streak untouched.
pub fn backfill(streak: &Streak, day: NaiveDate) -> Option<Streak> {
    let last = streak.last_active_date?;
    if last.signed_duration_since(day).num_days() != i64::from(streak.current_streak) {
        return None;
    }

    let mut next = streak.clone();
    next.current_streak += 1;
    next.longest_streak = next.longest_streak.max(next.current_streak);
    Some(next)
}

async fn save(conn: &mut PgConnection, streak: &Streak) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE streaks
        SET current_streak = $2, longest_streak = $3, last_active_date = $4
        WHERE user_id = $1
        "#,
    )
    .bind(streak.user_id)
    .bind(streak.current_streak)
    .bind(streak.longest_streak)
    .bind(streak.last_active_date)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Loads the user's streak row with a row lock, creating it if needed.
///
/// Must run inside a transaction; the lock serializes concurrent
/// submissions from the same user until commit.
pub async fn lock_streak(conn: &mut PgConnection, user_id: i64) -> Result<Streak, AppError> {
    sqlx::query("INSERT INTO streaks (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    let streak = sqlx::query_as::<_, Streak>(
        r#"
        SELECT user_id, current_streak, longest_streak, last_active_date
        FROM streaks
        WHERE user_id = $1
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(streak)
}

/// Advances the (already locked) streak for `today` and persists it.
pub async fn record_activity(
    conn: &mut PgConnection,
    current: &Streak,
    today: NaiveDate,
) -> Result<Streak, AppError> {
    let (next, phase) = advance(current, today);

    if phase == StreakPhase::ActiveToday {
        return Ok(next);
    }

    save(conn, &next).await?;

    tracing::debug!(
        user_id = next.user_id,
        ?phase,
        current = next.current_streak,
        longest = next.longest_streak,
        "Streak updated"
    );

    Ok(next)
}

/// Records activity on a day before the (already locked) streak's last active
/// day. Never moves `last_active_date` backwards.
pub async fn record_backdated(
    conn: &mut PgConnection,
    current: &Streak,
    day: NaiveDate,
) -> Result<Streak, AppError> {
    let Some(next) = backfill(current, day) else {
        return Ok(current.clone());
    };

    save(conn, &next).await?;

    tracing::debug!(
        user_id = next.user_id,
        %day,
        current = next.current_streak,
        "Streak extended backwards"
    );

    Ok(next)
}

pub async fn get_streak(pool: &PgPool, user_id: i64) -> Result<Streak, AppError> {
    let streak = sqlx::query_as::<_, Streak>(
        "SELECT user_id, current_streak, longest_streak, last_active_date FROM streaks WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(streak.unwrap_or_else(|| Streak::empty(user_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_first_activity_starts_streak() {
        let (s, phase) = advance(&Streak::empty(1), day(10));
        assert_eq!(phase, StreakPhase::Uninitialized);
        assert_eq!((s.current_streak, s.longest_streak), (1, 1));
        assert_eq!(s.last_active_date, Some(day(10)));
    }

    #[test]
    fn test_same_day_is_idempotent() {
        let (s, _) = advance(&Streak::empty(1), day(10));
        let (again, phase) = advance(&s, day(10));
        assert_eq!(phase, StreakPhase::ActiveToday);
        assert_eq!(again, s);
    }

    #[test]
    fn test_consecutive_days_then_gap() {
        let (s, _) = advance(&Streak::empty(1), day(10));
        let (s, phase) = advance(&s, day(11));
        assert_eq!(phase, StreakPhase::ActiveYesterday);
        assert_eq!((s.current_streak, s.longest_streak), (2, 2));

        // Skip the 12th.
        let (s, phase) = advance(&s, day(13));
        assert_eq!(phase, StreakPhase::Lapsed);
        assert_eq!((s.current_streak, s.longest_streak), (1, 2));
        assert_eq!(s.last_active_date, Some(day(13)));
    }

    #[test]
    fn test_future_last_active_resets() {
        let skewed = Streak {
            user_id: 1,
            current_streak: 4,
            longest_streak: 6,
            last_active_date: Some(day(20)),
        };
        let (s, phase) = advance(&skewed, day(15));
        assert_eq!(phase, StreakPhase::Lapsed);
        assert_eq!((s.current_streak, s.longest_streak), (1, 6));
    }

    #[test]
    fn test_longest_never_below_current() {
        let mut s = Streak::empty(1);
        for d in 1..=9 {
            s = advance(&s, day(d)).0;
            assert!(s.longest_streak >= s.current_streak);
        }
        assert_eq!((s.current_streak, s.longest_streak), (9, 9));
    }

    #[test]
    fn test_backfill_day_before_run_extends_it() {
        let s = Streak {
            user_id: 1,
            current_streak: 1,
            longest_streak: 1,
            last_active_date: Some(day(11)),
        };
        let s = backfill(&s, day(10)).unwrap();
        assert_eq!((s.current_streak, s.longest_streak), (2, 2));
        assert_eq!(s.last_active_date, Some(day(11)));

        let (s, phase) = advance(&s, day(12));
        assert_eq!(phase, StreakPhase::ActiveYesterday);
        assert_eq!(s.current_streak, 3);
    }

    #[test]
    fn test_backfill_ignores_days_inside_or_before_a_gap() {
        let s = Streak {
            user_id: 1,
            current_streak: 2,
            longest_streak: 4,
            last_active_date: Some(day(11)),
        };
        // Already part of the run.
        assert!(backfill(&s, day(10)).is_none());
        // Two days before the run starts.
        assert!(backfill(&s, day(8)).is_none());
        assert!(backfill(&Streak::empty(1), day(8)).is_none());
    }

    #[test]
    fn test_month_boundary_counts_as_yesterday() {
        let start = Streak {
            user_id: 1,
            current_streak: 3,
            longest_streak: 3,
            last_active_date: NaiveDate::from_ymd_opt(2025, 2, 28),
        };
        let (s, phase) = advance(&start, day(1));
        assert_eq!(phase, StreakPhase::ActiveYesterday);
        assert_eq!(s.current_streak, 4);
    }
}
