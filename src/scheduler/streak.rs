//! Daily review streaks, bucketed by UTC calendar day.
//!
//! Days are UTC regardless of the learner's timezone: reviews at 23:59 and 00:01 UTC land on
//! two different days.

use chrono::{DateTime, NaiveDate, Utc};

use crate::store::operations::streaks::StreakState;

pub fn utc_day(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive()
}

/// Streak after activity on `today`: unchanged on the same day, +1 on the next day,
/// otherwise restarted at 1 (including a `today` earlier than the last review).
pub fn advance_streak(prior: Option<&StreakState>, user_id: &str, today: NaiveDate) -> StreakState {
    let streak = match prior {
        None => 1,
        Some(prior) => match (today - prior.last_review_date).num_days() {
            0 => prior.streak,
            1 => prior.streak.saturating_add(1),
            _ => 1,
        },
    };

    StreakState {
        user_id: user_id.to_string(),
        streak,
        last_review_date: today,
    }
}
