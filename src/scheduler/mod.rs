pub mod error;
pub mod ports;
pub mod progress;
pub mod sm2;
pub mod stats;
pub mod streak;

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;

use crate::store::operations::reviews::ReviewRecord;
use crate::store::operations::streaks::StreakState;
use crate::store::Store;

pub use error::SchedulerError;
use ports::{ProgressStore, ReviewRecordStore, StreakStore};
pub use sm2::Grade;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeOutcome {
    pub review: ReviewRecord,
    pub streak: StreakState,
}

/// Grades learned items and keeps per-user streaks. Holds no mutable state of its own;
/// all read-modify-write cycles run atomically inside the stores.
#[derive(Clone)]
pub struct ReviewScheduler {
    reviews: Arc<dyn ReviewRecordStore>,
    streaks: Arc<dyn StreakStore>,
    progress: Arc<dyn ProgressStore>,
}

/// Stored timestamps carry millisecond precision, matching the due index.
fn stored_instant(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

impl ReviewScheduler {
    pub fn new(store: Arc<Store>) -> Self {
        Self::with_stores(store.clone(), store.clone(), store)
    }

    pub fn with_stores(
        reviews: Arc<dyn ReviewRecordStore>,
        streaks: Arc<dyn StreakStore>,
        progress: Arc<dyn ProgressStore>,
    ) -> Self {
        Self {
            reviews,
            streaks,
            progress,
        }
    }

    /// Applies one SM-2 grading to an item the user has already started learning, then
    /// counts today as active in the user's streak.
    ///
    /// Grades outside `0..=5` are rejected before the store is touched. A missing record is
    /// `NotFound`; items are never auto-initialized here. If the review commits but the
    /// streak write fails, the result is `StreakUpdateFailed` carrying the committed record.
    pub fn grade_review(
        &self,
        user_id: &str,
        item_id: &str,
        grade: i64,
        now: DateTime<Utc>,
    ) -> Result<GradeOutcome, SchedulerError> {
        let grade = Grade::new(grade)?;
        let now = stored_instant(now);

        let review = self
            .reviews
            .update_review(user_id, item_id, &|current| current.graded(grade, now))?
            .ok_or_else(|| SchedulerError::NotFound {
                user_id: user_id.to_string(),
                item_id: item_id.to_string(),
            })?;

        tracing::debug!(
            user_id,
            item_id,
            grade = grade.value(),
            repetitions = review.repetitions,
            interval_days = review.interval_days,
            ease_factor = review.ease_factor,
            "Review graded"
        );

        let streak = match self.update_streak(user_id, now) {
            Ok(streak) => streak,
            Err(source) => {
                tracing::warn!(user_id, item_id, error = %source, "Streak update failed after grading");
                return Err(SchedulerError::StreakUpdateFailed {
                    review: Box::new(review),
                    source,
                });
            }
        };

        Ok(GradeOutcome { review, streak })
    }

    /// Creates the default record for `(user_id, item_id)` unless one exists; an existing
    /// record is returned unchanged.
    pub fn initialize_review(
        &self,
        user_id: &str,
        lesson_id: i64,
        item_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ReviewRecord, SchedulerError> {
        let initial = ReviewRecord::initial(user_id, lesson_id, item_id, stored_instant(now));
        let stored = self.reviews.insert_review_if_absent(&initial)?;
        if stored == initial {
            tracing::debug!(user_id, item_id, lesson_id, "Review record initialized");
        }
        Ok(stored)
    }

    /// Deletes the record if present.
    pub fn remove_review(&self, user_id: &str, item_id: &str) -> Result<(), SchedulerError> {
        if self.reviews.delete_review(user_id, item_id)? {
            tracing::debug!(user_id, item_id, "Review record removed");
        }
        Ok(())
    }

    /// Records due at `as_of`, soonest first; equal due times are ordered by item id.
    pub fn list_due(
        &self,
        user_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<ReviewRecord>, SchedulerError> {
        Ok(self.reviews.list_due_reviews(user_id, as_of)?)
    }

    /// Counts `as_of`'s UTC day as active for `user_id`.
    pub fn record_activity(
        &self,
        user_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<StreakState, SchedulerError> {
        Ok(self.update_streak(user_id, as_of)?)
    }

    fn update_streak(
        &self,
        user_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<StreakState, crate::store::StoreError> {
        let today = streak::utc_day(as_of);
        self.streaks.update_streak(user_id, &|prior| {
            streak::advance_streak(prior, user_id, today)
        })
    }
}
