//! Storage seams of the scheduler. The sled [`Store`] implements all three; tests wrap it to
//! inject failures.

use chrono::{DateTime, Utc};

use crate::store::operations::progress::LessonProgress;
use crate::store::operations::reviews::ReviewRecord;
use crate::store::operations::streaks::StreakState;
use crate::store::{Store, StoreError};

/// Review records keyed by `(user_id, item_id)`.
pub trait ReviewRecordStore: Send + Sync {
    fn get_review(&self, user_id: &str, item_id: &str)
        -> Result<Option<ReviewRecord>, StoreError>;

    fn upsert_review(&self, record: &ReviewRecord) -> Result<ReviewRecord, StoreError>;

    /// Atomic create-if-absent, returning the stored record either way.
    fn insert_review_if_absent(&self, record: &ReviewRecord) -> Result<ReviewRecord, StoreError>;

    /// Atomic read-modify-write; `None` when the key has no record.
    fn update_review(
        &self,
        user_id: &str,
        item_id: &str,
        apply: &dyn Fn(&ReviewRecord) -> ReviewRecord,
    ) -> Result<Option<ReviewRecord>, StoreError>;

    fn delete_review(&self, user_id: &str, item_id: &str) -> Result<bool, StoreError>;

    fn list_reviews_by_user(&self, user_id: &str) -> Result<Vec<ReviewRecord>, StoreError>;

    /// Records with `next_review_at <= as_of`, ascending by due time then item id.
    fn list_due_reviews(
        &self,
        user_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<ReviewRecord>, StoreError>;
}

/// Streak state keyed by user.
pub trait StreakStore: Send + Sync {
    fn get_streak(&self, user_id: &str) -> Result<Option<StreakState>, StoreError>;

    fn upsert_streak(&self, state: &StreakState) -> Result<StreakState, StoreError>;

    /// Atomic read-modify-write of one user's streak.
    fn update_streak(
        &self,
        user_id: &str,
        apply: &dyn Fn(Option<&StreakState>) -> StreakState,
    ) -> Result<StreakState, StoreError>;
}

/// Lesson completion records keyed by `(user_id, lesson_id)`.
pub trait ProgressStore: Send + Sync {
    fn get_lesson_progress(
        &self,
        user_id: &str,
        lesson_id: i64,
    ) -> Result<Option<LessonProgress>, StoreError>;

    fn list_lesson_progress(&self, user_id: &str) -> Result<Vec<LessonProgress>, StoreError>;

    fn update_lesson_progress(
        &self,
        user_id: &str,
        lesson_id: i64,
        apply: &dyn Fn(Option<&LessonProgress>) -> Option<LessonProgress>,
    ) -> Result<Option<LessonProgress>, StoreError>;
}

impl ReviewRecordStore for Store {
    fn get_review(
        &self,
        user_id: &str,
        item_id: &str,
    ) -> Result<Option<ReviewRecord>, StoreError> {
        Store::get_review(self, user_id, item_id)
    }

    fn upsert_review(&self, record: &ReviewRecord) -> Result<ReviewRecord, StoreError> {
        Store::upsert_review(self, record)
    }

    fn insert_review_if_absent(&self, record: &ReviewRecord) -> Result<ReviewRecord, StoreError> {
        Store::insert_review_if_absent(self, record)
    }

    fn update_review(
        &self,
        user_id: &str,
        item_id: &str,
        apply: &dyn Fn(&ReviewRecord) -> ReviewRecord,
    ) -> Result<Option<ReviewRecord>, StoreError> {
        Store::update_review(self, user_id, item_id, apply)
    }

    fn delete_review(&self, user_id: &str, item_id: &str) -> Result<bool, StoreError> {
        Store::delete_review(self, user_id, item_id)
    }

    fn list_reviews_by_user(&self, user_id: &str) -> Result<Vec<ReviewRecord>, StoreError> {
        Store::list_reviews_by_user(self, user_id)
    }

    fn list_due_reviews(
        &self,
        user_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<ReviewRecord>, StoreError> {
        Store::list_due_reviews(self, user_id, as_of)
    }
}

impl StreakStore for Store {
    fn get_streak(&self, user_id: &str) -> Result<Option<StreakState>, StoreError> {
        Store::get_streak(self, user_id)
    }

    fn upsert_streak(&self, state: &StreakState) -> Result<StreakState, StoreError> {
        Store::upsert_streak(self, state)
    }

    fn update_streak(
        &self,
        user_id: &str,
        apply: &dyn Fn(Option<&StreakState>) -> StreakState,
    ) -> Result<StreakState, StoreError> {
        Store::update_streak(self, user_id, apply)
    }
}

impl ProgressStore for Store {
    fn get_lesson_progress(
        &self,
        user_id: &str,
        lesson_id: i64,
    ) -> Result<Option<LessonProgress>, StoreError> {
        Store::get_lesson_progress(self, user_id, lesson_id)
    }

    fn list_lesson_progress(&self, user_id: &str) -> Result<Vec<LessonProgress>, StoreError> {
        Store::list_lesson_progress(self, user_id)
    }

    fn update_lesson_progress(
        &self,
        user_id: &str,
        lesson_id: i64,
        apply: &dyn Fn(Option<&LessonProgress>) -> Option<LessonProgress>,
    ) -> Result<Option<LessonProgress>, StoreError> {
        Store::update_lesson_progress(self, user_id, lesson_id, apply)
    }
}
