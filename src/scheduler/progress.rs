use std::cell::Cell;

use chrono::{DateTime, Utc};

use super::{stored_instant, ReviewScheduler, SchedulerError};
use crate::store::operations::progress::LessonProgress;

fn check_lesson_id(lesson_id: i64) -> Result<(), SchedulerError> {
    if lesson_id <= 0 {
        return Err(SchedulerError::InvalidArgument(format!(
            "lessonId must be positive, got {lesson_id}"
        )));
    }
    Ok(())
}

impl ReviewScheduler {
    /// Marks `item_id` learned in `lesson_id` and makes sure it has a review record.
    /// Completing an already completed item changes nothing.
    pub fn complete_item(
        &self,
        user_id: &str,
        lesson_id: i64,
        item_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LessonProgress, SchedulerError> {
        check_lesson_id(lesson_id)?;
        if item_id.is_empty() {
            return Err(SchedulerError::InvalidArgument(
                "itemId must not be empty".to_string(),
            ));
        }
        let now = stored_instant(now);

        let progress = self
            .progress
            .update_lesson_progress(user_id, lesson_id, &|prior| {
                if prior.is_some_and(|p| p.contains(item_id)) {
                    return None;
                }
                let mut next = prior
                    .cloned()
                    .unwrap_or_else(|| LessonProgress::empty(user_id, lesson_id, now));
                next.completed_items.push(item_id.to_string());
                next.updated_at = now;
                Some(next)
            })?
            .unwrap_or_else(|| LessonProgress::empty(user_id, lesson_id, now));

        self.initialize_review(user_id, lesson_id, item_id, now)?;
        Ok(progress)
    }

    /// Un-marks `item_id` in `lesson_id`. The review record is deleted only when this call
    /// removed the item and no other lesson of the user still lists it.
    pub fn uncomplete_item(
        &self,
        user_id: &str,
        lesson_id: i64,
        item_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LessonProgress, SchedulerError> {
        check_lesson_id(lesson_id)?;
        let now = stored_instant(now);

        // set on every CAS attempt, so it reflects the attempt that won
        let removed = Cell::new(false);
        let progress = self
            .progress
            .update_lesson_progress(user_id, lesson_id, &|prior| {
                let listed = prior.filter(|p| p.contains(item_id));
                removed.set(listed.is_some());
                let mut next = listed?.clone();
                next.completed_items.retain(|id| id != item_id);
                next.updated_at = now;
                Some(next)
            })?
            .unwrap_or_else(|| LessonProgress::empty(user_id, lesson_id, now));

        if !removed.get() {
            return Ok(progress);
        }
        let still_listed = self
            .progress
            .list_lesson_progress(user_id)?
            .iter()
            .any(|p| p.contains(item_id));
        if still_listed {
            tracing::debug!(user_id, item_id, lesson_id, "Review kept, item listed in another lesson");
        } else {
            self.remove_review(user_id, item_id)?;
        }
        Ok(progress)
    }

    /// Progress for one lesson; an empty record when the user has not started it.
    pub fn lesson_progress(
        &self,
        user_id: &str,
        lesson_id: i64,
        now: DateTime<Utc>,
    ) -> Result<LessonProgress, SchedulerError> {
        check_lesson_id(lesson_id)?;
        Ok(self
            .progress
            .get_lesson_progress(user_id, lesson_id)?
            .unwrap_or_else(|| LessonProgress::empty(user_id, lesson_id, stored_instant(now))))
    }

    pub fn list_progress(&self, user_id: &str) -> Result<Vec<LessonProgress>, SchedulerError> {
        Ok(self.progress.list_lesson_progress(user_id)?)
    }
}
