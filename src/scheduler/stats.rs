use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use super::{streak, ReviewScheduler, SchedulerError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDueCount {
    pub lesson_id: i64,
    pub due_count: u64,
}

/// Dashboard summary for one learner at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_learned: u64,
    pub due_today: u64,
    pub reviews_done_today: u64,
    pub streak: u32,
    pub last_review_date: Option<NaiveDate>,
    pub per_lesson_due: Vec<LessonDueCount>,
}

/// `[start, end)` of the UTC day containing `at`.
fn utc_day_bounds(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = streak::utc_day(at);
    let start = Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN));
    (start, start + Duration::days(1))
}

impl ReviewScheduler {
    /// Items due before the end of `as_of`'s UTC day count as due today; records whose
    /// `updated_at` falls inside that day count as done today. The streak is reported
    /// as stored, so a streak broken by inactivity still shows until the next review.
    pub fn review_stats(
        &self,
        user_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<ReviewStats, SchedulerError> {
        let (day_start, day_end) = utc_day_bounds(as_of);

        let learned: HashSet<String> = self
            .progress
            .list_lesson_progress(user_id)?
            .into_iter()
            .flat_map(|p| p.completed_items)
            .collect();

        let mut due_today = 0u64;
        let mut reviews_done_today = 0u64;
        let mut per_lesson: BTreeMap<i64, u64> = BTreeMap::new();
        for record in self.reviews.list_reviews_by_user(user_id)? {
            if record.next_review_at < day_end {
                due_today += 1;
                *per_lesson.entry(record.lesson_id).or_default() += 1;
            }
            if record.updated_at >= day_start && record.updated_at < day_end {
                reviews_done_today += 1;
            }
        }

        let streak = self.streaks.get_streak(user_id)?;

        Ok(ReviewStats {
            total_learned: learned.len() as u64,
            due_today,
            reviews_done_today,
            streak: streak.as_ref().map_or(0, |s| s.streak),
            last_review_date: streak.map(|s| s.last_review_date),
            per_lesson_due: per_lesson
                .into_iter()
                .map(|(lesson_id, due_count)| LessonDueCount { lesson_id, due_count })
                .collect(),
        })
    }
}
