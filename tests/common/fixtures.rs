use chrono::{DateTime, Utc};

use review_backend::store::operations::reviews::ReviewRecord;
use review_backend::store::Store;

/// Stores a record with explicit SM-2 state, as if it had been reviewed before.
pub fn seed_review(
    store: &Store,
    user_id: &str,
    item_id: &str,
    lesson_id: i64,
    (repetitions, interval_days, ease_factor): (u32, u32, f64),
    next_review_at: DateTime<Utc>,
) -> ReviewRecord {
    let mut record = ReviewRecord::initial(user_id, lesson_id, item_id, next_review_at);
    record.repetitions = repetitions;
    record.interval_days = interval_days;
    record.ease_factor = ease_factor;
    store.upsert_review(&record).expect("seed review")
}
