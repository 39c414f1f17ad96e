use crate::store::StoreError;

const SEPARATOR: char = ':';

/// Width of the zero-padded millisecond field in due index keys.
const TS_WIDTH: usize = 20;

/// User ids are the leading key segment of every per-user tree, so they must not contain the
/// separator or prefix scans for one user would also match another.
fn checked_user_id(user_id: &str) -> Result<&str, StoreError> {
    if user_id.is_empty() {
        return Err(StoreError::Validation("userId must not be empty".to_string()));
    }
    if user_id.contains(SEPARATOR) {
        return Err(StoreError::Validation(format!(
            "userId must not contain '{SEPARATOR}'"
        )));
    }
    Ok(user_id)
}

fn checked_item_id(item_id: &str) -> Result<&str, StoreError> {
    if item_id.is_empty() {
        return Err(StoreError::Validation("itemId must not be empty".to_string()));
    }
    Ok(item_id)
}

// Review record keys
pub fn review_key(user_id: &str, item_id: &str) -> Result<String, StoreError> {
    Ok(format!(
        "{}:{}",
        checked_user_id(user_id)?,
        checked_item_id(item_id)?
    ))
}

pub fn review_prefix(user_id: &str) -> Result<String, StoreError> {
    Ok(format!("{}:", checked_user_id(user_id)?))
}

// Due index keys: `user:{millis:020}:item`, so a prefix scan yields ascending due time,
// then ascending item id for equal times.
pub fn review_due_index_key(
    user_id: &str,
    due_ts_ms: i64,
    item_id: &str,
) -> Result<String, StoreError> {
    let ts = due_ts_ms.max(0) as u64;
    Ok(format!(
        "{}:{:020}:{}",
        checked_user_id(user_id)?,
        ts,
        checked_item_id(item_id)?
    ))
}

pub fn review_due_index_prefix(user_id: &str) -> Result<String, StoreError> {
    review_prefix(user_id)
}

/// Splits a due index key back into `(due_ts_ms, item_id)`.
pub fn parse_due_index_key(key: &[u8]) -> Option<(i64, String)> {
    let text = std::str::from_utf8(key).ok()?;
    let (_, rest) = text.split_once(SEPARATOR)?;
    if rest.len() <= TS_WIDTH || rest.as_bytes()[TS_WIDTH] != SEPARATOR as u8 {
        return None;
    }
    let ts: u64 = rest[..TS_WIDTH].parse().ok()?;
    let item_id = &rest[TS_WIDTH + 1..];
    if item_id.is_empty() {
        return None;
    }
    Some((i64::try_from(ts).ok()?, item_id.to_string()))
}

// Streak keys
pub fn streak_key(user_id: &str) -> Result<String, StoreError> {
    Ok(checked_user_id(user_id)?.to_string())
}

// Lesson progress keys: lesson id is zero-padded so a prefix scan is ordered by lesson.
pub fn lesson_progress_key(user_id: &str, lesson_id: i64) -> Result<String, StoreError> {
    if lesson_id < 0 {
        return Err(StoreError::Validation(
            "lessonId must not be negative".to_string(),
        ));
    }
    Ok(format!("{}:{:020}", checked_user_id(user_id)?, lesson_id))
}

pub fn lesson_progress_prefix(user_id: &str) -> Result<String, StoreError> {
    Ok(format!("{}:", checked_user_id(user_id)?))
}
