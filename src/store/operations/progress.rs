use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

/// Items a learner has marked learned within one lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    pub user_id: String,
    pub lesson_id: i64,
    #[serde(default)]
    pub completed_items: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl LessonProgress {
    pub fn empty(user_id: &str, lesson_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            lesson_id,
            completed_items: Vec::new(),
            updated_at: now,
        }
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.completed_items.iter().any(|id| id == item_id)
    }
}

impl Store {
    pub fn get_lesson_progress(
        &self,
        user_id: &str,
        lesson_id: i64,
    ) -> Result<Option<LessonProgress>, StoreError> {
        let key = keys::lesson_progress_key(user_id, lesson_id)?;
        match self.lesson_progress.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// All of a user's lesson progress, ordered by lesson id.
    pub fn list_lesson_progress(&self, user_id: &str) -> Result<Vec<LessonProgress>, StoreError> {
        let prefix = keys::lesson_progress_prefix(user_id)?;
        let mut out = Vec::new();
        for item in self.lesson_progress.scan_prefix(prefix.as_bytes()) {
            let (_, v) = item?;
            out.push(Self::deserialize::<LessonProgress>(&v)?);
        }
        Ok(out)
    }

    /// Compare-and-swap update; `apply` returning `None` leaves the record as is.
    pub fn update_lesson_progress(
        &self,
        user_id: &str,
        lesson_id: i64,
        apply: &dyn Fn(Option<&LessonProgress>) -> Option<LessonProgress>,
    ) -> Result<Option<LessonProgress>, StoreError> {
        let key = keys::lesson_progress_key(user_id, lesson_id)?;
        Self::cas_update(&self.lesson_progress, "lesson_progress", &key, apply)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::tempdir;

    use super::LessonProgress;
    use crate::store::Store;

    #[test]
    fn list_is_ordered_by_lesson_id() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let now = Utc::now();

        for lesson_id in [10, 2, 7] {
            store
                .update_lesson_progress("u1", lesson_id, &|_| {
                    Some(LessonProgress::empty("u1", lesson_id, now))
                })
                .unwrap();
        }
        store
            .update_lesson_progress("u2", 1, &|_| Some(LessonProgress::empty("u2", 1, now)))
            .unwrap();

        let lessons: Vec<_> = store
            .list_lesson_progress("u1")
            .unwrap()
            .into_iter()
            .map(|p| p.lesson_id)
            .collect();
        assert_eq!(lessons, vec![2, 7, 10]);
    }

    #[test]
    fn skipped_update_returns_current_value() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();

        let result = store.update_lesson_progress("u1", 3, &|_| None).unwrap();
        assert!(result.is_none());
        assert!(store.get_lesson_progress("u1", 3).unwrap().is_none());
    }
}
