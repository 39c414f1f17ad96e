use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub user_id: String,
    pub streak: u32,
    /// UTC calendar day of the most recent graded review.
    pub last_review_date: NaiveDate,
}

impl Store {
    pub fn get_streak(&self, user_id: &str) -> Result<Option<StreakState>, StoreError> {
        let key = keys::streak_key(user_id)?;
        match self.streaks.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn upsert_streak(&self, state: &StreakState) -> Result<StreakState, StoreError> {
        let key = keys::streak_key(&state.user_id)?;
        self.streaks
            .insert(key.as_bytes(), Self::serialize(state)?)?;
        Ok(state.clone())
    }

    /// Compare-and-swap read-modify-write of a user's streak; `apply` must be pure.
    pub fn update_streak(
        &self,
        user_id: &str,
        apply: &dyn Fn(Option<&StreakState>) -> StreakState,
    ) -> Result<StreakState, StoreError> {
        let key = keys::streak_key(user_id)?;
        Self::cas_update(&self.streaks, "streak", &key, |prior| {
            Some(apply(prior))
        })?
        .ok_or_else(|| StoreError::NotFound {
            entity: "streak".to_string(),
            key,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use super::StreakState;
    use crate::store::Store;

    #[test]
    fn update_streak_sees_prior_state() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        store
            .upsert_streak(&StreakState {
                user_id: "u1".to_string(),
                streak: 4,
                last_review_date: day,
            })
            .unwrap();

        let updated = store
            .update_streak("u1", &|prior| {
                let prior = prior.expect("prior streak");
                StreakState {
                    streak: prior.streak + 1,
                    ..prior.clone()
                }
            })
            .unwrap();

        assert_eq!(updated.streak, 5);
        assert_eq!(store.get_streak("u1").unwrap(), Some(updated));
    }

    #[test]
    fn streak_date_serializes_as_calendar_day() {
        let state = StreakState {
            user_id: "u1".to_string(),
            streak: 2,
            last_review_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["lastReviewDate"], "2024-01-31");
    }
}
