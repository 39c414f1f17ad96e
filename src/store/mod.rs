pub mod keys;
pub mod migrate;
pub mod operations;
pub mod trees;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use thiserror::Error;

use crate::constants::MAX_CAS_RETRIES;

#[derive(Debug)]
pub struct Store {
    db: Db,
    pub reviews: sled::Tree,
    pub review_due_index: sled::Tree,
    pub streaks: sled::Tree,
    pub lesson_progress: sled::Tree,
    pub config_versions: sled::Tree,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found: entity={entity}, key={key}")]
    NotFound { entity: String, key: String },
    #[error("CAS retry exhausted after {attempts} attempts: entity={entity}, key={key}")]
    CasRetryExhausted {
        entity: String,
        key: String,
        attempts: u32,
    },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("migration error at version {version}: {message}")]
    Migration { version: u32, message: String },
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        let reviews = db.open_tree(trees::REVIEWS)?;
        let review_due_index = db.open_tree(trees::REVIEW_DUE_INDEX)?;
        let streaks = db.open_tree(trees::STREAKS)?;
        let lesson_progress = db.open_tree(trees::LESSON_PROGRESS)?;
        let config_versions = db.open_tree(trees::CONFIG_VERSIONS)?;

        Ok(Self {
            db,
            reviews,
            review_due_index,
            streaks,
            lesson_progress,
            config_versions,
        })
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        migrate::run(self)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub fn raw_db(&self) -> &Db {
        &self.db
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Read-modify-write of a single key guarded by compare-and-swap.
    ///
    /// `apply` sees the current value and returns the replacement, or `None` to leave the key
    /// untouched. It may run more than once when a concurrent writer wins the race, so it must
    /// be free of side effects. Returns the value stored under `key` afterwards.
    pub(crate) fn cas_update<T, F>(
        tree: &sled::Tree,
        entity: &str,
        key: &str,
        apply: F,
    ) -> Result<Option<T>, StoreError>
    where
        T: Serialize + DeserializeOwned,
        F: Fn(Option<&T>) -> Option<T>,
    {
        for _ in 0..MAX_CAS_RETRIES {
            let current = tree.get(key.as_bytes())?;
            let prior: Option<T> = current
                .as_deref()
                .map(Self::deserialize::<T>)
                .transpose()?;

            let Some(next) = apply(prior.as_ref()) else {
                return Ok(prior);
            };
            let bytes = Self::serialize(&next)?;

            match tree.compare_and_swap(key.as_bytes(), current, Some(bytes))? {
                Ok(()) => return Ok(Some(next)),
                Err(_) => {
                    tracing::debug!(entity, key, "CAS conflict, retrying");
                }
            }
        }

        Err(StoreError::CasRetryExhausted {
            entity: entity.to_string(),
            key: key.to_string(),
            attempts: MAX_CAS_RETRIES,
        })
    }
}
