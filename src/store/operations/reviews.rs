use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionalTree};
use sled::Transactional;

use crate::constants::{DEFAULT_EASE_FACTOR, DEFAULT_INTERVAL_DAYS};
use crate::store::keys;
use crate::store::{Store, StoreError};

const EMPTY: &[u8] = &[];

/// Scheduling state of one vocabulary item for one learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub user_id: String,
    pub item_id: String,
    pub lesson_id: i64,
    #[serde(alias = "nextReview")]
    pub next_review_at: DateTime<Utc>,
    #[serde(default = "default_interval_days", alias = "interval")]
    pub interval_days: u32,
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    #[serde(default)]
    pub repetitions: u32,
    pub updated_at: DateTime<Utc>,
}

fn default_interval_days() -> u32 {
    DEFAULT_INTERVAL_DAYS
}

fn default_ease_factor() -> f64 {
    DEFAULT_EASE_FACTOR
}

impl ReviewRecord {
    /// A record for an item that was just learned: due immediately, default SM-2 state.
    pub fn initial(user_id: &str, lesson_id: i64, item_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            lesson_id,
            next_review_at: now,
            interval_days: DEFAULT_INTERVAL_DAYS,
            ease_factor: DEFAULT_EASE_FACTOR,
            repetitions: 0,
            updated_at: now,
        }
    }
}

type TxResult<T> = Result<T, ConflictableTransactionError<StoreError>>;

fn abort(error: StoreError) -> ConflictableTransactionError<StoreError> {
    ConflictableTransactionError::Abort(error)
}

fn from_tx_error(error: TransactionError<StoreError>) -> StoreError {
    match error {
        TransactionError::Abort(store_error) => store_error,
        TransactionError::Storage(storage_error) => StoreError::Sled(storage_error),
    }
}

fn due_index_key(record: &ReviewRecord) -> Result<String, StoreError> {
    keys::review_due_index_key(
        &record.user_id,
        record.next_review_at.timestamp_millis(),
        &record.item_id,
    )
}

fn read_in_tx(tx_reviews: &TransactionalTree, key: &str) -> TxResult<Option<ReviewRecord>> {
    match tx_reviews.get(key.as_bytes())? {
        Some(raw) => Store::deserialize(&raw).map(Some).map_err(abort),
        None => Ok(None),
    }
}

/// Writes `next` and moves its due index entry, dropping the entry of `previous`.
fn write_in_tx(
    tx_reviews: &TransactionalTree,
    tx_due_index: &TransactionalTree,
    key: &str,
    previous: Option<&ReviewRecord>,
    next: &ReviewRecord,
) -> TxResult<()> {
    if let Some(previous) = previous {
        let old_index_key = due_index_key(previous).map_err(abort)?;
        tx_due_index.remove(old_index_key.as_bytes())?;
    }

    let value = Store::serialize(next).map_err(abort)?;
    tx_reviews.insert(key.as_bytes(), value)?;

    let index_key = due_index_key(next).map_err(abort)?;
    tx_due_index.insert(index_key.as_bytes(), EMPTY)?;
    Ok(())
}

fn ensure_key_matches(record: &ReviewRecord, user_id: &str, item_id: &str) -> Result<(), StoreError> {
    if record.user_id != user_id || record.item_id != item_id {
        return Err(StoreError::Validation(format!(
            "review record key changed from {user_id}/{item_id} to {}/{}",
            record.user_id, record.item_id
        )));
    }
    Ok(())
}

impl Store {
    pub fn get_review(
        &self,
        user_id: &str,
        item_id: &str,
    ) -> Result<Option<ReviewRecord>, StoreError> {
        let key = keys::review_key(user_id, item_id)?;
        match self.reviews.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn upsert_review(&self, record: &ReviewRecord) -> Result<ReviewRecord, StoreError> {
        let key = keys::review_key(&record.user_id, &record.item_id)?;

        (&self.reviews, &self.review_due_index)
            .transaction(|(tx_reviews, tx_due_index)| {
                let previous = read_in_tx(tx_reviews, &key)?;
                write_in_tx(tx_reviews, tx_due_index, &key, previous.as_ref(), record)
            })
            .map_err(from_tx_error)?;

        Ok(record.clone())
    }

    /// Inserts `record` unless one already exists for its key; returns whichever is stored.
    pub fn insert_review_if_absent(
        &self,
        record: &ReviewRecord,
    ) -> Result<ReviewRecord, StoreError> {
        let key = keys::review_key(&record.user_id, &record.item_id)?;

        (&self.reviews, &self.review_due_index)
            .transaction(|(tx_reviews, tx_due_index)| {
                if let Some(existing) = read_in_tx(tx_reviews, &key)? {
                    return Ok(existing);
                }
                write_in_tx(tx_reviews, tx_due_index, &key, None, record)?;
                Ok(record.clone())
            })
            .map_err(from_tx_error)
    }

    /// Atomic read-modify-write of one record. Returns `None` when no record exists.
    ///
    /// Runs inside a serializable sled transaction over the record and its due index, so
    /// `apply` may be re-run on conflict and must be pure.
    pub fn update_review(
        &self,
        user_id: &str,
        item_id: &str,
        apply: &dyn Fn(&ReviewRecord) -> ReviewRecord,
    ) -> Result<Option<ReviewRecord>, StoreError> {
        let key = keys::review_key(user_id, item_id)?;

        (&self.reviews, &self.review_due_index)
            .transaction(|(tx_reviews, tx_due_index)| {
                let Some(current) = read_in_tx(tx_reviews, &key)? else {
                    return Ok(None);
                };
                let next = apply(&current);
                ensure_key_matches(&next, user_id, item_id).map_err(abort)?;
                write_in_tx(tx_reviews, tx_due_index, &key, Some(&current), &next)?;
                Ok(Some(next))
            })
            .map_err(from_tx_error)
    }

    /// Returns whether a record was removed.
    pub fn delete_review(&self, user_id: &str, item_id: &str) -> Result<bool, StoreError> {
        let key = keys::review_key(user_id, item_id)?;

        (&self.reviews, &self.review_due_index)
            .transaction(|(tx_reviews, tx_due_index)| {
                let Some(removed) = tx_reviews.remove(key.as_bytes())? else {
                    return Ok(false);
                };
                let removed: ReviewRecord = Store::deserialize(&removed).map_err(abort)?;
                let index_key = due_index_key(&removed).map_err(abort)?;
                tx_due_index.remove(index_key.as_bytes())?;
                Ok(true)
            })
            .map_err(from_tx_error)
    }

    pub fn list_reviews_by_user(&self, user_id: &str) -> Result<Vec<ReviewRecord>, StoreError> {
        let prefix = keys::review_prefix(user_id)?;
        let mut records = Vec::new();
        for item in self.reviews.scan_prefix(prefix.as_bytes()) {
            let (_, v) = item?;
            records.push(Self::deserialize::<ReviewRecord>(&v)?);
        }
        Ok(records)
    }

    /// Records with `next_review_at <= as_of`, soonest first, ties ordered by item id.
    pub fn list_due_reviews(
        &self,
        user_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<ReviewRecord>, StoreError> {
        let prefix = keys::review_due_index_prefix(user_id)?;
        let as_of_ms = as_of.timestamp_millis().max(0);
        let mut due = Vec::new();

        for item in self.review_due_index.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            let Some((due_ts_ms, item_id)) = keys::parse_due_index_key(&key) else {
                continue;
            };

            if due_ts_ms > as_of_ms {
                break;
            }

            if let Some(record) = self.get_review(user_id, &item_id)? {
                let indexed_at = record.next_review_at.timestamp_millis().max(0);
                if indexed_at == due_ts_ms && record.next_review_at <= as_of {
                    due.push(record);
                }
            }
        }

        // The index orders by millisecond; sub-millisecond timestamps still sort exactly.
        due.sort_by(|a, b| {
            a.next_review_at
                .cmp(&b.next_review_at)
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        Ok(due)
    }
}
