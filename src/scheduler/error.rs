use thiserror::Error;

use crate::store::operations::reviews::ReviewRecord;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("no review record for user={user_id}, item={item_id}")]
    NotFound { user_id: String, item_id: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),
    /// The review write committed; only the streak write failed and may be retried alone.
    #[error("review graded but streak update failed: {source}")]
    StreakUpdateFailed {
        review: Box<ReviewRecord>,
        #[source]
        source: StoreError,
    },
}

impl From<StoreError> for SchedulerError {
    fn from(value: StoreError) -> Self {
        match value {
            // Key validation runs before any read or write.
            StoreError::Validation(message) => SchedulerError::InvalidArgument(message),
            other => SchedulerError::StoreUnavailable(other),
        }
    }
}
