use common::UserId;
use stream::StreamError;
use thiserror::Error;
use view_store::ViewStoreError;

use crate::retry::RetryExhausted;

/// A raw payload could not be decoded into a usage event.
///
/// Local to one record and never retried: the same bytes would fail again.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not well-formed JSON for the expected schema.
    #[error("Malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The payload parsed but carries no user id.
    #[error("Event payload has an empty user id")]
    MissingUserId,
}

/// Failure handling one stream record.
///
/// None of these propagate past the processor: each ends in an error count
/// and a log entry, and the record's checkpoint is not advanced.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The record's payload could not be decoded.
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// Reading the current view failed. Not retried; redelivery covers it.
    #[error("View read failed for user {user_id}: {source}")]
    StoreRead {
        user_id: UserId,
        #[source]
        source: ViewStoreError,
    },

    /// The view write failed on every attempt the retry policy allowed.
    #[error("View write failed after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: ViewStoreError,
    },
}

impl From<RetryExhausted<ViewStoreError>> for ProcessError {
    fn from(err: RetryExhausted<ViewStoreError>) -> Self {
        ProcessError::RetryExhausted {
            attempts: err.attempts,
            source: err.last_error,
        }
    }
}

/// Stream connection bring-up failed after its own bounded retries.
///
/// Fatal for the partition assignment being started, not for workers that
/// are already running.
#[derive(Debug, Error)]
#[error("Stream startup failed after {attempts} attempts: {source}")]
pub struct StartupError {
    pub attempts: u32,
    #[source]
    pub source: StreamError,
}

impl From<RetryExhausted<StreamError>> for StartupError {
    fn from(err: RetryExhausted<StreamError>) -> Self {
        StartupError {
            attempts: err.attempts,
            source: err.last_error,
        }
    }
}
