//! Error types for the tracker

use runwatch_client::ClientError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackError>;

/// Errors produced while resolving, extracting, or waiting on executions
#[derive(Debug, Error)]
pub enum TrackError {
    /// A named child task, result, param, or env var is absent from an
    /// otherwise successfully fetched object
    #[error("{0}")]
    NotFound(String),

    /// A required nested structure is absent
    #[error("{object} has no {field}")]
    MissingField { object: String, field: &'static str },

    /// The store could not be read; the store's error is kept verbatim
    #[error(transparent)]
    Fetch(#[from] ClientError),

    /// A bounded wait ran out before its condition held
    #[error("timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },

    /// A wait was aborted through its cancellation token
    #[error("wait for {0} was cancelled")]
    Cancelled(String),
}

impl TrackError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn missing_field(object: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            object: object.into(),
            field,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}
