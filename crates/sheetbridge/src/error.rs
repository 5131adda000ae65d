//! Error types for the editor bridge.

use std::time::Duration;

use sheetbridge_writer::WriterError;
use thiserror::Error;

use crate::config::ContextRole;

/// Errors surfaced by bridge operations, always through a rejected
/// [`Deferred`](crate::Deferred) or an `Err` return.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Timed out after {timeout:?} waiting for: {action}")]
    Timeout { action: String, timeout: Duration },

    #[error("{0} context not ready")]
    NotReady(ContextRole),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Remote execution failed: {message}")]
    Remote { message: String },

    #[error(transparent)]
    Writer(#[from] WriterError),

    #[error("Invalid editor configuration: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reply channel closed before the request settled")]
    Closed,

    #[error("No Tokio runtime available")]
    NoRuntime,
}

impl Error {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
