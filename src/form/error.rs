use thiserror::Error;

use crate::io::{ShapeError, StoreError};

/// Failures the form container reports instead of silently ignoring.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("form '{id}' not found")]
    NotFound { id: String },
    #[error("corrupt document under '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: ShapeError,
    },
    #[error("form has no identifier yet; publish it first")]
    MissingId,
    #[error(transparent)]
    Store(#[from] StoreError),
}
