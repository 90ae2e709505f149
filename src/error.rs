//! Structured error types for board operations and drag payloads.
//!
//! Board and transfer errors describe why an intent had no effect. They never
//! escape the controller, which logs them and treats the intent as a no-op.

use serde::Serialize;
use thiserror::Error;

/// Error codes for structured logging.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    InvalidId,
    EmptyTitle,
    MalformedPayload,
    MissingRequiredField,

    // Not found errors
    ColumnNotFound,
    TaskNotFound,

    // No-op moves
    SameColumn,

    // Internal errors
    EncodeFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidId => "INVALID_ID",
            ErrorCode::EmptyTitle => "EMPTY_TITLE",
            ErrorCode::MalformedPayload => "MALFORMED_PAYLOAD",
            ErrorCode::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ErrorCode::ColumnNotFound => "COLUMN_NOT_FOUND",
            ErrorCode::TaskNotFound => "TASK_NOT_FOUND",
            ErrorCode::SameColumn => "SAME_COLUMN",
            ErrorCode::EncodeFailed => "ENCODE_FAILED",
        }
    }
}

/// Why a board mutation was not applied. The board is untouched on error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("{field} must be a non-empty id")]
    InvalidId { field: &'static str },

    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Task {task_id} not found in column {column_id}")]
    TaskNotFound { column_id: String, task_id: String },

    #[error("Task is already in column {0}")]
    SameColumn(String),
}

impl BoardError {
    pub fn code(&self) -> ErrorCode {
        match self {
            BoardError::InvalidId { .. } => ErrorCode::InvalidId,
            BoardError::EmptyTitle => ErrorCode::EmptyTitle,
            BoardError::ColumnNotFound(_) => ErrorCode::ColumnNotFound,
            BoardError::TaskNotFound { .. } => ErrorCode::TaskNotFound,
            BoardError::SameColumn(_) => ErrorCode::SameColumn,
        }
    }

    pub fn column_not_found(column_id: &str) -> Self {
        BoardError::ColumnNotFound(column_id.to_string())
    }

    pub fn task_not_found(column_id: &str, task_id: &str) -> Self {
        BoardError::TaskNotFound {
            column_id: column_id.to_string(),
            task_id: task_id.to_string(),
        }
    }
}

/// Why a drag payload could not be produced or consumed.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Malformed drag payload: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Drag payload is missing {0}")]
    MissingField(&'static str),

    #[error("Failed to encode drag payload: {0}")]
    Encode(#[source] serde_json::Error),
}

impl TransferError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TransferError::Malformed(_) => ErrorCode::MalformedPayload,
            TransferError::MissingField(_) => ErrorCode::MissingRequiredField,
            TransferError::Encode(_) => ErrorCode::EncodeFailed,
        }
    }
}

/// Result type for board mutations.
pub type BoardResult<T> = std::result::Result<T, BoardError>;

/// Result type for drag payload handling.
pub type TransferResult<T> = std::result::Result<T, TransferError>;

/// Validate that an id is a non-empty string.
pub fn validate_id(field: &'static str, id: &str) -> BoardResult<()> {
    if id.trim().is_empty() {
        Err(BoardError::InvalidId { field })
    } else {
        Ok(())
    }
}
