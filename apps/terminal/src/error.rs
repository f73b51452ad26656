//! # API Error Type
//!
//! Unified error type for console commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Till POS                               │
//! │                                                                         │
//! │  Console line                Rust Backend                               │
//! │  ────────────                ────────────                               │
//! │                                                                         │
//! │  > checkout 5000                                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Engine rejects? ─── CoreError::State(ShiftRequired) ──┐        │  │
//! │  │         │                                              │        │  │
//! │  │         ▼                                              ▼        │  │
//! │  │  Unknown id? ────── CoreError::NotFound ──────────── ApiError ─►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  [SHIFT_REQUIRED] No shift is open; ask an administrator to open one   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::Serialize;
use till_core::{CoreError, StateError, ValidationError};
use till_db::DbError;

/// Error returned from console commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Muffin: available 2, requested 3"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    InsufficientStock,
    InsufficientTender,
    EmptyCart,
    InvalidQuantity,
    InvalidPrice,
    ShiftRequired,
    ShiftAlreadyOpen,
    ShiftNotOpen,
    /// A persisted document could not be read back.
    CorruptData,
    DatabaseError,
    /// The command needs a signed-in operator.
    NotSignedIn,
    /// The console line could not be parsed.
    BadInput,
    Internal,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::InsufficientTender => "INSUFFICIENT_TENDER",
            ErrorCode::EmptyCart => "EMPTY_CART",
            ErrorCode::InvalidQuantity => "INVALID_QUANTITY",
            ErrorCode::InvalidPrice => "INVALID_PRICE",
            ErrorCode::ShiftRequired => "SHIFT_REQUIRED",
            ErrorCode::ShiftAlreadyOpen => "SHIFT_ALREADY_OPEN",
            ErrorCode::ShiftNotOpen => "SHIFT_NOT_OPEN",
            ErrorCode::CorruptData => "CORRUPT_DATA",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::NotSignedIn => "NOT_SIGNED_IN",
            ErrorCode::BadInput => "BAD_INPUT",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn bad_input(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BadInput, message)
    }

    pub fn not_signed_in() -> Self {
        ApiError::new(ErrorCode::NotSignedIn, "Sign in first: login <username>")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts engine errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        let code = match err {
            CoreError::Validation(e) => match e {
                ValidationError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
                ValidationError::InsufficientTender { .. } => ErrorCode::InsufficientTender,
                ValidationError::EmptyCart => ErrorCode::EmptyCart,
                ValidationError::InvalidQuantity { .. } => ErrorCode::InvalidQuantity,
                ValidationError::InvalidPrice { .. } => ErrorCode::InvalidPrice,
                ValidationError::NegativeAmount { .. }
                | ValidationError::Required { .. }
                | ValidationError::AmountTooLarge { .. }
                | ValidationError::Overflow { .. } => ErrorCode::ValidationError,
            },
            CoreError::State(e) => match e {
                StateError::ShiftRequired => ErrorCode::ShiftRequired,
                StateError::AlreadyOpen { .. } => ErrorCode::ShiftAlreadyOpen,
                StateError::NotOpen => ErrorCode::ShiftNotOpen,
            },
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::CorruptDocument { .. } => ErrorCode::CorruptData,
        };
        ApiError::new(code, message)
    }
}

/// Store failures only surface at startup; the operator sees the store's
/// own message.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Corrupt(e) => ApiError::from(e),
            err @ DbError::Serialization { .. } => {
                ApiError::new(ErrorCode::CorruptData, err.to_string())
            }
            err => {
                tracing::error!(error = %err, "Document store unavailable");
                ApiError::new(ErrorCode::DatabaseError, err.to_string())
            }
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================
