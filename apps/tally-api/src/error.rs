//! # API Error Type
//!
//! Unified error type for RPC commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tally POS                              │
//! │                                                                         │
//! │  Client                      Rust Backend                               │
//! │  ──────                      ────────────                               │
//! │                                                                         │
//! │  {"method":"createTransaction", ...}                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Business rule? ── CoreError::InsufficientStock ──┐             │  │
//! │  │         │                                         │             │  │
//! │  │         ▼                                         ▼             │  │
//! │  │  Database? ─────── DbError::UniqueViolation ──► ApiError ──────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  {"id":7,"error":{"code":"INSUFFICIENT_STOCK","message":"...",          │
//! │                   "retryable":false}}                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Infrastructure failures are logged with their details and returned with
//! a generic message.

use serde::Serialize;
use tally_core::CoreError;
use tally_db::{DbError, EngineError};
use ts_rs::TS;

/// API error returned from RPC commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "CONFLICT",
///   "message": "Please retry: transaction number already in use",
///   "retryable": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Whether the same request may succeed if sent again
    pub retryable: bool,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product or transaction does not exist
    NotFound,

    /// Not enough units on hand
    InsufficientStock,

    /// Input validation failed
    ValidationError,

    /// Uniqueness collision; retryable
    Conflict,

    /// Database operation failed
    DatabaseError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new, non-retryable API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            retryable: false,
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a retryable conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError {
            code: ErrorCode::Conflict,
            message: message.into(),
            retryable: true,
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, .. } => {
                tracing::warn!(field = %field, "Uniqueness conflict");
                ApiError::conflict(format!("Please retry: {} already in use", field))
            }
            DbError::CheckViolation { message } => {
                tracing::error!("Check constraint violation: {}", message);
                ApiError::validation("Value rejected by database constraint")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::TransactionNotFound(id) => ApiError::not_found("Transaction", &id),
            err @ CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            err @ (CoreError::EmptyCart | CoreError::CartTooLarge { .. }) => {
                ApiError::validation(err.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Core(e) => e.into(),
            EngineError::Db(e) => e.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_serialize_screaming_snake() {
        let err = ApiError::new(ErrorCode::InsufficientStock, "x");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "INSUFFICIENT_STOCK");
        assert_eq!(json["retryable"], false);
    }

    #[test]
    fn test_business_errors_map_to_codes() {
        let stock: ApiError = CoreError::InsufficientStock {
            product_id: "p-1".to_string(),
            product_name: "Kopi".to_string(),
            available: 1,
            requested: 3,
        }
        .into();
        assert_eq!(stock.code, ErrorCode::InsufficientStock);
        assert!(stock.message.contains("Kopi"));

        let missing: ApiError = CoreError::TransactionNotFound("t-1".to_string()).into();
        assert_eq!(missing.code, ErrorCode::NotFound);

        let empty: ApiError = CoreError::EmptyCart.into();
        assert_eq!(empty.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_uniqueness_is_retryable_conflict() {
        let err: ApiError =
            EngineError::Db(DbError::duplicate("transactions.transaction_number", "TRX-1")).into();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert!(err.retryable);
    }

    #[test]
    fn test_infrastructure_details_not_leaked() {
        let err: ApiError = DbError::QueryFailed("near \"SELEC\": syntax error".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("SELEC"));
    }
}
