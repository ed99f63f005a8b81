//! # API Error Type
//!
//! Unified error type for boundary operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Ledger                             │
//! │                                                                         │
//! │  Caller                      Rust Backend                               │
//! │  ──────                      ────────────                               │
//! │                                                                         │
//! │  create_order(token, ...)                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Auth Error? ────── AuthError::InvalidToken ────────┐           │  │
//! │  │         │                                          │           │  │
//! │  │         ▼                                          ▼           │  │
//! │  │  Database Error? ── DbError::Forbidden / Query ── ApiError ────►│  │
//! │  │         │                                          ▲           │  │
//! │  │         ▼                                          │           │  │
//! │  │  Validation Error? ── CoreError::EmptyOrder ───────┘           │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "VALIDATION_ERROR",                                          │
//! │    "message": "Order must contain at least one item" }                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation messages reach the caller verbatim. Database failures are
//! logged and replaced by a generic message.

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::auth::AuthError;
use crate::config::ConfigError;
use ledger_core::{CoreError, ValidationError};
use ledger_db::DbError;

/// API error returned from boundary operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "FORBIDDEN",
///   "message": "Order 3f2a... is not accessible in this tenant/scope"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Missing, unknown or expired session (401)
    Unauthorized,

    /// Resource belongs to another tenant or scope (403)
    Forbidden,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
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
}

/// Result type for boundary operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Forbidden { entity, id } => {
                warn!(entity = %entity, id = %id, "Cross-tenant access rejected");
                ApiError::new(
                    ErrorCode::Forbidden,
                    format!("{} {} is not accessible in this tenant/scope", entity, id),
                )
            }
            DbError::Domain(e) => e.into(),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors. Every core error is a rejected input.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        debug!(error = %err, "Request rejected by validation");
        match err {
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            other => ApiError::validation(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        CoreError::Validation(err).into()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        warn!(error = %err, "Authentication failed");
        ApiError::new(ErrorCode::Unauthorized, err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_verbatim() {
        let err: ApiError = DbError::Domain(CoreError::EmptyOrder).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Order must contain at least one item");
    }

    #[test]
    fn test_forbidden_maps_to_forbidden() {
        let err: ApiError = DbError::forbidden("Order", "o-1").into();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[test]
    fn test_query_failure_is_generic() {
        let err: ApiError = DbError::QueryFailed("no such table: orders".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("orders"));
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::not_found("Order", "o-1");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Order not found: o-1");
    }
}
