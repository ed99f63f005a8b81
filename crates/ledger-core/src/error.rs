//! # Error Types
//!
//! Domain-specific error types for ledger-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ledger-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  ledger-db errors (separate crate)                                     │
//! │  └── DbError          - Database / authorization-by-ownership failures │
//! │                                                                         │
//! │  ledger-app errors                                                     │
//! │  └── ApiError         - What callers see (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Caller       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Referential drops (stale or foreign catalog references) are NOT errors:
//! the normalizer clears the reference and keeps going.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant is raised before any write happens, so no partial state is
/// ever committed for a rejected request.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Normalization dropped every line item.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// An item was flagged `manualProdajna` without a usable sale price.
    ///
    /// ## When This Occurs
    /// - `manualProdajna = true` and the sale price is missing
    /// - the manual value is NaN/Infinity or negative
    ///
    /// Coercing here would silently hide an operator mistake.
    #[error("Manual sale price is required for item '{title}'")]
    ManualPriceMissing { title: String },

    /// Pickup orders cannot carry a transport mode.
    #[error("Transport mode '{mode}' is not allowed for pickup orders")]
    PickupTransportMode { mode: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value must be a finite number.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
