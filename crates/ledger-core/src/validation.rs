//! # Validation Module
//!
//! Input validation for order and shipping-account writes.
//!
//! ## Validate or Coerce?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Field                 Bad value               Outcome                  │
//! │  ───────────────────   ─────────────────────   ──────────────────────   │
//! │  item prices           NaN / Inf / negative    coerced to 0 (items.rs)  │
//! │  item quantity         NaN / Inf / <= 0        coerced to 1 (items.rs)  │
//! │  transportCost         NaN / Inf               treated as absent        │
//! │  transportCost         negative                ValidationError          │
//! │  myProfitPercent       NaN / outside 0..=100   ValidationError          │
//! │  manual sale price     missing / NaN           CoreError                │
//! │  owner name            blank / < 2 chars       ValidationError          │
//! │  startingAmount        NaN / negative          ValidationError          │
//! │  customerName          blank                   ValidationError          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ledger_core::validation::{validate_owner_name, validate_profit_percent};
//!
//! assert_eq!(validate_owner_name("  Miloš ").unwrap(), "milos");
//! assert_eq!(validate_profit_percent(None).unwrap(), 0.0);
//! assert!(validate_profit_percent(Some(120.0)).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_LINE_TOTAL;
use crate::search::normalize;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Shortest owner key accepted by the shipping ledger.
pub const MIN_OWNER_KEY_LEN: usize = 2;

/// Longest owner display name.
pub const MAX_OWNER_NAME_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a carrier account holder name and returns its normalized key.
///
/// ## Rules
/// - Must not be blank
/// - Normalized key must have at least 2 characters
/// - At most 100 characters
pub fn validate_owner_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "ownerName".to_string(),
        });
    }

    if name.chars().count() > MAX_OWNER_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "ownerName".to_string(),
            max: MAX_OWNER_NAME_LEN,
        });
    }

    let key = normalize(name);
    if key.chars().count() < MIN_OWNER_KEY_LEN {
        return Err(ValidationError::TooShort {
            field: "ownerName".to_string(),
            min: MIN_OWNER_KEY_LEN,
        });
    }

    Ok(key)
}

pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "customerName".to_string(),
        });
    }
    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (matches everything)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the operator's profit share. Absent means 0.
pub fn validate_profit_percent(percent: Option<f64>) -> ValidationResult<f64> {
    let Some(percent) = percent else {
        return Ok(0.0);
    };

    if !percent.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "myProfitPercent".to_string(),
        });
    }

    if !(0.0..=100.0).contains(&percent) {
        return Err(ValidationError::OutOfRange {
            field: "myProfitPercent".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(percent)
}

/// Validates a transport cost. Non-finite input is treated as absent.
pub fn validate_transport_cost(cost: Option<f64>) -> ValidationResult<Option<Money>> {
    let Some(cost) = cost.filter(|c| c.is_finite()) else {
        return Ok(None);
    };

    if cost < 0.0 {
        return Err(ValidationError::Negative {
            field: "transportCost".to_string(),
        });
    }

    let money = Money::from_major(cost).filter(|m| *m <= MAX_LINE_TOTAL);
    if money.is_none() {
        return Err(out_of_range("transportCost"));
    }
    Ok(money)
}

/// Validates a shipping account starting balance.
pub fn validate_starting_amount(amount: f64) -> ValidationResult<Money> {
    let money = Money::from_major(amount).ok_or_else(|| ValidationError::NotFinite {
        field: "startingAmount".to_string(),
    })?;

    if money.is_negative() {
        return Err(ValidationError::Negative {
            field: "startingAmount".to_string(),
        });
    }
    if money > MAX_LINE_TOTAL {
        return Err(out_of_range("startingAmount"));
    }

    Ok(money)
}

fn out_of_range(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: MAX_LINE_TOTAL.major(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_owner_name() {
        assert_eq!(validate_owner_name("Racun A").unwrap(), "racun a");
        assert_eq!(validate_owner_name("racun a").unwrap(), "racun a");
        assert!(matches!(
            validate_owner_name("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_owner_name("Š"),
            Err(ValidationError::TooShort { .. })
        ));
        assert!(validate_owner_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_customer_name() {
        assert!(validate_customer_name("Petar").is_ok());
        assert!(validate_customer_name(" ").is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  lampa ").unwrap(), "lampa");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_profit_percent() {
        assert_eq!(validate_profit_percent(None).unwrap(), 0.0);
        assert_eq!(validate_profit_percent(Some(40.0)).unwrap(), 40.0);
        assert_eq!(validate_profit_percent(Some(100.0)).unwrap(), 100.0);
        assert!(validate_profit_percent(Some(-1.0)).is_err());
        assert!(validate_profit_percent(Some(100.5)).is_err());
        assert!(matches!(
            validate_profit_percent(Some(f64::NAN)),
            Err(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_validate_transport_cost() {
        assert_eq!(validate_transport_cost(None).unwrap(), None);
        assert_eq!(validate_transport_cost(Some(f64::NAN)).unwrap(), None);
        assert_eq!(
            validate_transport_cost(Some(4.5)).unwrap(),
            Some(Money::from_cents(450))
        );
        assert!(validate_transport_cost(Some(-2.0)).is_err());
        assert!(matches!(
            validate_transport_cost(Some(1e15)),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_starting_amount() {
        assert_eq!(
            validate_starting_amount(1200.0).unwrap(),
            Money::from_cents(120_000)
        );
        assert!(validate_starting_amount(0.0).unwrap().is_zero());
        assert!(validate_starting_amount(-0.01).is_err());
        assert!(validate_starting_amount(f64::INFINITY).is_err());
        assert!(matches!(
            validate_starting_amount(1e15),
            Err(ValidationError::OutOfRange { .. })
        ));
    }
}
