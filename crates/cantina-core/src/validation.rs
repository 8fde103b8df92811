//! # Validation Module
//!
//! Input validation for stock adjustments and product fields.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI form (external collaborator)                              │
//! │  └── Immediate feedback, not trusted                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (domain services call these before any write)    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite constraints (NOT NULL, UNIQUE, CHECK stock ≥ 0)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A validation failure blocks the mutation entirely - no partial write.

use crate::error::{ValidationError, ValidationResult};
use crate::MAX_STOCK;

// =============================================================================
// Stock Validators
// =============================================================================

/// Validates a manually-entered stock level.
///
/// ## Rules
/// - Must be in `[0, MAX_STOCK]` (9999)
///
/// The value is already an integer by the time it reaches Rust; the UI is
/// responsible for rejecting fractional input before dispatching.
///
/// ## Example
/// ```rust
/// use cantina_core::validation::validate_stock_level;
///
/// assert!(validate_stock_level(15).is_ok());
/// assert!(validate_stock_level(-1).is_err());
/// assert!(validate_stock_level(10_000).is_err());
/// ```
pub fn validate_stock_level(value: i64) -> ValidationResult<()> {
    if !(0..=MAX_STOCK).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: MAX_STOCK,
        });
    }
    Ok(())
}

// =============================================================================
// Product Field Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be between 3 and 50 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() < 3 {
        return Err(ValidationError::TooShort {
            field: "name".to_string(),
            min: 3,
        });
    }

    if name.chars().count() > 50 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 50,
        });
    }

    Ok(())
}

/// Validates a unit label ("unit", "bottle", "kg", ...).
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 50 characters
pub fn validate_unit(unit: &str) -> ValidationResult<()> {
    let unit = unit.trim();

    if unit.is_empty() {
        return Err(ValidationError::Required {
            field: "unit".to_string(),
        });
    }

    if unit.chars().count() > 50 {
        return Err(ValidationError::TooLong {
            field: "unit".to_string(),
            max: 50,
        });
    }

    Ok(())
}

// =============================================================================
// Settings Validators
// =============================================================================

/// Validates the `activeDaysPerWeek` setting (1..=7).
pub fn validate_active_days(value: i64) -> ValidationResult<()> {
    if !(1..=7).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: "activeDaysPerWeek".to_string(),
            min: 1,
            max: 7,
        });
    }
    Ok(())
}

/// Validates the `safetyMarginPercent` setting (0..=100).
pub fn validate_percentage(value: i64) -> ValidationResult<()> {
    if !(0..=100).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: "safetyMarginPercent".to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_level_bounds() {
        assert!(validate_stock_level(0).is_ok());
        assert!(validate_stock_level(9999).is_ok());
        assert!(validate_stock_level(-1).is_err());
        assert!(validate_stock_level(10_000).is_err());
    }

    #[test]
    fn test_product_name_rules() {
        assert!(validate_product_name("Orange juice").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("  ").is_err());
        assert!(validate_product_name("ab").is_err());
        assert!(validate_product_name(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_unit_rules() {
        assert!(validate_unit("bottle").is_ok());
        assert!(validate_unit("").is_err());
        assert!(validate_unit(&"u".repeat(51)).is_err());
    }

    #[test]
    fn test_settings_ranges() {
        assert!(validate_active_days(4).is_ok());
        assert!(validate_active_days(0).is_err());
        assert!(validate_active_days(8).is_err());

        assert!(validate_percentage(30).is_ok());
        assert!(validate_percentage(101).is_err());
    }
}
