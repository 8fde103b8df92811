//! # Stock Math
//!
//! The arithmetic behind stock mutations and low-stock alerts, kept pure so
//! it can be tested without a database.
//!
//! ## Minimum Stock Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  daily_average = sale consumption in window / operating days in window │
//! │                  (operating day = a calendar day with a CLOSED workday)│
//! │                                                                         │
//! │  base   = daily_average × activeDaysPerWeek                            │
//! │  margin = base × safetyMarginPercent / 100                             │
//! │  minimum_stock = ceil(base + margin)                                   │
//! │                                                                         │
//! │  level:  current < minimum        → Low                                │
//! │          current < minimum × 1.2  → Medium                             │
//! │          otherwise                → Good                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Deltas
// =============================================================================

/// Computes a single-unit decrement clamped at zero.
///
/// Returns `(new_stock, applied_delta)`. The ledger records the APPLIED
/// delta: decrementing at stock 0 yields `(0, 0)`, not `(0, -1)`.
pub fn clamped_decrement(current: i64) -> (i64, i64) {
    let new = (current - 1).max(0);
    (new, new - current)
}

/// Computes the signed delta a manual adjustment applies.
pub fn adjustment_delta(current: i64, new: i64) -> i64 {
    new - current
}

// =============================================================================
// Consumption Averages
// =============================================================================

/// Average daily consumption over a window.
///
/// The denominator is *operating days* (closed workdays), not calendar days.
/// Zero operating days yields 0, never a division error.
pub fn daily_average(total_consumption: i64, operating_days: i64) -> f64 {
    if operating_days <= 0 {
        return 0.0;
    }
    total_consumption as f64 / operating_days as f64
}

// =============================================================================
// Minimum Stock
// =============================================================================

/// Breakdown of a minimum-stock recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MinimumStock {
    /// Recommended minimum (rounded up).
    pub minimum: i64,
    /// Average units consumed per operating day.
    pub daily_average: f64,
    /// daily_average × activeDaysPerWeek, before the safety margin.
    pub base: f64,
    /// Safety margin added on top of the base.
    pub margin: f64,
}

/// Computes the recommended minimum stock for a product.
pub fn recommended_minimum(
    daily_average: f64,
    active_days_per_week: i64,
    safety_margin_percent: i64,
) -> MinimumStock {
    let base = daily_average * active_days_per_week as f64;
    let margin = base * safety_margin_percent as f64 / 100.0;
    MinimumStock {
        minimum: (base + margin).ceil() as i64,
        daily_average,
        base,
        margin,
    }
}

// =============================================================================
// Stock Level Classification
// =============================================================================

/// Coarse stock-health classification shown on product cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    Low,
    Medium,
    Good,
}

/// Classifies a current stock level against its recommended minimum.
///
/// Medium covers the band up to 20% above the minimum.
pub fn classify(current_stock: i64, minimum: i64) -> StockLevel {
    if current_stock < minimum {
        StockLevel::Low
    } else if (current_stock as f64) < minimum as f64 * 1.2 {
        StockLevel::Medium
    } else {
        StockLevel::Good
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrement_clamps_at_zero() {
        assert_eq!(clamped_decrement(5), (4, -1));
        assert_eq!(clamped_decrement(1), (0, -1));
        // The applied delta is 0 when there was nothing to sell.
        assert_eq!(clamped_decrement(0), (0, 0));
    }

    #[test]
    fn test_adjustment_delta_signed() {
        assert_eq!(adjustment_delta(10, 15), 5);
        assert_eq!(adjustment_delta(15, 10), -5);
        assert_eq!(adjustment_delta(7, 7), 0);
    }

    #[test]
    fn test_daily_average_zero_operating_days() {
        // Zero closed workdays in the window must not be a division error.
        assert_eq!(daily_average(42, 0), 0.0);
        assert_eq!(daily_average(0, 0), 0.0);
    }

    #[test]
    fn test_daily_average() {
        assert!((daily_average(30, 10) - 3.0).abs() < f64::EPSILON);
        assert!((daily_average(7, 2) - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recommended_minimum_defaults() {
        // 3/day × 4 active days × 1.30 margin = 15.6 → ceil = 16
        let min = recommended_minimum(3.0, 4, 30);
        assert_eq!(min.minimum, 16);
        assert!((min.base - 12.0).abs() < f64::EPSILON);
        assert!((min.margin - 3.6).abs() < 1e-9);
    }

    #[test]
    fn test_recommended_minimum_zero_consumption() {
        let min = recommended_minimum(0.0, 4, 30);
        assert_eq!(min.minimum, 0);
    }

    #[test]
    fn test_classify_levels() {
        // minimum 10: <10 low, <12 medium, ≥12 good
        assert_eq!(classify(9, 10), StockLevel::Low);
        assert_eq!(classify(10, 10), StockLevel::Medium);
        assert_eq!(classify(11, 10), StockLevel::Medium);
        assert_eq!(classify(12, 10), StockLevel::Good);
    }

    #[test]
    fn test_classify_zero_minimum() {
        // No consumption history: everything counts as good.
        assert_eq!(classify(0, 0), StockLevel::Good);
        assert_eq!(classify(5, 0), StockLevel::Good);
    }
}
