//! Pricing rules
//!
//! Derived product figures are pure functions of stored fields and are never
//! persisted.

/// Stock level at or below which a product counts as "low stock"
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Sale price after the percentage discount
///
/// A discount of zero (or less) leaves the price untouched.
pub fn final_price(price: f64, discount_percentage: f64) -> f64 {
    if discount_percentage > 0.0 {
        price * (1.0 - discount_percentage / 100.0)
    } else {
        price
    }
}

/// Line total at the discounted unit price
pub fn line_total(price: f64, discount_percentage: f64, quantity: i64) -> f64 {
    final_price(price, discount_percentage) * quantity as f64
}

/// Margin over cost as a percentage of cost (0 when cost is 0)
pub fn margin_percentage(selling_price: f64, cost_price: f64) -> f64 {
    if cost_price == 0.0 {
        return 0.0;
    }
    (selling_price - cost_price) / cost_price * 100.0
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_price_with_discount() {
        assert_eq!(final_price(100.0, 10.0), 90.0);
        assert_eq!(final_price(80.0, 25.0), 60.0);
    }

    #[test]
    fn test_final_price_without_discount() {
        assert_eq!(final_price(100.0, 0.0), 100.0);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(100.0, 10.0, 2), 180.0);
        assert_eq!(line_total(50.0, 0.0, 3), 150.0);
    }

    #[test]
    fn test_margin_percentage() {
        assert_eq!(margin_percentage(150.0, 100.0), 50.0);
        assert_eq!(margin_percentage(90.0, 0.0), 0.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.33333), 33.33);
        assert_eq!(round2(66.666), 66.67);
        assert_eq!(round2(0.0), 0.0);
    }
}
