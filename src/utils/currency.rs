/// Currency utility functions for handling AUD conversions
///
/// All monetary values in the database are stored in cents (1 dollar = 100
/// cents) to avoid floating-point precision issues.

/// Convert dollars to cents (multiply by 100)
pub fn dollars_to_cents(dollars: f64) -> i64 {
    (dollars * 100.0).round() as i64
}

/// Convert cents to dollars (divide by 100)
pub fn cents_to_dollars(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Platform fee in cents for a given amount, expressed in basis points
/// (500 bps = 5%). Integer arithmetic, round half up.
pub fn platform_fee_cents(amount_cents: i64, fee_bps: i64) -> i64 {
    (amount_cents * fee_bps + 5_000) / 10_000
}
