//! NVT / MVRV style ratios derived from stored price and volume.

pub fn market_cap(price: f64, volume: f64) -> f64 {
    price * volume
}

/// Network value to transactions, approximated as market cap over volume.
pub fn nvt(market_cap: f64, volume: f64) -> f64 {
    if volume != 0.0 {
        market_cap / volume
    } else {
        0.0
    }
}

/// Market value to realized value.
///
/// Callers currently pass volume as `realized_cap`, so this equals [`nvt`]
/// until a real realized-capitalization source exists.
pub fn mvrv(market_cap: f64, realized_cap: f64) -> f64 {
    if realized_cap != 0.0 {
        market_cap / realized_cap
    } else {
        0.0
    }
}

pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}
