//! Target transformation.
//!
//! The label arrives as a currency-formatted string. `forward` strips the
//! currency symbol and thousands separators, parses, and applies `ln(1+x)`
//! to compress the right-skewed price distribution. `inverse` undoes the
//! log so model output can be reported as a human-readable price; the
//! training pipeline only ever runs forward, but serving depends on the
//! inverse.

use polars::prelude::*;

use crate::error::Result;

/// Parse one currency-formatted price string. Malformed input yields
/// `None`, never a panic; the label policy for unparseable prices is null.
pub fn parse_price_scalar(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    cleaned.trim().parse().ok()
}

/// `ln(1 + price)` for one already-parsed price.
pub fn forward_scalar(price: f64) -> f64 {
    price.ln_1p()
}

/// `exp(x) - 1`, the inverse of [`forward_scalar`].
pub fn inverse_scalar(transformed: f64) -> f64 {
    transformed.exp_m1()
}

/// Parse a series of currency strings to numeric prices.
pub fn parse_price(prices: &Series) -> Result<Series> {
    let values = prices.str()?;
    let parsed: Vec<Option<f64>> = values
        .into_iter()
        .map(|value| value.and_then(parse_price_scalar))
        .collect();
    Ok(Series::new(prices.name().clone(), parsed))
}

/// Full forward transform: parse then `ln(1+x)`.
pub fn forward(prices: &Series) -> Result<Series> {
    let parsed = parse_price(prices)?;
    Ok(parsed.f64()?.apply_values(f64::ln_1p).into_series())
}

/// Inverse transform over a series of model outputs.
pub fn inverse(transformed: &Series) -> Result<Series> {
    Ok(transformed.f64()?.apply_values(f64::exp_m1).into_series())
}
