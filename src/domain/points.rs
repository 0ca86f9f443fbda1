//! Loyalty point arithmetic. Pure functions of a line's pricing mode and
//! measured amounts.

use super::pricing::{PricingMode, round_half_up};

/// Points contributed by one line.
///
/// * `unit`: ceiling of the quantity
/// * `weight`: kilograms rounded half-up
/// * `combined`: both contributions added together
pub fn line_points(mode: PricingMode, quantity: Option<f64>, weight_kg: Option<f64>) -> i64 {
    let units = || quantity.map(|q| q.ceil() as i64).unwrap_or(0);
    let kilos = || weight_kg.map(round_half_up).unwrap_or(0);
    match mode {
        PricingMode::Unit => units(),
        PricingMode::Weight => kilos(),
        PricingMode::Combined => kilos().saturating_add(units()),
    }
}

/// Order-level points: the sum over all lines, never below zero.
pub fn order_points<I>(lines: I) -> i64
where
    I: IntoIterator<Item = (PricingMode, Option<f64>, Option<f64>)>,
{
    lines
        .into_iter()
        .map(|(mode, quantity, weight)| line_points(mode, quantity, weight))
        .fold(0_i64, i64::saturating_add)
        .max(0)
}
