//! Shock-and-recovery price paths.
//!
//! A path has two phases:
//! 1. Drop: linear slide from the initial price to `initial * (1 - drop%)`
//!    over `drop_days` days (day 0 is the untouched initial price).
//! 2. Recovery: ten days climbing linearly back 70% of the way to the
//!    initial price.

use crate::error::{ensure_percentage, ensure_positive, Result, SimulationError};

pub const RECOVERY_DAYS: usize = 10;
pub const RECOVERY_FRACTION: f64 = 0.7;

/// Number of points produced for a given drop duration.
pub fn path_len(drop_days: usize) -> usize {
    drop_days + 1 + RECOVERY_DAYS
}

pub fn generate_price_path(
    initial_price: f64,
    drop_percent: f64,
    drop_days: usize,
) -> Result<Vec<f64>> {
    ensure_positive("initial_price", initial_price)?;
    ensure_percentage("drop_percent", drop_percent)?;
    if drop_days < 1 {
        return Err(SimulationError::invalid(
            "drop_days",
            drop_days as f64,
            "a shock needs at least one day",
        ));
    }

    let drop_fraction = drop_percent / 100.0;
    let mut prices = Vec::with_capacity(path_len(drop_days));

    for day in 0..=drop_days {
        let progress = day as f64 / drop_days as f64;
        prices.push(initial_price * (1.0 - progress * drop_fraction));
    }

    let lowest_price = initial_price * (1.0 - drop_fraction);
    let recovery_amount = (initial_price - lowest_price) * RECOVERY_FRACTION;
    for day in 1..=RECOVERY_DAYS {
        let progress = day as f64 / RECOVERY_DAYS as f64;
        prices.push(lowest_price + progress * recovery_amount);
    }

    Ok(prices)
}
