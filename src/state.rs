//! Protocol state and the daily state updater.
//!
//! ## Day Mechanics
//! 1. Collateral value tracks the asset price from its initial value
//! 2. Collateral ratio = collateral value / stable supply (percent)
//! 3. Residual token is priced off the equity above the stable liability
//! 4. At or below 130% the staked stable pool is converted into freshly
//!    minted residual tokens, shrinking the stable liability
//!
//! State is threaded explicitly: `advance_day` takes the previous day's
//! post-conversion state by value and hands back the next one.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_percentage, ensure_positive, Result};

pub const WARNING_RATIO: f64 = 150.0;
pub const CRITICAL_RATIO: f64 = 130.0;
pub const DEPEG_RATIO: f64 = 100.0;

const MAX_DAILY_CONVERSION_RATE: f64 = 0.2;
/// Smallest conversion reported on a critical day so charts never show a gap.
pub const MIN_VISIBLE_CONVERSION: f64 = 0.001;
/// Conversion never burns the stable supply below this many units.
pub const MIN_STABLE_SUPPLY: f64 = 1.0;

pub fn collateral_ratio(collateral_value: f64, stable_supply: f64) -> f64 {
    (collateral_value / stable_supply) * 100.0
}

/// Percent change of `current` relative to `reference`; zero when there is
/// no reference to compare against.
pub(crate) fn percent_change(current: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        0.0
    } else {
        (current / reference - 1.0) * 100.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StabilityMode {
    Normal,
    Warning,  // mode 1
    Critical, // mode 2, conversions active
}

impl StabilityMode {
    pub fn classify(collateral_ratio: f64) -> Self {
        if collateral_ratio <= CRITICAL_RATIO {
            Self::Critical
        } else if collateral_ratio <= WARNING_RATIO {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "Normal Operation",
            Self::Warning => "Warning (Mode 1)",
            Self::Critical => "Critical (Mode 2)",
        }
    }
}

/// Caller-supplied protocol inputs for a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialConditions {
    pub collateral_value: f64,
    pub stable_supply: f64,
    pub staked_percentage: f64,
    pub asset_price: f64,
}

impl InitialConditions {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("collateral_value", self.collateral_value)?;
        ensure_positive("stable_supply", self.stable_supply)?;
        ensure_percentage("staked_percentage", self.staked_percentage)?;
        ensure_positive("asset_price", self.asset_price)?;
        Ok(())
    }

    /// Builds the day-0 state and the reference values every later day is
    /// measured against.
    ///
    /// The residual token launches at half the asset price and its supply is
    /// sized so that it exactly prices the equity above the stable liability.
    pub fn bootstrap(&self) -> Result<(ProtocolState, Baseline)> {
        self.validate()?;

        let reserve = (self.collateral_value - self.stable_supply).max(0.0);
        let residual_price = self.asset_price / 2.0;
        let state = ProtocolState {
            collateral_value: self.collateral_value,
            stable_supply: self.stable_supply,
            staked_stable: self.stable_supply * (self.staked_percentage / 100.0),
            residual_supply: reserve / residual_price,
        };
        let baseline = Baseline {
            asset_price: self.asset_price,
            collateral_value: self.collateral_value,
            collateral_ratio: state.collateral_ratio(),
            residual_price,
            staked_stable: state.staked_stable,
        };

        Ok((state, baseline))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProtocolState {
    pub collateral_value: f64,
    pub stable_supply: f64,
    pub staked_stable: f64,
    pub residual_supply: f64,
}

impl ProtocolState {
    pub fn collateral_ratio(&self) -> f64 {
        collateral_ratio(self.collateral_value, self.stable_supply)
    }

    fn residual_price(&self, fallback: f64) -> f64 {
        if self.residual_supply > 0.0 {
            ((self.collateral_value - self.stable_supply) / self.residual_supply).max(0.0)
        } else {
            fallback
        }
    }
}

/// Day-0 reference values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Baseline {
    pub asset_price: f64,
    pub collateral_value: f64,
    pub collateral_ratio: f64,
    pub residual_price: f64,
    pub staked_stable: f64,
}

/// One simulated day.
///
/// Price, collateral and ratio fields describe the day before that day's
/// conversion runs; the supply fields are post-conversion, i.e. the state
/// the next day starts from.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    pub day: usize,
    pub asset_price: f64,
    pub asset_price_change_percent: f64,
    pub collateral_value: f64,
    pub collateral_value_change_percent: f64,
    pub collateral_ratio: f64,
    pub collateral_ratio_change: f64,
    pub collateral_ratio_change_percent: f64,
    pub stability_mode: StabilityMode,
    pub residual_price: f64,
    pub residual_price_change_percent: f64,
    pub effective_leverage: f64,
    pub stable_supply: f64,
    pub staked_stable: f64,
    pub residual_supply: f64,
    pub converted: f64,
    pub conversion_percent_of_staked: f64,
    pub minted: f64,
    pub depeg_buffer: f64,
    pub depeg_buffer_fraction: f64,
    /// Set when `converted` was filled in for display only.
    pub synthetic_conversion: bool,
}

/// Rate of the staked pool converted today; zero above the critical ratio.
///
/// Scales with how far the ratio has fallen from where it started, so the
/// rate is capped at twice `MAX_DAILY_CONVERSION_RATE`.
pub fn conversion_rate(collateral_ratio: f64, initial_collateral_ratio: f64) -> f64 {
    if collateral_ratio > CRITICAL_RATIO {
        return 0.0;
    }
    let severity = if initial_collateral_ratio > 0.0 {
        (initial_collateral_ratio - collateral_ratio) / initial_collateral_ratio
    } else {
        0.0
    };
    let base = MAX_DAILY_CONVERSION_RATE.min((CRITICAL_RATIO - collateral_ratio) / 100.0);
    (base * (1.0 + severity)).clamp(0.0, 2.0 * MAX_DAILY_CONVERSION_RATE)
}

pub fn advance_day(
    day: usize,
    mut state: ProtocolState,
    asset_price: f64,
    baseline: &Baseline,
) -> (DayRecord, ProtocolState) {
    state.collateral_value = baseline.collateral_value * (asset_price / baseline.asset_price);
    let ratio = state.collateral_ratio();
    let mode = StabilityMode::classify(ratio);
    let residual_price = state.residual_price(baseline.residual_price);

    let asset_change = percent_change(asset_price, baseline.asset_price);
    let residual_change = percent_change(residual_price, baseline.residual_price);
    let effective_leverage = if asset_change == 0.0 {
        0.0
    } else {
        (residual_change / asset_change).abs()
    };

    let mut converted = 0.0;
    let mut conversion_percent_of_staked = 0.0;
    let mut minted = 0.0;

    if mode == StabilityMode::Critical {
        let rate = conversion_rate(ratio, baseline.collateral_ratio);
        let headroom = (state.stable_supply - MIN_STABLE_SUPPLY).max(0.0);
        let daily = (state.staked_stable * rate)
            .min(state.staked_stable)
            .min(headroom);

        converted = daily.max(MIN_VISIBLE_CONVERSION);
        if state.staked_stable > 0.0 {
            conversion_percent_of_staked = converted / state.staked_stable * 100.0;
        }

        if daily > 0.0 {
            state.staked_stable -= daily;
            state.stable_supply -= daily;
            // A wiped-out residual claim cannot price new tokens; the staked
            // pool absorbs the burn without receiving any.
            if residual_price > 0.0 {
                minted = daily / residual_price;
                state.residual_supply += minted;
            }
        }

        trace!(
            "day {}: rate {:.4}, converted {:.2}, minted {:.4} at residual price {:.4}",
            day,
            rate,
            daily,
            minted,
            residual_price
        );
    }

    debug!(
        "day {}: price {:.4}, ratio {:.2}% ({:?}), residual {:.4}",
        day, asset_price, ratio, mode, residual_price
    );

    let record = DayRecord {
        day,
        asset_price,
        asset_price_change_percent: asset_change,
        collateral_value: state.collateral_value,
        collateral_value_change_percent: percent_change(
            state.collateral_value,
            baseline.collateral_value,
        ),
        collateral_ratio: ratio,
        collateral_ratio_change: ratio - baseline.collateral_ratio,
        collateral_ratio_change_percent: percent_change(ratio, baseline.collateral_ratio),
        stability_mode: mode,
        residual_price,
        residual_price_change_percent: residual_change,
        effective_leverage,
        stable_supply: state.stable_supply,
        staked_stable: state.staked_stable,
        residual_supply: state.residual_supply,
        converted,
        conversion_percent_of_staked,
        minted,
        depeg_buffer: ratio - DEPEG_RATIO,
        depeg_buffer_fraction: ratio / DEPEG_RATIO - 1.0,
        synthetic_conversion: false,
    };

    (record, state)
}
