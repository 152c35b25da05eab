//! Single-shock depeg risk estimator.

use serde::Serialize;

use crate::error::{ensure_non_negative, ensure_percentage, ensure_positive, Result};
use crate::state::{collateral_ratio, CRITICAL_RATIO, DEPEG_RATIO, WARNING_RATIO};
use crate::yield_calc::RiskLevel;

/// Ratio band below the critical threshold over which the whole staked pool
/// gets converted.
const FULL_CONVERSION_BAND: f64 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DepegStatus {
    Normal,
    Warning,
    Critical,
    DepegRisk,
}

impl DepegStatus {
    pub fn classify(collateral_ratio: f64) -> Self {
        if collateral_ratio <= DEPEG_RATIO {
            Self::DepegRisk
        } else if collateral_ratio <= CRITICAL_RATIO {
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
            Self::DepegRisk => "Depeg Risk (CR <= 100%)",
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        match self {
            Self::Normal => RiskLevel::Low,
            Self::Warning => RiskLevel::Medium,
            Self::Critical | Self::DepegRisk => RiskLevel::High,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DepegLevel {
    VeryLow,
    Low,
    Medium,
    High,
    Extreme,
}

impl DepegLevel {
    pub fn classify(collateral_ratio: f64) -> Self {
        if collateral_ratio <= 100.0 {
            Self::Extreme
        } else if collateral_ratio <= 110.0 {
            Self::High
        } else if collateral_ratio <= 120.0 {
            Self::Medium
        } else if collateral_ratio <= 130.0 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    /// Rough depeg probability in percent.
    pub fn probability(&self) -> f64 {
        match self {
            Self::Extreme => 99.0,
            Self::High => 75.0,
            Self::Medium => 50.0,
            Self::Low => 25.0,
            Self::VeryLow => 5.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Extreme => "Extreme",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::VeryLow => "Very Low",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepegRiskResult {
    pub current_ratio: f64,
    pub after_drop_ratio: f64,
    pub stability_mode: DepegStatus,
    pub converted: f64,
    pub conversion_percentage: f64,
    pub depeg_probability: f64,
    pub depeg_level: DepegLevel,
    pub max_safe_drop_percentage: f64,
}

pub fn calculate_depeg_risk(
    collateral_value: f64,
    stable_supply: f64,
    staked_percentage: f64,
    asset_price: f64,
    price_drop_percentage: f64,
) -> Result<DepegRiskResult> {
    ensure_non_negative("collateral_value", collateral_value)?;
    ensure_positive("stable_supply", stable_supply)?;
    ensure_percentage("staked_percentage", staked_percentage)?;
    ensure_positive("asset_price", asset_price)?;
    ensure_percentage("price_drop_percentage", price_drop_percentage)?;

    let current_ratio = collateral_ratio(collateral_value, stable_supply);
    let staked_stable = stable_supply * (staked_percentage / 100.0);

    let dropped_price = asset_price * (1.0 - price_drop_percentage / 100.0);
    let after_drop_value = collateral_value * (dropped_price / asset_price);
    let after_drop_ratio = collateral_ratio(after_drop_value, stable_supply);

    let conversion_rate = if after_drop_ratio <= CRITICAL_RATIO {
        ((CRITICAL_RATIO - after_drop_ratio) / FULL_CONVERSION_BAND).min(1.0)
    } else {
        0.0
    };
    let converted = staked_stable * conversion_rate;
    let conversion_percentage = if staked_stable > 0.0 {
        conversion_rate * 100.0
    } else {
        0.0
    };

    let depeg_level = DepegLevel::classify(after_drop_ratio);
    // already at or below the critical ratio: no drop is safe
    let max_safe_drop_percentage = if current_ratio > 0.0 {
        ((1.0 - CRITICAL_RATIO / current_ratio) * 100.0).max(0.0)
    } else {
        0.0
    };

    Ok(DepegRiskResult {
        current_ratio,
        after_drop_ratio,
        stability_mode: DepegStatus::classify(after_drop_ratio),
        converted,
        conversion_percentage,
        depeg_probability: depeg_level.probability(),
        depeg_level,
        max_safe_drop_percentage,
    })
}
