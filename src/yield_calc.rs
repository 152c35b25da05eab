//! Staking yield (APY) estimator.
//!
//! Stakers receive `yield_distribution_percentage` of the yield earned on
//! the whole collateral base, so their APY is the base yield amplified by
//! collateral value / staked balance. The risk-adjusted figure discounts the
//! chance that the staked balance gets converted during a drawdown.

use serde::Serialize;

use crate::error::{
    ensure_non_negative, ensure_percentage, ensure_positive, Result, SimulationError,
};
use crate::state::collateral_ratio;

const REFERENCE_INVESTMENT: f64 = 1000.0;
const STAKING_LEVELS: [f64; 9] = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingLevel {
    pub percentage: f64,
    pub apy: f64,
    pub risk_level: RiskLevel,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldResult {
    pub collateral_ratio: f64,
    pub staked_stable: f64,
    pub yield_multiple: f64,
    pub raw_apy: f64,
    pub risk_factor: f64,
    pub risk_adjusted_apy: f64,
    pub annual_yield_on_reference_investment: f64,
    pub staking_levels: Vec<StakingLevel>,
}

/// Probability-like discount for the staked balance being converted.
pub fn risk_factor(collateral_ratio: f64) -> f64 {
    if collateral_ratio < 130.0 {
        0.4
    } else if collateral_ratio < 150.0 {
        0.2
    } else if collateral_ratio < 180.0 {
        0.1
    } else {
        0.05
    }
}

fn staking_risk(staked_percentage: f64) -> RiskLevel {
    // a thin pool absorbs a conversion across fewer holders
    if staked_percentage < 20.0 {
        RiskLevel::High
    } else if staked_percentage < 40.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn apy(collateral_value: f64, staked: f64, base_yield: f64, distribution: f64) -> f64 {
    base_yield * (distribution / 100.0) * (collateral_value / staked)
}

pub fn calculate_yield(
    collateral_value: f64,
    stable_supply: f64,
    staked_percentage: f64,
    base_yield: f64,
    yield_distribution_percentage: f64,
) -> Result<YieldResult> {
    ensure_non_negative("collateral_value", collateral_value)?;
    ensure_positive("stable_supply", stable_supply)?;
    ensure_percentage("staked_percentage", staked_percentage)?;
    if staked_percentage == 0.0 {
        return Err(SimulationError::invalid(
            "staked_percentage",
            staked_percentage,
            "yield is undefined with nothing staked",
        ));
    }
    ensure_non_negative("base_yield", base_yield)?;
    ensure_percentage("yield_distribution_percentage", yield_distribution_percentage)?;

    let ratio = collateral_ratio(collateral_value, stable_supply);
    let staked_stable = stable_supply * (staked_percentage / 100.0);
    let yield_multiple = collateral_value / staked_stable;
    let raw_apy = apy(collateral_value, staked_stable, base_yield, yield_distribution_percentage);
    let risk_factor = risk_factor(ratio);

    let staking_levels = STAKING_LEVELS
        .iter()
        .map(|&percentage| StakingLevel {
            percentage,
            apy: apy(
                collateral_value,
                stable_supply * (percentage / 100.0),
                base_yield,
                yield_distribution_percentage,
            ),
            risk_level: staking_risk(percentage),
        })
        .collect();

    Ok(YieldResult {
        collateral_ratio: ratio,
        staked_stable,
        yield_multiple,
        raw_apy,
        risk_factor,
        risk_adjusted_apy: raw_apy * (1.0 - risk_factor),
        annual_yield_on_reference_investment: raw_apy / 100.0 * REFERENCE_INVESTMENT,
        staking_levels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_inputs() {
        let r = calculate_yield(10_000_000.0, 5_000_000.0, 30.0, 8.0, 80.0).unwrap();

        assert!((r.collateral_ratio - 200.0).abs() < 1e-9);
        assert!((r.staked_stable - 1_500_000.0).abs() < 1e-6);
        assert!((r.yield_multiple - 6.667).abs() < 0.01);
        assert!((r.raw_apy - 42.67).abs() < 0.01);
        assert!(r.risk_factor < 0.2);
        assert!(r.risk_adjusted_apy < r.raw_apy);
        assert!((r.annual_yield_on_reference_investment - 426.67).abs() < 0.01);
    }

    #[test]
    fn test_staking_levels() {
        let r = calculate_yield(10_000_000.0, 5_000_000.0, 30.0, 8.0, 80.0).unwrap();

        assert_eq!(r.staking_levels.len(), 9);
        assert_eq!(r.staking_levels[0].percentage, 10.0);
        assert_eq!(r.staking_levels[0].risk_level, RiskLevel::High);
        assert_eq!(r.staking_levels[2].risk_level, RiskLevel::Medium);
        assert_eq!(r.staking_levels[8].risk_level, RiskLevel::Low);
        for w in r.staking_levels.windows(2) {
            assert!(w[0].apy > w[1].apy);
        }
    }

    #[test]
    fn test_lower_ratio_is_riskier() {
        let high_risk = calculate_yield(6_500_000.0, 5_000_000.0, 30.0, 8.0, 80.0).unwrap();
        let low_risk = calculate_yield(12_000_000.0, 5_000_000.0, 30.0, 8.0, 80.0).unwrap();

        assert!(high_risk.collateral_ratio < 150.0);
        assert!(low_risk.collateral_ratio > 200.0);
        assert!(high_risk.risk_factor > low_risk.risk_factor);
        assert!(high_risk.yield_multiple < low_risk.yield_multiple);
    }

    #[test]
    fn test_rejects_empty_pool() {
        assert!(calculate_yield(10_000_000.0, 5_000_000.0, 0.0, 8.0, 80.0).is_err());
        assert!(calculate_yield(10_000_000.0, 0.0, 30.0, 8.0, 80.0).is_err());
    }
}
