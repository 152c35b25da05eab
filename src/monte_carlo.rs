//! Monte Carlo Shock Sweep
//!
//! Samples many shock-and-recovery scenarios and runs each through the
//! deterministic day-by-day engine, measuring how often the protocol keeps
//! its peg.
//!
//! ## Sampling
//! - Drop size: Normal(drop_mean, drop_std), clipped to [1%, 95%]
//! - Drop length: uniform in 1..=max_drop_days
//!
//! ## Metrics
//! - Survival probability (min ratio stays above 100%)
//! - Probability of entering critical mode (ratio <= 130%)
//! - Lower percentiles of the minimum collateral ratio
//! - Share of the staked pool converted, worst residual drawdown
//!
//! The RNG is seeded, so a given config always produces the same report.

use log::info;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_percentage, Result, SimulationError};
use crate::scenario::{run_simulation, ScenarioParameters};
use crate::state::{InitialConditions, CRITICAL_RATIO};

const MIN_DROP_PERCENT: f64 = 1.0;
const MAX_DROP_PERCENT: f64 = 95.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub runs: usize,
    pub seed: u64,
    pub drop_mean: f64,     // percent
    pub drop_std: f64,      // percent
    pub max_drop_days: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            runs: 1_000,
            seed: 42,
            drop_mean: 35.0,
            drop_std: 15.0,
            max_drop_days: 7,
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<()> {
        if self.runs == 0 {
            return Err(SimulationError::invalid("runs", 0.0, "need at least one run"));
        }
        if self.max_drop_days < 1 {
            return Err(SimulationError::invalid(
                "max_drop_days",
                self.max_drop_days as f64,
                "a shock needs at least one day",
            ));
        }
        ensure_percentage("drop_mean", self.drop_mean)?;
        if !(self.drop_std.is_finite() && self.drop_std >= 0.0) {
            return Err(SimulationError::invalid(
                "drop_std",
                self.drop_std,
                "must be a finite number >= 0",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepResult {
    pub runs: usize,
    pub min_ratios: Vec<f64>,

    pub survival_probability: f64,
    pub critical_probability: f64,
    pub mean_min_ratio: f64,
    pub min_ratio_p5: f64,
    pub min_ratio_p1: f64,
    pub worst_min_ratio: f64,
    pub mean_conversion_percentage: f64,
    pub worst_residual_drawdown: f64,
}

impl SweepResult {
    pub fn print(&self) {
        println!("  Runs:                    {}", self.runs);
        println!("  Survival probability:    {:.2}%", self.survival_probability * 100.0);
        println!("  Critical-mode prob.:     {:.2}%", self.critical_probability * 100.0);
        println!("  Mean min CR:             {:.2}%", self.mean_min_ratio);
        println!("  Min CR, 5th pct:         {:.2}%", self.min_ratio_p5);
        println!("  Min CR, 1st pct:         {:.2}%", self.min_ratio_p1);
        println!("  Worst min CR:            {:.2}%", self.worst_min_ratio);
        println!("  Mean staked converted:   {:.2}%", self.mean_conversion_percentage);
        println!("  Worst residual drawdown: {:.2}%", self.worst_residual_drawdown);
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

pub fn sample_shock(
    config: &SweepConfig,
    normal: &Normal<f64>,
    rng: &mut impl Rng,
) -> ScenarioParameters {
    let drop_percent = normal
        .sample(rng)
        .clamp(MIN_DROP_PERCENT, MAX_DROP_PERCENT);
    ScenarioParameters {
        drop_percent,
        drop_days: rng.gen_range(1..=config.max_drop_days),
    }
}

pub fn run_shock_sweep(initial: &InitialConditions, config: &SweepConfig) -> Result<SweepResult> {
    config.validate()?;
    initial.validate()?;

    let normal = Normal::new(config.drop_mean, config.drop_std)
        .map_err(|_| SimulationError::invalid("drop_std", config.drop_std, "not a valid std dev"))?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let staked = initial.stable_supply * (initial.staked_percentage / 100.0);

    info!(
        "sweeping {} shocks (drop ~ N({}, {}), up to {} days, seed {})",
        config.runs, config.drop_mean, config.drop_std, config.max_drop_days, config.seed
    );

    let mut min_ratios = Vec::with_capacity(config.runs);
    let mut survived = 0;
    let mut went_critical = 0;
    let mut conversion_sum = 0.0;
    let mut worst_residual_drawdown: f64 = 0.0;

    for _ in 0..config.runs {
        let shock = sample_shock(config, &normal, &mut rng);
        let result = run_simulation(initial, shock)?;
        let summary = &result.summary;

        if summary.survived {
            survived += 1;
        }
        if summary.min_collateral_ratio <= CRITICAL_RATIO {
            went_critical += 1;
        }
        if staked > 0.0 {
            conversion_sum += result.economic_converted() / staked * 100.0;
        }
        worst_residual_drawdown = worst_residual_drawdown.min(summary.residual_drawdown);
        min_ratios.push(summary.min_collateral_ratio);
    }

    let n = config.runs as f64;
    let mut sorted = min_ratios.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Ok(SweepResult {
        runs: config.runs,
        survival_probability: survived as f64 / n,
        critical_probability: went_critical as f64 / n,
        mean_min_ratio: min_ratios.iter().sum::<f64>() / n,
        min_ratio_p5: percentile(&sorted, 0.05),
        min_ratio_p1: percentile(&sorted, 0.01),
        worst_min_ratio: sorted.first().copied().unwrap_or(0.0),
        mean_conversion_percentage: conversion_sum / n,
        worst_residual_drawdown,
        min_ratios,
    })
}
