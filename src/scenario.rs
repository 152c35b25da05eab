//! Named stress scenarios and result aggregation.
//!
//! `run_scenario` resolves a scenario name, builds the price path, folds the
//! daily updater over it and reduces the day series into summary metrics.
//! The full day series is returned alongside the summary for charting.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_percentage, Result, SimulationError};
use crate::price_path::generate_price_path;
use crate::state::{
    advance_day, percent_change, Baseline, DayRecord, InitialConditions, StabilityMode,
    DEPEG_RATIO, MIN_VISIBLE_CONVERSION,
};

/// Share of the initial staked balance shown on the worst day when a run
/// produced no conversion at all.
const DISPLAY_CONVERSION_FRACTION: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    Moderate,   // -30% over a week
    Severe,     // -50% over 3 days
    Extreme,    // -70% over 5 days
    FlashCrash, // -40% in a day
    #[serde(rename = "var-99")]
    Var99,      // 99% one-day VaR move
}

impl Scenario {
    pub fn all() -> Vec<Self> {
        vec![
            Self::Moderate,
            Self::Severe,
            Self::Extreme,
            Self::FlashCrash,
            Self::Var99,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Moderate => "moderate",
            Self::Severe => "severe",
            Self::Extreme => "extreme",
            Self::FlashCrash => "flash-crash",
            Self::Var99 => "var-99",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Moderate => "Moderate (-30% over 7 days)",
            Self::Severe => "Severe (-50% over 3 days)",
            Self::Extreme => "Extreme (-70% over 5 days)",
            Self::FlashCrash => "Flash Crash (-40% in 1 day)",
            Self::Var99 => "VaR 99% (-33% in 1 day)",
        }
    }

    /// Unknown names fall back to `Moderate`.
    pub fn from_name(name: &str) -> Self {
        Self::all()
            .into_iter()
            .find(|s| s.key() == name)
            .unwrap_or_else(|| {
                warn!("unknown scenario {:?}, using {}", name, Self::Moderate.key());
                Self::Moderate
            })
    }

    pub fn parameters(&self) -> ScenarioParameters {
        let (drop_percent, drop_days) = match self {
            Self::Moderate => (30.0, 7),
            Self::Severe => (50.0, 3),
            Self::Extreme => (70.0, 5),
            Self::FlashCrash => (40.0, 1),
            Self::Var99 => (33.0, 1),
        };
        ScenarioParameters {
            drop_percent,
            drop_days,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioParameters {
    pub drop_percent: f64,
    pub drop_days: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub initial_collateral_ratio: f64,
    pub min_collateral_ratio: f64,
    pub min_collateral_ratio_change_percent: f64,
    pub final_collateral_ratio: f64,
    pub final_collateral_ratio_change_percent: f64,
    pub total_converted: f64,
    pub conversion_percentage: f64,
    pub residual_drawdown: f64,
    pub residual_leverage: f64,
    pub survived: bool,
    pub days_in_warning: usize,
    pub days_in_critical: usize,
    pub depeg_buffer: f64,
    pub recovery_from_trough: f64,
    pub recovery_after_drop: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub parameters: ScenarioParameters,
    pub summary: SummaryMetrics,
    pub daily_data: Vec<DayRecord>,
}

impl SimulationResult {
    /// Total converted, leaving out the display-only fill-in.
    pub fn economic_converted(&self) -> f64 {
        self.daily_data
            .iter()
            .filter(|d| !d.synthetic_conversion)
            .map(|d| d.converted)
            .sum()
    }
}

pub fn run_scenario(initial: &InitialConditions, scenario_name: &str) -> Result<SimulationResult> {
    let scenario = Scenario::from_name(scenario_name);
    info!("running stress scenario: {}", scenario.name());
    run_simulation(initial, scenario.parameters())
}

/// Runs a shock with arbitrary drop parameters.
pub fn run_simulation(
    initial: &InitialConditions,
    parameters: ScenarioParameters,
) -> Result<SimulationResult> {
    ensure_percentage("drop_percent", parameters.drop_percent)?;
    if parameters.drop_days < 1 {
        return Err(SimulationError::invalid(
            "drop_days",
            parameters.drop_days as f64,
            "a shock needs at least one day",
        ));
    }
    let (mut state, baseline) = initial.bootstrap()?;
    let prices = generate_price_path(
        initial.asset_price,
        parameters.drop_percent,
        parameters.drop_days,
    )?;

    let mut daily_data = Vec::with_capacity(prices.len());
    for (day, &price) in prices.iter().enumerate() {
        let (record, next) = advance_day(day, state, price, &baseline);
        daily_data.push(record);
        state = next;
    }

    ensure_visible_conversion(&mut daily_data, &baseline);
    let summary = summarize(&daily_data, &baseline, &parameters);

    Ok(SimulationResult {
        parameters,
        summary,
        daily_data,
    })
}

/// Presentation accommodation, not an economic event: when nothing was
/// converted, mark 1% of the initial staked balance (at least
/// `MIN_VISIBLE_CONVERSION`) on the lowest-ratio day so a conversion chart is
/// never all zeros. State is not touched.
fn ensure_visible_conversion(daily_data: &mut [DayRecord], baseline: &Baseline) {
    if daily_data.iter().any(|d| d.converted > 0.0) {
        return;
    }

    let worst = daily_data.iter_mut().reduce(|worst, day| {
        if day.collateral_ratio < worst.collateral_ratio {
            day
        } else {
            worst
        }
    });

    if let Some(day) = worst {
        debug!("no conversion in run, display-only conversion on day {}", day.day);
        day.converted =
            (baseline.staked_stable * DISPLAY_CONVERSION_FRACTION).max(MIN_VISIBLE_CONVERSION);
        day.synthetic_conversion = true;
    }
}

fn summarize(
    daily_data: &[DayRecord],
    baseline: &Baseline,
    parameters: &ScenarioParameters,
) -> SummaryMetrics {
    let initial_ratio = baseline.collateral_ratio;
    let mut min_ratio = f64::INFINITY;
    let mut min_residual = f64::INFINITY;
    let mut total_converted = 0.0;
    let mut days_in_warning = 0;
    let mut days_in_critical = 0;

    for day in daily_data {
        min_ratio = min_ratio.min(day.collateral_ratio);
        min_residual = min_residual.min(day.residual_price);
        total_converted += day.converted;
        match day.stability_mode {
            StabilityMode::Warning => days_in_warning += 1,
            StabilityMode::Critical => days_in_critical += 1,
            StabilityMode::Normal => {}
        }
    }

    let final_ratio = daily_data.last().map_or(initial_ratio, |d| d.collateral_ratio);
    let drop_end_ratio = daily_data
        .get(parameters.drop_days)
        .map_or(final_ratio, |d| d.collateral_ratio);
    let first_residual = daily_data.first().map_or(baseline.residual_price, |d| d.residual_price);

    let conversion_percentage = if baseline.staked_stable > 0.0 {
        total_converted / baseline.staked_stable * 100.0
    } else {
        0.0
    };
    let residual_drawdown = percent_change(min_residual, first_residual);
    let residual_leverage = if parameters.drop_percent > 0.0 {
        (residual_drawdown / -parameters.drop_percent).abs()
    } else {
        0.0
    };

    SummaryMetrics {
        initial_collateral_ratio: initial_ratio,
        min_collateral_ratio: min_ratio,
        min_collateral_ratio_change_percent: percent_change(min_ratio, initial_ratio),
        final_collateral_ratio: final_ratio,
        final_collateral_ratio_change_percent: percent_change(final_ratio, initial_ratio),
        total_converted,
        conversion_percentage,
        residual_drawdown,
        residual_leverage,
        survived: min_ratio > DEPEG_RATIO,
        days_in_warning,
        days_in_critical,
        depeg_buffer: min_ratio - DEPEG_RATIO,
        recovery_from_trough: final_ratio - min_ratio,
        recovery_after_drop: final_ratio - drop_end_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> InitialConditions {
        InitialConditions {
            collateral_value: 10_000_000.0,
            stable_supply: 5_000_000.0,
            staked_percentage: 30.0,
            asset_price: 100.0,
        }
    }

    #[test]
    fn test_scenario_lookup() {
        assert_eq!(Scenario::from_name("severe"), Scenario::Severe);
        assert_eq!(Scenario::from_name("flash-crash"), Scenario::FlashCrash);
        assert_eq!(Scenario::from_name("var-99"), Scenario::Var99);
        assert_eq!(Scenario::from_name("no-such-thing"), Scenario::Moderate);
        assert_eq!(Scenario::Extreme.parameters().drop_percent, 70.0);
        assert_eq!(Scenario::Extreme.parameters().drop_days, 5);
    }

    #[test]
    fn test_moderate_run() {
        let result = run_scenario(&base(), "moderate").unwrap();
        let s = &result.summary;

        assert_eq!(result.daily_data.len(), 18);
        assert!((s.initial_collateral_ratio - 200.0).abs() < 1e-9);
        assert!((s.min_collateral_ratio - 140.0).abs() < 1e-9);
        assert!(s.final_collateral_ratio > s.min_collateral_ratio);
        assert!((s.residual_drawdown + 60.0).abs() < 1e-9);
        assert!((s.residual_leverage - 2.0).abs() < 1e-9);
        assert!(s.survived);
        assert_eq!(s.days_in_critical, 0);
        assert!(s.days_in_warning > 0);
    }

    #[test]
    fn test_visibility_conversion_on_quiet_run() {
        let result = run_scenario(&base(), "moderate").unwrap();

        let synthetic: Vec<_> = result
            .daily_data
            .iter()
            .filter(|d| d.synthetic_conversion)
            .collect();
        assert_eq!(synthetic.len(), 1);
        assert_eq!(synthetic[0].day, 7);
        assert!((synthetic[0].converted - 15_000.0).abs() < 1e-6);
        assert_eq!(synthetic[0].minted, 0.0);
        // state untouched by the display conversion
        assert!(result.daily_data.iter().all(|d| d.stable_supply == 5_000_000.0));
        assert!((result.summary.conversion_percentage - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_visibility_conversion_with_nothing_staked() {
        let initial = InitialConditions {
            staked_percentage: 0.0,
            ..base()
        };
        let result = run_scenario(&initial, "moderate").unwrap();

        let synthetic: Vec<_> = result
            .daily_data
            .iter()
            .filter(|d| d.synthetic_conversion)
            .collect();
        assert_eq!(synthetic.len(), 1);
        assert_eq!(synthetic[0].day, 7);
        assert_eq!(synthetic[0].converted, MIN_VISIBLE_CONVERSION);
        assert!(result.daily_data.iter().any(|d| d.converted > 0.0));
        assert_eq!(result.summary.total_converted, MIN_VISIBLE_CONVERSION);
        assert_eq!(result.summary.conversion_percentage, 0.0);
        assert_eq!(result.economic_converted(), 0.0);
    }

    #[test]
    fn test_severe_run_converts() {
        let result = run_scenario(&base(), "severe").unwrap();
        let s = &result.summary;

        assert_eq!(result.daily_data.len(), 14);
        assert!((s.min_collateral_ratio - 100.0).abs() < 1e-9);
        assert!(!s.survived);
        assert!(s.total_converted > 0.0);
        assert!(result.daily_data.iter().all(|d| !d.synthetic_conversion));
        assert!(s.days_in_critical >= 1);
        // supply only ever shrinks
        for w in result.daily_data.windows(2) {
            assert!(w[1].stable_supply <= w[0].stable_supply);
        }
    }

    #[test]
    fn test_extreme_run_stays_finite() {
        let result = run_scenario(&base(), "extreme").unwrap();

        for day in &result.daily_data {
            assert!(day.collateral_ratio.is_finite());
            assert!(day.residual_price >= 0.0);
            assert!(day.minted >= 0.0);
            assert!(day.stable_supply > 0.0);
        }
        assert!(result.summary.residual_drawdown >= -100.0);
    }

    #[test]
    fn test_invalid_inputs() {
        let mut bad = base();
        bad.stable_supply = -5.0;
        assert!(run_scenario(&bad, "moderate").is_err());

        let params = ScenarioParameters {
            drop_percent: 30.0,
            drop_days: 0,
        };
        assert!(run_simulation(&base(), params).is_err());
    }
}
