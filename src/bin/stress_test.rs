//! Stress Test Binary
//!
//! Runs each configured scenario through the day-by-day engine and prints
//! the summary plus a per-day table.
//!
//! ## Usage
//! ```bash
//! HYLO_SIM_CONFIG=hylo-sim.toml cargo run --bin stress_test --release
//! ```

use anyhow::{Context, Result};
use hylo_simulation::config::Config;
use hylo_simulation::scenario::{run_scenario, Scenario, SimulationResult};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load_or_default()?;
    let initial = config.initial_conditions();

    println!("=======================================================");
    println!("  Stress Test Simulation");
    println!("  Shock, stability-mode conversion and recovery");
    println!("=======================================================");
    println!();
    println!("Parameters:");
    println!("  Collateral value: ${:.0}", initial.collateral_value);
    println!("  Stable supply:    {:.0}", initial.stable_supply);
    println!("  Staked:           {:.1}%", initial.staked_percentage);
    println!("  Asset price:      ${:.2}", initial.asset_price);
    println!();

    let mut results = Vec::with_capacity(config.scenarios.len());
    for key in &config.scenarios {
        let scenario = Scenario::from_name(key);
        let result = run_scenario(&initial, scenario.key())
            .with_context(|| format!("scenario {} failed", key))?;

        println!("=======================================================");
        println!("Scenario: {}", scenario.name());
        println!("=======================================================");
        print_summary(&result);
        println!();
        print_days(&result);
        println!();

        results.push((scenario.key(), result));
    }

    print_comparison_table(&results);

    if let Some(path) = &config.json_output {
        let dump: Vec<_> = results
            .iter()
            .map(|(key, result)| serde_json::json!({ "scenario": key, "result": result }))
            .collect();
        let json = serde_json::to_string_pretty(&dump).context("Failed to serialize results")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write results to {}", path.display()))?;
        log::info!("Wrote stress results to {}", path.display());
    }

    Ok(())
}

fn print_summary(result: &SimulationResult) {
    let s = &result.summary;
    println!("  Initial CR:              {:.2}%", s.initial_collateral_ratio);
    println!(
        "  Min CR:                  {:.2}% ({:+.2}%)",
        s.min_collateral_ratio, s.min_collateral_ratio_change_percent
    );
    println!(
        "  Final CR:                {:.2}% ({:+.2}%)",
        s.final_collateral_ratio, s.final_collateral_ratio_change_percent
    );
    println!(
        "  Stable converted:        {:.0} ({:.2}%)",
        s.total_converted, s.conversion_percentage
    );
    println!("  Residual drawdown:       {:.2}%", s.residual_drawdown);
    println!("  Residual leverage:       {:.2}x", s.residual_leverage);
    println!("  Depeg buffer:            {:.2}% above depeg", s.depeg_buffer);
    println!("  CR recovery:             +{:.2}%", s.recovery_from_trough);
    println!("  Days in warning:         {}", s.days_in_warning);
    println!("  Days in critical:        {}", s.days_in_critical);
    println!(
        "  Survived:                {}",
        if s.survived { "Yes (maintained peg)" } else { "No (lost peg)" }
    );
}

fn print_days(result: &SimulationResult) {
    println!("| Day | Price    | CR (%)  | Mode     | Residual | Converted    | Minted     |");
    println!("|-----|----------|---------|----------|----------|--------------|------------|");
    for d in &result.daily_data {
        println!(
            "| {:3} | {:8.2} | {:7.2} | {:8} | {:8.2} | {:12.0}{} | {:10.2} |",
            d.day,
            d.asset_price,
            d.collateral_ratio,
            format!("{:?}", d.stability_mode),
            d.residual_price,
            d.converted,
            if d.synthetic_conversion { "*" } else { " " },
            d.minted,
        );
    }
    if result.daily_data.iter().any(|d| d.synthetic_conversion) {
        println!("  * display-only conversion, no state change");
    }
}

fn print_comparison_table(results: &[(&str, SimulationResult)]) {
    println!("=======================================================");
    println!("  Summary");
    println!("=======================================================");
    println!();
    println!("| Scenario    | Min CR  | Final CR | Converted % | Drawdown | Survived |");
    println!("|-------------|---------|----------|-------------|----------|----------|");
    for (key, result) in results {
        let s = &result.summary;
        println!(
            "| {:11} | {:6.2}% | {:7.2}% | {:10.2}% | {:7.2}% | {:8} |",
            key,
            s.min_collateral_ratio,
            s.final_collateral_ratio,
            s.conversion_percentage,
            s.residual_drawdown,
            if s.survived { "yes" } else { "no" },
        );
    }
}
