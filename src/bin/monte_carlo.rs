//! Monte Carlo Shock Sweep Binary
//!
//! Samples random shock sizes and durations and reports how often the
//! protocol keeps its peg.
//!
//! ## Usage
//! ```bash
//! cargo run --bin monte_carlo --release
//! ```

use anyhow::Result;
use hylo_simulation::config::Config;
use hylo_simulation::monte_carlo::{run_shock_sweep, SweepConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load_or_default()?;
    let initial = config.initial_conditions();
    let sweep = &config.monte_carlo;

    println!("=======================================================");
    println!("  Monte Carlo Shock Sweep");
    println!("=======================================================");
    println!();
    println!("Parameters:");
    println!("  Runs: {}, seed: {}", sweep.runs, sweep.seed);
    println!(
        "  Drop: N({:.1}%, {:.1}%), 1-{} days",
        sweep.drop_mean, sweep.drop_std, sweep.max_drop_days
    );
    println!();

    let result = run_shock_sweep(&initial, sweep)?;
    result.print();
    println!();

    print_sensitivity_table(&config)?;
    Ok(())
}

/// Survival across a few shock severities around the configured one.
fn print_sensitivity_table(config: &Config) -> Result<()> {
    println!("| Drop mean | Survival | Critical | Min CR p5 |");
    println!("|-----------|----------|----------|-----------|");

    for drop_mean in [20.0, 35.0, 50.0, 65.0] {
        let sweep = SweepConfig {
            drop_mean,
            runs: config.monte_carlo.runs.min(500),
            ..config.monte_carlo.clone()
        };
        let result = run_shock_sweep(&config.initial_conditions(), &sweep)?;
        println!(
            "| {:8.0}% | {:7.1}% | {:7.1}% | {:8.2}% |",
            drop_mean,
            result.survival_probability * 100.0,
            result.critical_probability * 100.0,
            result.min_ratio_p5,
        );
    }
    Ok(())
}
