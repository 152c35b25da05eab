//! APY and Depeg Risk Calculators Binary
//!
//! ## Usage
//! ```bash
//! cargo run --bin calculators --release
//! ```

use anyhow::Result;
use hylo_simulation::config::Config;
use hylo_simulation::{calculate_depeg_risk, calculate_yield};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load_or_default()?;

    println!("=======================================================");
    println!("  Staking APY Calculator");
    println!("=======================================================");
    println!();

    let apy = calculate_yield(
        config.collateral_value,
        config.stable_supply,
        config.staked_percentage,
        config.base_yield,
        config.yield_distribution_percentage,
    )?;

    println!("  Collateral ratio:        {:.2}%", apy.collateral_ratio);
    println!("  Current APY:             {:.2}%", apy.raw_apy);
    println!("  Yield multiple:          {:.2}x", apy.yield_multiple);
    println!("  Risk-adjusted APY:       {:.2}%", apy.risk_adjusted_apy);
    println!("  Annual yield on $1,000:  ${:.2}", apy.annual_yield_on_reference_investment);
    println!();
    println!("| Staked % | APY      | Risk   |");
    println!("|----------|----------|--------|");
    for level in &apy.staking_levels {
        println!(
            "| {:7.0}% | {:7.2}% | {:6} |",
            level.percentage,
            level.apy,
            level.risk_level.name()
        );
    }
    println!();

    println!("=======================================================");
    println!("  Depeg Risk Calculator (-{:.1}% asset price)", config.price_drop_percentage);
    println!("=======================================================");
    println!();

    let depeg = calculate_depeg_risk(
        config.collateral_value,
        config.stable_supply,
        config.staked_percentage,
        config.asset_price,
        config.price_drop_percentage,
    )?;

    println!("  Current CR:              {:.2}%", depeg.current_ratio);
    println!("  CR after drop:           {:.2}%", depeg.after_drop_ratio);
    println!("  Stability mode:          {}", depeg.stability_mode.name());
    println!(
        "  Stable converted:        {:.0} ({:.2}%)",
        depeg.converted, depeg.conversion_percentage
    );
    println!(
        "  Depeg probability:       {} ({:.0}%)",
        depeg.depeg_level.name(),
        depeg.depeg_probability
    );
    println!("  Max safe price drop:     {:.2}%", depeg.max_safe_drop_percentage);

    Ok(())
}
