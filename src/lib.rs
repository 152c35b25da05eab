//! Hylo Stress Simulation Library
//!
//! Calculators for a synthetic-dollar protocol where a stable token (hyUSD)
//! and a leveraged residual-claim token (xSOL) share one collateral pool,
//! and a staked stable pool is converted into the residual token when the
//! collateral ratio falls into stability mode.
//!
//! ## Modules
//!
//! - `price_path`: deterministic shock-and-recovery price paths
//! - `state`: protocol state and the day-by-day state updater
//! - `scenario`: named stress scenarios and summary metrics
//! - `yield_calc`: staking APY estimator
//! - `depeg`: single-shock depeg risk estimator
//! - `monte_carlo`: randomized shock sweep over the stress engine
//! - `config`: TOML configuration for the report binaries
//!
//! ## Usage
//!
//! ```bash
//! # Run every named stress scenario
//! cargo run --bin stress_test --release
//!
//! # APY and depeg calculators
//! cargo run --bin calculators --release
//!
//! # Randomized shock sweep
//! cargo run --bin monte_carlo --release
//! ```

pub mod config;
pub mod depeg;
pub mod error;
pub mod monte_carlo;
pub mod price_path;
pub mod scenario;
pub mod state;
pub mod yield_calc;

pub use depeg::calculate_depeg_risk;
pub use error::{Result, SimulationError};
pub use scenario::{run_scenario, run_simulation, SimulationResult};
pub use state::InitialConditions;
pub use yield_calc::calculate_yield;
