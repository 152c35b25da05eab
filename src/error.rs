//! Error types shared by every calculator entry point.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimulationError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl SimulationError {
    pub fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter { name, value, reason }
    }
}

pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimulationError::invalid(name, value, "must be a finite number greater than zero"))
    }
}

pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SimulationError::invalid(name, value, "must be a finite number >= 0"))
    }
}

pub(crate) fn ensure_percentage(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(SimulationError::invalid(name, value, "must be a percentage in [0, 100]"))
    }
}
