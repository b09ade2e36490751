//! Common types and sampling helpers for the entity models.

use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::config::{LoadConfig, TclConfig};
use crate::error::SimError;

/// Fixed physical parameters of one TCL, drawn once per seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TclParameters {
    /// Thermal coupling between indoor air and ambient air.
    pub air_thermal_coeff: f64,
    /// Thermal coupling between indoor air and building mass.
    pub mass_thermal_coeff: f64,
    /// Internal heat gain per sub-step (°C).
    pub internal_heat_gain: f64,
    /// Temperature lift per sub-step when switched on, also the power draw (kW).
    pub nominal_power: f64,
}

impl TclParameters {
    /// Draws one parameter set from the configured distributions.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidArgument`] if a standard deviation is invalid.
    pub fn sample(cfg: &TclConfig, rng: &mut StdRng) -> Result<Self, SimError> {
        Ok(Self {
            air_thermal_coeff: sample_normal(rng, cfg.air_coeff_mean, cfg.air_coeff_std)?,
            mass_thermal_coeff: sample_normal(rng, cfg.mass_coeff_mean, cfg.mass_coeff_std)?,
            internal_heat_gain: sample_normal(rng, cfg.heat_gain_mean, cfg.heat_gain_std)?,
            nominal_power: sample_normal(rng, cfg.nominal_power_mean, cfg.nominal_power_std)?,
        })
    }
}

/// Fixed behavioural parameters of one household, drawn once per seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadParameters {
    /// Initial response per price tier above the neutral tier.
    pub price_sensitivity: f64,
    /// Largest load the household sheds at unit response (kW).
    pub max_sheddable_load: f64,
}

impl LoadParameters {
    /// Draws one parameter set from the configured distributions.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidArgument`] if a standard deviation is invalid.
    pub fn sample(cfg: &LoadConfig, rng: &mut StdRng) -> Result<Self, SimError> {
        Ok(Self {
            price_sensitivity: sample_normal(rng, cfg.sensitivity_mean, cfg.sensitivity_std)?,
            max_sheddable_load: sample_normal(rng, cfg.max_shed_mean, cfg.max_shed_std)?,
        })
    }
}

/// Draws one value from `N(mean, std_dev)`.
///
/// A zero standard deviation returns `mean` exactly.
///
/// # Errors
///
/// Returns [`SimError::InvalidArgument`] for a negative or non-finite deviation.
pub fn sample_normal(rng: &mut StdRng, mean: f64, std_dev: f64) -> Result<f64, SimError> {
    let normal = Normal::new(mean, std_dev).map_err(|e| {
        SimError::InvalidArgument(format!("normal({mean}, {std_dev}): {e}"))
    })?;
    Ok(normal.sample(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn zero_deviation_returns_mean() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(sample_normal(&mut rng, 1.5, 0.0).ok(), Some(1.5));
    }

    #[test]
    fn negative_deviation_is_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            sample_normal(&mut rng, 0.0, -1.0),
            Err(SimError::InvalidArgument(_))
        ));
    }

    #[test]
    fn same_seed_draws_same_parameters() {
        let cfg = TclConfig::default();
        let mut a = StdRng::seed_from_u64(11);
        let mut b = StdRng::seed_from_u64(11);
        let pa = TclParameters::sample(&cfg, &mut a).ok();
        let pb = TclParameters::sample(&cfg, &mut b).ok();
        assert!(pa.is_some());
        assert_eq!(pa, pb);
    }
}
