//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Hourly household demand profile shared by the whole load population (kW).
pub const BASE_LOAD: [f64; 24] = [
    2.0, 2.0, 2.0, 2.0, 3.4, 4.0, 6.0, 5.5, 6.0, 5.5, 4.0, 3.3, 4.1, 3.3, 4.1, 2.0, 2.0, 2.0, 2.0,
    2.0, 2.0, 2.0, 2.0, 2.0,
];

/// Retail price ladder offered to households (cents/kWh).
pub const PRICE_TIERS: [f64; 5] = [2.8, 5.8, 7.8, 9.3, 10.81];

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Episode shape, population sizes and seeding.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Thermostatically controlled load parameters.
    #[serde(default)]
    pub tcl: TclConfig,
    /// Household load population parameters.
    #[serde(default)]
    pub load: LoadConfig,
    /// Battery storage parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Market pricing constants.
    #[serde(default)]
    pub market: MarketConfig,
    /// Exogenous series source.
    #[serde(default)]
    pub data: DataConfig,
}

/// Episode shape, population sizes and seeding.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Episode length in hourly steps (must be >= 2).
    pub iterations: usize,
    /// Number of TCLs in the fleet.
    pub num_tcls: usize,
    /// Number of price-responsive households (must be > 0).
    pub num_loads: usize,
    /// Master random seed.
    pub seed: u64,
    /// Largest day offset drawn at reset (inclusive).
    pub max_day_offset: usize,
    /// Power budget granted to the TCL fleet at full dispatch (kW).
    pub dispatch_scale: f64,
    /// Action policy used by the CLI: `"random"` or `"idle"`.
    pub policy: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: 24,
            num_tcls: 100,
            num_loads: 150,
            seed: 1,
            max_day_offset: 10,
            dispatch_scale: 50.0,
            policy: "random".to_string(),
        }
    }
}

/// Thermostatically controlled load parameters.
///
/// Per-unit coefficients are drawn from normal distributions with the given
/// mean and standard deviation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TclConfig {
    /// Lower comfort bound (°C).
    pub temp_min: f64,
    /// Upper comfort bound (°C).
    pub temp_max: f64,
    pub air_coeff_mean: f64,
    pub air_coeff_std: f64,
    pub mass_coeff_mean: f64,
    pub mass_coeff_std: f64,
    pub heat_gain_mean: f64,
    pub heat_gain_std: f64,
    pub nominal_power_mean: f64,
    pub nominal_power_std: f64,
    /// Fleet-wide initial temperature drawn once per reset (°C).
    pub initial_temp_mean: f64,
    pub initial_temp_std: f64,
}

impl Default for TclConfig {
    fn default() -> Self {
        Self {
            temp_min: 19.0,
            temp_max: 25.0,
            air_coeff_mean: 0.004,
            air_coeff_std: 0.0008,
            mass_coeff_mean: 0.2,
            mass_coeff_std: 0.004,
            heat_gain_mean: 0.0,
            heat_gain_std: 0.01,
            nominal_power_mean: 1.5,
            nominal_power_std: 0.01,
            initial_temp_mean: 12.0,
            initial_temp_std: 5.0,
        }
    }
}

/// Household load population parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    /// Hourly baseline demand profile (kW, 24 values).
    pub base_load: Vec<f64>,
    /// Retail price ladder indexed by the pricing action (cents/kWh).
    pub price_tiers: Vec<f64>,
    pub sensitivity_mean: f64,
    pub sensitivity_std: f64,
    /// Largest load a household can shed at full response (kW).
    pub max_shed_mean: f64,
    pub max_shed_std: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            base_load: BASE_LOAD.to_vec(),
            price_tiers: PRICE_TIERS.to_vec(),
            sensitivity_mean: 0.5,
            sensitivity_std: 0.3,
            max_shed_mean: 3.0,
            max_shed_std: 1.0,
        }
    }
}

/// Battery storage parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Full-charge capacity (kWh).
    pub capacity: f64,
    /// Fraction of requested energy drawn from storage per unit supplied.
    pub discharge_efficiency: f64,
    /// Fraction of offered energy that ends up stored.
    pub charge_efficiency: f64,
    /// Exponential self-discharge rate per step.
    pub dissipation_rate: f64,
    /// Nameplate discharge limit per step (kWh). Recorded, not enforced.
    pub max_discharge_rate: f64,
    /// Nameplate charge loss. Recorded, not enforced.
    pub charge_loss: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity: 400.0,
            discharge_efficiency: 0.9,
            charge_efficiency: 0.9,
            dissipation_rate: 0.001,
            max_discharge_rate: 10.0,
            charge_loss: 0.15,
        }
    }
}

/// Market pricing constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketConfig {
    /// Convex surcharge on purchases, multiplied by the squared quantity.
    pub quadratic_price: f64,
    /// Flat cost charged on every purchase.
    pub fixed_cost: f64,
    /// Multiplier applied when the accumulated price tier runs too high.
    pub high_price_penalty: f64,
    /// Scale applied to regulation prices read from CSV.
    pub regulation_price_scale: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            quadratic_price: 0.025,
            fixed_cost: 0.0,
            high_price_penalty: 2.0,
            regulation_price_scale: 0.1,
        }
    }
}

/// Exogenous series source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Directory holding the CSV series. Synthetic series are used when unset.
    pub dir: Option<PathBuf>,
    /// Length in hours of the synthetic series.
    pub synthetic_len: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: None,
            synthetic_len: 24 * 60,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.iterations"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: 100 TCLs, 150 households, one day.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns a small fleet for quick runs and tests.
    pub fn compact() -> Self {
        Self {
            simulation: SimulationConfig {
                num_tcls: 10,
                num_loads: 20,
                seed: 7,
                ..SimulationConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "compact"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "compact" => Ok(Self::compact()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let s = &self.simulation;
        if s.iterations < 2 {
            errors.push(ConfigError::new("simulation.iterations", "must be >= 2"));
        }
        if s.num_loads == 0 {
            errors.push(ConfigError::new("simulation.num_loads", "must be > 0"));
        }
        if !(s.dispatch_scale.is_finite() && s.dispatch_scale >= 0.0) {
            errors.push(ConfigError::new(
                "simulation.dispatch_scale",
                "must be finite and >= 0",
            ));
        }
        if s.policy != "random" && s.policy != "idle" {
            errors.push(ConfigError::new(
                "simulation.policy",
                format!("must be \"random\" or \"idle\", got \"{}\"", s.policy),
            ));
        }

        let t = &self.tcl;
        if !(t.temp_min.is_finite() && t.temp_max.is_finite()) {
            errors.push(ConfigError::new("tcl.temp_min", "comfort bounds must be finite"));
        } else if t.temp_min >= t.temp_max {
            errors.push(ConfigError::new("tcl.temp_min", "must be < tcl.temp_max"));
        }
        for (field, mean) in [
            ("tcl.air_coeff_mean", t.air_coeff_mean),
            ("tcl.mass_coeff_mean", t.mass_coeff_mean),
            ("tcl.heat_gain_mean", t.heat_gain_mean),
            ("tcl.nominal_power_mean", t.nominal_power_mean),
            ("tcl.initial_temp_mean", t.initial_temp_mean),
            ("load.sensitivity_mean", self.load.sensitivity_mean),
            ("load.max_shed_mean", self.load.max_shed_mean),
        ] {
            if !mean.is_finite() {
                errors.push(ConfigError::new(field, "must be finite"));
            }
        }
        for (field, std) in [
            ("tcl.air_coeff_std", t.air_coeff_std),
            ("tcl.mass_coeff_std", t.mass_coeff_std),
            ("tcl.heat_gain_std", t.heat_gain_std),
            ("tcl.nominal_power_std", t.nominal_power_std),
            ("tcl.initial_temp_std", t.initial_temp_std),
            ("load.sensitivity_std", self.load.sensitivity_std),
            ("load.max_shed_std", self.load.max_shed_std),
        ] {
            if !(std.is_finite() && std >= 0.0) {
                errors.push(ConfigError::new(field, "must be finite and >= 0"));
            }
        }

        let l = &self.load;
        if l.base_load.is_empty() {
            errors.push(ConfigError::new("load.base_load", "must not be empty"));
        }
        if !l.base_load.iter().all(|v| v.is_finite()) {
            errors.push(ConfigError::new("load.base_load", "values must be finite"));
        }
        if l.price_tiers.len() < 3 {
            errors.push(ConfigError::new(
                "load.price_tiers",
                "must hold at least 3 tiers (tier 2 is the reset sale price)",
            ));
        }
        if !l.price_tiers.iter().all(|v| v.is_finite()) {
            errors.push(ConfigError::new("load.price_tiers", "values must be finite"));
        }

        let b = &self.battery;
        if !(b.capacity.is_finite() && b.capacity > 0.0) {
            errors.push(ConfigError::new("battery.capacity", "must be finite and > 0"));
        }
        for (field, eta) in [
            ("battery.charge_efficiency", b.charge_efficiency),
            ("battery.discharge_efficiency", b.discharge_efficiency),
        ] {
            if !(eta > 0.0 && eta <= 1.0) {
                errors.push(ConfigError::new(field, "must be in (0.0, 1.0]"));
            }
        }

        let m = &self.market;
        for (field, value) in [
            ("battery.dissipation_rate", b.dissipation_rate),
            ("battery.max_discharge_rate", b.max_discharge_rate),
            ("battery.charge_loss", b.charge_loss),
            ("market.quadratic_price", m.quadratic_price),
            ("market.fixed_cost", m.fixed_cost),
            ("market.high_price_penalty", m.high_price_penalty),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(ConfigError::new(field, "must be finite and >= 0"));
            }
        }
        if !(m.regulation_price_scale.is_finite() && m.regulation_price_scale > 0.0) {
            errors.push(ConfigError::new(
                "market.regulation_price_scale",
                "must be finite and > 0",
            ));
        }

        if self.data.dir.is_none() && self.data.synthetic_len < s.max_day_offset + s.iterations {
            errors.push(ConfigError::new(
                "data.synthetic_len",
                "must cover simulation.max_day_offset + simulation.iterations",
            ));
        }

        errors
    }
}
