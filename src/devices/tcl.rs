use crate::devices::types::TclParameters;

/// Number of Euler sub-steps integrated per simulation step.
const SUB_STEPS: usize = 5;

/// A thermostatically controlled load: one building with an air node and a
/// thermal mass node, heated by a unit that is either on or off.
///
/// External control requests go through a backup controller that keeps the
/// indoor temperature inside `[temp_min, temp_max]`: below the band the unit
/// is forced on, above it the unit is forced off.
///
/// # Examples
///
/// ```
/// use microgrid_sim::devices::Tcl;
/// use microgrid_sim::devices::types::TclParameters;
///
/// let params = TclParameters {
///     air_thermal_coeff: 0.004,
///     mass_thermal_coeff: 0.2,
///     internal_heat_gain: 0.0,
///     nominal_power: 1.5,
/// };
/// let mut tcl = Tcl::new(params, 19.0, 25.0, 12.0);
///
/// // Too cold: the backup controller overrides the "off" request.
/// tcl.control(0);
/// assert_eq!(tcl.control_signal, 1);
/// ```
#[derive(Debug, Clone)]
pub struct Tcl {
    pub air_thermal_coeff: f64,
    pub mass_thermal_coeff: f64,
    pub internal_heat_gain: f64,
    /// Nominal heating power (kW).
    pub nominal_power: f64,
    /// Lower comfort bound (°C).
    pub temp_min: f64,
    /// Upper comfort bound (°C).
    pub temp_max: f64,

    /// Indoor air temperature (°C).
    pub indoor_temp: f64,
    /// Building mass temperature (°C).
    pub mass_temp: f64,
    /// Applied control, 1 = on, 0 = off.
    pub control_signal: u8,
}

impl Tcl {
    /// Creates a TCL with both temperature nodes at `initial_temp`.
    pub fn new(params: TclParameters, temp_min: f64, temp_max: f64, initial_temp: f64) -> Self {
        Self {
            air_thermal_coeff: params.air_thermal_coeff,
            mass_thermal_coeff: params.mass_thermal_coeff,
            internal_heat_gain: params.internal_heat_gain,
            nominal_power: params.nominal_power,
            temp_min,
            temp_max,
            indoor_temp: initial_temp,
            mass_temp: initial_temp,
            control_signal: 0,
        }
    }

    /// Applies a requested control through the backup controller.
    ///
    /// The request is honoured only while the indoor temperature is strictly
    /// inside the comfort band. Below it the unit turns on; at or above the
    /// upper bound (and exactly at the lower bound) it turns off.
    pub fn control(&mut self, requested: u8) {
        self.control_signal = if self.indoor_temp < self.temp_min {
            1
        } else if self.temp_min < self.indoor_temp && self.indoor_temp < self.temp_max {
            requested.min(1)
        } else {
            0
        };
    }

    /// Advances the two-node thermal model by one step.
    ///
    /// Integrates five explicit Euler sub-steps and stops early once the
    /// indoor temperature reaches `temp_max`.
    pub fn update_state(&mut self, ambient_temp: f64) {
        let u = f64::from(self.control_signal);
        for _ in 0..SUB_STEPS {
            self.indoor_temp += self.air_thermal_coeff * (ambient_temp - self.indoor_temp)
                + self.mass_thermal_coeff * (self.mass_temp - self.indoor_temp)
                + self.nominal_power * u
                + self.internal_heat_gain;
            self.mass_temp += self.mass_thermal_coeff * (self.indoor_temp - self.mass_temp);
            if self.indoor_temp >= self.temp_max {
                break;
            }
        }
    }

    /// Position of the indoor temperature within the comfort band.
    ///
    /// Linear and unclamped: below the band it is negative, above it exceeds 1.
    pub fn charge_level(&self) -> f64 {
        (self.indoor_temp - self.temp_min) / (self.temp_max - self.temp_min)
    }

    /// Power drawn at the current control signal (kW).
    pub fn power(&self) -> f64 {
        self.nominal_power * f64::from(self.control_signal)
    }
}
