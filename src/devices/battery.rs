use crate::config::BatteryConfig;
use crate::error::SimError;

/// The microgrid's battery energy storage unit.
///
/// `Battery` tracks stored energy under charge, discharge and passive
/// self-discharge. Energy amounts are per simulation step (kWh); the stored
/// energy always stays within `[0, capacity]`.
#[derive(Debug, Clone)]
pub struct Battery {
    /// Full-charge capacity (kWh).
    pub capacity: f64,

    /// Energy drawn from storage per unit of energy supplied.
    pub discharge_efficiency: f64,

    /// Exponential self-discharge rate per step.
    pub dissipation_rate: f64,

    /// Fraction of offered energy that ends up stored.
    pub charge_efficiency: f64,

    /// Nameplate discharge limit per step (kWh). Not enforced by `supply`.
    pub max_discharge_rate: f64,

    /// Nameplate charge loss. Not used by the storage model.
    pub charge_loss: f64,

    /// Energy currently stored (kWh).
    stored_energy: f64,
}

impl Battery {
    /// Creates an empty battery from its configuration.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero/negative or efficiencies are outside `(0, 1]`.
    pub fn new(cfg: &BatteryConfig) -> Self {
        assert!(cfg.capacity > 0.0);
        assert!(cfg.charge_efficiency > 0.0 && cfg.charge_efficiency <= 1.0);
        assert!(cfg.discharge_efficiency > 0.0 && cfg.discharge_efficiency <= 1.0);

        Self {
            capacity: cfg.capacity,
            discharge_efficiency: cfg.discharge_efficiency,
            dissipation_rate: cfg.dissipation_rate,
            charge_efficiency: cfg.charge_efficiency,
            max_discharge_rate: cfg.max_discharge_rate,
            charge_loss: cfg.charge_loss,
            stored_energy: 0.0,
        }
    }

    /// Offers `energy` to the battery and returns what was not absorbed.
    ///
    /// A full battery rejects the whole offer. Otherwise
    /// `charge_efficiency * energy` is stored and anything above capacity is
    /// returned as leftover for the caller to sell or discard.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidArgument`] for negative or non-finite energy.
    pub fn charge(&mut self, energy: f64) -> Result<f64, SimError> {
        check_energy("charge", energy)?;

        let empty = self.capacity - self.stored_energy;
        if empty <= 0.0 {
            return Ok(energy);
        }

        self.stored_energy += self.charge_efficiency * energy;
        let leftover = self.stored_energy - self.capacity;
        self.stored_energy = self.stored_energy.min(self.capacity);
        Ok(leftover.max(0.0))
    }

    /// Draws `energy` from the battery and returns the amount delivered.
    ///
    /// Storage drops by `energy * discharge_efficiency`, floored at zero. The
    /// delivered amount is `min(energy, stored energy before the call)`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidArgument`] for negative or non-finite energy.
    pub fn supply(&mut self, energy: f64) -> Result<f64, SimError> {
        check_energy("supply", energy)?;

        let remaining = self.stored_energy;
        self.stored_energy -= energy * self.discharge_efficiency;
        self.stored_energy = self.stored_energy.max(0.0);
        Ok(energy.min(remaining))
    }

    /// Applies one step of exponential self-discharge.
    pub fn dissipate(&mut self) {
        self.stored_energy *= (-self.dissipation_rate).exp();
    }

    /// Energy currently stored (kWh).
    pub fn stored_energy(&self) -> f64 {
        self.stored_energy
    }

    /// Stored energy as a fraction of capacity (0.0 to 1.0).
    pub fn charge_fraction(&self) -> f64 {
        self.stored_energy / self.capacity
    }
}

fn check_energy(op: &str, energy: f64) -> Result<(), SimError> {
    if energy.is_finite() && energy >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidArgument(format!(
            "battery {op} requires finite non-negative energy, got {energy}"
        )))
    }
}
