//! Per-step trace buffers for inspecting and exporting an episode.

use crate::error::SimError;

use super::engine::MicrogridEnv;

/// Snapshot of the environment taken right after a step.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceRow {
    pub time_step: usize,
    /// Absolute hour after the step advanced.
    pub absolute_time: usize,
    pub reward: f64,
    /// Charge level of every TCL, in fleet order.
    pub tcl_levels: Vec<f64>,
    /// Demand of every household (kW).
    pub household_loads: Vec<f64>,
    pub sale_price: f64,
    pub battery_fraction: f64,
    /// Generation at `absolute_time` (kW).
    pub generation: f64,
    pub energy_sold: f64,
    pub energy_bought: f64,
    /// Market buy price at `absolute_time` (cents/kWh).
    pub grid_price: f64,
    pub dispatch_command: f64,
    pub tcl_consumption: f64,
}

impl TraceRow {
    /// Total household demand (kW).
    pub fn total_load(&self) -> f64 {
        self.household_loads.iter().sum()
    }

    /// Mean TCL charge level, 0 for an empty fleet.
    pub fn mean_tcl_level(&self) -> f64 {
        if self.tcl_levels.is_empty() {
            0.0
        } else {
            self.tcl_levels.iter().sum::<f64>() / self.tcl_levels.len() as f64
        }
    }
}

/// Caller-owned buffer of trace rows.
///
/// The environment never records on its own; pass it to
/// [`TraceRecorder::record`] after each step worth keeping.
#[derive(Debug, Clone, Default)]
pub struct TraceRecorder {
    rows: Vec<TraceRow>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a snapshot of `env` together with the reward just received.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IndexOutOfRange`] if the environment clock sits
    /// past a series end.
    pub fn record(&mut self, env: &MicrogridEnv, reward: f64) -> Result<(), SimError> {
        let now = env.absolute_time();
        self.rows.push(TraceRow {
            time_step: env.time_step(),
            absolute_time: now,
            reward,
            tcl_levels: env.tcls().iter().map(|t| t.charge_level()).collect(),
            household_loads: env.household_loads(),
            sale_price: env.sale_price(),
            battery_fraction: env.battery().charge_fraction(),
            generation: env.generation().current_generation(now)?,
            energy_sold: env.energy_sold(),
            energy_bought: env.energy_bought(),
            grid_price: env.grid().buy_price_at(now)?,
            dispatch_command: env.dispatch_command(),
            tcl_consumption: env.tcl_consumption(),
        });
        Ok(())
    }

    pub fn rows(&self) -> &[TraceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Takes the recorded rows, leaving the recorder empty.
    pub fn take(&mut self) -> Vec<TraceRow> {
        std::mem::take(&mut self.rows)
    }
}
