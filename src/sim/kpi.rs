//! Post-hoc episode summary computed from trace rows.

use std::fmt;

use serde::Serialize;

use super::trace::TraceRow;

/// Aggregate indicators of one recorded episode.
///
/// Computed from the trace after the fact so the reported figures always
/// agree with the exported rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EpisodeSummary {
    /// Number of recorded steps.
    pub steps: usize,
    /// Sum of step rewards (currency units).
    pub total_reward: f64,
    /// Energy sold to the grid (kWh).
    pub energy_sold: f64,
    /// Energy bought from the grid (kWh).
    pub energy_bought: f64,
    /// Household energy served (kWh).
    pub energy_served: f64,
    /// Mean retail price charged (cents/kWh).
    pub mean_sale_price: f64,
    /// Largest TCL fleet draw in a step (kW).
    pub peak_tcl_consumption: f64,
    /// Mean TCL charge level over all steps.
    pub mean_tcl_level: f64,
    /// Battery charge fraction after the last step.
    pub final_battery_fraction: f64,
}

impl EpisodeSummary {
    /// Summarises a complete episode trace.
    pub fn from_trace(rows: &[TraceRow]) -> Self {
        let Some(last) = rows.last() else {
            return Self::default();
        };

        let n = rows.len() as f64;
        let mut summary = Self {
            steps: rows.len(),
            final_battery_fraction: last.battery_fraction,
            ..Self::default()
        };
        let mut price_sum = 0.0;
        let mut level_sum = 0.0;

        for r in rows {
            summary.total_reward += r.reward;
            summary.energy_sold += r.energy_sold;
            summary.energy_bought += r.energy_bought;
            summary.energy_served += r.total_load();
            summary.peak_tcl_consumption = summary.peak_tcl_consumption.max(r.tcl_consumption);
            price_sum += r.sale_price;
            level_sum += r.mean_tcl_level();
        }

        summary.mean_sale_price = price_sum / n;
        summary.mean_tcl_level = level_sum / n;
        summary
    }
}

impl fmt::Display for EpisodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Episode Summary ---")?;
        writeln!(f, "Steps:                 {}", self.steps)?;
        writeln!(f, "Total reward:          {:.3}", self.total_reward)?;
        writeln!(f, "Energy sold:           {:.2} kWh", self.energy_sold)?;
        writeln!(f, "Energy bought:         {:.2} kWh", self.energy_bought)?;
        writeln!(f, "Household energy:      {:.2} kWh", self.energy_served)?;
        writeln!(f, "Mean sale price:       {:.2} c/kWh", self.mean_sale_price)?;
        writeln!(f, "Peak TCL draw:         {:.2} kW", self.peak_tcl_consumption)?;
        writeln!(f, "Mean TCL charge level: {:.3}", self.mean_tcl_level)?;
        write!(
            f,
            "Final battery charge:  {:.1}%",
            self.final_battery_fraction * 100.0
        )
    }
}
