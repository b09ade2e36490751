//! Core simulation types: actions, observations and per-step results.

use std::fmt;

use serde::Serialize;

use crate::error::SimError;
use crate::forecast::Forecast;

/// Number of trailing scalar features after the per-TCL levels.
pub const OBSERVATION_TAIL: usize = 6;

/// Lifecycle of one episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EpisodeState {
    /// Constructed or reseeded, waiting for `reset`.
    Uninitialized,
    /// Accepting steps.
    Running,
    /// Last step taken; only `reset` is accepted.
    Terminal,
}

/// Controller decision for one step.
///
/// # Examples
///
/// ```
/// use microgrid_sim::sim::types::Action;
///
/// // Wider vectors are accepted; only the first four positions are read.
/// let action = Action::from_raw(&[0.5, 3.0, 0.0, 1.0, 0.7, 0.2]).unwrap();
/// assert_eq!(action.price_tier, 3);
/// assert!(action.excess && !action.deficiency);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Action {
    /// Share of the TCL dispatch budget to hand out, in `[0, 1]`.
    pub tcl_dispatch: f64,
    /// Index into the retail price ladder.
    pub price_tier: usize,
    /// Cover deficits from the battery before buying.
    pub deficiency: bool,
    /// Store surpluses in the battery before selling.
    pub excess: bool,
}

impl Action {
    /// Number of raw vector positions an action is read from.
    pub const FIELDS: usize = 4;

    pub fn new(tcl_dispatch: f64, price_tier: usize, deficiency: bool, excess: bool) -> Self {
        Self {
            tcl_dispatch,
            price_tier,
            deficiency,
            excess,
        }
    }

    /// Reads an action from positions 0..4 of a raw vector.
    ///
    /// The price tier must be a non-negative integral value. Flags are set
    /// when their value is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidArgument`] for a short vector or a
    /// fractional, negative or non-finite price tier.
    pub fn from_raw(raw: &[f64]) -> Result<Self, SimError> {
        if raw.len() < Self::FIELDS {
            return Err(SimError::InvalidArgument(format!(
                "action vector needs at least {} values, got {}",
                Self::FIELDS,
                raw.len()
            )));
        }
        let tier = raw[1];
        if !tier.is_finite() || tier < 0.0 || tier.fract() != 0.0 {
            return Err(SimError::InvalidArgument(format!(
                "price tier must be a non-negative integer, got {tier}"
            )));
        }
        Ok(Self {
            tcl_dispatch: raw[0],
            price_tier: tier as usize,
            deficiency: raw[2] != 0.0,
            excess: raw[3] != 0.0,
        })
    }

    /// Checks the action against a ladder of `num_tiers` prices.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidArgument`] if the dispatch share is outside
    /// `[0, 1]` or the tier is outside the ladder.
    pub fn validate(&self, num_tiers: usize) -> Result<(), SimError> {
        if !(0.0..=1.0).contains(&self.tcl_dispatch) {
            return Err(SimError::InvalidArgument(format!(
                "tcl dispatch must be in [0, 1], got {}",
                self.tcl_dispatch
            )));
        }
        if self.price_tier >= num_tiers {
            return Err(SimError::InvalidArgument(format!(
                "price tier {} outside ladder of {num_tiers} tiers",
                self.price_tier
            )));
        }
        Ok(())
    }
}

/// Observation vector of length `num_tcls + 6`.
///
/// Layout: one rescaled charge level per TCL, then aggregate load, battery
/// charge fraction, generation, temperature, buy price and episode progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    values: Vec<f64>,
    num_tcls: usize,
}

impl Observation {
    pub(crate) fn new(values: Vec<f64>, num_tcls: usize) -> Self {
        debug_assert_eq!(values.len(), num_tcls + OBSERVATION_TAIL);
        Self { values, num_tcls }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Per-TCL charge levels rescaled by `(x + 4) / 5`.
    pub fn tcl_levels(&self) -> &[f64] {
        &self.values[..self.num_tcls]
    }

    fn tail(&self, i: usize) -> f64 {
        self.values[self.num_tcls + i]
    }

    pub fn aggregate_load(&self) -> f64 {
        self.tail(0)
    }

    pub fn battery_fraction(&self) -> f64 {
        self.tail(1)
    }

    pub fn generation(&self) -> f64 {
        self.tail(2)
    }

    pub fn temperature(&self) -> f64 {
        self.tail(3)
    }

    pub fn price(&self) -> f64 {
        self.tail(4)
    }

    /// Episode progress, `time_step / iterations`.
    pub fn progress(&self) -> f64 {
        self.tail(5)
    }
}

impl From<Observation> for Vec<f64> {
    fn from(obs: Observation) -> Self {
        obs.values
    }
}

/// Terms that make up one step's reward (currency units).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RewardBreakdown {
    /// Household load valued at the sale price.
    pub load_revenue: f64,
    /// TCL consumption valued at the sale price.
    pub tcl_revenue: f64,
    /// Market sale revenue (positive) or purchase cost (negative).
    pub market: f64,
    /// Amount removed for sustained high price tiers.
    pub high_price_penalty: f64,
    /// Amount added on the terminal step for stored energy.
    pub terminal_bonus: f64,
}

impl RewardBreakdown {
    /// Net reward after penalty and bonus.
    pub fn total(&self) -> f64 {
        self.load_revenue + self.tcl_revenue + self.market - self.high_price_penalty
            + self.terminal_bonus
    }
}

/// Diagnostic record of one step, returned alongside the reward.
#[derive(Debug, Clone, Serialize)]
pub struct StepInfo {
    /// Step index after advancing.
    pub time_step: usize,
    /// Absolute hour that was settled.
    pub settled_time: usize,
    /// Retail price charged this step (cents/kWh).
    pub sale_price: f64,
    /// Household demand after price response (kW).
    pub total_load: f64,
    /// Renewable generation (kW).
    pub generation: f64,
    /// TCL dispatch budget granted (kW).
    pub dispatch_command: f64,
    /// Power drawn by the TCL fleet (kW).
    pub tcl_consumption: f64,
    pub energy_sold: f64,
    pub energy_bought: f64,
    /// Battery charge fraction after dissipation.
    pub battery_fraction: f64,
    pub reward: RewardBreakdown,
    pub forecast: Forecast,
}

impl fmt::Display for StepInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>3} (h{:>4}) | price={:>5.2}  load={:>7.2} kW  gen={:>7.2} kW  \
             tcl={:>6.2}/{:>5.2} kW | sold={:>7.2}  bought={:>7.2} | \
             bat={:.1}% | reward={:>8.3}",
            self.time_step,
            self.settled_time,
            self.sale_price,
            self.total_load,
            self.generation,
            self.tcl_consumption,
            self.dispatch_command,
            self.energy_sold,
            self.energy_bought,
            self.battery_fraction * 100.0,
            self.reward.total(),
        )
    }
}
