//! Microgrid environment that orchestrates the TCL fleet, households,
//! battery, generation and market.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::ScenarioConfig;
use crate::data::SeriesBundle;
use crate::devices::types::sample_normal;
use crate::devices::{Battery, HouseholdLoad, LoadParameters, Tcl, TclParameters, WindGeneration};
use crate::error::{SimError, series_at};
use crate::forecast::Forecast;

use super::clock::EpisodeClock;
use super::env::{Environment, Transition};
use super::market::{Grid, min_max};
use super::power_balance::{CENTS_PER_UNIT, settle};
use super::types::{
    Action, EpisodeState, OBSERVATION_TAIL, Observation, RewardBreakdown, StepInfo,
};

/// Tier at which households neither shed nor add load; the sale price
/// reported before the first step.
const NEUTRAL_TIER: usize = 2;

/// Shift and scale of the per-TCL observation feature, `(x + 4) / 5`.
const TCL_LEVEL_OFFSET: f64 = 4.0;
const TCL_LEVEL_SCALE: f64 = 5.0;

/// Highest tier index on the default ladder; the penalty threshold is half
/// of `HIGHEST_TIER * iterations`.
const HIGHEST_TIER: f64 = 4.0;

pub type MicrogridTransition = Transition<Observation, StepInfo>;

/// Microgrid operator environment.
///
/// Owns every entity exclusively. A single seeded [`StdRng`] draws the fleet
/// parameters, the per-episode day offset and the shared initial TCL
/// temperature, so equal seeds over equal data give identical trajectories.
pub struct MicrogridEnv {
    config: ScenarioConfig,
    rng: StdRng,

    base_load: Arc<[f64]>,
    base_load_bounds: (f64, f64),
    temperatures: Vec<f64>,
    temperature_bounds: (f64, f64),
    prices: Vec<f64>,
    buy_price_bounds: (f64, f64),

    generation: WindGeneration,
    grid: Grid,
    battery: Battery,

    tcl_parameters: Vec<TclParameters>,
    load_parameters: Vec<LoadParameters>,
    tcls: Vec<Tcl>,
    loads: Vec<HouseholdLoad>,

    clock: EpisodeClock,
    state: EpisodeState,
    high_price_signal: usize,
    sale_price: f64,
    dispatch_command: f64,
    energy_sold: f64,
    energy_bought: f64,
}

impl MicrogridEnv {
    /// Builds an environment over a loaded series bundle.
    ///
    /// The configuration is validated, every series is checked to cover
    /// `max_day_offset + iterations` hours, and the fleet parameters are
    /// drawn from `simulation.seed`. Call [`Environment::reset`] before
    /// stepping.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] for the first invalid field and
    /// [`SimError::IndexOutOfRange`] for a series that is too short.
    pub fn new(config: ScenarioConfig, data: SeriesBundle) -> Result<Self, SimError> {
        if let Some(err) = config.validate().into_iter().next() {
            return Err(err.into());
        }
        let sim = &config.simulation;
        data.ensure_covers(sim.max_day_offset + sim.iterations)?;

        let base_load: Arc<[f64]> = Arc::from(config.load.base_load.clone());
        let grid = Grid::new(data.buy_prices, data.sell_prices, &config.market);

        let mut env = Self {
            rng: StdRng::seed_from_u64(sim.seed),
            base_load_bounds: min_max(&base_load),
            base_load,
            temperature_bounds: min_max(&data.temperatures),
            temperatures: data.temperatures,
            prices: data.prices,
            buy_price_bounds: grid.buy_price_bounds(),
            generation: WindGeneration::new(data.wind_power),
            grid,
            battery: Battery::new(&config.battery),
            tcl_parameters: Vec::new(),
            load_parameters: Vec::new(),
            tcls: Vec::new(),
            loads: Vec::new(),
            clock: EpisodeClock::new(sim.iterations),
            state: EpisodeState::Uninitialized,
            high_price_signal: 0,
            sale_price: config.load.price_tiers[NEUTRAL_TIER],
            dispatch_command: 0.0,
            energy_sold: 0.0,
            energy_bought: 0.0,
            config,
        };
        env.draw_parameters()?;
        Ok(env)
    }

    /// Loads the series described by `config.data` and builds the environment.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Data`] if the series cannot be loaded, plus the
    /// errors of [`MicrogridEnv::new`].
    pub fn from_config(config: ScenarioConfig) -> Result<Self, SimError> {
        let data = SeriesBundle::load(&config.data, config.market.regulation_price_scale)?;
        Self::new(config, data)
    }

    /// Draws the fixed TCL and household parameter lists, TCLs first.
    fn draw_parameters(&mut self) -> Result<(), SimError> {
        let sim = &self.config.simulation;
        self.tcl_parameters = (0..sim.num_tcls)
            .map(|_| TclParameters::sample(&self.config.tcl, &mut self.rng))
            .collect::<Result<_, _>>()?;
        self.load_parameters = (0..sim.num_loads)
            .map(|_| LoadParameters::sample(&self.config.load, &mut self.rng))
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    /// Total household demand at the current step (kW).
    fn household_demand(&self) -> f64 {
        let hour = self.clock.time_step();
        self.loads.iter().map(|l| l.load(hour)).sum()
    }

    /// Hands the dispatch budget to the coldest TCLs first, then advances
    /// every TCL one step at `ambient`.
    fn dispatch_tcls(&mut self, budget: f64, ambient: f64) {
        let mut order: Vec<usize> = (0..self.tcls.len()).collect();
        order.sort_by(|&a, &b| {
            self.tcls[a]
                .charge_level()
                .total_cmp(&self.tcls[b].charge_level())
        });

        let mut remaining = budget;
        for i in order {
            let tcl = &mut self.tcls[i];
            if remaining > 0.0 {
                tcl.control(1);
                remaining -= tcl.power();
            } else {
                tcl.control(0);
            }
            tcl.update_state(ambient);
        }
    }

    fn build_observation(&self) -> Result<Observation, SimError> {
        let now = self.clock.absolute();
        let n = self.config.simulation.num_loads as f64;
        let (load_lo, load_hi) = self.base_load_bounds;

        let mut values = Vec::with_capacity(self.tcls.len() + OBSERVATION_TAIL);
        values.extend(
            self.tcls
                .iter()
                .map(|t| (t.charge_level() + TCL_LEVEL_OFFSET) / TCL_LEVEL_SCALE),
        );

        let demand = self.household_demand();
        values.push((demand - (load_lo + 2.0) * n) / ((load_hi + 4.0 - load_lo - 2.0) * n));
        values.push(self.battery.charge_fraction());

        let generation = self.generation.current_generation(now)?;
        let capacity = self.generation.max_capacity();
        values.push(if capacity > 0.0 { generation / capacity } else { 0.0 });

        let temperature = series_at("temperature", &self.temperatures, now)?;
        values.push(normalize(temperature, self.temperature_bounds));
        values.push(normalize(self.grid.buy_price_at(now)?, self.buy_price_bounds));
        values.push(self.clock.progress());

        Ok(Observation::new(values, self.tcls.len()))
    }

    fn forecast(&self) -> Forecast {
        Forecast::after(
            &self.temperatures,
            &self.prices,
            self.clock.absolute(),
            self.clock.iterations(),
        )
    }

    /// Applies the high-price penalty and terminal bonus to a reward.
    fn finish_reward(&self, reward: &mut RewardBreakdown, terminal: bool) {
        let threshold = HIGHEST_TIER * self.clock.iterations() as f64 / 2.0;
        let signal = self.high_price_signal as f64;
        if signal > threshold {
            let partial = reward.total();
            reward.high_price_penalty =
                (partial * self.config.market.high_price_penalty * (signal - threshold)).abs();
            warn!(
                high_price_signal = self.high_price_signal,
                penalty = reward.high_price_penalty,
                "sustained high price tiers penalised"
            );
        }
        if terminal {
            let partial = reward.total();
            reward.terminal_bonus = (partial * self.battery.charge_fraction() / 4.0).abs();
        }
    }

    /// Lifecycle state of the current episode.
    pub fn state(&self) -> EpisodeState {
        self.state
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Steps taken in the current episode.
    pub fn time_step(&self) -> usize {
        self.clock.time_step()
    }

    /// Day offset drawn at the last reset.
    pub fn day_offset(&self) -> usize {
        self.clock.day_offset()
    }

    /// Absolute hour into the exogenous series.
    pub fn absolute_time(&self) -> usize {
        self.clock.absolute()
    }

    pub fn tcls(&self) -> &[Tcl] {
        &self.tcls
    }

    pub fn loads(&self) -> &[HouseholdLoad] {
        &self.loads
    }

    pub fn tcl_parameters(&self) -> &[TclParameters] {
        &self.tcl_parameters
    }

    pub fn load_parameters(&self) -> &[LoadParameters] {
        &self.load_parameters
    }

    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn generation(&self) -> &WindGeneration {
        &self.generation
    }

    /// Sum of price tiers chosen so far this episode.
    pub fn high_price_signal(&self) -> usize {
        self.high_price_signal
    }

    /// Retail price charged on the last step (cents/kWh).
    pub fn sale_price(&self) -> f64 {
        self.sale_price
    }

    /// TCL dispatch budget granted on the last step (kW).
    pub fn dispatch_command(&self) -> f64 {
        self.dispatch_command
    }

    pub fn energy_sold(&self) -> f64 {
        self.energy_sold
    }

    pub fn energy_bought(&self) -> f64 {
        self.energy_bought
    }

    /// Power drawn by the TCL fleet at its current control signals (kW).
    pub fn tcl_consumption(&self) -> f64 {
        self.tcls.iter().map(Tcl::power).sum()
    }

    /// Per-household demand at the current step (kW).
    pub fn household_loads(&self) -> Vec<f64> {
        let hour = self.clock.time_step();
        self.loads.iter().map(|l| l.load(hour)).collect()
    }

    /// Number of fields a raw action vector must carry.
    pub fn action_len(&self) -> usize {
        Action::FIELDS
    }

    /// Number of retail price tiers an action can select.
    pub fn num_price_tiers(&self) -> usize {
        self.config.load.price_tiers.len()
    }
}

impl Environment for MicrogridEnv {
    type Action = Action;
    type Observation = Observation;
    type Info = StepInfo;

    /// Starts a new episode.
    ///
    /// Draws a day offset in `0..=max_day_offset` and one initial indoor
    /// temperature shared by every TCL, then rebuilds the fleet from the
    /// fixed parameter lists and empties the battery.
    fn reset(&mut self) -> Result<Observation, SimError> {
        let sim = &self.config.simulation;
        let day_offset = self.rng.random_range(0..=sim.max_day_offset);
        self.clock.restart(day_offset);

        let tcl_cfg = &self.config.tcl;
        let initial_temp = sample_normal(
            &mut self.rng,
            tcl_cfg.initial_temp_mean,
            tcl_cfg.initial_temp_std,
        )?;
        self.tcls = self
            .tcl_parameters
            .iter()
            .map(|&p| Tcl::new(p, tcl_cfg.temp_min, tcl_cfg.temp_max, initial_temp))
            .collect();
        self.loads = self
            .load_parameters
            .iter()
            .map(|&p| HouseholdLoad::new(p, Arc::clone(&self.base_load)))
            .collect();

        self.battery = Battery::new(&self.config.battery);
        self.high_price_signal = 0;
        self.sale_price = self.config.load.price_tiers[NEUTRAL_TIER];
        self.dispatch_command = 0.0;
        self.energy_sold = 0.0;
        self.energy_bought = 0.0;
        self.state = EpisodeState::Running;

        info!(day_offset, initial_temp, "episode reset");
        self.build_observation()
    }

    fn step(&mut self, action: &Action) -> Result<MicrogridTransition, SimError> {
        match self.state {
            EpisodeState::Running => {}
            EpisodeState::Uninitialized => {
                return Err(SimError::InvalidState("step called before reset".into()));
            }
            EpisodeState::Terminal => {
                return Err(SimError::InvalidState(
                    "step called after the episode ended".into(),
                ));
            }
        }
        action.validate(self.num_price_tiers())?;

        let now = self.clock.absolute();
        let generation = self.generation.current_generation(now)?;
        let ambient = series_at("temperature", &self.temperatures, now)?;
        self.grid.set_time(now);

        for load in &mut self.loads {
            load.react(action.price_tier);
        }
        let total_load = self.household_demand();
        let mut available = generation - total_load;

        self.sale_price = self.config.load.price_tiers[action.price_tier];
        self.high_price_signal += action.price_tier;
        let mut reward = RewardBreakdown {
            load_revenue: total_load * self.sale_price / CENTS_PER_UNIT,
            ..RewardBreakdown::default()
        };

        self.dispatch_command = action.tcl_dispatch * self.config.simulation.dispatch_scale;
        self.dispatch_tcls(self.dispatch_command, ambient);
        let tcl_consumption = self.tcl_consumption();
        available -= tcl_consumption;
        reward.tcl_revenue = tcl_consumption * self.sale_price / CENTS_PER_UNIT;

        let settlement = settle(
            available,
            action.excess,
            action.deficiency,
            &mut self.battery,
            &self.grid,
        )?;
        self.energy_sold = settlement.energy_sold;
        self.energy_bought = settlement.energy_bought;
        reward.market = settlement.market_value;

        self.battery.dissipate();
        self.clock.advance();

        let observation = self.build_observation()?;
        let terminal = self.clock.is_terminal();
        self.finish_reward(&mut reward, terminal);
        if terminal {
            self.state = EpisodeState::Terminal;
        }

        let info = StepInfo {
            time_step: self.clock.time_step(),
            settled_time: now,
            sale_price: self.sale_price,
            total_load,
            generation,
            dispatch_command: self.dispatch_command,
            tcl_consumption,
            energy_sold: self.energy_sold,
            energy_bought: self.energy_bought,
            battery_fraction: self.battery.charge_fraction(),
            reward,
            forecast: self.forecast(),
        };
        debug!(
            time_step = info.time_step,
            total_load,
            generation,
            tcl_consumption,
            energy_sold = info.energy_sold,
            energy_bought = info.energy_bought,
            reward = reward.total(),
            "step settled"
        );

        Ok(Transition {
            observation,
            reward: reward.total(),
            terminal,
            info,
        })
    }

    /// Reseeds the generator and re-draws the fixed parameter lists.
    fn seed(&mut self, seed: u64) -> Result<(), SimError> {
        self.rng = StdRng::seed_from_u64(seed);
        self.draw_parameters()?;
        self.state = EpisodeState::Uninitialized;
        Ok(())
    }

    fn observation_len(&self) -> usize {
        self.config.simulation.num_tcls + OBSERVATION_TAIL
    }
}

/// Min-max normalisation; a flat range maps to 0.
fn normalize(value: f64, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo { (value - lo) / (hi - lo) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> MicrogridEnv {
        let config = ScenarioConfig::compact();
        let data = SeriesBundle::synthetic(config.data.synthetic_len);
        MicrogridEnv::new(config, data).expect("compact scenario is valid")
    }

    #[test]
    fn parameters_drawn_at_construction() {
        let env = env();
        assert_eq!(env.tcl_parameters().len(), 10);
        assert_eq!(env.load_parameters().len(), 20);
        assert_eq!(env.state(), EpisodeState::Uninitialized);
    }

    #[test]
    fn reset_builds_fleet_with_shared_temperature() {
        let mut env = env();
        let obs = env.reset().expect("reset");
        assert_eq!(obs.len(), env.observation_len());
        let first = env.tcls()[0].indoor_temp;
        assert!(env.tcls().iter().all(|t| t.indoor_temp == first));
        assert!(env.day_offset() <= env.config().simulation.max_day_offset);
        assert_eq!(env.battery().stored_energy(), 0.0);
    }

    #[test]
    fn dispatch_favours_coldest_tcls() {
        let mut env = env();
        env.reset().expect("reset");
        for (i, tcl) in env.tcls.iter_mut().enumerate() {
            tcl.indoor_temp = 20.0 + 0.4 * i as f64;
            tcl.nominal_power = 1.5;
        }
        // Budget for exactly two units.
        env.dispatch_tcls(3.0, 10.0);
        let on: Vec<u8> = env.tcls().iter().map(|t| t.control_signal).collect();
        assert_eq!(&on[..3], &[1, 1, 0]);
        assert!(on[3..].iter().all(|&u| u == 0));
    }

    #[test]
    fn zero_budget_dispatches_nothing_inside_band() {
        let mut env = env();
        env.reset().expect("reset");
        for tcl in &mut env.tcls {
            tcl.indoor_temp = 22.0;
        }
        env.dispatch_tcls(0.0, 10.0);
        assert_eq!(env.tcl_consumption(), 0.0);
    }

    #[test]
    fn normalize_handles_flat_range() {
        assert_eq!(normalize(3.0, (3.0, 3.0)), 0.0);
        assert_eq!(normalize(5.0, (0.0, 10.0)), 0.5);
    }

    #[test]
    fn seed_requires_reset() {
        let mut env = env();
        env.reset().expect("reset");
        env.seed(3).expect("seed");
        assert_eq!(env.state(), EpisodeState::Uninitialized);
        let action = Action::new(0.0, 2, false, false);
        assert!(matches!(env.step(&action), Err(SimError::InvalidState(_))));
    }
}
