//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::data::SeriesBundle;
use microgrid_sim::sim::engine::MicrogridEnv;

/// Small fleet (10 TCLs, 20 households, 24 steps, seed 7).
pub fn compact_config() -> ScenarioConfig {
    ScenarioConfig::compact()
}

/// Synthetic series long enough for any default day offset.
pub fn synthetic_bundle(config: &ScenarioConfig) -> SeriesBundle {
    SeriesBundle::synthetic(config.data.synthetic_len)
}

/// Constant series of `len` hours.
///
/// Flat temperature and buy price normalise to zero, which makes
/// observation features and market terms easy to recompute by hand.
pub fn flat_bundle(len: usize, wind_kw: f64, temperature: f64) -> SeriesBundle {
    SeriesBundle {
        prices: vec![6.0; len],
        temperatures: vec![temperature; len],
        buy_prices: vec![5.0; len],
        sell_prices: vec![3.0; len],
        wind_power: vec![wind_kw; len],
    }
}

/// Environment over synthetic series.
pub fn env_with(config: ScenarioConfig) -> MicrogridEnv {
    let data = synthetic_bundle(&config);
    MicrogridEnv::new(config, data).expect("scenario should be valid")
}

/// Environment over a flat bundle covering the default day-offset window.
pub fn flat_env(config: ScenarioConfig, wind_kw: f64, temperature: f64) -> MicrogridEnv {
    let len = config.simulation.max_day_offset + config.simulation.iterations + 24;
    MicrogridEnv::new(config, flat_bundle(len, wind_kw, temperature))
        .expect("scenario should be valid")
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * (1.0 + a.abs().max(b.abs()))
}
