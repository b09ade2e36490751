//! Integration tests for the microgrid environment lifecycle and step algorithm.

mod common;

use common::approx_eq;
use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::error::SimError;
use microgrid_sim::sim::engine::MicrogridEnv;
use microgrid_sim::sim::env::Environment;
use microgrid_sim::sim::types::{Action, EpisodeState};

#[test]
fn episode_terminates_after_iterations_minus_one_steps() {
    let mut env = common::env_with(common::compact_config());
    env.reset().expect("reset");
    let action = Action::new(0.5, 2, true, true);

    let mut flags = Vec::new();
    for _ in 0..23 {
        flags.push(env.step(&action).expect("step").terminal);
    }
    assert!(flags[..22].iter().all(|&t| !t));
    assert!(flags[22]);
    assert_eq!(env.state(), EpisodeState::Terminal);
}

#[test]
fn step_outside_running_episode_is_rejected() {
    let mut env = common::env_with(common::compact_config());
    let action = Action::new(0.5, 2, false, false);
    assert!(matches!(env.step(&action), Err(SimError::InvalidState(_))));

    env.reset().expect("reset");
    while !env.step(&action).expect("step").terminal {}
    assert!(matches!(env.step(&action), Err(SimError::InvalidState(_))));

    env.reset().expect("reset after terminal");
    assert_eq!(env.time_step(), 0);
    assert!(env.step(&action).is_ok());
}

#[test]
fn seeded_tier_two_step_values_load_at_middle_price() {
    let mut env = common::env_with(ScenarioConfig::baseline());
    env.reset().expect("reset");
    let transition = env
        .step(&Action::new(0.5, 2, false, true))
        .expect("step");
    let info = &transition.info;

    // Tier 2 sheds nothing, so every household draws its hour-0 baseline.
    let expected_load = 150.0 * 2.0;
    assert!(approx_eq(info.total_load, expected_load));
    assert_eq!(info.sale_price, 7.8);
    assert!(approx_eq(info.reward.load_revenue, expected_load * 7.8 / 100.0));

    for (load, params) in env.loads().iter().zip(env.load_parameters()) {
        assert_eq!(load.price_sensitivity, params.price_sensitivity);
    }
}

#[test]
fn equal_seeds_give_identical_trajectories() {
    let run = || {
        let mut env = common::env_with(common::compact_config());
        let mut obs = vec![env.reset().expect("reset")];
        let mut rewards = Vec::new();
        for k in 0..23 {
            let action = Action::new((k as f64) / 23.0, k % 5, k % 2 == 0, k % 3 == 0);
            let tr = env.step(&action).expect("step");
            rewards.push(tr.reward);
            obs.push(tr.observation);
        }
        (obs, rewards, env.day_offset())
    };
    assert_eq!(run(), run());
}

#[test]
fn reseeding_matches_fresh_construction() {
    let mut seeded = ScenarioConfig::compact();
    seeded.simulation.seed = 5;
    let mut fresh = common::env_with(seeded);

    let mut reseeded = common::env_with(common::compact_config());
    reseeded.reset().expect("reset");
    reseeded.seed(5).expect("seed");
    assert_eq!(reseeded.state(), EpisodeState::Uninitialized);

    assert_eq!(fresh.tcl_parameters(), reseeded.tcl_parameters());
    assert_eq!(fresh.load_parameters(), reseeded.load_parameters());
    assert_eq!(fresh.reset().ok(), reseeded.reset().ok());
    assert_eq!(fresh.day_offset(), reseeded.day_offset());
}

#[test]
fn observation_has_fleet_plus_six_features() {
    let mut env = common::env_with(ScenarioConfig::baseline());
    let obs = env.reset().expect("reset");
    assert_eq!(obs.len(), 106);
    assert_eq!(obs.len(), env.observation_len());
    assert_eq!(obs.battery_fraction(), 0.0);
    assert_eq!(obs.progress(), 0.0);

    for (level, tcl) in obs.tcl_levels().iter().zip(env.tcls()) {
        assert!(approx_eq(*level, (tcl.charge_level() + 4.0) / 5.0));
    }
    assert!((0.0..=1.0).contains(&obs.temperature()));
    assert!((0.0..=1.0).contains(&obs.price()));
    assert!((0.0..=1.0).contains(&obs.generation()));
}

#[test]
fn flat_series_normalise_to_zero() {
    let mut env = common::flat_env(common::compact_config(), 1000.0, 10.0);
    env.reset().expect("reset");
    let tr = env.step(&Action::new(0.0, 2, false, false)).expect("step");
    let obs = &tr.observation;
    assert_eq!(obs.temperature(), 0.0);
    assert_eq!(obs.price(), 0.0);
    assert_eq!(obs.generation(), 1.0);
    assert!(approx_eq(obs.progress(), 1.0 / 24.0));
}

#[test]
fn deficit_is_bought_with_convex_surcharge() {
    let mut env = common::flat_env(common::compact_config(), 0.0, 10.0);
    env.reset().expect("reset");
    let tr = env.step(&Action::new(0.0, 2, false, false)).expect("step");
    let info = &tr.info;

    let deficit = info.total_load + info.tcl_consumption;
    assert_eq!(info.energy_sold, 0.0);
    assert!(approx_eq(info.energy_bought, deficit));
    let expected = (-5.0 * deficit - 0.025 * deficit * deficit) / 100.0;
    assert!(approx_eq(info.reward.market, expected));
    assert_eq!(env.battery().stored_energy(), 0.0);
}

#[test]
fn surplus_fills_battery_then_sells_and_dissipates() {
    let mut env = common::flat_env(common::compact_config(), 1000.0, 10.0);
    env.reset().expect("reset");
    let tr = env.step(&Action::new(0.0, 2, false, true)).expect("step");
    let info = &tr.info;

    let surplus = 1000.0 - info.total_load - info.tcl_consumption;
    assert!(approx_eq(info.energy_sold, 0.9 * surplus - 400.0));
    assert!(approx_eq(info.reward.market, 3.0 * info.energy_sold / 100.0));
    assert!(approx_eq(
        env.battery().stored_energy(),
        400.0 * (-0.001_f64).exp()
    ));
    assert!(approx_eq(tr.observation.battery_fraction(), (-0.001_f64).exp()));
}

#[test]
fn sustained_high_tiers_are_penalised() {
    let mut env = common::flat_env(common::compact_config(), 1000.0, 10.0);
    env.reset().expect("reset");
    let action = Action::new(0.0, 4, false, false);

    for _ in 0..12 {
        let tr = env.step(&action).expect("step");
        assert_eq!(tr.info.reward.high_price_penalty, 0.0);
    }
    // Signal 52 against a threshold of 48.
    let tr = env.step(&action).expect("step");
    let r = tr.info.reward;
    let partial = r.load_revenue + r.tcl_revenue + r.market;
    assert!(r.high_price_penalty > 0.0);
    assert!(approx_eq(r.high_price_penalty, (partial * 2.0 * 4.0).abs()));
    assert!(approx_eq(tr.reward, partial - r.high_price_penalty));
    assert_eq!(env.high_price_signal(), 52);
}

#[test]
fn terminal_step_adds_storage_bonus() {
    let mut env = common::flat_env(common::compact_config(), 1000.0, 10.0);
    env.reset().expect("reset");
    let action = Action::new(0.0, 2, false, true);

    loop {
        let tr = env.step(&action).expect("step");
        let r = tr.info.reward;
        if !tr.terminal {
            assert_eq!(r.terminal_bonus, 0.0);
            continue;
        }
        let before_bonus = r.total() - r.terminal_bonus;
        let expected = (before_bonus * tr.info.battery_fraction / 4.0).abs();
        assert!(r.terminal_bonus > 0.0);
        assert!(approx_eq(r.terminal_bonus, expected));
        break;
    }
}

#[test]
fn forecast_looks_ahead_from_current_hour() {
    let config = common::compact_config();
    let bundle = common::synthetic_bundle(&config);
    let mut env = common::env_with(config);
    env.reset().expect("reset");
    let tr = env.step(&Action::new(0.3, 1, true, false)).expect("step");

    let next = env.absolute_time() + 1;
    let forecast = &tr.info.forecast;
    assert_eq!(forecast.temperature.len(), 24);
    assert_eq!(forecast.temperature[0], bundle.temperatures[next]);
    assert_eq!(forecast.price[0], bundle.prices[next]);
    assert_eq!(forecast.times, (0..24).collect::<Vec<_>>());
}

#[test]
fn invalid_actions_leave_episode_untouched() {
    let mut env = common::env_with(common::compact_config());
    env.reset().expect("reset");

    let bad_tier = Action::new(0.5, 5, false, false);
    assert!(matches!(env.step(&bad_tier), Err(SimError::InvalidArgument(_))));
    let bad_dispatch = Action::new(1.5, 2, false, false);
    assert!(matches!(env.step(&bad_dispatch), Err(SimError::InvalidArgument(_))));

    assert_eq!(env.time_step(), 0);
    assert_eq!(env.high_price_signal(), 0);
    assert_eq!(env.state(), EpisodeState::Running);
}

#[test]
fn raw_action_vector_drives_a_step() {
    let mut env = common::env_with(common::compact_config());
    env.reset().expect("reset");
    let mut raw = vec![0.0; env.action_len()];
    raw[0] = 0.4;
    raw[1] = 3.0;
    raw[3] = 1.0;
    let action = Action::from_raw(&raw).expect("valid raw action");
    let tr = env.step(&action).expect("step");
    assert_eq!(tr.info.sale_price, 9.3);
    assert!(approx_eq(tr.info.dispatch_command, 20.0));
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let mut config = common::compact_config();
    config.simulation.iterations = 1;
    let data = common::synthetic_bundle(&config);
    assert!(matches!(
        MicrogridEnv::new(config, data),
        Err(SimError::Config(_))
    ));
}

#[test]
fn nan_battery_capacity_is_a_config_error() {
    let config = ScenarioConfig::from_toml_str("[battery]\ncapacity = nan\n")
        .expect("toml accepts nan floats");
    let data = common::synthetic_bundle(&config);
    assert!(matches!(
        MicrogridEnv::new(config, data),
        Err(SimError::Config(_))
    ));
}

#[test]
fn nan_dissipation_rate_is_a_config_error() {
    let mut config = common::compact_config();
    config.battery.dissipation_rate = f64::NAN;
    let data = common::synthetic_bundle(&config);
    assert!(matches!(
        MicrogridEnv::new(config, data),
        Err(SimError::Config(_))
    ));
}

#[test]
fn short_series_is_rejected_at_construction() {
    let config = common::compact_config();
    let data = common::flat_bundle(20, 100.0, 5.0);
    assert!(matches!(
        MicrogridEnv::new(config, data),
        Err(SimError::IndexOutOfRange { .. })
    ));
}
