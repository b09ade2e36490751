//! Property tests for the entity models.

use std::sync::Arc;

use proptest::prelude::*;

use microgrid_sim::config::{BASE_LOAD, BatteryConfig};
use microgrid_sim::devices::types::{LoadParameters, TclParameters};
use microgrid_sim::devices::{Battery, HouseholdLoad, Tcl};

#[derive(Debug, Clone)]
enum BatteryOp {
    Charge(f64),
    Supply(f64),
    Dissipate,
}

fn battery_op() -> impl Strategy<Value = BatteryOp> {
    prop_oneof![
        (0.0..1000.0f64).prop_map(BatteryOp::Charge),
        (0.0..1000.0f64).prop_map(BatteryOp::Supply),
        Just(BatteryOp::Dissipate),
    ]
}

fn tcl_params() -> impl Strategy<Value = TclParameters> {
    (0.002..0.006f64, 0.19..0.21f64, 1.4..1.6f64).prop_map(|(a, m, p)| TclParameters {
        air_thermal_coeff: a,
        mass_thermal_coeff: m,
        internal_heat_gain: 0.0,
        nominal_power: p,
    })
}

proptest! {
    #[test]
    fn storage_stays_within_capacity(ops in prop::collection::vec(battery_op(), 1..60)) {
        let mut battery = Battery::new(&BatteryConfig::default());
        for op in ops {
            match op {
                BatteryOp::Charge(e) => { prop_assert!(battery.charge(e).is_ok()); }
                BatteryOp::Supply(e) => { prop_assert!(battery.supply(e).is_ok()); }
                BatteryOp::Dissipate => battery.dissipate(),
            }
            prop_assert!(battery.stored_energy() >= 0.0);
            prop_assert!(battery.stored_energy() <= battery.capacity);
        }
    }

    #[test]
    fn charge_overflow_is_conserved(pre in 0.0..300.0f64, energy in 0.0..2000.0f64) {
        let mut battery = Battery::new(&BatteryConfig::default());
        prop_assert!(battery.charge(pre / 0.9).is_ok());
        let before = battery.stored_energy();

        let leftover = battery.charge(energy).unwrap_or(f64::NAN);
        let stored = 0.9 * energy;
        prop_assert!(leftover >= stored - (400.0 - before) - 1e-9);
        prop_assert_eq!(battery.stored_energy(), (before + stored).min(400.0));
    }

    #[test]
    fn supply_never_delivers_more_than_stored(pre in 0.0..400.0f64, energy in 0.0..600.0f64) {
        let mut battery = Battery::new(&BatteryConfig::default());
        prop_assert!(battery.charge(pre / 0.9).is_ok());
        let before = battery.stored_energy();
        let delivered = battery.supply(energy).unwrap_or(f64::NAN);
        prop_assert!(delivered <= energy);
        prop_assert!(delivered <= before);
    }

    #[test]
    fn backup_controller_overrides_requests(
        params in tcl_params(),
        temp in -10.0..40.0f64,
        requested in 0u8..=1,
    ) {
        let mut tcl = Tcl::new(params, 19.0, 25.0, temp);
        tcl.control(requested);
        if temp < 19.0 {
            prop_assert_eq!(tcl.control_signal, 1);
        }
        if temp > 25.0 {
            prop_assert_eq!(tcl.control_signal, 0);
        }
    }

    #[test]
    fn idle_tcl_cools_towards_colder_ambient(
        params in tcl_params(),
        indoor in 10.0..30.0f64,
        gap in 0.1..30.0f64,
    ) {
        let mut tcl = Tcl::new(params, 19.0, 25.0, indoor);
        tcl.update_state(indoor - gap);
        prop_assert!(tcl.indoor_temp <= indoor);
    }

    #[test]
    fn repeated_high_tiers_never_raise_sensitivity(
        sensitivity in -0.5..1.5f64,
        max_shed in 0.0..5.0f64,
        tiers in prop::collection::vec(3usize..5, 1..30),
        hour in 0usize..48,
    ) {
        let profile: Arc<[f64]> = Arc::from(BASE_LOAD.to_vec());
        let mut load = HouseholdLoad::new(
            LoadParameters { price_sensitivity: sensitivity, max_sheddable_load: max_shed },
            profile,
        );
        let mut last = load.price_sensitivity;
        for tier in tiers {
            load.react(tier);
            prop_assert!(load.price_sensitivity <= last);
            prop_assert!(load.load(hour) >= 0.0);
            last = load.price_sensitivity;
        }
    }
}
