use std::sync::Arc;

use crate::devices::types::LoadParameters;

/// Sensitivity at or below which price pressure stops eroding it further.
const SENSITIVITY_FLOOR: f64 = 0.1;

/// Sensitivity lost each time a household sheds load under a high tier.
const SENSITIVITY_DECAY: f64 = 0.1;

/// Price tier at which households neither shed nor add load.
const NEUTRAL_TIER: f64 = 2.0;

/// A price-responsive household load.
///
/// Demand follows a shared daily baseline profile, reduced by a shed term
/// proportional to how far the offered price tier sits above the neutral
/// tier. Every time the household sheds, its sensitivity erodes, so repeated
/// high prices get a weaker response.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use microgrid_sim::devices::HouseholdLoad;
/// use microgrid_sim::devices::types::LoadParameters;
///
/// let profile: Arc<[f64]> = Arc::from(vec![2.0; 24]);
/// let params = LoadParameters { price_sensitivity: 0.5, max_sheddable_load: 3.0 };
/// let mut load = HouseholdLoad::new(params, profile);
///
/// load.react(4);
/// // 2.0 - 3.0 * 0.5 * (4 - 2) is negative, so demand floors at zero.
/// assert_eq!(load.load(0), 0.0);
/// assert!((load.price_sensitivity - 0.4).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct HouseholdLoad {
    /// Current response per tier above neutral. Never increases.
    pub price_sensitivity: f64,

    /// Hourly baseline demand shared by the population (kW).
    pub baseline_profile: Arc<[f64]>,

    /// Largest load shed at unit response (kW).
    pub max_sheddable_load: f64,

    /// Response to the last price tier. Negative values increase demand.
    pub shed_response: f64,
}

impl HouseholdLoad {
    /// Creates a household with no pending response.
    pub fn new(params: LoadParameters, baseline_profile: Arc<[f64]>) -> Self {
        Self {
            price_sensitivity: params.price_sensitivity,
            baseline_profile,
            max_sheddable_load: params.max_sheddable_load,
            shed_response: 0.0,
        }
    }

    /// Updates the shed response for the offered price tier.
    ///
    /// Tiers at or below the neutral tier never erode sensitivity.
    pub fn react(&mut self, price_tier: usize) {
        self.shed_response = self.price_sensitivity * (price_tier as f64 - NEUTRAL_TIER);
        if self.shed_response > 0.0 && self.price_sensitivity > SENSITIVITY_FLOOR {
            self.price_sensitivity -= SENSITIVITY_DECAY;
        }
    }

    /// Delivered demand at `hour_of_day` (kW), never negative.
    ///
    /// The hour wraps around the baseline profile length.
    pub fn load(&self, hour_of_day: usize) -> f64 {
        let baseline = self.baseline_profile[hour_of_day % self.baseline_profile.len()];
        (baseline - self.max_sheddable_load * self.shed_response).max(0.0)
    }
}
