//! Action policies used to drive the environment from the CLI and tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::{Action, Observation};

/// Chooses an action from the latest observation.
pub trait Policy {
    fn act(&mut self, observation: &Observation) -> Action;
}

/// Uniformly random actions over the whole action space.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
    num_tiers: usize,
}

impl RandomPolicy {
    /// Creates a policy over a ladder of `num_tiers` prices.
    pub fn new(seed: u64, num_tiers: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            num_tiers,
        }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observation: &Observation) -> Action {
        Action {
            tcl_dispatch: self.rng.random::<f64>(),
            price_tier: self.rng.random_range(0..self.num_tiers),
            deficiency: self.rng.random_bool(0.5),
            excess: self.rng.random_bool(0.5),
        }
    }
}

/// Replays the same action every step.
#[derive(Debug, Clone, Copy)]
pub struct FixedPolicy(pub Action);

impl FixedPolicy {
    /// No TCL dispatch, neutral price, battery used both ways.
    pub fn idle() -> Self {
        Self(Action::new(0.0, 2, true, true))
    }
}

impl Policy for FixedPolicy {
    fn act(&mut self, _observation: &Observation) -> Action {
        self.0
    }
}
