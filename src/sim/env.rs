//! Episodic environment interface.

use crate::error::SimError;

/// Result of one environment step.
#[derive(Debug, Clone)]
pub struct Transition<O, I> {
    pub observation: O,
    pub reward: f64,
    /// True on the last step of the episode.
    pub terminal: bool,
    pub info: I,
}

/// Reset/step contract for episodic control environments.
///
/// Implementations are single-threaded and mutate in place; two instances
/// never share state.
pub trait Environment {
    type Action;
    type Observation;
    type Info;

    /// Starts a new episode and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Observation, SimError>;

    /// Applies `action` and advances one step.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidState`] unless an episode is running.
    fn step(
        &mut self,
        action: &Self::Action,
    ) -> Result<Transition<Self::Observation, Self::Info>, SimError>;

    /// Reseeds the random source. A `reset` is required before stepping.
    fn seed(&mut self, seed: u64) -> Result<(), SimError>;

    /// Length of every observation this environment produces.
    fn observation_len(&self) -> usize;
}
