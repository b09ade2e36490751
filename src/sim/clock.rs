/// Episode clock tracking the step index within a day-offset window.
///
/// The absolute hour used to index exogenous series is
/// `day_offset + time_step`. An episode of `iterations` steps becomes
/// terminal once `time_step` reaches `iterations - 1`.
///
/// # Examples
///
/// ```
/// use microgrid_sim::sim::clock::EpisodeClock;
///
/// let mut clock = EpisodeClock::new(3);
/// clock.restart(5);
/// assert_eq!(clock.absolute(), 5);
/// clock.advance();
/// assert!(!clock.is_terminal());
/// clock.advance();
/// assert!(clock.is_terminal());
/// assert_eq!(clock.absolute(), 7);
/// ```
#[derive(Debug, Clone)]
pub struct EpisodeClock {
    day_offset: usize,
    time_step: usize,
    iterations: usize,
}

impl EpisodeClock {
    /// Creates a clock for episodes of `iterations` steps.
    pub fn new(iterations: usize) -> Self {
        Self {
            day_offset: 0,
            time_step: 0,
            iterations,
        }
    }

    /// Rewinds to step 0 at a new day offset.
    pub fn restart(&mut self, day_offset: usize) {
        self.day_offset = day_offset;
        self.time_step = 0;
    }

    /// Advances one step and returns the new step index.
    pub fn advance(&mut self) -> usize {
        self.time_step += 1;
        self.time_step
    }

    pub fn time_step(&self) -> usize {
        self.time_step
    }

    pub fn day_offset(&self) -> usize {
        self.day_offset
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Absolute hour into the exogenous series.
    pub fn absolute(&self) -> usize {
        self.day_offset + self.time_step
    }

    /// Whether the last step of the episode has been taken.
    pub fn is_terminal(&self) -> bool {
        self.time_step + 1 == self.iterations
    }

    /// Episode progress, `time_step / iterations`.
    pub fn progress(&self) -> f64 {
        self.time_step as f64 / self.iterations as f64
    }
}
