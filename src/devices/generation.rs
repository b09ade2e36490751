use crate::error::{SimError, series_at};

/// Renewable generation replayed from a recorded wind-power series.
///
/// The series is indexed by absolute simulation hour. Its maximum is kept as
/// the normalisation divisor for observations.
#[derive(Debug, Clone)]
pub struct WindGeneration {
    power: Vec<f64>,
    max_capacity: f64,
}

impl WindGeneration {
    /// Wraps a recorded power series (kW).
    pub fn new(power: Vec<f64>) -> Self {
        let max_capacity = power.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            power,
            max_capacity,
        }
    }

    /// Power generated at absolute hour `time` (kW).
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IndexOutOfRange`] if `time` is past the series.
    pub fn current_generation(&self, time: usize) -> Result<f64, SimError> {
        series_at("wind_power", &self.power, time)
    }

    /// Largest value in the series (kW).
    pub fn max_capacity(&self) -> f64 {
        self.max_capacity
    }

    /// Number of recorded hours.
    pub fn len(&self) -> usize {
        self.power.len()
    }

    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }
}
