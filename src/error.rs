//! Error types shared by the simulation core.

use thiserror::Error;

use crate::config::ConfigError;

/// Failure raised by an entity model or the environment.
///
/// The simulation is deterministic, so none of these are retried: any error
/// aborts the current step and is handed back to the caller.
#[derive(Debug, Error)]
pub enum SimError {
    /// A time cursor ran past the end of a loaded series.
    #[error("index {index} out of range for {series} series of length {len}")]
    IndexOutOfRange {
        series: &'static str,
        index: usize,
        len: usize,
    },

    /// A caller supplied a value outside the accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The environment was driven in the wrong lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// An exogenous series could not be loaded.
    #[error("data error: {0}")]
    Data(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Reads `series[index]`, mapping an overrun to [`SimError::IndexOutOfRange`].
pub(crate) fn series_at(series: &'static str, values: &[f64], index: usize) -> Result<f64, SimError> {
    values
        .get(index)
        .copied()
        .ok_or(SimError::IndexOutOfRange {
            series,
            index,
            len: values.len(),
        })
}
