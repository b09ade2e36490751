//! Forecast payload handed to the controller alongside each observation.

use serde::Serialize;

/// Number of future hours included in each forecast.
pub const FORECAST_HORIZON: usize = 24;

/// Look-ahead slices of the exogenous series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Forecast {
    /// Ambient temperature for the coming hours (°C).
    pub temperature: Vec<f64>,
    /// Retail price for the coming hours (cents/kWh).
    pub price: Vec<f64>,
    /// Step indices of the episode, `0..iterations`.
    pub times: Vec<usize>,
}

impl Forecast {
    /// Builds the forecast following absolute hour `now`.
    ///
    /// Both slices start at `now + 1` and hold up to [`FORECAST_HORIZON`]
    /// values; they are truncated where the series ends.
    pub fn after(temperatures: &[f64], prices: &[f64], now: usize, iterations: usize) -> Self {
        Self {
            temperature: window(temperatures, now + 1, FORECAST_HORIZON),
            price: window(prices, now + 1, FORECAST_HORIZON),
            times: (0..iterations).collect(),
        }
    }
}

/// Copies up to `horizon` values starting at `start`, truncated at the end.
fn window(series: &[f64], start: usize, horizon: usize) -> Vec<f64> {
    if start >= series.len() {
        return Vec::new();
    }
    let end = (start + horizon).min(series.len());
    series[start..end].to_vec()
}
