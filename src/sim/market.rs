//! Two-sided energy market connecting the microgrid to the main grid.

use crate::config::MarketConfig;
use crate::error::{SimError, series_at};

/// Real-time market settled against regulation prices.
///
/// Surplus energy is sold at the up-regulation price; deficits are bought at
/// the down-regulation price plus a convex surcharge on the quantity bought.
/// Both price series are indexed by absolute simulation hour through a time
/// cursor that must be positioned with [`Grid::set_time`] before trading.
#[derive(Debug, Clone)]
pub struct Grid {
    buy_prices: Vec<f64>,
    sell_prices: Vec<f64>,
    quadratic_price: f64,
    fixed_cost: f64,
    time: usize,
}

impl Grid {
    /// Creates a market over the given price series.
    pub fn new(buy_prices: Vec<f64>, sell_prices: Vec<f64>, cfg: &MarketConfig) -> Self {
        Self {
            buy_prices,
            sell_prices,
            quadratic_price: cfg.quadratic_price,
            fixed_cost: cfg.fixed_cost,
            time: 0,
        }
    }

    /// Positions the trading cursor at absolute hour `time`.
    pub fn set_time(&mut self, time: usize) {
        self.time = time;
    }

    /// Revenue from selling `energy` at the current hour.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IndexOutOfRange`] if the cursor is past the series.
    pub fn sell(&self, energy: f64) -> Result<f64, SimError> {
        Ok(series_at("sell_price", &self.sell_prices, self.time)? * energy)
    }

    /// Signed cash flow from buying `energy` at the current hour.
    ///
    /// The result is already negative (a cost): price times quantity, plus
    /// `quadratic_price * energy²`, plus the fixed cost.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IndexOutOfRange`] if the cursor is past the series.
    pub fn buy(&self, energy: f64) -> Result<f64, SimError> {
        let price = series_at("buy_price", &self.buy_prices, self.time)?;
        Ok(-price * energy - self.quadratic_price * energy * energy - self.fixed_cost)
    }

    /// Buy price at absolute hour `time`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IndexOutOfRange`] if `time` is past the series.
    pub fn buy_price_at(&self, time: usize) -> Result<f64, SimError> {
        series_at("buy_price", &self.buy_prices, time)
    }

    /// Smallest and largest buy price over the whole series.
    pub fn buy_price_bounds(&self) -> (f64, f64) {
        min_max(&self.buy_prices)
    }
}

/// Returns `(min, max)` of a series; `(inf, -inf)` when empty.
pub(crate) fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}
