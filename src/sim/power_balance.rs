//! Settlement of the microgrid's net energy position.

use crate::devices::Battery;
use crate::error::SimError;

use super::market::Grid;

/// Prices are quoted in cents; rewards are reported in currency units.
pub const CENTS_PER_UNIT: f64 = 100.0;

/// Outcome of settling one step's net energy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Settlement {
    /// Energy sold to the grid (kWh).
    pub energy_sold: f64,
    /// Energy bought from the grid (kWh).
    pub energy_bought: f64,
    /// Sale revenue or purchase cost, in currency units.
    pub market_value: f64,
}

/// Routes `available` energy through the battery and the market.
///
/// A positive position is a surplus: with `store_excess` the battery absorbs
/// what it can and only the leftover is sold. A zero or negative position is
/// a deficit: with `cover_deficiency` the battery supplies first and only the
/// remainder is bought. The grid cursor must already sit on the current hour.
///
/// # Errors
///
/// Propagates battery argument errors and market index errors.
pub fn settle(
    available: f64,
    store_excess: bool,
    cover_deficiency: bool,
    battery: &mut Battery,
    grid: &Grid,
) -> Result<Settlement, SimError> {
    if available > 0.0 {
        let energy_sold = if store_excess {
            battery.charge(available)?
        } else {
            available
        };
        Ok(Settlement {
            energy_sold,
            energy_bought: 0.0,
            market_value: grid.sell(energy_sold)? / CENTS_PER_UNIT,
        })
    } else {
        let mut deficit = -available;
        if cover_deficiency {
            deficit -= battery.supply(deficit)?;
        }
        Ok(Settlement {
            energy_sold: 0.0,
            energy_bought: deficit,
            market_value: grid.buy(deficit)? / CENTS_PER_UNIT,
        })
    }
}
