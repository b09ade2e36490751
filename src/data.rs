//! Exogenous time series: retail prices, temperatures, regulation prices and
//! wind generation, indexed by absolute simulation hour.

use std::f64::consts::PI;
use std::path::Path;

use tracing::info;

use crate::config::DataConfig;
use crate::error::SimError;

/// File holding retail price (column 0) and ambient temperature (column 1).
pub const PRICE_AND_TEMPERATURE_FILE: &str = "price_and_temperature.csv";
/// Down-regulation prices, used as the market buy price.
pub const DOWN_REGULATION_FILE: &str = "down_regulation.csv";
/// Up-regulation prices, used as the market sell price.
pub const UP_REGULATION_FILE: &str = "up_regulation.csv";
/// Wind farm output.
pub const WIND_GENERATION_FILE: &str = "wind_generation.csv";

/// All series the environment reads during an episode.
#[derive(Debug, Clone)]
pub struct SeriesBundle {
    /// Retail price forecast series (cents/kWh).
    pub prices: Vec<f64>,
    /// Ambient temperature (°C).
    pub temperatures: Vec<f64>,
    /// Market buy prices (cents/kWh).
    pub buy_prices: Vec<f64>,
    /// Market sell prices (cents/kWh).
    pub sell_prices: Vec<f64>,
    /// Renewable generation (kW).
    pub wind_power: Vec<f64>,
}

impl SeriesBundle {
    /// Loads the bundle described by `cfg`.
    ///
    /// Reads the CSV files under `cfg.dir` when set, otherwise builds the
    /// synthetic bundle of `cfg.synthetic_len` hours. Regulation prices read
    /// from CSV are multiplied by `regulation_price_scale`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Data`] if a file is missing or malformed.
    pub fn load(cfg: &DataConfig, regulation_price_scale: f64) -> Result<Self, SimError> {
        match &cfg.dir {
            Some(dir) => Self::from_dir(dir, regulation_price_scale),
            None => Ok(Self::synthetic(cfg.synthetic_len)),
        }
    }

    /// Reads the four CSV files from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Data`] if a file is missing or malformed.
    pub fn from_dir(dir: &Path, regulation_price_scale: f64) -> Result<Self, SimError> {
        let columns = read_columns(&dir.join(PRICE_AND_TEMPERATURE_FILE), 2)?;
        let (prices, temperatures): (Vec<f64>, Vec<f64>) = columns
            .into_iter()
            .map(|row| (row[0], row[1]))
            .unzip();

        let scale = |v: Vec<f64>| -> Vec<f64> {
            v.into_iter().map(|p| p * regulation_price_scale).collect()
        };
        let buy_prices = scale(read_last_column(&dir.join(DOWN_REGULATION_FILE))?);
        let sell_prices = scale(read_last_column(&dir.join(UP_REGULATION_FILE))?);
        let wind_power = read_last_column(&dir.join(WIND_GENERATION_FILE))?;

        let bundle = Self {
            prices,
            temperatures,
            buy_prices,
            sell_prices,
            wind_power,
        };
        info!(
            dir = %dir.display(),
            hours = bundle.shortest_len(),
            "loaded series bundle"
        );
        Ok(bundle)
    }

    /// Deterministic daily-cycle series of `len` hours.
    ///
    /// Used when no recorded data is configured; shapes follow typical
    /// winter-day patterns so that generation both exceeds and falls short of
    /// household demand over a day.
    pub fn synthetic(len: usize) -> Self {
        let hours = || (0..len).map(|h| h as f64);
        let daily = |h: f64, peak_hour: f64| (2.0 * PI * (h - peak_hour) / 24.0 + PI / 2.0).sin();

        Self {
            prices: hours().map(|h| 6.0 + 2.5 * daily(h, 18.0)).collect(),
            temperatures: hours()
                .map(|h| 4.0 + 5.0 * daily(h, 15.0) + 2.0 * (2.0 * PI * h / 168.0).sin())
                .collect(),
            buy_prices: hours().map(|h| 4.5 + 2.0 * daily(h, 19.0)).collect(),
            sell_prices: hours().map(|h| 3.0 + 1.5 * daily(h, 19.0)).collect(),
            wind_power: hours()
                .map(|h| {
                    (450.0 + 300.0 * (2.0 * PI * h / 37.0).sin() + 120.0 * (2.0 * PI * h / 11.0).cos())
                        .max(0.0)
                })
                .collect(),
        }
    }

    /// Checks every series covers at least `required` hours.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IndexOutOfRange`] naming the first short series.
    pub fn ensure_covers(&self, required: usize) -> Result<(), SimError> {
        for (series, values) in self.named() {
            if values.len() < required {
                return Err(SimError::IndexOutOfRange {
                    series,
                    index: required.saturating_sub(1),
                    len: values.len(),
                });
            }
        }
        Ok(())
    }

    fn shortest_len(&self) -> usize {
        self.named().iter().map(|(_, v)| v.len()).min().unwrap_or(0)
    }

    fn named(&self) -> [(&'static str, &[f64]); 5] {
        [
            ("price", self.prices.as_slice()),
            ("temperature", self.temperatures.as_slice()),
            ("buy_price", self.buy_prices.as_slice()),
            ("sell_price", self.sell_prices.as_slice()),
            ("wind_power", self.wind_power.as_slice()),
        ]
    }
}

/// Reads the last column of every data row (header skipped).
fn read_last_column(path: &Path) -> Result<Vec<f64>, SimError> {
    let mut reader = open(path)?;
    let mut values = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| data_error(path, e))?;
        let field = record
            .iter()
            .last()
            .ok_or_else(|| SimError::Data(format!("{}: empty row {}", path.display(), i + 1)))?;
        values.push(parse_value(path, i, field)?);
    }
    Ok(values)
}

/// Reads the first `n` columns of every data row (header skipped).
fn read_columns(path: &Path, n: usize) -> Result<Vec<Vec<f64>>, SimError> {
    let mut reader = open(path)?;
    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| data_error(path, e))?;
        if record.len() < n {
            return Err(SimError::Data(format!(
                "{}: row {} has {} columns, expected at least {n}",
                path.display(),
                i + 1,
                record.len()
            )));
        }
        let row = record
            .iter()
            .take(n)
            .map(|field| parse_value(path, i, field))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }
    Ok(rows)
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, SimError> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| data_error(path, e))
}

fn parse_value(path: &Path, row: usize, field: &str) -> Result<f64, SimError> {
    field.parse::<f64>().map_err(|_| {
        SimError::Data(format!(
            "{}: row {}: \"{field}\" is not a number",
            path.display(),
            row + 1
        ))
    })
}

fn data_error(path: &Path, e: csv::Error) -> SimError {
    SimError::Data(format!("{}: {e}", path.display()))
}
