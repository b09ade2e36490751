//! Microgrid operator simulation: a TCL fleet, price-responsive households,
//! battery storage, wind generation and a two-sided energy market, exposed
//! as an episodic reset/step environment.

pub mod config;
pub mod data;
pub mod devices;
pub mod error;
pub mod forecast;
pub mod io;
pub mod runner;
pub mod telemetry;
/// Environment, settlement, policies and episode reporting.
pub mod sim;
