/// Episode clock for step and day-offset bookkeeping.
pub mod clock;
pub mod controller;
pub mod engine;
/// Reset/step contract shared by environments.
pub mod env;
pub mod kpi;
/// Two-sided energy market.
pub mod market;
pub mod power_balance;
/// Per-step trace buffers.
pub mod trace;
pub mod types;
