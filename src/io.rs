/// CSV export of recorded traces.
pub mod export;
