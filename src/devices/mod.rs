//! Entity models for the microgrid.

/// Battery energy storage model.
pub mod battery;
/// Wind generation replay.
pub mod generation;
/// Price-responsive household load model.
pub mod household;
pub mod tcl;
pub mod types;

pub use battery::Battery;
pub use generation::WindGeneration;
pub use household::HouseholdLoad;
pub use tcl::Tcl;
pub use types::{LoadParameters, TclParameters};
