//! Ability namespace resolution and execution.

pub mod executor;
pub mod registry;

pub use executor::AbilityExecutor;
pub use registry::AbilityRegistry;
