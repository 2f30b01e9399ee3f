// ============================================================================
// Checkout Domain - Commands, steps and call failures
// ============================================================================

pub mod steps;
pub mod commands;
pub mod errors;

pub use steps::*;
pub use commands::*;
pub use errors::*;
