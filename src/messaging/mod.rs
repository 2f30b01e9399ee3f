// ============================================================================
// Messaging - Command stream plumbing
// ============================================================================

mod bus;
mod envelope;

pub use bus::CommandBus;
pub use envelope::{CausationRef, CommandEnvelope};
