// ============================================================================
// Navigation - Turning outcomes into route changes
// ============================================================================
//
// - `NavigationGate`: settles qualifying outcomes before navigating once
// - `NotFoundRecovery`: expired basket → basket overview, right away
// - `Router`: the seam to whatever actually changes the location
//
// ============================================================================

mod gate;
mod not_found;
mod router;

pub use gate::{GateState, NavigationGate, NavigationGateTask, Observation};
pub use not_found::NotFoundRecovery;
pub use router::{NavigationRequest, RecordingRouter, Router};
