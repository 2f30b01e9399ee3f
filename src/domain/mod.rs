// ============================================================================
// Domain Layer
// ============================================================================
//
// Pure data: basket snapshots, validation results and the checkout commands
// that flow over the command stream. No IO lives here.
//
// ============================================================================

pub mod basket;
pub mod checkout;
