// ============================================================================
// Basket Domain - Snapshots and validation results
// ============================================================================
//
// - Value objects (Basket, BasketApproval, ServerConfig)
// - Validation (BasketValidation, ValidationResults, ValidationError, ValidationScope)
//
// ============================================================================

pub mod value_objects;
pub mod validation;

pub use value_objects::*;
pub use validation::*;
