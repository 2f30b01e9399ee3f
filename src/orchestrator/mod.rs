// ============================================================================
// Checkout Orchestrator - Reactive effects over the command stream
// ============================================================================
//
// Effects (one task each):
//   StartWithoutAcceleration  StartCheckout            → ContinueCheckout
//   StartWithAcceleration     StartCheckout            → StartCheckout{Success,Fail}
//   AcceleratedContinue       StartCheckoutSuccess     → ContinueCheckout{Success,WithIssues,Fail}
//   ValidateOnRequest         ValidateBasket           → ContinueCheckout{Success,WithIssues,Fail}
//   ValidateAndAdvance        ContinueCheckout         → ContinueCheckout{Success,WithIssues,Fail}
//                                                        + SubmitBasket | CreateOrder
//
// Effects never share mutable state. They read snapshots from the state
// container and talk to each other only by publishing commands.
//
// ============================================================================

mod acceleration;
mod advance;
mod context;
mod runner;
mod start;
#[cfg(test)]
mod test_support;
mod validate;

pub use acceleration::AcceleratedContinue;
pub use advance::ValidateAndAdvance;
pub use context::ValidationContext;
pub use runner::run_effect;
pub use start::{StartWithAcceleration, StartWithoutAcceleration};
pub use validate::ValidateOnRequest;

use async_trait::async_trait;

use crate::domain::checkout::CheckoutCommand;
use crate::messaging::CommandEnvelope;

/// One reactive handler on the command stream.
///
/// `accepts` runs on receipt and must not block. `handle` may suspend on
/// validation calls. Its outputs are published together, in order.
#[async_trait]
pub trait CheckoutEffect: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn accepts(&self, command: &CheckoutCommand) -> bool;

    async fn handle(&self, envelope: CommandEnvelope) -> Vec<CheckoutCommand>;
}
