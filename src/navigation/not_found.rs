use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::checkout::CheckoutCommand;
use crate::messaging::CommandEnvelope;
use crate::metrics::Metrics;
use crate::orchestrator::CheckoutEffect;
use crate::routing::RouteResolver;
use super::router::{NavigationRequest, Router};

/// Sends the user back to the basket overview once the basket is gone.
///
/// Bypasses the navigation gate: there is no checkout step left to settle
/// on. The store is told through `LoadBasketFail`.
pub struct NotFoundRecovery {
    resolver: RouteResolver,
    router: Arc<dyn Router>,
    metrics: Arc<Metrics>,
}

impl NotFoundRecovery {
    pub fn new(resolver: RouteResolver, router: Arc<dyn Router>, metrics: Arc<Metrics>) -> Self {
        Self {
            resolver,
            router,
            metrics,
        }
    }
}

#[async_trait]
impl CheckoutEffect for NotFoundRecovery {
    fn name(&self) -> &'static str {
        "not_found_recovery"
    }

    fn accepts(&self, command: &CheckoutCommand) -> bool {
        command
            .checkout_failure()
            .is_some_and(|error| error.is_basket_not_found())
    }

    async fn handle(&self, envelope: CommandEnvelope) -> Vec<CheckoutCommand> {
        let Some(error) = envelope.command.checkout_failure().cloned() else {
            return Vec::new();
        };

        tracing::warn!(
            command_id = %envelope.command_id,
            error = %error,
            "Basket no longer exists, recovering to basket overview"
        );

        let request = NavigationRequest::to(self.resolver.basket()).with_error_marker();
        match self.router.navigate(&request) {
            Ok(()) => self.metrics.record_navigation("basket_recovery"),
            Err(e) => tracing::error!(location = %request, error = %e, "Basket recovery navigation failed"),
        }

        vec![CheckoutCommand::LoadBasketFail { error }]
    }
}
