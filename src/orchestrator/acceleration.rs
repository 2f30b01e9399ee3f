use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::checkout::{CheckoutCommand, CheckoutStep, TargetRoute};
use crate::messaging::CommandEnvelope;
use super::{CheckoutEffect, ValidationContext};

/// After a clean accelerated start, jump to the furthest step the basket
/// already supports.
///
/// Invalid or adjusted start results are left alone; whoever brought the
/// user to checkout surfaces them.
pub struct AcceleratedContinue {
    context: Arc<ValidationContext>,
}

impl AcceleratedContinue {
    pub fn new(context: Arc<ValidationContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl CheckoutEffect for AcceleratedContinue {
    fn name(&self) -> &'static str {
        "accelerated_continue"
    }

    fn accepts(&self, command: &CheckoutCommand) -> bool {
        matches!(
            command,
            CheckoutCommand::StartCheckoutSuccess { validation } if validation.results.is_clean()
        )
    }

    async fn handle(&self, envelope: CommandEnvelope) -> Vec<CheckoutCommand> {
        let CheckoutCommand::StartCheckoutSuccess { validation } = envelope.command else {
            return Vec::new();
        };

        let basket = self.context.current_basket().unwrap_or(validation.basket);
        let step = CheckoutStep::furthest_reachable(&basket);
        tracing::debug!(step = %step, basket_id = %basket.id, "Continuing accelerated checkout");

        match self.context.validate(self.name(), &step.validation_scopes()).await {
            Ok(validation) if validation.results.valid => vec![CheckoutCommand::ContinueCheckoutSuccess {
                target_route: Some(self.context.resolver().step_target(step)),
                validation,
            }],
            Ok(validation) => vec![CheckoutCommand::ContinueCheckoutWithIssues {
                target_route: Some(TargetRoute::Auto),
                validation,
            }],
            Err(error) => vec![CheckoutCommand::ContinueCheckoutFail { error }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::basket::{ServerConfig, ValidationScope};
    use crate::domain::checkout::ApiError;
    use crate::orchestrator::test_support::{adjusted, basket, envelope, fixture, invalid, valid};
    use crate::services::ScriptedValidationClient;

    fn start_success(validation: crate::domain::basket::BasketValidation) -> CheckoutCommand {
        CheckoutCommand::StartCheckoutSuccess { validation }
    }

    #[tokio::test]
    async fn test_clean_start_triggers_one_more_validation() {
        let fx = fixture(ScriptedValidationClient::returning(valid()), ServerConfig::with_acceleration(true), Some(basket()));
        let effect = AcceleratedContinue::new(fx.context.clone());

        assert!(effect.accepts(&start_success(valid())));
        let outputs = effect.handle(envelope(start_success(valid())).await).await;

        assert_eq!(fx.client.call_count(), 1);
        assert_eq!(fx.client.calls()[0].scopes, CheckoutStep::Addresses.validation_scopes());
        assert_eq!(
            outputs,
            vec![CheckoutCommand::ContinueCheckoutSuccess {
                target_route: Some(TargetRoute::path("/checkout/address")),
                validation: valid(),
            }]
        );
    }

    #[tokio::test]
    async fn test_invalid_or_adjusted_start_is_not_revalidated() {
        let fx = fixture(ScriptedValidationClient::returning(valid()), ServerConfig::with_acceleration(true), Some(basket()));
        let effect = AcceleratedContinue::new(fx.context.clone());

        assert!(!effect.accepts(&start_success(invalid(ValidationScope::Products))));
        assert!(!effect.accepts(&start_success(adjusted())));
        assert!(!effect.accepts(&CheckoutCommand::StartCheckout));
        assert_eq!(fx.client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_furthest_reachable_step_is_targeted() {
        let mut ready = basket();
        ready.invoice_to_address = Some("invoice".to_string());
        ready.common_ship_to_address = Some("ship-to".to_string());
        ready.common_shipping_method = Some("express".to_string());
        let fx = fixture(ScriptedValidationClient::returning(valid()), ServerConfig::with_acceleration(true), Some(ready));
        let effect = AcceleratedContinue::new(fx.context.clone());

        let outputs = effect.handle(envelope(start_success(valid())).await).await;

        assert_eq!(fx.client.calls()[0].scopes, CheckoutStep::Payment.validation_scopes());
        assert!(matches!(
            &outputs[0],
            CheckoutCommand::ContinueCheckoutSuccess { target_route: Some(TargetRoute::Path(path)), .. }
                if path == "/checkout/payment"
        ));
    }

    #[tokio::test]
    async fn test_issues_route_automatically() {
        let fx = fixture(
            ScriptedValidationClient::returning(invalid(ValidationScope::Addresses)),
            ServerConfig::with_acceleration(true),
            Some(basket()),
        );
        let effect = AcceleratedContinue::new(fx.context.clone());

        let outputs = effect.handle(envelope(start_success(valid())).await).await;

        assert_eq!(
            outputs,
            vec![CheckoutCommand::ContinueCheckoutWithIssues {
                target_route: Some(TargetRoute::Auto),
                validation: invalid(ValidationScope::Addresses),
            }]
        );
    }

    #[tokio::test]
    async fn test_failure_is_reported() {
        let error = ApiError::new(503, "unavailable");
        let fx = fixture(ScriptedValidationClient::failing(error.clone()), ServerConfig::with_acceleration(true), Some(basket()));
        let effect = AcceleratedContinue::new(fx.context.clone());

        let outputs = effect.handle(envelope(start_success(valid())).await).await;

        assert_eq!(outputs, vec![CheckoutCommand::ContinueCheckoutFail { error }]);
    }
}
