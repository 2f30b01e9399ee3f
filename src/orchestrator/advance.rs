use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::basket::BasketValidation;
use crate::domain::checkout::{CheckoutCommand, CheckoutStep, TargetRoute};
use crate::messaging::CommandEnvelope;
use super::{CheckoutEffect, ValidationContext};

// ============================================================================
// Validate and Advance
// ============================================================================
//
// ContinueCheckout{step} → validate(step scopes)
//   fail                  → ContinueCheckoutFail
//   valid, Receipt        → ContinueCheckoutSuccess{None} + SubmitBasket | CreateOrder
//   valid, other step     → ContinueCheckoutSuccess{route(step)}
//   invalid, Receipt      → ContinueCheckoutWithIssues{Auto}
//   invalid, other step   → ContinueCheckoutWithIssues{route(step)}
//
// ============================================================================

pub struct ValidateAndAdvance {
    context: Arc<ValidationContext>,
}

impl ValidateAndAdvance {
    pub fn new(context: Arc<ValidationContext>) -> Self {
        Self { context }
    }

    fn route(&self, step: CheckoutStep) -> Option<TargetRoute> {
        Some(self.context.resolver().step_target(step))
    }

    /// Success notification first, then the order command
    fn create_order(&self, validation: BasketValidation) -> Vec<CheckoutCommand> {
        let approval_required = self
            .context
            .current_basket()
            .map_or_else(|| validation.basket.approval_required(), |basket| basket.approval_required());

        let order = if approval_required {
            tracing::info!(basket_id = %validation.basket.id, "Basket needs approval, submitting it");
            CheckoutCommand::SubmitBasket
        } else {
            CheckoutCommand::CreateOrder
        };

        vec![
            CheckoutCommand::ContinueCheckoutSuccess {
                target_route: None,
                validation,
            },
            order,
        ]
    }
}

#[async_trait]
impl CheckoutEffect for ValidateAndAdvance {
    fn name(&self) -> &'static str {
        "validate_and_advance"
    }

    fn accepts(&self, command: &CheckoutCommand) -> bool {
        matches!(command, CheckoutCommand::ContinueCheckout { .. })
    }

    async fn handle(&self, envelope: CommandEnvelope) -> Vec<CheckoutCommand> {
        let CheckoutCommand::ContinueCheckout { target_step } = envelope.command else {
            return Vec::new();
        };

        match self.context.validate(self.name(), &target_step.validation_scopes()).await {
            Err(error) => vec![CheckoutCommand::ContinueCheckoutFail { error }],
            Ok(validation) if !validation.results.valid => vec![CheckoutCommand::ContinueCheckoutWithIssues {
                target_route: self.route(target_step),
                validation,
            }],
            Ok(validation) if target_step.is_order_creation() => self.create_order(validation),
            Ok(validation) => vec![CheckoutCommand::ContinueCheckoutSuccess {
                target_route: self.route(target_step),
                validation,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::basket::{Basket, BasketApproval, ServerConfig, ValidationScope};
    use crate::domain::checkout::ApiError;
    use crate::orchestrator::test_support::{basket, envelope, fixture, invalid, valid};
    use crate::services::ScriptedValidationClient;

    fn continue_to(target_step: CheckoutStep) -> CheckoutCommand {
        CheckoutCommand::ContinueCheckout { target_step }
    }

    fn approval_basket() -> Basket {
        let mut basket = basket();
        basket.approval = Some(BasketApproval { approval_required: true });
        basket
    }

    #[tokio::test]
    async fn test_valid_step_emits_success_with_route() {
        let fx = fixture(ScriptedValidationClient::returning(valid()), ServerConfig::default(), Some(basket()));
        let effect = ValidateAndAdvance::new(fx.context.clone());

        let outputs = effect.handle(envelope(continue_to(CheckoutStep::Addresses)).await).await;

        assert_eq!(
            outputs,
            vec![CheckoutCommand::ContinueCheckoutSuccess {
                target_route: Some(TargetRoute::path("/checkout/address")),
                validation: valid(),
            }]
        );
        assert_eq!(fx.client.calls()[0].scopes, CheckoutStep::Addresses.validation_scopes());
    }

    #[tokio::test]
    async fn test_receipt_emits_success_and_create_order_every_time() {
        let fx = fixture(ScriptedValidationClient::returning(valid()), ServerConfig::default(), Some(basket()));
        let effect = ValidateAndAdvance::new(fx.context.clone());

        for _ in 0..3 {
            let outputs = effect.handle(envelope(continue_to(CheckoutStep::Receipt)).await).await;
            assert_eq!(
                outputs,
                vec![
                    CheckoutCommand::ContinueCheckoutSuccess { target_route: None, validation: valid() },
                    CheckoutCommand::CreateOrder,
                ]
            );
        }
        assert_eq!(fx.client.call_count(), 3);
        assert_eq!(fx.client.calls()[0].scopes, CheckoutStep::Receipt.validation_scopes());
    }

    #[tokio::test]
    async fn test_receipt_with_approval_submits_basket() {
        let fx = fixture(ScriptedValidationClient::returning(valid()), ServerConfig::default(), Some(approval_basket()));
        let effect = ValidateAndAdvance::new(fx.context.clone());

        for _ in 0..3 {
            let outputs = effect.handle(envelope(continue_to(CheckoutStep::Receipt)).await).await;
            assert_eq!(
                outputs,
                vec![
                    CheckoutCommand::ContinueCheckoutSuccess { target_route: None, validation: valid() },
                    CheckoutCommand::SubmitBasket,
                ]
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_step_emits_issues_with_route() {
        let fx = fixture(
            ScriptedValidationClient::returning(invalid(ValidationScope::Addresses)),
            ServerConfig::default(),
            Some(basket()),
        );
        let effect = ValidateAndAdvance::new(fx.context.clone());

        let outputs = effect.handle(envelope(continue_to(CheckoutStep::Addresses)).await).await;

        assert_eq!(
            outputs,
            vec![CheckoutCommand::ContinueCheckoutWithIssues {
                target_route: Some(TargetRoute::path("/checkout/address")),
                validation: invalid(ValidationScope::Addresses),
            }]
        );
    }

    #[tokio::test]
    async fn test_invalid_receipt_never_creates_order() {
        let fx = fixture(
            ScriptedValidationClient::returning(invalid(ValidationScope::Payment)),
            ServerConfig::default(),
            Some(basket()),
        );
        let effect = ValidateAndAdvance::new(fx.context.clone());

        let outputs = effect.handle(envelope(continue_to(CheckoutStep::Receipt)).await).await;

        assert_eq!(
            outputs,
            vec![CheckoutCommand::ContinueCheckoutWithIssues {
                target_route: Some(TargetRoute::Auto),
                validation: invalid(ValidationScope::Payment),
            }]
        );
    }

    #[tokio::test]
    async fn test_failure_emits_continue_fail() {
        let error = ApiError::basket_not_found("Basket expired");
        let fx = fixture(ScriptedValidationClient::failing(error.clone()), ServerConfig::default(), Some(basket()));
        let effect = ValidateAndAdvance::new(fx.context.clone());

        let outputs = effect.handle(envelope(continue_to(CheckoutStep::Review)).await).await;

        assert_eq!(outputs, vec![CheckoutCommand::ContinueCheckoutFail { error }]);
    }
}
