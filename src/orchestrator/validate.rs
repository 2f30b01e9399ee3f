use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::checkout::CheckoutCommand;
use crate::messaging::CommandEnvelope;
use super::{CheckoutEffect, ValidationContext};

/// Validates on explicit request; outcomes never name a route
pub struct ValidateOnRequest {
    context: Arc<ValidationContext>,
}

impl ValidateOnRequest {
    pub fn new(context: Arc<ValidationContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl CheckoutEffect for ValidateOnRequest {
    fn name(&self) -> &'static str {
        "validate_on_request"
    }

    fn accepts(&self, command: &CheckoutCommand) -> bool {
        matches!(command, CheckoutCommand::ValidateBasket { .. })
    }

    async fn handle(&self, envelope: CommandEnvelope) -> Vec<CheckoutCommand> {
        let CheckoutCommand::ValidateBasket { scopes } = envelope.command else {
            return Vec::new();
        };

        let outcome = match self.context.validate(self.name(), &scopes).await {
            Ok(validation) if validation.results.valid => CheckoutCommand::ContinueCheckoutSuccess {
                target_route: None,
                validation,
            },
            Ok(validation) => CheckoutCommand::ContinueCheckoutWithIssues {
                target_route: None,
                validation,
            },
            Err(error) => CheckoutCommand::ContinueCheckoutFail { error },
        };
        vec![outcome]
    }
}
