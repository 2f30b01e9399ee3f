use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::checkout::{CheckoutCommand, CheckoutStep};
use crate::messaging::CommandEnvelope;
use crate::state::StateContainer;
use super::{CheckoutEffect, ValidationContext};

/// Without acceleration the first step is shown right away
pub struct StartWithoutAcceleration {
    state: Arc<dyn StateContainer>,
}

impl StartWithoutAcceleration {
    pub fn new(state: Arc<dyn StateContainer>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl CheckoutEffect for StartWithoutAcceleration {
    fn name(&self) -> &'static str {
        "start_without_acceleration"
    }

    fn accepts(&self, command: &CheckoutCommand) -> bool {
        matches!(command, CheckoutCommand::StartCheckout) && !self.state.server_config().acceleration()
    }

    async fn handle(&self, _envelope: CommandEnvelope) -> Vec<CheckoutCommand> {
        vec![CheckoutCommand::ContinueCheckout {
            target_step: CheckoutStep::Addresses,
        }]
    }
}

/// With acceleration the basket is validated before any step is shown
pub struct StartWithAcceleration {
    context: Arc<ValidationContext>,
}

impl StartWithAcceleration {
    pub fn new(context: Arc<ValidationContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl CheckoutEffect for StartWithAcceleration {
    fn name(&self) -> &'static str {
        "start_with_acceleration"
    }

    fn accepts(&self, command: &CheckoutCommand) -> bool {
        matches!(command, CheckoutCommand::StartCheckout)
            && self.context.state().server_config().acceleration()
    }

    async fn handle(&self, _envelope: CommandEnvelope) -> Vec<CheckoutCommand> {
        // Empty scope set: the server applies its default scopes
        match self.context.validate(self.name(), &BTreeSet::new()).await {
            Ok(validation) => vec![CheckoutCommand::StartCheckoutSuccess { validation }],
            Err(error) => vec![CheckoutCommand::StartCheckoutFail { error }],
        }
    }
}
