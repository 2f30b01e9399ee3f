use std::sync::{Arc, RwLock};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::domain::basket::{Basket, ServerConfig, ValidationResults};
use crate::domain::checkout::{ApiError, CheckoutCommand};
use crate::messaging::CommandEnvelope;
use super::StateContainer;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub server_config: ServerConfig,
    pub basket: Option<Basket>,
    pub validation_results: Option<ValidationResults>,
    pub basket_error: Option<ApiError>,
    /// Sequence of the last applied command
    pub last_sequence: u64,
}

/// Reducer-style store fed from the command stream
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreSnapshot>,
}

impl InMemoryStore {
    pub fn new(server_config: ServerConfig, basket: Option<Basket>) -> Self {
        Self {
            state: RwLock::new(StoreSnapshot {
                server_config,
                basket,
                ..StoreSnapshot::default()
            }),
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    pub fn apply(&self, envelope: &CommandEnvelope) {
        let mut state = self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if envelope.sequence <= state.last_sequence {
            tracing::debug!(sequence = envelope.sequence, "Ignoring stale command");
            return;
        }
        state.last_sequence = envelope.sequence;

        match &envelope.command {
            CheckoutCommand::LoadServerConfigSuccess { config } => {
                state.server_config = config.clone();
            }
            CheckoutCommand::LoadBasketSuccess { basket } => {
                state.basket = Some(basket.clone());
                state.basket_error = None;
            }
            CheckoutCommand::LoadBasketFail { error } => {
                tracing::info!(error = %error, "Basket could not be reloaded, clearing it");
                state.basket = None;
                state.validation_results = None;
                state.basket_error = Some(error.clone());
            }
            CheckoutCommand::StartCheckoutSuccess { validation }
            | CheckoutCommand::ContinueCheckoutSuccess { validation, .. }
            | CheckoutCommand::ContinueCheckoutWithIssues { validation, .. } => {
                state.basket = Some(validation.basket.clone());
                state.validation_results = Some(validation.results.clone());
            }
            _ => {}
        }
    }

    /// Keep applying commands from `rx` until the bus closes
    pub fn attach(self: &Arc<Self>, mut rx: broadcast::Receiver<CommandEnvelope>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(envelope) => store.apply(&envelope),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "State store lagged behind the command stream");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

impl StateContainer for InMemoryStore {
    fn server_config(&self) -> ServerConfig {
        self.snapshot().server_config
    }

    fn current_basket(&self) -> Option<Basket> {
        self.snapshot().basket
    }
}
