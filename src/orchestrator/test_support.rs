//! Fixtures shared by the effect tests

use std::sync::Arc;

use crate::domain::basket::{
    Basket, BasketValidation, ServerConfig, ValidationError, ValidationResults, ValidationScope,
};
use crate::domain::checkout::CheckoutCommand;
use crate::messaging::{CommandBus, CommandEnvelope};
use crate::metrics::Metrics;
use crate::routing::RouteResolver;
use crate::services::ScriptedValidationClient;
use crate::state::InMemoryStore;
use super::ValidationContext;

pub fn basket() -> Basket {
    Basket::new("b-1")
}

pub fn valid() -> BasketValidation {
    BasketValidation::new(basket(), ValidationResults::valid(false))
}

pub fn adjusted() -> BasketValidation {
    BasketValidation::new(basket(), ValidationResults::valid(true))
}

pub fn invalid(scope: ValidationScope) -> BasketValidation {
    BasketValidation::new(
        basket(),
        ValidationResults::invalid(false, vec![ValidationError::new("1234", "error", [scope])]),
    )
}

pub struct Fixture {
    pub client: Arc<ScriptedValidationClient>,
    pub store: Arc<InMemoryStore>,
    pub metrics: Arc<Metrics>,
    pub context: Arc<ValidationContext>,
}

pub fn fixture(client: ScriptedValidationClient, config: ServerConfig, basket: Option<Basket>) -> Fixture {
    let client = Arc::new(client);
    let store = Arc::new(InMemoryStore::new(config, basket));
    let metrics = Arc::new(Metrics::new().unwrap());
    let context = Arc::new(ValidationContext::new(
        client.clone(),
        store.clone(),
        RouteResolver::default(),
        metrics.clone(),
    ));
    Fixture { client, store, metrics, context }
}

/// Wrap a command the way the bus would
pub async fn envelope(command: CheckoutCommand) -> CommandEnvelope {
    let bus = CommandBus::new(1);
    let mut rx = bus.subscribe();
    bus.publish(command);
    rx.recv().await.unwrap()
}
