use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::config::CheckoutConfig;
use crate::domain::checkout::CheckoutCommand;
use crate::error::Result;
use crate::messaging::{CommandBus, CommandEnvelope};
use crate::metrics::Metrics;
use crate::navigation::{NavigationGate, NavigationGateTask, NotFoundRecovery, Router};
use crate::orchestrator::{
    run_effect, AcceleratedContinue, CheckoutEffect, StartWithAcceleration, StartWithoutAcceleration,
    ValidateAndAdvance, ValidateOnRequest, ValidationContext,
};
use crate::routing::RouteResolver;
use crate::services::ValidationClient;
use crate::state::StateContainer;

// ============================================================================
// Checkout Engine - Wires every task onto one command stream
// ============================================================================
//
// Task layout:
//   CommandBus
//   ├── StartWithoutAcceleration
//   ├── StartWithAcceleration
//   ├── AcceleratedContinue
//   ├── ValidateOnRequest
//   ├── ValidateAndAdvance
//   ├── NotFoundRecovery
//   └── NavigationGate
//
// All receivers are subscribed before the first task runs, so no task
// misses a command dispatched right after `start`.
//
// ============================================================================

pub struct CheckoutEngine {
    config: CheckoutConfig,
    client: Arc<dyn ValidationClient>,
    state: Arc<dyn StateContainer>,
    router: Arc<dyn Router>,
    metrics: Arc<Metrics>,
    bus: CommandBus,
}

impl CheckoutEngine {
    pub fn new(
        config: CheckoutConfig,
        client: Arc<dyn ValidationClient>,
        state: Arc<dyn StateContainer>,
        router: Arc<dyn Router>,
    ) -> Result<Self> {
        config.validate()?;
        let metrics = Arc::new(Metrics::new()?);
        let bus = CommandBus::new(config.bus_capacity);

        Ok(Self {
            config,
            client,
            state,
            router,
            metrics,
            bus,
        })
    }

    /// Bus the engine will run on; attach the state container here before `start`
    pub fn bus(&self) -> &CommandBus {
        &self.bus
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    fn effects(&self, resolver: &RouteResolver) -> Vec<Arc<dyn CheckoutEffect>> {
        let context = Arc::new(ValidationContext::new(
            Arc::clone(&self.client),
            Arc::clone(&self.state),
            resolver.clone(),
            Arc::clone(&self.metrics),
        ));

        vec![
            Arc::new(StartWithoutAcceleration::new(Arc::clone(&self.state))),
            Arc::new(StartWithAcceleration::new(Arc::clone(&context))),
            Arc::new(AcceleratedContinue::new(Arc::clone(&context))),
            Arc::new(ValidateOnRequest::new(Arc::clone(&context))),
            Arc::new(ValidateAndAdvance::new(context)),
            Arc::new(NotFoundRecovery::new(
                resolver.clone(),
                Arc::clone(&self.router),
                Arc::clone(&self.metrics),
            )),
        ]
    }

    /// Spawn every task. Must be called inside a tokio runtime.
    pub fn start(self) -> EngineHandle {
        let resolver = RouteResolver::new(self.config.routes.clone());
        let mut tasks = JoinSet::new();

        let effects = self.effects(&resolver);
        let gate_rx = self.bus.subscribe();
        let receivers: Vec<_> = effects.iter().map(|_| self.bus.subscribe()).collect();

        for (effect, rx) in effects.into_iter().zip(receivers) {
            tasks.spawn(run_effect(
                effect,
                self.bus.clone(),
                rx,
                Arc::clone(&self.metrics),
                self.config.max_in_flight,
            ));
        }

        let gate = NavigationGate::new(resolver, self.config.settle_delay());
        tasks.spawn(NavigationGateTask::new(gate, Arc::clone(&self.router), Arc::clone(&self.metrics)).run(gate_rx));

        tracing::info!(
            tasks = tasks.len(),
            settle_delay_ms = self.config.settle_delay_ms,
            max_in_flight = self.config.max_in_flight,
            "Checkout engine started"
        );

        EngineHandle {
            bus: self.bus,
            metrics: self.metrics,
            tasks,
        }
    }
}

/// Running engine; dropping it leaves the tasks running until the runtime stops
pub struct EngineHandle {
    bus: CommandBus,
    metrics: Arc<Metrics>,
    tasks: JoinSet<()>,
}

impl EngineHandle {
    /// Feed an external trigger into the command stream
    pub fn dispatch(&self, command: CheckoutCommand) -> Uuid {
        tracing::info!(command_type = command.command_type(), "Dispatching command");
        self.bus.publish(command)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CommandEnvelope> {
        self.bus.subscribe()
    }

    pub fn bus(&self) -> &CommandBus {
        &self.bus
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn running_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Stop every task. Work still in flight is dropped.
    pub async fn shutdown(mut self) {
        tracing::info!("Checkout engine stopping");
        self.tasks.abort_all();

        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    tracing::error!(error = %e, "Engine task panicked");
                }
            }
        }
        tracing::info!("Checkout engine stopped");
    }
}
