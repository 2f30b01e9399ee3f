use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{sleep_until, Instant};
use uuid::Uuid;

use crate::domain::checkout::CheckoutCommand;
use crate::messaging::CommandEnvelope;
use crate::metrics::Metrics;
use crate::routing::RouteResolver;
use super::router::{NavigationRequest, Router};

// ============================================================================
// Navigation Gate
// ============================================================================
//
// Idle ──qualifying outcome──▶ Pending ──settle delay──▶ Navigated
//  ▲                            │  ▲
//  │                            └──┘ newer qualifying outcome supersedes
//  └──────basket not found──────┘
//
// Qualifying outcomes are `ContinueCheckoutSuccess` and
// `ContinueCheckoutWithIssues` that name a target route. Issues add the
// `error=true` marker. Outcomes without a target route never navigate.
// A basket-not-found failure drops whatever is pending; recovery has
// already sent the user to the basket.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    Idle,
    Pending {
        trigger: Uuid,
        request: NavigationRequest,
        deadline: Instant,
    },
    Navigated {
        trigger: Uuid,
        request: NavigationRequest,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Ignored,
    Armed,
    /// A pending navigation was dropped in favour of this one
    Superseded { previous: NavigationRequest },
    /// The basket is gone; the pending navigation will not happen
    Cancelled { previous: NavigationRequest },
}

fn basket_gone(command: &CheckoutCommand) -> bool {
    match command {
        CheckoutCommand::LoadBasketFail { error } => error.is_basket_not_found(),
        other => other.checkout_failure().is_some_and(|error| error.is_basket_not_found()),
    }
}

#[derive(Debug)]
pub struct NavigationGate {
    state: GateState,
    resolver: RouteResolver,
    settle_delay: Duration,
}

impl NavigationGate {
    pub fn new(resolver: RouteResolver, settle_delay: Duration) -> Self {
        Self {
            state: GateState::Idle,
            resolver,
            settle_delay,
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Navigation a command asks for, if any
    pub fn request_for(&self, command: &CheckoutCommand) -> Option<NavigationRequest> {
        match command {
            CheckoutCommand::ContinueCheckoutSuccess {
                target_route: Some(target),
                validation,
            } => Some(NavigationRequest::to(
                self.resolver.resolve_target(target, &validation.results.errors),
            )),
            CheckoutCommand::ContinueCheckoutWithIssues {
                target_route: Some(target),
                validation,
            } => Some(
                NavigationRequest::to(self.resolver.resolve_target(target, &validation.results.errors))
                    .with_error_marker(),
            ),
            _ => None,
        }
    }

    pub fn observe(&mut self, envelope: &CommandEnvelope, now: Instant) -> Observation {
        if basket_gone(&envelope.command) {
            return match std::mem::replace(&mut self.state, GateState::Idle) {
                GateState::Pending { request, .. } => Observation::Cancelled { previous: request },
                settled => {
                    self.state = settled;
                    Observation::Ignored
                }
            };
        }

        let Some(request) = self.request_for(&envelope.command) else {
            return Observation::Ignored;
        };

        let previous = std::mem::replace(
            &mut self.state,
            GateState::Pending {
                trigger: envelope.command_id,
                request,
                deadline: now + self.settle_delay,
            },
        );

        match previous {
            GateState::Pending { request, .. } => Observation::Superseded { previous: request },
            GateState::Idle | GateState::Navigated { .. } => Observation::Armed,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            GateState::Pending { deadline, .. } => Some(*deadline),
            _ => None,
        }
    }

    /// Move a settled pending navigation to `Navigated` and hand it out
    pub fn fire(&mut self, now: Instant) -> Option<NavigationRequest> {
        match &self.state {
            GateState::Pending {
                trigger,
                request,
                deadline,
            } if now >= *deadline => {
                let request = request.clone();
                self.state = GateState::Navigated {
                    trigger: *trigger,
                    request: request.clone(),
                };
                Some(request)
            }
            _ => None,
        }
    }
}

/// Drives a `NavigationGate` from the command stream
pub struct NavigationGateTask {
    gate: NavigationGate,
    router: Arc<dyn Router>,
    metrics: Arc<Metrics>,
}

impl NavigationGateTask {
    pub fn new(gate: NavigationGate, router: Arc<dyn Router>, metrics: Arc<Metrics>) -> Self {
        Self { gate, router, metrics }
    }

    pub async fn run(mut self, mut rx: broadcast::Receiver<CommandEnvelope>) {
        tracing::info!("Navigation gate started");

        loop {
            let deadline = self.gate.deadline();

            tokio::select! {
                biased;

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.navigate();
                }
                received = rx.recv() => match received {
                    Ok(envelope) => self.observe(&envelope),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Navigation gate lagged behind the command stream");
                        self.metrics.record_lag("navigation_gate", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        // Let a navigation that was already decided settle and happen
        if let Some(deadline) = self.gate.deadline() {
            sleep_until(deadline).await;
            self.navigate();
        }
        tracing::info!("Navigation gate stopped");
    }

    fn observe(&mut self, envelope: &CommandEnvelope) {
        match self.gate.observe(envelope, Instant::now()) {
            Observation::Ignored => {}
            Observation::Armed => {
                tracing::debug!(
                    command_id = %envelope.command_id,
                    command_type = envelope.command_type(),
                    "Navigation pending"
                );
            }
            Observation::Superseded { previous } => {
                tracing::debug!(
                    command_id = %envelope.command_id,
                    superseded = %previous,
                    "Pending navigation superseded"
                );
                self.metrics.record_superseded();
            }
            Observation::Cancelled { previous } => {
                tracing::info!(
                    command_id = %envelope.command_id,
                    command_type = envelope.command_type(),
                    cancelled = %previous,
                    "Pending navigation cancelled, basket not found"
                );
                self.metrics.record_cancelled();
            }
        }
    }

    fn navigate(&mut self) {
        let Some(request) = self.gate.fire(Instant::now()) else {
            return;
        };

        let kind = if request.query.contains_key("error") { "issues" } else { "step" };
        match self.router.navigate(&request) {
            Ok(()) => self.metrics.record_navigation(kind),
            Err(e) => tracing::error!(location = %request, error = %e, "Navigation failed"),
        }
    }
}
