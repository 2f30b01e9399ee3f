use futures_util::future::BoxFuture;
use futures_util::stream::{FuturesOrdered, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::domain::checkout::CheckoutCommand;
use crate::messaging::{CausationRef, CommandBus, CommandEnvelope};
use crate::metrics::Metrics;
use super::CheckoutEffect;

type Pending = BoxFuture<'static, (CausationRef, Vec<CheckoutCommand>)>;

/// Drive one effect until the command stream closes.
///
/// Up to `max_in_flight` accepted commands are handled concurrently. The rest
/// wait in a backlog while the receiver keeps draining the bus, so a slow
/// handler never lags behind the stream. Outputs are published in the order
/// the triggers arrived, so an older trigger's outcome never lands after a
/// newer one's.
pub async fn run_effect(
    effect: Arc<dyn CheckoutEffect>,
    bus: CommandBus,
    mut rx: broadcast::Receiver<CommandEnvelope>,
    metrics: Arc<Metrics>,
    max_in_flight: usize,
) {
    let name = effect.name();
    let max_in_flight = max_in_flight.max(1);
    let mut in_flight: FuturesOrdered<Pending> = FuturesOrdered::new();
    let mut backlog: VecDeque<CommandEnvelope> = VecDeque::new();
    let mut open = true;

    tracing::info!(handler = name, "Checkout effect started");

    loop {
        while in_flight.len() < max_in_flight {
            let Some(envelope) = backlog.pop_front() else {
                break;
            };
            in_flight.push_back(start(&effect, envelope));
        }

        tokio::select! {
            biased;

            Some((cause, outputs)) = in_flight.next(), if !in_flight.is_empty() => {
                publish(&bus, &metrics, name, outputs, &cause);
            }
            received = rx.recv(), if open => match received {
                Ok(envelope) if effect.accepts(&envelope.command) => {
                    if in_flight.len() >= max_in_flight {
                        tracing::debug!(
                            handler = name,
                            command_id = %envelope.command_id,
                            queued = backlog.len() + 1,
                            "Handler busy, queueing command"
                        );
                    }
                    backlog.push_back(envelope);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(handler = name, skipped, "Effect lagged behind the command stream");
                    metrics.record_lag(name, skipped);
                }
                Err(RecvError::Closed) => open = false,
            },
            else => break,
        }
    }

    tracing::info!(handler = name, "Checkout effect stopped");
}

fn start(effect: &Arc<dyn CheckoutEffect>, envelope: CommandEnvelope) -> Pending {
    tracing::debug!(
        handler = effect.name(),
        command_id = %envelope.command_id,
        command_type = envelope.command_type(),
        "Handling command"
    );
    let effect = Arc::clone(effect);
    Box::pin(async move {
        let cause = envelope.cause();
        (cause, effect.handle(envelope).await)
    })
}

fn publish(
    bus: &CommandBus,
    metrics: &Metrics,
    handler: &'static str,
    outputs: Vec<CheckoutCommand>,
    cause: &CausationRef,
) {
    if outputs.is_empty() {
        return;
    }
    for command in &outputs {
        tracing::info!(
            handler,
            causation_id = %cause.command_id,
            command_type = command.command_type(),
            "Emitting command"
        );
        metrics.record_published(handler, command.command_type());
    }
    bus.publish_all(outputs, cause);
}
