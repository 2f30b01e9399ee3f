use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::checkout::CheckoutCommand;
use super::envelope::{CausationRef, CommandEnvelope};

// ============================================================================
// Command Bus - The single channel between the engine and its surroundings
// ============================================================================
//
// A `tokio::sync::broadcast` channel: every subscriber sees every command in
// sequence order. Sequence assignment and sending happen under one lock so a
// batch published with `publish_all` is observed contiguously.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct CommandBus {
    inner: Arc<BusInner>,
}

#[derive(Debug)]
struct BusInner {
    sender: broadcast::Sender<CommandEnvelope>,
    next_sequence: Mutex<u64>,
}

impl CommandBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(BusInner {
                sender,
                next_sequence: Mutex::new(1),
            }),
        }
    }

    /// Publish a command that does not derive from another one
    pub fn publish(&self, command: CheckoutCommand) -> Uuid {
        self.send_batch(vec![command], None)
            .into_iter()
            .next()
            .unwrap_or_else(Uuid::nil)
    }

    /// Publish commands derived from `cause` as one uninterrupted batch
    pub fn publish_all(&self, commands: Vec<CheckoutCommand>, cause: &CausationRef) -> Vec<Uuid> {
        self.send_batch(commands, Some(cause))
    }

    fn send_batch(&self, commands: Vec<CheckoutCommand>, cause: Option<&CausationRef>) -> Vec<Uuid> {
        let mut next_sequence = self
            .inner
            .next_sequence
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        commands
            .into_iter()
            .map(|command| {
                let mut envelope = CommandEnvelope::new(*next_sequence, command);
                if let Some(cause) = cause {
                    envelope = envelope.caused_by(cause);
                }
                *next_sequence += 1;

                let command_id = envelope.command_id;
                tracing::debug!(
                    command_id = %command_id,
                    sequence = envelope.sequence,
                    causation_id = ?envelope.causation_id,
                    command_type = envelope.command_type(),
                    "Publishing command"
                );
                // Err only means nobody is subscribed, the command is dropped
                let _ = self.inner.sender.send(envelope);
                command_id
            })
            .collect()
    }

    /// Receive every command published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<CommandEnvelope> {
        self.inner.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.inner.sender.receiver_count()
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkout::CheckoutStep;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = CommandBus::new(16);
        let mut rx = bus.subscribe();

        let id = bus.publish(CheckoutCommand::StartCheckout);
        let envelope = rx.recv().await.unwrap();

        assert_eq!(envelope.command_id, id);
        assert_eq!(envelope.command, CheckoutCommand::StartCheckout);
        assert_eq!(bus.receiver_count(), 1);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_does_not_fail() {
        let bus = CommandBus::new(4);
        let id = bus.publish(CheckoutCommand::CreateOrder);
        assert!(!id.is_nil());
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_causation() {
        let bus = CommandBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(CheckoutCommand::ContinueCheckout {
            target_step: CheckoutStep::Receipt,
        });
        let trigger = rx.recv().await.unwrap();

        bus.publish_all(
            vec![CheckoutCommand::SubmitBasket, CheckoutCommand::CreateOrder],
            &trigger.cause(),
        );

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();

        assert_eq!(first.command, CheckoutCommand::SubmitBasket);
        assert_eq!(second.command, CheckoutCommand::CreateOrder);
        assert_eq!(first.sequence + 1, second.sequence);
        assert_eq!(first.causation_id, Some(trigger.command_id));
        assert_eq!(second.correlation_id, trigger.correlation_id);
    }

    #[tokio::test]
    async fn test_sequences_increase_across_publishers() {
        let bus = CommandBus::new(64);
        let mut rx = bus.subscribe();

        let mut tasks = Vec::new();
        for _ in 0..4 {
            let bus = bus.clone();
            tasks.push(tokio::spawn(async move {
                for _ in 0..5 {
                    bus.publish(CheckoutCommand::StartCheckout);
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let mut last = 0;
        for _ in 0..20 {
            let envelope = rx.recv().await.unwrap();
            assert!(envelope.sequence > last);
            last = envelope.sequence;
        }
    }
}
