use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::checkout::CheckoutCommand;

// ============================================================================
// Command Envelope - Metadata around every command on the stream
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CommandEnvelope {
    // Identity
    pub command_id: Uuid,
    /// Position on the stream; strictly increasing per bus
    pub sequence: u64,

    // Causation & Correlation
    pub causation_id: Option<Uuid>,      // Command this one was derived from
    pub correlation_id: Uuid,            // Shared by everything from one external trigger

    pub timestamp: DateTime<Utc>,

    pub command: CheckoutCommand,
}

impl CommandEnvelope {
    pub(crate) fn new(sequence: u64, command: CheckoutCommand) -> Self {
        let command_id = Uuid::now_v7();
        Self {
            command_id,
            sequence,
            causation_id: None,
            correlation_id: command_id,
            timestamp: Utc::now(),
            command,
        }
    }

    pub(crate) fn caused_by(mut self, cause: &CausationRef) -> Self {
        self.causation_id = Some(cause.command_id);
        self.correlation_id = cause.correlation_id;
        self
    }

    pub fn command_type(&self) -> &'static str {
        self.command.command_type()
    }

    pub fn cause(&self) -> CausationRef {
        CausationRef {
            command_id: self.command_id,
            correlation_id: self.correlation_id,
        }
    }
}

/// The identity of a trigger, kept while its outcome is still in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CausationRef {
    pub command_id: Uuid,
    pub correlation_id: Uuid,
}
