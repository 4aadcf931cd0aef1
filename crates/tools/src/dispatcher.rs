//! The tool dispatcher: maps a proposed action to its result.
//!
//! The dispatcher does not check approval. Callers classify first (see
//! [`steward_core::Thread::state`]); approval-gated actions only reach here
//! after a human signed off.

use std::sync::Arc;

use steward_core::action::ProposedAction;
use steward_core::effect::{RefundProcessor, ToolOutput};
use steward_core::error::ToolError;
use tracing::{debug, warn};

use crate::calculator;
use crate::refund::{RefundMode, SimulatedRefunds};

pub struct Dispatcher {
    refunds: Arc<dyn RefundProcessor>,
}

impl Dispatcher {
    pub fn new(refunds: Arc<dyn RefundProcessor>) -> Self {
        Self { refunds }
    }

    pub fn from_mode(mode: RefundMode) -> Self {
        Self::new(Arc::from(mode.processor()))
    }

    /// Name of the refund processor in use.
    pub fn refund_processor(&self) -> &str {
        self.refunds.name()
    }

    /// Execute an action.
    ///
    /// Arithmetic is pure and exact. Refunds go through the configured
    /// [`RefundProcessor`]. Response intents (`request_more_information`,
    /// `done_for_now`) have nothing to execute and are rejected with
    /// [`ToolError::UnsupportedIntent`].
    pub async fn apply(&self, action: &ProposedAction) -> Result<ToolOutput, ToolError> {
        let intent = action.intent();
        let result = match action {
            ProposedAction::Add { a, b } => calculator::add(*a, *b).map(ToolOutput::Number),
            ProposedAction::Subtract { a, b } => {
                calculator::subtract(*a, *b).map(ToolOutput::Number)
            }
            ProposedAction::Multiply { a, b } => {
                calculator::multiply(*a, *b).map(ToolOutput::Number)
            }
            ProposedAction::Divide { a, b } => calculator::divide(*a, *b).map(ToolOutput::Number),
            ProposedAction::ProcessRefund => {
                debug!(processor = self.refunds.name(), "Issuing refund");
                self.refunds.process_refund().await.map(ToolOutput::Refund)
            }
            ProposedAction::RequestMoreInformation { .. } | ProposedAction::DoneForNow { .. } => {
                Err(ToolError::UnsupportedIntent(intent))
            }
        };

        match &result {
            Ok(output) => debug!(%intent, output = %output.to_value(), "Tool executed"),
            Err(e) => warn!(%intent, error = %e, "Tool execution failed"),
        }
        result
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Arc::new(SimulatedRefunds))
    }
}
