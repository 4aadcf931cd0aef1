//! Built-in refund processors.
//!
//! Real deployments plug in their payment provider by implementing
//! [`RefundProcessor`]. These two cover local runs and locked-down installs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use steward_core::action::Intent;
use steward_core::effect::{RefundProcessor, RefundReceipt};
use steward_core::error::ToolError;

/// Reports success without contacting anything.
pub struct SimulatedRefunds;

#[async_trait]
impl RefundProcessor for SimulatedRefunds {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn process_refund(&self) -> Result<RefundReceipt, ToolError> {
        tracing::info!("Simulated refund issued");
        Ok(RefundReceipt {
            status: "processed".into(),
            message: "refund processed successfully".into(),
        })
    }
}

/// Refuses every refund, even approved ones.
pub struct DisabledRefunds;

#[async_trait]
impl RefundProcessor for DisabledRefunds {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn process_refund(&self) -> Result<RefundReceipt, ToolError> {
        Err(ToolError::EffectFailed {
            intent: Intent::ProcessRefund,
            reason: "refunds are disabled in this deployment".into(),
        })
    }
}

/// Which built-in processor to use; selected from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundMode {
    #[default]
    Simulated,
    Disabled,
}

impl RefundMode {
    pub fn processor(self) -> Box<dyn RefundProcessor> {
        match self {
            RefundMode::Simulated => Box::new(SimulatedRefunds),
            RefundMode::Disabled => Box::new(DisabledRefunds),
        }
    }
}

impl std::str::FromStr for RefundMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulated" => Ok(RefundMode::Simulated),
            "disabled" => Ok(RefundMode::Disabled),
            other => Err(format!("unknown refund mode '{other}' (expected simulated|disabled)")),
        }
    }
}
