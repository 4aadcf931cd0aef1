//! Tool outputs and effect collaborators.
//!
//! Most tools are pure computations. A few (refunds) need to reach an external
//! system; that reach goes through a trait defined here so the dispatcher
//! never owns a payment client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::Number;
use crate::error::ToolError;

/// The result of a successfully dispatched action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Number(Number),
    Refund(RefundReceipt),
}

impl ToolOutput {
    /// The value recorded in a `tool_response` event.
    pub fn to_value(&self) -> Value {
        match self {
            ToolOutput::Number(Number::Int(i)) => Value::from(*i),
            ToolOutput::Number(Number::Float(f)) => Value::from(*f),
            ToolOutput::Refund(receipt) => serde_json::json!({
                "status": receipt.status,
                "message": receipt.message,
            }),
        }
    }
}

/// Confirmation returned by a refund processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundReceipt {
    pub status: String,
    pub message: String,
}

/// The external system that actually moves money back.
///
/// Only ever invoked after a human approved the refund.
#[async_trait]
pub trait RefundProcessor: Send + Sync {
    /// A short name for logs (e.g. "simulated", "stripe").
    fn name(&self) -> &str;

    async fn process_refund(&self) -> Result<RefundReceipt, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_output_keeps_int_float_distinction() {
        assert_eq!(ToolOutput::Number(Number::Int(5)).to_value().to_string(), "5");
        assert_eq!(
            ToolOutput::Number(Number::Float(5.0)).to_value().to_string(),
            "5.0"
        );
    }

    #[test]
    fn receipt_output_is_an_object() {
        let output = ToolOutput::Refund(RefundReceipt {
            status: "processed".into(),
            message: "ok".into(),
        });
        let value = output.to_value();
        assert_eq!(value["status"], "processed");
        assert_eq!(value["message"], "ok");
    }
}
