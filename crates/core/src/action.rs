//! Proposed actions: the closed set of things the model may ask for.
//!
//! Every action carries the literal operands needed to execute it. Adding a
//! variant here forces [`Intent::disposition`] (and the dispatcher's `match`)
//! to be updated, so an intent can never slip through unclassified.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ModelError;

/// A numeric operand or result.
///
/// JSON integers deserialize as [`Number::Int`]; anything with a fraction or
/// exponent deserializes as [`Number::Float`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// True for `0`, `0.0` and `-0.0`.
    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            // Debug keeps the trailing ".0" so 5.0 never reads as an integer.
            Number::Float(x) => write!(f, "{x:?}"),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// The next step proposed by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum ProposedAction {
    Add { a: Number, b: Number },
    Subtract { a: Number, b: Number },
    Multiply { a: Number, b: Number },
    Divide { a: Number, b: Number },
    ProcessRefund,
    /// Ask the human a clarifying question.
    RequestMoreInformation { message: String },
    /// Report the final answer and hand control back.
    DoneForNow { message: String },
}

impl ProposedAction {
    pub fn intent(&self) -> Intent {
        match self {
            ProposedAction::Add { .. } => Intent::Add,
            ProposedAction::Subtract { .. } => Intent::Subtract,
            ProposedAction::Multiply { .. } => Intent::Multiply,
            ProposedAction::Divide { .. } => Intent::Divide,
            ProposedAction::ProcessRefund => Intent::ProcessRefund,
            ProposedAction::RequestMoreInformation { .. } => Intent::RequestMoreInformation,
            ProposedAction::DoneForNow { .. } => Intent::DoneForNow,
        }
    }

    pub fn disposition(&self) -> Disposition {
        self.intent().disposition()
    }

    /// Parse a model collaborator's raw JSON output into an action.
    ///
    /// Anything outside the known union is a protocol violation; the raw
    /// payload is kept on the error for diagnosis.
    pub fn from_model_output(raw: &str) -> Result<Self, ModelError> {
        serde_json::from_str(raw).map_err(|e| ModelError::UnrecognizedAction {
            payload: raw.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Fieldless mirror of [`ProposedAction`], used for routing and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Add,
    Subtract,
    Multiply,
    Divide,
    ProcessRefund,
    RequestMoreInformation,
    DoneForNow,
}

impl Intent {
    pub const ALL: [Intent; 7] = [
        Intent::Add,
        Intent::Subtract,
        Intent::Multiply,
        Intent::Divide,
        Intent::ProcessRefund,
        Intent::RequestMoreInformation,
        Intent::DoneForNow,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Intent::Add => "add",
            Intent::Subtract => "subtract",
            Intent::Multiply => "multiply",
            Intent::Divide => "divide",
            Intent::ProcessRefund => "process_refund",
            Intent::RequestMoreInformation => "request_more_information",
            Intent::DoneForNow => "done_for_now",
        }
    }

    /// The single routing table for intents.
    ///
    /// Divide and refunds are gated behind a human; divide is a stand-in for
    /// any high-impact operation.
    pub const fn disposition(self) -> Disposition {
        match self {
            Intent::RequestMoreInformation | Intent::DoneForNow => Disposition::AwaitResponse,
            Intent::Divide | Intent::ProcessRefund => Disposition::AwaitApproval,
            Intent::Add | Intent::Subtract | Intent::Multiply => Disposition::AutoExecute,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == name)
            .ok_or_else(|| format!("unknown intent '{name}'"))
    }
}

/// What the controller does with a freshly proposed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Nothing more to do without a human reply.
    AwaitResponse,
    /// A human must sign off before any side effect.
    AwaitApproval,
    /// Safe to hand to the dispatcher immediately.
    AutoExecute,
}
