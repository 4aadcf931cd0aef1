//! Error types for the Steward domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

use crate::action::{Intent, Number};

/// The top-level error type for all Steward operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Event log errors ---
    #[error("Thread error: {0}")]
    Thread(#[from] ThreadError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Model collaborator errors ---
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    // --- Controller errors ---
    #[error("Agent loop exceeded {limit} model calls without suspending")]
    IterationLimit { limit: u32 },

    #[error("Thread is not awaiting approval (last event: {last_event})")]
    NotAwaitingApproval { last_event: String },
}

// --- Bounded context errors ---

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThreadError {
    /// A thread must be seeded before the loop starts.
    #[error("Thread has no events; seed it before running the agent loop")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error("Intent '{0}' cannot be dispatched to a tool")]
    UnsupportedIntent(Intent),

    #[error("Division by zero: {dividend} / 0")]
    DivisionByZero { dividend: Number },

    #[error("Arithmetic overflow in '{intent}': {a}, {b}")]
    Overflow { intent: Intent, a: Number, b: Number },

    #[error("Non-finite result in '{intent}': {a}, {b}")]
    NonFinite { intent: Intent, a: Number, b: Number },

    #[error("Tool effect failed: {intent}: {reason}")]
    EffectFailed { intent: Intent, reason: String },
}

impl ToolError {
    /// True for errors that mean a caller skipped classification, as opposed
    /// to faults the tool itself raised.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, ToolError::UnsupportedIntent(_))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Model returned an unrecognized action ({reason}): {payload}")]
    UnrecognizedAction { payload: String, reason: String },

    #[error("Model call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Model unavailable: {0}")]
    Unavailable(String),
}
