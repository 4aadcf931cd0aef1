//! Tool dispatch for Steward.
//!
//! Tools are what let the agent act: exact arithmetic, and refunds issued
//! through a pluggable payment collaborator. The [`Dispatcher`] routes each
//! proposed action to its tool.

pub mod calculator;
pub mod dispatcher;
pub mod refund;

pub use dispatcher::Dispatcher;
pub use refund::{DisabledRefunds, RefundMode, SimulatedRefunds};

/// Create a dispatcher with the simulated refund processor.
pub fn default_dispatcher() -> Dispatcher {
    Dispatcher::default()
}
