//! # Steward Core
//!
//! Domain types, traits, and error definitions for the Steward agent loop.
//! This crate has **zero framework dependencies**. It defines the domain model
//! that the dispatcher, the controller, and the CLI implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator the loop talks to (the model that proposes the next
//! step, the payment processor behind refunds) is a trait here. Implementations
//! live in their respective crates or in the embedding application. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with scripted/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod action;
pub mod agent;
pub mod effect;
pub mod error;
pub mod event;
pub mod model;
pub mod thread;

// Re-export key types at crate root for ergonomics
pub use action::{Disposition, Intent, Number, ProposedAction};
pub use agent::{AgentConfig, LoopState};
pub use effect::{RefundProcessor, RefundReceipt, ToolOutput};
pub use error::{Error, ModelError, ThreadError, ToolError};
pub use event::{DomainEvent, EventBus};
pub use model::{NextStepModel, ScriptedModel};
pub use thread::{Event, Payload, Thread, ThreadId};
