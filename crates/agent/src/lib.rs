//! The agent loop controller at the heart of Steward.
//!
//! The loop follows a **Propose → Record → Classify** cycle:
//!
//! 1. **Render** the thread into a flat transcript
//! 2. **Ask the model** for exactly one next action
//! 3. **Record** the proposal in the thread, unconditionally
//! 4. **Classify** the new last event:
//!    - a question or final answer suspends for a human response
//!    - a high-impact action suspends for human approval
//!    - anything else is executed by the dispatcher, its result is recorded,
//!      and the loop goes back to step 1
//!
//! The controller never moves past a suspension on its own. Callers resume by
//! appending a human reply, or by approving/rejecting the pending action, and
//! then calling [`AgentLoop::run`] again.

pub mod loop_runner;

pub use loop_runner::AgentLoop;
