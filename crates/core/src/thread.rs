//! Event and Thread domain types.
//!
//! A thread is the append-only log of one conversation: the user's request,
//! every action the model proposed, every tool result, every human reply.
//! The last event alone decides whether the agent loop may keep going.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::action::{Disposition, Intent, ProposedAction};
use crate::agent::LoopState;
use crate::effect::ToolOutput;
use crate::error::{ThreadError, ToolError};

/// Well-known event kinds.
pub mod kinds {
    pub const USER_INPUT: &str = "user_input";
    pub const TOOL_CALL: &str = "tool_call";
    pub const TOOL_RESPONSE: &str = "tool_response";
    pub const HUMAN_RESPONSE: &str = "human_response";
    pub const APPROVAL_REJECTED: &str = "approval_rejected";
}

/// Unique identifier for a thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ThreadId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an event carries.
///
/// Only [`Payload::Action`] has an intent; results and human input are plain
/// data and are never classified as awaiting anything. The variant is written
/// out explicitly (`{"action": ...}` or `{"data": ...}`) so a data object
/// that happens to look like an action stays data after a reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Action(ProposedAction),
    Data(Value),
}

impl Payload {
    pub fn intent(&self) -> Option<Intent> {
        self.action().map(ProposedAction::intent)
    }

    pub fn action(&self) -> Option<&ProposedAction> {
        match self {
            Payload::Action(action) => Some(action),
            Payload::Data(_) => None,
        }
    }

    fn render_body(&self) -> String {
        match self {
            Payload::Action(action) => render_action_fields(action),
            Payload::Data(value) => render_value(value),
        }
    }
}

impl From<ProposedAction> for Payload {
    fn from(action: ProposedAction) -> Self {
        Payload::Action(action)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Data(value)
    }
}

/// A single entry in a thread. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: String,
    pub payload: Payload,
}

impl Event {
    pub fn new(kind: impl Into<String>, payload: impl Into<Payload>) -> Self {
        Self {
            kind: kind.into(),
            payload: payload.into(),
        }
    }

    /// The user's request that seeds a thread.
    pub fn user_input(text: impl Into<String>) -> Self {
        Self::new(kinds::USER_INPUT, Value::String(text.into()))
    }

    /// A free-text reply from a human after a suspension.
    pub fn human_response(text: impl Into<String>) -> Self {
        Self::new(kinds::HUMAN_RESPONSE, Value::String(text.into()))
    }

    pub fn tool_call(action: ProposedAction) -> Self {
        Self::new(kinds::TOOL_CALL, action)
    }

    pub fn tool_response(output: &ToolOutput) -> Self {
        Self::new(kinds::TOOL_RESPONSE, output.to_value())
    }

    /// A tool fault, recorded as an error-bearing `tool_response`.
    pub fn tool_error(error: &ToolError) -> Self {
        Self::new(
            kinds::TOOL_RESPONSE,
            serde_json::json!({ "error": error.to_string() }),
        )
    }

    /// A human declined the pending action.
    pub fn approval_rejected(reason: impl Into<String>) -> Self {
        Self::new(
            kinds::APPROVAL_REJECTED,
            serde_json::json!({ "reason": reason.into() }),
        )
    }

    /// Block name in the rendered transcript: the intent if there is one,
    /// otherwise the kind.
    pub fn tag(&self) -> &str {
        match &self.payload {
            Payload::Action(action) => action.intent().as_str(),
            Payload::Data(Value::Object(map)) => map
                .get("intent")
                .and_then(Value::as_str)
                .unwrap_or(&self.kind),
            Payload::Data(_) => &self.kind,
        }
    }

    /// Render this event as one `<tag>` block.
    pub fn render(&self) -> String {
        let tag = self.tag();
        let body = self.payload.render_body();
        let block = if body.is_empty() {
            format!("<{tag}>\n</{tag}>")
        } else {
            format!("<{tag}>\n{body}\n</{tag}>")
        };
        strip_leading_whitespace(&block)
    }
}

/// An ordered, append-only log of events for one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    id: ThreadId,
    created_at: DateTime<Utc>,
    events: Vec<Event>,
}

impl Thread {
    /// Create a thread seeded with the given events.
    pub fn new(seed: impl IntoIterator<Item = Event>) -> Self {
        Self {
            id: ThreadId::new(),
            created_at: Utc::now(),
            events: seed.into_iter().collect(),
        }
    }

    pub fn id(&self) -> &ThreadId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Add an event to the end. Content is not validated.
    pub fn append(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn last(&self) -> Result<&Event, ThreadError> {
        self.events.last().ok_or(ThreadError::Empty)
    }

    /// The flat transcript handed to the model, one block per event in
    /// append order.
    ///
    /// Each block is `<tag>\n{body}\n</tag>` (or `<tag>\n</tag>` when the
    /// body is empty) and blocks are separated by one blank line.
    pub fn render_context(&self) -> String {
        self.events
            .iter()
            .map(Event::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The last action asks a question or reports a final answer.
    pub fn is_awaiting_human_response(&self) -> bool {
        self.last_disposition() == Some(Disposition::AwaitResponse)
    }

    /// The last action needs human sign-off before it may run.
    pub fn is_awaiting_human_approval(&self) -> bool {
        self.last_disposition() == Some(Disposition::AwaitApproval)
    }

    /// Classify the thread by its last event.
    pub fn state(&self) -> Result<LoopState, ThreadError> {
        let last = self.last()?;
        Ok(match last.payload.intent().map(Intent::disposition) {
            Some(Disposition::AwaitResponse) => LoopState::SuspendedForResponse,
            Some(Disposition::AwaitApproval) => LoopState::SuspendedForApproval,
            Some(Disposition::AutoExecute) | None => LoopState::Running,
        })
    }

    /// The action waiting for sign-off, if the thread is suspended for approval.
    pub fn pending_approval(&self) -> Option<&ProposedAction> {
        self.events
            .last()?
            .payload
            .action()
            .filter(|action| action.disposition() == Disposition::AwaitApproval)
    }

    fn last_disposition(&self) -> Option<Disposition> {
        self.events
            .last()?
            .payload
            .intent()
            .map(Intent::disposition)
    }
}

fn render_action_fields(action: &ProposedAction) -> String {
    match action {
        ProposedAction::Add { a, b }
        | ProposedAction::Subtract { a, b }
        | ProposedAction::Multiply { a, b }
        | ProposedAction::Divide { a, b } => format!("a: {a}\nb: {b}"),
        ProposedAction::ProcessRefund => String::new(),
        ProposedAction::RequestMoreInformation { message }
        | ProposedAction::DoneForNow { message } => format!("message: {message}"),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Object(map) => map
            .iter()
            .filter(|(key, _)| key.as_str() != "intent")
            .map(|(key, value)| format!("{key}: {}", render_scalar(value)))
            .collect::<Vec<_>>()
            .join("\n"),
        other => render_scalar(other),
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn strip_leading_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.trim_start_matches([' ', '\t']))
        .collect::<Vec<_>>()
        .join("\n")
}
