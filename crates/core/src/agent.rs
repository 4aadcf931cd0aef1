//! Agent configuration and loop state types.

use serde::{Deserialize, Serialize};

/// Configuration for the agent loop's behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Name of the agent working this conversation (appears in logs and events)
    #[serde(default = "default_name")]
    pub name: String,

    /// Maximum model calls per `run` before giving up (safety limit)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Timeout around each model call, in seconds. `None` disables it; in
    /// TOML it is written as `0`.
    #[serde(
        default = "default_model_timeout_secs",
        with = "zero_disables"
    )]
    pub model_timeout_secs: Option<u64>,
}

fn default_name() -> String {
    "steward".into()
}
fn default_max_iterations() -> u32 {
    25
}
fn default_model_timeout_secs() -> Option<u64> {
    Some(60)
}

/// Serde adapter: `0` reads as `None`, and `None` writes as `0`.
mod zero_disables {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(secs: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(secs.unwrap_or(0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.filter(|&secs| secs > 0))
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            max_iterations: default_max_iterations(),
            model_timeout_secs: default_model_timeout_secs(),
        }
    }
}

/// Where the agent loop stands, as decided by the thread's last event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    /// Actively cycling; the next step is to ask the model.
    Running,
    /// Waiting for a free-text reply, or the agent reported it is done.
    SuspendedForResponse,
    /// Waiting for a human to authorize the last proposed action.
    SuspendedForApproval,
}

impl LoopState {
    pub fn is_suspended(self) -> bool {
        !matches!(self, LoopState::Running)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LoopState::Running => "running",
            LoopState::SuspendedForResponse => "suspended_for_response",
            LoopState::SuspendedForApproval => "suspended_for_approval",
        }
    }
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
