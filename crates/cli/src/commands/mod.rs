//! Subcommand implementations and the thread-file helpers they share.

pub mod approve;
pub mod config_cmd;
pub mod init;
pub mod render;
pub mod replay;
pub mod reply;
pub mod status;

use std::path::Path;
use std::sync::Arc;

use steward_agent::AgentLoop;
use steward_config::AppConfig;
use steward_core::model::NextStepModel;
use steward_core::thread::Thread;
use steward_tools::Dispatcher;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Read a thread from its JSON file.
pub fn load_thread(path: &Path) -> Result<Thread, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read thread {}: {e}", path.display()))?;
    let thread = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse thread {}: {e}", path.display()))?;
    Ok(thread)
}

/// Write a thread to its JSON file, replacing the previous contents.
pub fn save_thread(path: &Path, thread: &Thread) -> CmdResult {
    let json = serde_json::to_string_pretty(thread)?;
    std::fs::write(path, json)
        .map_err(|e| format!("Failed to write thread {}: {e}", path.display()))?;
    tracing::debug!(path = %path.display(), events = thread.len(), "Thread saved");
    Ok(())
}

/// Build the agent loop described by the configuration.
pub fn build_agent(config: &AppConfig, model: Arc<dyn NextStepModel>) -> AgentLoop {
    let dispatcher = Arc::new(Dispatcher::from_mode(config.refunds.mode));
    AgentLoop::from_config(&config.agent, model, dispatcher)
}

/// One-line description of where a thread stands.
pub fn describe(thread: &Thread) -> String {
    match thread.state() {
        Ok(state) => {
            let last = thread
                .last()
                .map(|event| event.tag().to_string())
                .unwrap_or_default();
            format!("{state} (last event: {last}, {} events)", thread.len())
        }
        Err(e) => format!("invalid: {e}"),
    }
}
