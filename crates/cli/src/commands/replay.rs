//! `steward replay`: drive a thread with model steps read from a JSONL script.
//!
//! Each non-empty line of the script is one proposed action. The thread is
//! saved whatever the outcome, so a failed run leaves its recorded events on
//! disk for inspection.

use std::path::Path;
use std::sync::Arc;

use steward_config::AppConfig;
use steward_core::model::ScriptedModel;

use super::{CmdResult, build_agent, describe, load_thread, save_thread};

pub async fn run(config: &AppConfig, thread_path: &Path, script_path: &Path) -> CmdResult {
    let script = std::fs::read_to_string(script_path)
        .map_err(|e| format!("Failed to read script {}: {e}", script_path.display()))?;
    let model = Arc::new(ScriptedModel::from_jsonl(&script));
    let agent = build_agent(config, model.clone());

    let mut thread = load_thread(thread_path)?;
    let before = thread.len();
    let outcome = agent.run(&mut thread).await;
    save_thread(thread_path, &thread)?;

    println!(
        "▶️  {} model step(s), {} new event(s)",
        model.calls(),
        thread.len() - before
    );

    match outcome {
        Ok(state) => {
            println!("   Stopped: {state}");
            println!("   Thread:  {}", describe(&thread));
            Ok(())
        }
        Err(e) => {
            println!("   ❌ {e}");
            Err(e.into())
        }
    }
}
