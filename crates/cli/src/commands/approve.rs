//! `steward approve` / `steward reject`: settle the action awaiting approval.

use std::path::Path;
use std::sync::Arc;

use steward_config::AppConfig;
use steward_core::model::ScriptedModel;

use super::{CmdResult, build_agent, describe, load_thread, save_thread};

pub async fn approve(config: &AppConfig, path: &Path) -> CmdResult {
    // Settling an approval never consults the model.
    let agent = build_agent(config, Arc::new(ScriptedModel::default()));
    let mut thread = load_thread(path)?;

    let outcome = agent.approve(&mut thread).await;
    // A failed effect still appends its error result.
    save_thread(path, &thread)?;

    let output = outcome?;
    println!("✅ Approved");
    println!("   Result: {}", output.to_value());
    println!("   Thread: {}", describe(&thread));
    Ok(())
}

pub fn reject(config: &AppConfig, path: &Path, reason: String) -> CmdResult {
    let agent = build_agent(config, Arc::new(ScriptedModel::default()));
    let mut thread = load_thread(path)?;

    agent.reject(&mut thread, reason)?;
    save_thread(path, &thread)?;

    println!("🚫 Rejected");
    println!("   Thread: {}", describe(&thread));
    Ok(())
}
