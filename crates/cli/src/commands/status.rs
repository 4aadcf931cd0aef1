//! `steward status`: show where a thread stands.

use std::path::Path;

use steward_core::agent::LoopState;

use super::{CmdResult, load_thread};

pub fn run(path: &Path) -> CmdResult {
    let thread = load_thread(path)?;

    println!("🧵 Thread {}", thread.id());
    println!("   Created: {}", thread.created_at().format("%Y-%m-%d %H:%M:%S UTC"));
    println!("   Events:  {}", thread.len());

    let state = thread.state()?;
    println!("   State:   {state}");

    match state {
        LoopState::SuspendedForApproval => {
            if let Some(action) = thread.pending_approval() {
                println!("   Pending: {} (approve or reject it)", action.intent());
            }
        }
        LoopState::SuspendedForResponse => {
            if let Ok(last) = thread.last() {
                println!("   Waiting on a human reply to '{}'", last.tag());
            }
        }
        LoopState::Running => println!("   Ready for the next model step"),
    }

    Ok(())
}
