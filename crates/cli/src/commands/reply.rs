//! `steward reply`: answer a thread that is waiting on a human.

use std::path::Path;

use steward_core::agent::LoopState;
use steward_core::thread::Event;

use super::{CmdResult, describe, load_thread, save_thread};

pub fn run(path: &Path, message: String) -> CmdResult {
    let mut thread = load_thread(path)?;

    if thread.state()? == LoopState::SuspendedForApproval {
        tracing::warn!(
            "Replying to a thread awaiting approval; the pending action stays unexecuted"
        );
    }

    thread.append(Event::human_response(message));
    save_thread(path, &thread)?;

    println!("💬 Reply recorded");
    println!("   Thread: {}", describe(&thread));
    Ok(())
}
