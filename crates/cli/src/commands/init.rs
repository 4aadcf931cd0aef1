//! `steward init`: seed a thread file with the user's request.

use std::path::Path;

use steward_core::thread::{Event, Thread};

use super::{CmdResult, save_thread};

pub fn run(path: &Path, message: String, force: bool) -> CmdResult {
    if path.exists() && !force {
        return Err(format!(
            "{} already exists (pass --force to overwrite)",
            path.display()
        )
        .into());
    }

    let thread = Thread::new([Event::user_input(message)]);
    save_thread(path, &thread)?;

    println!("🧵 Created thread {}", thread.id());
    println!("   File: {}", path.display());
    Ok(())
}
