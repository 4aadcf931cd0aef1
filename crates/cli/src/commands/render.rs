//! `steward render`: print the transcript exactly as the model sees it.

use std::path::Path;

use super::{CmdResult, load_thread};

pub fn run(path: &Path) -> CmdResult {
    let thread = load_thread(path)?;
    println!("{}", thread.render_context());
    Ok(())
}
