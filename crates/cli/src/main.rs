//! Steward CLI entry point.
//!
//! Threads live in JSON files so a conversation can be suspended, handed to a
//! human, and resumed from another shell.
//!
//! Commands:
//! - `init`: Seed a new thread with the user's request
//! - `render`: Print the transcript the model would see
//! - `status`: Show whether the thread is running or suspended
//! - `replay`: Run the agent loop against a scripted model
//! - `approve`: Execute the action awaiting approval
//! - `reject`: Decline the action awaiting approval
//! - `reply`: Append a human reply
//! - `config`: Show the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use steward_config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "steward",
    about = "Steward: a human-in-the-loop agent loop",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a thread seeded with a user request
    Init {
        /// Where to write the thread
        #[arg(short, long)]
        thread: PathBuf,

        /// The user's request
        #[arg(short, long)]
        message: String,

        /// Overwrite an existing thread file
        #[arg(long)]
        force: bool,
    },

    /// Print the rendered transcript
    Render {
        #[arg(short, long)]
        thread: PathBuf,
    },

    /// Show the thread's loop state
    Status {
        #[arg(short, long)]
        thread: PathBuf,
    },

    /// Run the agent loop, taking model steps from a JSONL script
    Replay {
        #[arg(short, long)]
        thread: PathBuf,

        /// One JSON action per line, e.g. {"intent":"add","a":2,"b":3}
        #[arg(short, long)]
        script: PathBuf,
    },

    /// Execute the action awaiting approval
    Approve {
        #[arg(short, long)]
        thread: PathBuf,
    },

    /// Decline the action awaiting approval
    Reject {
        #[arg(short, long)]
        thread: PathBuf,

        /// Why the action was declined (shown to the model)
        #[arg(short, long)]
        reason: String,
    },

    /// Append a human reply to a suspended thread
    Reply {
        #[arg(short, long)]
        thread: PathBuf,

        #[arg(short, long)]
        message: String,
    },

    /// Show the effective configuration
    Config {
        /// Print the built-in defaults instead
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    init_tracing(&config, cli.verbose);

    match cli.command {
        Commands::Init {
            thread,
            message,
            force,
        } => commands::init::run(&thread, message, force)?,
        Commands::Render { thread } => commands::render::run(&thread)?,
        Commands::Status { thread } => commands::status::run(&thread)?,
        Commands::Replay { thread, script } => {
            commands::replay::run(&config, &thread, &script).await?
        }
        Commands::Approve { thread } => commands::approve::approve(&config, &thread).await?,
        Commands::Reject { thread, reason } => {
            commands::approve::reject(&config, &thread, reason)?
        }
        Commands::Reply { thread, message } => commands::reply::run(&thread, message)?,
        Commands::Config { default } => commands::config_cmd::show(&config, default),
    }

    Ok(())
}

fn init_tracing(config: &AppConfig, verbose: bool) {
    let filter = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
