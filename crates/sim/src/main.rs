//! Balance tools for the boss fight.
//!
//! Run with: `cargo run -p boss-sim -- <command>`

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Raid, Skill};

/// Balance and load simulations for the boss fight
#[derive(Parser)]
#[command(name = "boss-sim")]
#[command(about = "Offline simulations for the stream boss fight", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Print skill progression over a run of attacks
    Skill(Skill),

    /// Run a headless raid with simulated viewers
    Raid(Raid),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (SKILL_*, EVENT_*, RNG_SEED, ...)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Skill(cmd) => cmd.execute(),
        Command::Raid(cmd) => cmd.execute().await,
    }
}
