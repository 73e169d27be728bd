//! ChatEval CLI application
//!
//! Talks to a persona-conditioned chat bot in one of two modes:
//!
//! ## 1. Interactive Mode (Default)
//! Each chat opens with a fresh persona pair from the persona corpus. The
//! bot's persona is prepended to your first message; yours is printed.
//!
//! - **Command:** `chateval --persona-corpus personas.txt`
//! - Type `[DONE]` for a new partner, `[EXIT]` or Ctrl+D to quit.
//!
//! ## 2. Script Mode
//! Replays a transcript file line by line and writes the bot's replies to
//! `{input}_{model}_{timestamp}.txt` in the output directory.
//!
//! - **Command:** `chateval --script-chateval --chateval-input-path in.txt --chateval-output-path out/`
//! - `--chateval-multi --chateval-multi-num 2|3` replays `</s>`-joined groups.

mod args;
mod commands;
mod console;
mod human;
mod router;
mod signal_handler;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::args::Cli;
use crate::console::CliConsole;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = cli.load_config()?;
    cli.apply_to(&mut config);

    // RUST_LOG wins over the configured level
    let default_level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = router::route(config, cli.verbose).await {
        CliConsole::new(cli.verbose).error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}
