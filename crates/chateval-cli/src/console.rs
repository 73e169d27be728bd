//! CLI console utilities

use async_trait::async_trait;
use chateval_core::{ChatObserver, Persona, TurnRecord};
use colored::*;

/// CLI console for formatted output
pub struct CliConsole {
    verbose: bool,
}

impl CliConsole {
    /// Create a new CLI console
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.verbose {
            println!("{} {}", "ℹ".blue().bold(), message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message.green());
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        println!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }
}

/// Prints personas, exchanges and episode endings to the terminal
pub struct ConsoleObserver {
    console: CliConsole,
}

impl ConsoleObserver {
    pub fn new(verbose: bool) -> Self {
        Self {
            console: CliConsole::new(verbose),
        }
    }
}

#[async_trait]
impl ChatObserver for ConsoleObserver {
    async fn persona_assigned(&mut self, persona: &Persona) {
        for line in persona.partner_lines() {
            println!("{}", line.cyan());
        }
        println!("Enter [DONE] if you want a new partner at any time.");
    }

    async fn exchange(&mut self, human: &TurnRecord, reply: &TurnRecord) {
        println!("{}", "---".dimmed());
        println!("{}", display_exchange(human, reply));
    }

    async fn episode_finished(&mut self, persona: &Persona) {
        println!("{}", "CHAT DONE ".bold());
        println!("In case you were curious you were talking to this bot:");
        println!("{:?}", persona.preamble_lines());
        println!("\n... preparing new chat... \n");
    }

    async fn reply_recorded(&mut self, line: usize, reply: &str) {
        self.console
            .info(&format!("line {}: {}", line, reply.dimmed()));
    }
}

/// Both sides of one exchange, the human turn unindented
fn display_exchange(human: &TurnRecord, reply: &TurnRecord) -> String {
    let mut lines = Vec::new();
    for (i, line) in human.text().split('\n').enumerate() {
        if i == 0 {
            lines.push(format!("[{}]: {}", human.speaker_id(), line));
        } else {
            lines.push(line.to_string());
        }
    }
    let done = if human.episode_done() || reply.episode_done() {
        " [episode done]"
    } else {
        ""
    };
    lines.push(format!(
        "   [{}]: {}{}",
        reply.speaker_id(),
        reply.text(),
        done
    ));
    lines.join("\n")
}
