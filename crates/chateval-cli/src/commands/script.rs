//! Scripted replay command

use anyhow::{Context, Result};
use chateval_core::{CancellationToken, ChatConfig, EpisodeOrchestrator, ScriptRequest};

use super::{build_bot, load_personas};
use crate::console::{CliConsole, ConsoleObserver};
use crate::human::LocalHuman;

/// Replay the configured transcript and write the bot's replies
pub async fn run(config: &ChatConfig, cancel: &CancellationToken, verbose: bool) -> Result<()> {
    let console = CliConsole::new(verbose);
    let request = ScriptRequest::from_config(config)?;
    console.info(&format!(
        "Replaying {} in {} mode",
        request.input.display(),
        request.mode
    ));

    let bot = build_bot(config)?;
    let personas = load_personas(config).await?;
    let human = LocalHuman::stdin().with_echo(false);

    let mut orchestrator = EpisodeOrchestrator::new(Box::new(human), Box::new(bot), personas)
        .with_observer(Box::new(ConsoleObserver::new(verbose)))
        .with_display_examples(config.display_examples);

    let report = orchestrator
        .run_script(&request, cancel)
        .await
        .with_context(|| format!("Replay of {} failed", request.input.display()))?;

    console.info(&format!(
        "{} lines, {} turns, {} replies recorded",
        report.lines, report.turns, report.recorded
    ));
    console.success(&format!(
        "script response complete! Results in {}",
        report.output_path.display()
    ));
    Ok(())
}
