//! Interactive chat command

use anyhow::Result;
use chateval_core::{CancellationToken, ChatConfig, EpisodeOrchestrator};

use super::{build_bot, load_personas};
use crate::console::{CliConsole, ConsoleObserver};
use crate::human::LocalHuman;

/// Chat with the bot until [EXIT], end of input or Ctrl+C
pub async fn run(config: &ChatConfig, cancel: &CancellationToken, verbose: bool) -> Result<()> {
    let console = CliConsole::new(verbose);
    let bot = build_bot(config)?;
    let personas = load_personas(config).await?;

    let mut orchestrator =
        EpisodeOrchestrator::new(Box::new(LocalHuman::stdin()), Box::new(bot), personas)
            .with_observer(Box::new(ConsoleObserver::new(verbose)))
            .with_display_examples(config.display_examples);

    let report = orchestrator.run_interactive(cancel).await?;
    console.info(&format!(
        "Chatted for {} turns over {} finished episodes",
        report.turns, report.episodes
    ));
    console.success("Goodbye!");
    Ok(())
}
