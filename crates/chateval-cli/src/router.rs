//! Command routing logic for CLI

use anyhow::Result;
use chateval_core::{CancellationToken, ChatConfig, ChatEvalError};

use crate::commands;
use crate::console::CliConsole;
use crate::signal_handler::SignalHandler;

/// Route to interactive chat or scripted replay
pub async fn route(config: ChatConfig, verbose: bool) -> Result<()> {
    config.validate()?;

    let cancel = CancellationToken::new();
    let signals = SignalHandler::start(cancel.clone())?;

    let result = if config.chat_script {
        commands::script::run(&config, &cancel, verbose).await
    } else {
        commands::interactive::run(&config, &cancel, verbose).await
    };
    signals.stop().await;

    match result {
        Err(e) if is_cancelled(&e) => {
            CliConsole::new(verbose).warn("Run cancelled; partial results were kept");
            Ok(())
        }
        other => other,
    }
}

fn is_cancelled(error: &anyhow::Error) -> bool {
    error
        .chain()
        .any(|cause| matches!(cause.downcast_ref::<ChatEvalError>(), Some(ChatEvalError::Cancelled)))
}
