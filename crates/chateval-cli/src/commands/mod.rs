//! Command implementations

pub mod interactive;
pub mod script;

use anyhow::{Context, Result};
use chateval_core::{ChatConfig, PersonaCorpus, PersonaExtractor, RemoteChatAgent};
use tracing::info;

/// Bot under evaluation, served by the configured chat endpoint
fn build_bot(config: &ChatConfig) -> Result<RemoteChatAgent> {
    let model = config.agent_model();
    info!("Using model '{}' at {}", model, config.agent.base_url);
    RemoteChatAgent::new(&config.agent, model).context("Failed to create chat agent")
}

/// Persona source backed by the configured corpus file
async fn load_personas(config: &ChatConfig) -> Result<PersonaExtractor> {
    let path = config.persona_corpus_path.as_ref().context(
        "A persona corpus is required (--persona-corpus or CHATEVAL_PERSONA_CORPUS)",
    )?;
    let corpus = PersonaCorpus::load(path)
        .await
        .with_context(|| format!("Failed to load persona corpus {}", path.display()))?;
    Ok(PersonaExtractor::new(Box::new(corpus)))
}
