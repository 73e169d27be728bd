//! Persona assignment for chat episodes
//!
//! A persona source is any [`Agent`] that walks through a corpus of
//! persona-labelled episodes. [`PersonaExtractor`] advances it to the start
//! of the next episode and pulls the persona lines out of that message.

mod corpus;

pub use corpus::PersonaCorpus;

use tracing::debug;

use crate::agent::Agent;
use crate::error::{ChatEvalError, ChatEvalResult};
use crate::turn::TurnRecord;

/// Prefix of persona lines assigned to the bot
pub const SELF_PERSONA_PREFIX: &str = "your persona:";

/// Prefix of persona lines describing the conversation partner
pub const PARTNER_PERSONA_PREFIX: &str = "partner's persona:";

/// Speaker id the extractor uses when acknowledging corpus messages
pub const PERSONA_LISTENER_ID: &str = "persona_listener";

/// Corpus messages read before giving up on finding an episode boundary
const MAX_ADVANCE_STEPS: usize = 100_000;

/// Personas assigned for one episode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Persona {
    preamble: String,
    partner_lines: Vec<String>,
}

impl Persona {
    /// Build a persona from the text of an episode's first message
    pub fn from_message(text: &str) -> Self {
        let mut preamble = String::new();
        let mut partner_lines = Vec::new();

        for line in text.split('\n') {
            if let Some(rest) = line.strip_prefix(PARTNER_PERSONA_PREFIX) {
                partner_lines.push(format!("{}{}", SELF_PERSONA_PREFIX, rest));
            }
            if line.starts_with(SELF_PERSONA_PREFIX) {
                preamble.push_str(line);
                preamble.push('\n');
            }
        }

        Self {
            preamble,
            partner_lines,
        }
    }

    /// Bot persona lines, each newline-terminated, prepended to the first turn
    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// Partner persona lines relabelled for the human, display only
    pub fn partner_lines(&self) -> &[String] {
        &self.partner_lines
    }

    /// Bot persona split back into lines, as shown when an episode ends
    pub fn preamble_lines(&self) -> Vec<&str> {
        self.preamble.split('\n').collect()
    }

    pub fn is_empty(&self) -> bool {
        self.preamble.is_empty() && self.partner_lines.is_empty()
    }
}

/// Pulls a fresh persona out of a persona source at each episode start
pub struct PersonaExtractor {
    source: Box<dyn Agent>,
}

impl PersonaExtractor {
    pub fn new(source: Box<dyn Agent>) -> Self {
        Self { source }
    }

    /// Advance the source past the current episode and read the next persona
    pub async fn next_persona(&mut self) -> ChatEvalResult<Persona> {
        let mut steps = 0;
        loop {
            let message = self.advance().await?;
            steps += 1;
            if message.episode_done() {
                break;
            }
            if steps >= MAX_ADVANCE_STEPS {
                return Err(ChatEvalError::persona(format!(
                    "no episode boundary in {} messages from '{}'",
                    MAX_ADVANCE_STEPS,
                    self.source.id()
                )));
            }
        }

        let first = self.advance().await?;
        let persona = Persona::from_message(first.text());
        debug!(
            "Assigned persona after {} corpus messages ({} bot lines, {} partner lines)",
            steps + 1,
            persona.preamble_lines().len().saturating_sub(1),
            persona.partner_lines().len()
        );
        Ok(persona)
    }

    /// One act/observe cycle against the source
    async fn advance(&mut self) -> ChatEvalResult<TurnRecord> {
        let message = self.source.act().await?;
        let ack = TurnRecord::new(PERSONA_LISTENER_ID, "", message.episode_done());
        self.source.observe(ack).await?;
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;

    struct ScriptedSource {
        messages: VecDeque<TurnRecord>,
        observed: usize,
    }

    impl ScriptedSource {
        fn new(messages: Vec<(&str, bool)>) -> Self {
            Self {
                messages: messages
                    .into_iter()
                    .map(|(text, done)| TurnRecord::new("convai2", text, done))
                    .collect(),
                observed: 0,
            }
        }
    }

    #[async_trait]
    impl Agent for ScriptedSource {
        fn id(&self) -> &str {
            "convai2"
        }

        async fn act(&mut self) -> ChatEvalResult<TurnRecord> {
            self.messages
                .pop_front()
                .ok_or_else(|| ChatEvalError::persona("corpus exhausted"))
        }

        async fn observe(&mut self, _turn: TurnRecord) -> ChatEvalResult<()> {
            self.observed += 1;
            Ok(())
        }
    }

    const FIRST: &str = "your persona: i like to ski.\n\
                         your persona: my wife does not like me anymore.\n\
                         partner's persona: i am a vegan.\n\
                         hi , how are you doing ?";

    #[test]
    fn test_persona_from_message() {
        let persona = Persona::from_message(FIRST);
        assert_eq!(
            persona.preamble(),
            "your persona: i like to ski.\nyour persona: my wife does not like me anymore.\n"
        );
        assert_eq!(persona.partner_lines(), &["your persona: i am a vegan.".to_string()]);
        assert!(!persona.is_empty());
    }

    #[test]
    fn test_persona_without_persona_lines() {
        let persona = Persona::from_message("hello there");
        assert_eq!(persona.preamble(), "");
        assert!(persona.is_empty());
    }

    #[tokio::test]
    async fn test_skips_to_next_episode_start() {
        let source = ScriptedSource::new(vec![
            ("your persona: stale.\nold episode", false),
            ("still old", true),
            (FIRST, false),
            ("second turn", false),
        ]);
        let mut extractor = PersonaExtractor::new(Box::new(source));

        let persona = extractor.next_persona().await.unwrap();
        assert!(persona.preamble().starts_with("your persona: i like to ski."));
    }

    #[tokio::test]
    async fn test_boundary_message_is_not_used_as_persona() {
        let source = ScriptedSource::new(vec![
            ("your persona: ends here.", true),
            ("your persona: fresh.\nhey", false),
        ]);
        let mut extractor = PersonaExtractor::new(Box::new(source));

        let persona = extractor.next_persona().await.unwrap();
        assert_eq!(persona.preamble(), "your persona: fresh.\n");
    }

    #[tokio::test]
    async fn test_repeated_calls_walk_the_corpus() {
        let source = ScriptedSource::new(vec![
            ("a", true),
            ("your persona: one.", false),
            ("b", true),
            ("your persona: two.", false),
        ]);
        let mut extractor = PersonaExtractor::new(Box::new(source));

        assert_eq!(extractor.next_persona().await.unwrap().preamble(), "your persona: one.\n");
        assert_eq!(extractor.next_persona().await.unwrap().preamble(), "your persona: two.\n");
    }

    #[tokio::test]
    async fn test_source_errors_propagate() {
        let source = ScriptedSource::new(vec![("no boundary", false)]);
        let mut extractor = PersonaExtractor::new(Box::new(source));

        let err = extractor.next_persona().await.unwrap_err();
        assert!(matches!(err, ChatEvalError::Persona(_)));
    }
}
