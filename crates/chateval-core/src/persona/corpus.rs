//! File-backed persona corpus
//!
//! Reads the ParlAI dialog text format: one message per line, tab separated
//! `key:value` fields, newlines inside `text` escaped as `\n`.
//!
//! ```text
//! text:your persona: i like to ski.\nhi there\tlabels:hello\tepisode_done:False
//! text:how are you?\tlabels:good\tepisode_done:True
//! ```

use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

use crate::agent::Agent;
use crate::error::{ChatEvalError, ChatEvalResult};
use crate::turn::TurnRecord;

/// Speaker id of corpus messages
pub const CORPUS_ID: &str = "convai2";

/// Persona corpus that replays its episodes in a loop
#[derive(Debug, Clone)]
pub struct PersonaCorpus {
    messages: Vec<TurnRecord>,
    cursor: usize,
    episode_done: bool,
}

impl PersonaCorpus {
    /// Load a corpus file
    pub async fn load(path: impl AsRef<Path>) -> ChatEvalResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ChatEvalError::io(format!("reading persona corpus {}", path.display()), e))?;
        let corpus = Self::parse(&content)?;
        info!(
            "Loaded persona corpus {} ({} messages, {} episodes)",
            path.display(),
            corpus.messages.len(),
            corpus.episode_count()
        );
        Ok(corpus)
    }

    /// Parse corpus text
    pub fn parse(content: &str) -> ChatEvalResult<Self> {
        let messages = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(parse_message)
            .collect();
        Self::from_messages(messages)
    }

    /// Build a corpus from already parsed messages
    ///
    /// The last message always closes an episode so that looping back to
    /// the start crosses a boundary.
    pub fn from_messages(mut messages: Vec<TurnRecord>) -> ChatEvalResult<Self> {
        let last = messages
            .pop()
            .ok_or_else(|| ChatEvalError::persona("persona corpus has no messages"))?;
        messages.push(TurnRecord::new(last.speaker_id(), last.text(), true));

        Ok(Self {
            messages,
            cursor: 0,
            episode_done: false,
        })
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of episodes in the corpus
    pub fn episode_count(&self) -> usize {
        self.messages.iter().filter(|m| m.episode_done()).count()
    }
}

#[async_trait]
impl Agent for PersonaCorpus {
    fn id(&self) -> &str {
        CORPUS_ID
    }

    async fn act(&mut self) -> ChatEvalResult<TurnRecord> {
        let message = self.messages[self.cursor].clone();
        self.cursor += 1;
        if self.cursor == self.messages.len() {
            debug!("Persona corpus exhausted, starting over");
            self.cursor = 0;
        }
        self.episode_done = message.episode_done();
        Ok(message)
    }

    async fn observe(&mut self, _turn: TurnRecord) -> ChatEvalResult<()> {
        Ok(())
    }

    fn episode_done(&self) -> bool {
        self.episode_done
    }
}

fn parse_message(line: &str) -> TurnRecord {
    let mut text = String::new();
    let mut episode_done = false;

    for field in line.split('\t') {
        if let Some(value) = field.strip_prefix("text:") {
            text = unescape(value);
        } else if let Some(value) = field.strip_prefix("episode_done:") {
            episode_done = value.trim().eq_ignore_ascii_case("true");
        }
    }

    TurnRecord::new(CORPUS_ID, text, episode_done)
}

fn unescape(value: &str) -> String {
    value.replace("\\n", "\n").replace("\\t", "\t")
}
