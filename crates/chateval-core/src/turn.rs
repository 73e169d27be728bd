//! Turn records exchanged between conversation partners
//!
//! A [`TurnRecord`] is built once per turn and handed to the receiving
//! agent by value. Records are never edited in place: prefixing a persona
//! produces a new record via [`TurnRecord::with_text`].

use serde::{Deserialize, Serialize};

/// Speaker id used for the human side of the conversation
pub const LOCAL_HUMAN_ID: &str = "localHuman";

/// Text a human sends to end the current chat partner
pub const DONE_SENTINEL: &str = "[DONE]";

/// One utterance in a two-party conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TurnRecord {
    /// Who produced the utterance
    #[serde(rename = "id")]
    speaker_id: String,

    /// Utterance content
    text: String,

    /// Whether this utterance closes the current episode
    #[serde(default)]
    episode_done: bool,
}

impl TurnRecord {
    /// Create a new record
    pub fn new(speaker_id: impl Into<String>, text: impl Into<String>, episode_done: bool) -> Self {
        Self {
            speaker_id: speaker_id.into(),
            text: text.into(),
            episode_done,
        }
    }

    /// A human-surrogate turn that keeps the current context
    pub fn continuation(text: impl Into<String>) -> Self {
        Self::new(LOCAL_HUMAN_ID, text, false)
    }

    /// A human-surrogate turn that closes the episode and resets context
    pub fn terminal(text: impl Into<String>) -> Self {
        Self::new(LOCAL_HUMAN_ID, text, true)
    }

    /// The `[DONE]` sentinel sent to an agent once a script is finished
    pub fn done_sentinel() -> Self {
        Self::continuation(DONE_SENTINEL)
    }

    /// Parse a record from its JSON form, rejecting unknown fields
    pub fn from_json(json: &str) -> crate::error::ChatEvalResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn speaker_id(&self) -> &str {
        &self.speaker_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn episode_done(&self) -> bool {
        self.episode_done
    }

    /// Build a copy of this record carrying different text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            speaker_id: self.speaker_id.clone(),
            text: text.into(),
            episode_done: self.episode_done,
        }
    }

    /// Build a copy of this record with the given text placed in front
    pub fn with_prefix(&self, prefix: &str) -> Self {
        self.with_text(format!("{}{}", prefix, self.text))
    }
}
