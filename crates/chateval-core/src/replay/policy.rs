//! Turn grouping modes and the per-position send table

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ChatEvalError, ChatEvalResult};

/// How many sub-turns one transcript line holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnMode {
    /// The whole line is one utterance
    Single,
    /// Two utterances joined by `</s>`
    Pair,
    /// Three utterances joined by `</s>` and `<\s>`
    Triple,
}

impl TurnMode {
    /// Resolve the mode from the `chateval_multi` / `chateval_multi_num` pair
    pub fn from_options(multi: bool, multi_num: u32) -> ChatEvalResult<Self> {
        if !multi {
            return Ok(Self::Single);
        }
        match multi_num {
            2 => Ok(Self::Pair),
            3 => Ok(Self::Triple),
            other => Err(ChatEvalError::config(format!(
                "chateval_multi_num must be 2 or 3 when chateval_multi is set, got {}",
                other
            ))),
        }
    }

    /// Number of sub-turns a line yields in this mode
    pub const fn sub_turns(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Pair => 2,
            Self::Triple => 3,
        }
    }

    /// Sends performed for the sub-turn at `position`
    pub fn sends_for(self, position: usize) -> &'static [Dispatch] {
        match (self, position) {
            (Self::Single, 0) => SCORED_ONLY,
            (Self::Pair, 1) | (Self::Triple, 2) => SCORED_THEN_RESET,
            (Self::Triple, 1) => PRIMED_THEN_RESET,
            (Self::Single, _) => &[],
            _ => RESET_ONLY,
        }
    }

    /// Agent turns one line costs in this mode
    pub fn turns_per_line(self) -> usize {
        (0..self.sub_turns()).map(|i| self.sends_for(i).len()).sum()
    }

    /// Replies written to the output per line in this mode
    pub fn records_per_line(self) -> usize {
        (0..self.sub_turns())
            .flat_map(|i| self.sends_for(i))
            .filter(|send| send.recorded)
            .count()
    }
}

impl fmt::Display for TurnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-turn", self.sub_turns())
    }
}

/// One human-surrogate send to the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    /// `episode_done` flag carried by the human turn
    pub episode_done: bool,
    /// Whether the agent's reply is written to the output sink
    pub recorded: bool,
}

impl Dispatch {
    /// Context-resetting send whose reply is discarded
    pub const TERMINAL: Self = Self {
        episode_done: true,
        recorded: false,
    };

    /// Context-extending send whose reply is discarded
    pub const CONTINUATION: Self = Self {
        episode_done: false,
        recorded: false,
    };

    /// Context-extending send whose reply is scored
    pub const CONTINUATION_RECORDED: Self = Self {
        episode_done: false,
        recorded: true,
    };
}

const SCORED_ONLY: &[Dispatch] = &[Dispatch::CONTINUATION_RECORDED];
const SCORED_THEN_RESET: &[Dispatch] = &[Dispatch::CONTINUATION_RECORDED, Dispatch::TERMINAL];
const PRIMED_THEN_RESET: &[Dispatch] = &[Dispatch::CONTINUATION, Dispatch::TERMINAL];
const RESET_ONLY: &[Dispatch] = &[Dispatch::TERMINAL];
