//! Capability contracts for conversation partners and display
//!
//! The orchestrator never knows how a partner produces its utterances; it
//! only drives the act/observe cycle defined here.

use async_trait::async_trait;

use crate::error::ChatEvalResult;
use crate::persona::Persona;
use crate::turn::TurnRecord;

/// A conversation partner driven through act/observe cycles
#[async_trait]
pub trait Agent: Send {
    /// Identifier used as the speaker id of this agent's turns
    fn id(&self) -> &str;

    /// Produce the next utterance given the observed history
    async fn act(&mut self) -> ChatEvalResult<TurnRecord>;

    /// Incorporate a partner's utterance into the history
    async fn observe(&mut self, turn: TurnRecord) -> ChatEvalResult<()>;

    /// Whether the agent's current episode has ended
    fn episode_done(&self) -> bool {
        false
    }

    /// Told once, after a scripted replay completed, that no more turns
    /// follow
    ///
    /// Defaults to observing a `[DONE]` turn. Transcript lines reading
    /// `[DONE]` arrive through [`Agent::observe`] like any other text.
    async fn finish(&mut self) -> ChatEvalResult<()> {
        self.observe(TurnRecord::done_sentinel()).await
    }
}

/// Receives conversation events for display
///
/// Every method defaults to doing nothing, so implementors only pick the
/// events they show.
#[async_trait]
pub trait ChatObserver: Send {
    /// A persona was assigned for a new episode
    async fn persona_assigned(&mut self, _persona: &Persona) {}

    /// One human/agent exchange completed
    async fn exchange(&mut self, _human: &TurnRecord, _reply: &TurnRecord) {}

    /// An episode ended and its persona was retired
    async fn episode_finished(&mut self, _persona: &Persona) {}

    /// A reply was written to the result file
    async fn reply_recorded(&mut self, _line: usize, _reply: &str) {}
}

/// Observer that shows nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

#[async_trait]
impl ChatObserver for SilentObserver {}
