//! Episode orchestration
//!
//! [`EpisodeOrchestrator`] runs a human surrogate against a bot in one of
//! two modes:
//!
//! - **Interactive**: unbounded episodes, each opened with a fresh persona
//!   that is prepended to the human's first turn. The loop checks a
//!   [`CancellationToken`] before every turn.
//! - **Scripted batch**: a transcript is replayed line by line under a
//!   [`TurnMode`](crate::replay::TurnMode), and only the replies selected by
//!   the mode's send table are written to the result file.

mod interactive;
mod script;
mod state;

pub use interactive::InteractiveReport;
pub use script::{ScriptReport, ScriptRequest};
pub use state::EpisodeState;

use tracing::debug;

use crate::agent::{Agent, ChatObserver, SilentObserver};
use crate::error::ChatEvalResult;
use crate::persona::PersonaExtractor;
use crate::turn::TurnRecord;

pub use tokio_util::sync::CancellationToken;

/// Drives one human/bot conversation pair
pub struct EpisodeOrchestrator {
    human: Box<dyn Agent>,
    bot: Box<dyn Agent>,
    personas: PersonaExtractor,
    observer: Box<dyn ChatObserver>,
    display_examples: bool,
    state: EpisodeState,
}

impl EpisodeOrchestrator {
    /// Create an orchestrator for `human` talking to `bot`
    pub fn new(human: Box<dyn Agent>, bot: Box<dyn Agent>, personas: PersonaExtractor) -> Self {
        Self {
            human,
            bot,
            personas,
            observer: Box::new(SilentObserver),
            display_examples: false,
            state: EpisodeState::new(),
        }
    }

    /// Send conversation events to `observer`
    pub fn with_observer(mut self, observer: Box<dyn ChatObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Report every exchange to the observer
    pub fn with_display_examples(mut self, display: bool) -> Self {
        self.display_examples = display;
        self
    }

    pub fn state(&self) -> &EpisodeState {
        &self.state
    }

    /// Fetch and install the persona of a new episode
    async fn assign_persona(&mut self) -> ChatEvalResult<()> {
        let persona = self.personas.next_persona().await?;
        self.observer.persona_assigned(&persona).await;
        self.state.begin_episode(persona);
        Ok(())
    }

    /// One act/observe cycle: the bot observes `human_turn` and replies,
    /// then the human observes the reply
    async fn exchange(&mut self, human_turn: TurnRecord) -> ChatEvalResult<TurnRecord> {
        debug!(
            turn = self.state.total_turns() + 1,
            episode_done = human_turn.episode_done(),
            "Sending turn to '{}'",
            self.bot.id()
        );

        self.bot.observe(human_turn.clone()).await?;
        let reply = self.bot.act().await?;
        self.human.observe(reply.clone()).await?;

        let episode_done =
            human_turn.episode_done() || reply.episode_done() || self.bot.episode_done();
        self.state.record_turn(episode_done);

        if self.display_examples {
            self.observer.exchange(&human_turn, &reply).await;
        }
        Ok(reply)
    }
}
