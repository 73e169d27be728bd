//! Episode bookkeeping threaded through the orchestrator

use crate::persona::Persona;

/// Turn counters and the active persona of the running conversation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeState {
    /// Turns in the current episode
    turn_count: usize,
    /// Turns since the run started, never reset
    total_turns: usize,
    /// Whether the last exchange closed the episode
    episode_done: bool,
    /// Persona of the current episode
    persona: Option<Persona>,
    /// Completed episodes
    episodes: usize,
}

impl EpisodeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new persona is needed before the next turn
    pub fn needs_persona(&self) -> bool {
        self.turn_count == 0 && self.persona.is_none()
    }

    /// The next turn is the first of the episode
    pub fn is_first_turn(&self) -> bool {
        self.turn_count == 0
    }

    /// Install the persona of a new episode
    pub fn begin_episode(&mut self, persona: Persona) {
        self.turn_count = 0;
        self.episode_done = false;
        self.persona = Some(persona);
    }

    /// Count one completed exchange
    pub fn record_turn(&mut self, episode_done: bool) {
        self.turn_count += 1;
        self.total_turns += 1;
        self.episode_done = episode_done;
    }

    /// Close the episode, returning the persona it used
    pub fn finish_episode(&mut self) -> Option<Persona> {
        self.turn_count = 0;
        self.episode_done = false;
        self.episodes += 1;
        self.persona.take()
    }

    pub fn persona(&self) -> Option<&Persona> {
        self.persona.as_ref()
    }

    pub fn turn_count(&self) -> usize {
        self.turn_count
    }

    pub fn total_turns(&self) -> usize {
        self.total_turns
    }

    pub fn episode_done(&self) -> bool {
        self.episode_done
    }

    pub fn episodes(&self) -> usize {
        self.episodes
    }
}
