//! ChatEval Core Library
//!
//! This crate provides the core functionality for ChatEval, including
//! persona-aware interactive episodes, scripted multi-turn transcript
//! replay, and the HTTP chat agent used as the bot under evaluation.

pub mod agent;
pub mod agents;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod persona;
pub mod replay;
pub mod turn;

// Re-export commonly used types
pub use agent::{Agent, ChatObserver, SilentObserver};
pub use agents::RemoteChatAgent;
pub use config::{AgentEndpointConfig, ChatConfig, ScriptPaths};
pub use error::{ChatEvalError, ChatEvalResult};
pub use orchestrator::{
    CancellationToken, EpisodeOrchestrator, EpisodeState, InteractiveReport, ScriptReport,
    ScriptRequest,
};
pub use persona::{Persona, PersonaCorpus, PersonaExtractor};
pub use replay::{OutputSink, TurnMode};
pub use turn::{DONE_SENTINEL, LOCAL_HUMAN_ID, TurnRecord};
