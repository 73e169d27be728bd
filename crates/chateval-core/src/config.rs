//! Configuration for chat and replay runs
//!
//! Values come from, in increasing priority: built-in defaults, a JSON
//! config file, `CHATEVAL_*` environment variables, and command-line flags
//! (applied by the CLI on top of the loaded config).

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{ChatEvalError, ChatEvalResult};
use crate::replay::TurnMode;
use crate::replay::naming::short_model_name;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "chateval.json";

/// Model used when none is configured
pub const DEFAULT_MODEL_FILE: &str = "models:convai2/kvmemnn/model";

/// Chat and replay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Print every exchange
    #[serde(default)]
    pub display_examples: bool,

    /// Run the scripted batch replay instead of an interactive chat
    #[serde(default)]
    pub chat_script: bool,

    /// Transcript to replay (required with `chat_script`)
    #[serde(default)]
    pub script_input_path: Option<PathBuf>,

    /// Directory receiving the result file (required with `chat_script`)
    #[serde(default)]
    pub script_output_path: Option<PathBuf>,

    /// Group several sub-turns per transcript line
    #[serde(default)]
    pub chateval_multi: bool,

    /// Sub-turns per line when `chateval_multi` is set (2 or 3)
    #[serde(default)]
    pub chateval_multi_num: u32,

    /// Model identifier, also used to name result files
    #[serde(default = "default_model_file")]
    pub model_file: String,

    /// ParlAI-format persona corpus
    #[serde(default)]
    pub persona_corpus_path: Option<PathBuf>,

    /// Remote chat agent settings
    #[serde(default)]
    pub agent: AgentEndpointConfig,

    /// Log level used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_model_file() -> String {
    DEFAULT_MODEL_FILE.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            display_examples: false,
            chat_script: false,
            script_input_path: None,
            script_output_path: None,
            chateval_multi: false,
            chateval_multi_num: 0,
            model_file: default_model_file(),
            persona_corpus_path: None,
            agent: AgentEndpointConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// Input and output locations of a scripted replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPaths {
    pub input: PathBuf,
    pub output_dir: PathBuf,
}

impl ChatConfig {
    /// Load a JSON config file; a missing file yields the defaults
    pub fn from_file(path: impl AsRef<Path>) -> ChatEvalResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ChatEvalError::io(format!("reading config {}", path.display()), e))?;
        serde_json::from_str(&content).map_err(|e| {
            ChatEvalError::config(format!("invalid config file {}: {}", path.display(), e))
        })
    }

    /// Load `path` if it exists, else `~/.chateval/config.json`, then apply
    /// environment overrides
    pub fn load(path: impl AsRef<Path>) -> ChatEvalResult<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            match global_config_path().filter(|p| p.exists()) {
                Some(global) => Self::from_file(global)?,
                None => Self::default(),
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Load a config file the user named explicitly, then apply environment
    /// overrides; unlike [`ChatConfig::load`] a missing file is an error
    pub fn load_explicit(path: impl AsRef<Path>) -> ChatEvalResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ChatEvalError::config(format!(
                "config file {} not found",
                path.display()
            )));
        }
        let mut config = Self::from_file(path)?;
        config.apply_env();
        Ok(config)
    }

    /// Override fields from `CHATEVAL_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(model) = env::var("CHATEVAL_MODEL_FILE") {
            self.model_file = model;
        }
        if let Ok(corpus) = env::var("CHATEVAL_PERSONA_CORPUS") {
            self.persona_corpus_path = Some(PathBuf::from(corpus));
        }
        if let Ok(endpoint) = env::var("CHATEVAL_AGENT_URL") {
            self.agent.base_url = endpoint;
        }
        if let Ok(model) = env::var("CHATEVAL_AGENT_MODEL") {
            self.agent.model = Some(model);
        }
        if let Ok(level) = env::var("CHATEVAL_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    /// Grouping mode selected by `chateval_multi` / `chateval_multi_num`
    pub fn turn_mode(&self) -> ChatEvalResult<TurnMode> {
        TurnMode::from_options(self.chateval_multi, self.chateval_multi_num)
    }

    /// Replay locations, required in script mode
    pub fn script_paths(&self) -> ChatEvalResult<ScriptPaths> {
        let input = self
            .script_input_path
            .clone()
            .ok_or_else(|| ChatEvalError::config("script_input_path is required in script mode"))?;
        let output_dir = self.script_output_path.clone().ok_or_else(|| {
            ChatEvalError::config("script_output_path is required in script mode")
        })?;
        Ok(ScriptPaths { input, output_dir })
    }

    /// Model name sent to the chat endpoint
    pub fn agent_model(&self) -> String {
        self.agent
            .model
            .clone()
            .unwrap_or_else(|| short_model_name(&self.model_file))
    }

    /// Check the combination of options before a run starts
    pub fn validate(&self) -> ChatEvalResult<()> {
        if self.model_file.trim().is_empty() {
            return Err(ChatEvalError::config("model_file must not be empty"));
        }
        if self.chat_script {
            self.script_paths()?;
            self.turn_mode()?;
        }
        self.agent.validate()
    }
}

/// Settings of the OpenAI-compatible chat endpoint used as the bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEndpointConfig {
    /// Base URL; `/v1/chat/completions` is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name sent to the endpoint; defaults to the short model name
    #[serde(default)]
    pub model: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_api_key_env() -> String {
    "CHATEVAL_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for AgentEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: None,
            api_key_env: default_api_key_env(),
            temperature: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AgentEndpointConfig {
    /// API key read from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env).ok().filter(|k| !k.trim().is_empty())
    }

    fn validate(&self) -> ChatEvalResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ChatEvalError::config(format!(
                "agent base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ChatEvalError::config("agent timeout_secs must be positive"));
        }
        Ok(())
    }
}

/// `~/.chateval/config.json`
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".chateval").join("config.json"))
}
