//! Bot backed by an OpenAI-compatible chat completions endpoint
//!
//! The agent keeps the observed conversation as chat history. A turn flagged
//! `episode_done` is still answered, and the history is cleared before the
//! next observed turn.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::agent::Agent;
use crate::config::AgentEndpointConfig;
use crate::error::{ChatEvalError, ChatEvalResult};
use crate::turn::TurnRecord;

/// Chat role of a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    User,
    Assistant,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Conversational agent answering through an HTTP chat endpoint
pub struct RemoteChatAgent {
    id: String,
    model: String,
    url: String,
    api_key: Option<String>,
    temperature: Option<f32>,
    http_client: Client,
    history: Vec<(Role, String)>,
    reset_pending: bool,
    episode_done: bool,
}

impl RemoteChatAgent {
    /// Create an agent for `model` served at the configured endpoint
    pub fn new(config: &AgentEndpointConfig, model: impl Into<String>) -> ChatEvalResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let model = model.into();

        Ok(Self {
            id: model.clone(),
            model,
            url: format!(
                "{}/v1/chat/completions",
                config.base_url.trim_end_matches('/')
            ),
            api_key: config.api_key(),
            temperature: config.temperature,
            http_client,
            history: Vec::new(),
            reset_pending: false,
            episode_done: false,
        })
    }

    /// Number of messages in the current episode's history
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn request_body(&self) -> Value {
        let messages: Vec<Value> = self
            .history
            .iter()
            .map(|(role, content)| json!({ "role": role.as_str(), "content": content }))
            .collect();

        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });
        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }
        body
    }

    #[instrument(skip(self), level = "debug", fields(model = %self.model))]
    async fn complete(&self) -> ChatEvalResult<String> {
        let body = self.request_body();
        let mut request = self
            .http_client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ChatEvalError::http(format!("request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ChatEvalError::http(format!(
                "chat endpoint error (status {}): {}",
                status, error_text
            )));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| ChatEvalError::http(format!("invalid chat response: {}", e)))?;
        parse_reply(&response_json)
    }
}

#[async_trait]
impl Agent for RemoteChatAgent {
    fn id(&self) -> &str {
        &self.id
    }

    async fn act(&mut self) -> ChatEvalResult<TurnRecord> {
        if !matches!(self.history.last(), Some((Role::User, _))) {
            return Err(ChatEvalError::agent(&self.id, "act called before observing a turn"));
        }

        let reply = self.complete().await?;
        debug!("'{}' replied with {} chars", self.id, reply.len());
        self.history.push((Role::Assistant, reply.clone()));
        Ok(TurnRecord::new(&self.id, reply, self.episode_done))
    }

    async fn observe(&mut self, turn: TurnRecord) -> ChatEvalResult<()> {
        if self.reset_pending {
            self.history.clear();
            self.reset_pending = false;
        }
        self.history.push((Role::User, turn.text().to_string()));
        self.episode_done = turn.episode_done();
        self.reset_pending = turn.episode_done();
        Ok(())
    }

    fn episode_done(&self) -> bool {
        self.episode_done
    }

    async fn finish(&mut self) -> ChatEvalResult<()> {
        debug!("'{}' finished, dropping {} history messages", self.id, self.history.len());
        self.history.clear();
        self.reset_pending = false;
        self.episode_done = false;
        Ok(())
    }
}

/// Pull the assistant text out of a chat completions response
fn parse_reply(response: &Value) -> ChatEvalResult<String> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| ChatEvalError::http(format!("chat response without content: {}", response)))
}
