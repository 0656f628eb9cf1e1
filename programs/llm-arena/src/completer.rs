//! Completion service boundary
//!
//! The engine only ever sees a successful batch of new turns or a fatal
//! [`CompletionError`]. Transient provider failures are retried here.

use std::time::Duration;

use async_trait::async_trait;
use game_logic::{Message, Speaker};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;
use crate::state::ModelSetup;

/// Produces the model's next turn(s) for a conversation prefix
#[async_trait]
pub trait Completer: Send + Sync {
    /// Return `n` alternative next turns for `messages`
    async fn complete(
        &self,
        messages: &[Message],
        model: &ModelSetup,
        n: usize,
    ) -> Result<Vec<Message>, CompletionError>;
}

/// Connection settings of an OpenAI-compatible chat completion endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Environment variable holding the bearer token
    pub api_key_env: String,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_retries: 5,
            initial_backoff_ms: 500,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
    n: usize,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Outcome of a single HTTP attempt
enum Attempt {
    Done(Vec<Message>),
    Transient(String),
    Fatal(CompletionError),
}

/// Chat completion client with bounded exponential backoff
pub struct OpenAiCompleter {
    client: reqwest::Client,
    api_key: String,
    config: ApiConfig,
}

impl OpenAiCompleter {
    pub fn new(config: ApiConfig, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            config,
        }
    }

    /// Read the API key from the configured environment variable
    pub fn from_env(config: ApiConfig) -> Result<Self, CompletionError> {
        let key = std::env::var(&config.api_key_env)
            .map_err(|_| CompletionError::Transport(format!("{} is not set", config.api_key_env)))?;
        Ok(Self::new(config, key))
    }

    async fn attempt(&self, request: &ChatRequest<'_>) -> Attempt {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let response = match self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Attempt::Transient(e.to_string()),
        };

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            return Attempt::Transient(format!("status {status}"));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Attempt::Fatal(CompletionError::Rejected { status: status.as_u16(), body });
        }

        match response.json::<ChatResponse>().await {
            Ok(parsed) => Attempt::Done(
                parsed
                    .choices
                    .into_iter()
                    .map(|c| {
                        Message::new(Speaker::Assistant, c.message.content.unwrap_or_default())
                    })
                    .collect(),
            ),
            Err(e) => Attempt::Fatal(CompletionError::Malformed(e.to_string())),
        }
    }
}

#[async_trait]
impl Completer for OpenAiCompleter {
    async fn complete(
        &self,
        messages: &[Message],
        model: &ModelSetup,
        n: usize,
    ) -> Result<Vec<Message>, CompletionError> {
        let request = ChatRequest {
            model: &model.model,
            messages,
            temperature: model.temperature,
            max_tokens: model.max_tokens,
            n,
        };
        let attempts = self.config.max_retries + 1;
        let mut backoff = Duration::from_millis(self.config.initial_backoff_ms);
        let mut last = String::new();

        for attempt in 1..=attempts {
            debug!(
                "completion request for {} ({} messages), attempt {}",
                model.model,
                messages.len(),
                attempt
            );
            match self.attempt(&request).await {
                Attempt::Done(turns) => return Ok(turns),
                Attempt::Fatal(e) => return Err(e),
                Attempt::Transient(reason) => {
                    warn!("transient completion failure ({reason}), attempt {attempt}/{attempts}");
                    last = reason;
                    if attempt < attempts {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }
        Err(CompletionError::RetriesExhausted { attempts, last })
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Replies from a script, then repeats `fallback`; fails on call `fail_on`
    pub struct ScriptedCompleter {
        script: Mutex<VecDeque<String>>,
        fallback: String,
        fail_on: Option<usize>,
        calls: AtomicUsize,
    }

    impl ScriptedCompleter {
        pub fn new(script: &[&str], fallback: &str) -> Self {
            Self {
                script: Mutex::new(script.iter().map(|s| s.to_string()).collect()),
                fallback: fallback.to_string(),
                fail_on: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn repeating(reply: &str) -> Self {
            Self::new(&[], reply)
        }

        /// Fail with an exhausted-retries error on the given call (0-indexed)
        pub fn failing_on(mut self, call: usize) -> Self {
            self.fail_on = Some(call);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Completer for ScriptedCompleter {
        async fn complete(
            &self,
            _messages: &[Message],
            _model: &ModelSetup,
            n: usize,
        ) -> Result<Vec<Message>, CompletionError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(call) {
                return Err(CompletionError::RetriesExhausted {
                    attempts: 3,
                    last: "status 503".into(),
                });
            }
            let reply = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone());
            Ok(vec![Message::assistant(reply); n])
        }
    }
}
