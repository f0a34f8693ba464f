//! Translation oracle: the external text-generation service.
//!
//! The [`Oracle`] trait is the seam between the pipeline and the network.
//! [`ChatCompletionOracle`] talks to any OpenAI-compatible
//! `/chat/completions` endpoint; [`MockOracle`] is a deterministic,
//! network-free stand-in for tests.

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

/// One request to the oracle: a system instruction plus the text payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

/// A blocking text-generation backend.
pub trait Oracle {
    /// Return the raw generated text for `request`.
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

impl<O: Oracle + ?Sized> Oracle for Rc<O> {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (**self).complete(request)
    }
}

/// Connection settings for [`ChatCompletionOracle`].
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Base URL, e.g. `https://api.siliconflow.cn/v1`.
    pub endpoint: String,
    pub model: String,
    /// Bearer credential; omitted from the request when empty.
    pub api_key: String,
    /// Send `enable_thinking: true` for reasoning models that support it.
    pub enable_thinking: bool,
    /// Skip TLS certificate validation (interception proxies).
    pub insecure_tls: bool,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    enable_thinking: Option<bool>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Client for OpenAI-compatible chat completion endpoints.
pub struct ChatCompletionOracle {
    client: Client,
    config: OracleConfig,
}

impl ChatCompletionOracle {
    /// Build the HTTP client for `config`.
    pub fn new(config: OracleConfig) -> Result<Self> {
        if config.insecure_tls {
            log::warn!("TLS certificate validation is disabled for {}", config.endpoint);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure_tls)
            .build()
            .map_err(|e| Error::OracleError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }
}

impl Oracle for ChatCompletionOracle {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            enable_thinking: self.config.enable_thinking.then_some(true),
        };

        let mut builder = self.client.post(self.url()).json(&body);
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        let response = builder
            .send()
            .map_err(|e| Error::OracleError(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(Error::OracleError(format!(
                "endpoint returned {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| Error::OracleError(format!("malformed response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::OracleError("response contained no message".to_string()))
    }
}

/// Behaviour of a [`MockOracle`].
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Prepend a marker: "Hello" → "[zh] Hello".
    Prefix(String),
    /// Fixed source → translation table; unknown inputs fail.
    Mappings(HashMap<String, String>),
    /// Every call fails with this message.
    Error(String),
}

/// Deterministic oracle for tests; records every payload it receives.
#[derive(Debug)]
pub struct MockOracle {
    mode: MockMode,
    calls: Cell<usize>,
    payloads: RefCell<Vec<String>>,
}

impl MockOracle {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            calls: Cell::new(0),
            payloads: RefCell::new(Vec::new()),
        }
    }

    /// Number of completed or failed calls.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// User payloads in call order.
    pub fn payloads(&self) -> Vec<String> {
        self.payloads.borrow().clone()
    }
}

impl Oracle for MockOracle {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        self.payloads.borrow_mut().push(request.user.clone());

        match &self.mode {
            MockMode::Prefix(prefix) => Ok(format!("{}{}", prefix, request.user)),
            MockMode::Mappings(map) => map.get(&request.user).cloned().ok_or_else(|| {
                Error::OracleError(format!("no mapping for {:?}", request.user))
            }),
            MockMode::Error(message) => Err(Error::OracleError(message.clone())),
        }
    }
}
