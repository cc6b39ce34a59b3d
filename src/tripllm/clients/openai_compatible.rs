//! The `OpenAICompatibleClient` struct implements `ClientWrapper` for any endpoint speaking the
//! OpenAI Chat Completions protocol (Groq, OpenAI, self-hosted gateways), capturing both the
//! assistant response and detailed token usage for cost tracking.
//!
//! # Example
//!
//! ```rust,no_run
//! use tripllm::clients::openai_compatible::OpenAICompatibleClient;
//! use tripllm::client_wrapper::{ClientWrapper, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let secret_key = std::env::var("GROQ_API_KEY")?;
//!     let client = OpenAICompatibleClient::new(
//!         &secret_key,
//!         "llama3-8b-8192",
//!         "https://api.groq.com/openai/v1",
//!     );
//!
//!     let resp = client
//!         .send_message(&[Message::system("You are terse."), Message::user("Hello!")])
//!         .await?;
//!     println!("Assistant: {}", resp.content);
//!
//!     if let Some(usage) = client.get_last_usage() {
//!         println!("Tokens: {} in, {} out", usage.input_tokens, usage.output_tokens);
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::client_wrapper::{ClientError, ClientWrapper, Message, Role, TokenUsage};
use crate::clients::common::get_http_client;

#[derive(Serialize)]
struct ChatRequestMessage<'a> {
    role: &'static str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
    #[serde(default)]
    total_tokens: usize,
}

impl From<ChatUsage> for TokenUsage {
    fn from(usage: ChatUsage) -> Self {
        TokenUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

/// Client wrapper for OpenAI compatible Chat Completions endpoints.
///
/// The wrapper keeps the selected model identifier plus an internal [`TokenUsage`] slot so
/// callers can inspect how many tokens each request consumed. The HTTP client comes from the
/// shared pool in [`crate::clients::common`].
pub struct OpenAICompatibleClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    token_usage: Mutex<Option<TokenUsage>>,
}

impl OpenAICompatibleClient {
    /// Construct a client for `model_name` served under `base_url`
    /// (e.g. `https://api.groq.com/openai/v1`).
    pub fn new(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        OpenAICompatibleClient {
            http: get_http_client(&base_url),
            api_key: secret_key.to_string(),
            base_url,
            model: model_name.to_string(),
            token_usage: Mutex::new(None),
        }
    }

    /// Base URL requests are sent to, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn record_usage(&self, usage: Option<TokenUsage>) {
        if let Ok(mut slot) = self.token_usage.lock() {
            *slot = usage;
        }
    }
}

fn parse_completion(body: &str) -> Result<(String, Option<TokenUsage>), ClientError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| ClientError::Malformed(e.to_string()))?;
    let usage = response.usage.map(TokenUsage::from);
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(ClientError::EmptyResponse)?;
    Ok((choice.message.content.unwrap_or_default(), usage))
}

#[async_trait]
impl ClientWrapper for OpenAICompatibleClient {
    async fn send_message(&self, messages: &[Message]) -> Result<Message, ClientError> {
        let request = ChatRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|msg| ChatRequestMessage {
                    role: msg.role.as_str(),
                    content: &msg.content,
                    name: msg.name.as_deref(),
                })
                .collect(),
        };

        let url = self.completions_url();
        log::debug!(
            "OpenAICompatibleClient::send_message(...): {} messages to {} ({})",
            messages.len(),
            url,
            self.model
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;

        if !status.is_success() {
            log::error!(
                "OpenAICompatibleClient::send_message(...): HTTP {} from {}",
                status.as_u16(),
                url
            );
            self.record_usage(None);
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let (content, usage) = parse_completion(&body)?;
        self.record_usage(usage);

        Ok(Message {
            role: Role::Assistant,
            content,
            name: None,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        Some(&self.token_usage)
    }
}
