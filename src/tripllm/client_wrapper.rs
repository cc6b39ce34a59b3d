use async_trait::async_trait;
use std::ops::AddAssign;
use std::sync::Mutex;
use thiserror::Error;

/// A ClientWrapper is a wrapper around a specific hosted LLM service.
/// It provides a common interface to interact with the LLMs.
/// It does not keep track of the conversation, for that we use a
/// [`GroupChat`](crate::group_chat::GroupChat) which owns the chat history
/// and hands it to each [`Agent`](crate::agent::Agent) when it is their turn.
// src/tripllm/client_wrapper.rs

/// Represents the possible roles for a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    // set by the developer to steer the model's responses
    System,
    // a message sent by a human user, or by another agent in a group chat
    User,
    // lets the model know the content was generated as a response to a user message
    Assistant,
}

impl Role {
    /// The wire name used by OpenAI compatible chat endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// How many tokens were spent on prompt vs. completion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub total_tokens: usize,
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// Represents a generic message to be sent to an LLM.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// The role associated with the message.
    pub role: Role,
    /// The actual content of the message.
    pub content: String,
    /// Optional speaker name. Group chats tag every turn with the agent that produced it.
    pub name: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Message {
            role,
            content: content.into(),
            name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Attach the speaker name (builder pattern).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Failures surfaced by a [`ClientWrapper`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-success status code.
    #[error("LLM endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The body could not be decoded as a chat completion.
    #[error("malformed chat completion: {0}")]
    Malformed(String),

    /// The completion carried no choices.
    #[error("chat completion contained no choices")]
    EmptyResponse,

    /// Catch-all used by mocks and wrappers around other clients.
    #[error("{0}")]
    Other(String),
}

/// Trait defining the interface to interact with various LLM services.
#[async_trait]
pub trait ClientWrapper: Send + Sync {
    /// Send the messages to the LLM and get the assistant's reply.
    async fn send_message(&self, messages: &[Message]) -> Result<Message, ClientError>;

    /// Name of the model each request is addressed to.
    fn model_name(&self) -> &str;

    /// Hook to retrieve usage from the *last* send_message() call.
    /// Default impl reads [`usage_slot`](ClientWrapper::usage_slot) so wrappers
    /// that do not track usage simply return `None`.
    fn get_last_usage(&self) -> Option<TokenUsage> {
        self.usage_slot()
            .and_then(|slot| slot.lock().ok().and_then(|usage| *usage))
    }

    /// Clients supporting usage tracking return their slot by overriding this method.
    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        None
    }
}
