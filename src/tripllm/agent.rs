//! Conversable agents.
//!
//! An [`Agent`] is a named configuration record: a system message plus the LLM client it talks
//! to. Agents never ask a human for input and hold no conversation state of their own; the
//! [`GroupChatManager`](crate::group_chat::GroupChatManager) hands them the shared chat history
//! whenever it is their turn.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tripllm::agent::Agent;
//! use tripllm::clients::groq::{GroqClient, Model};
//!
//! let client = Arc::new(GroqClient::new_with_model_enum("gsk-...", Model::Llama3_8b8192));
//! let expert = Agent::new(
//!     "Destination_Expert_Agent",
//!     "You are the Destination Expert.",
//!     client,
//! );
//! assert_eq!(expert.name, "Destination_Expert_Agent");
//! ```

use crate::client_wrapper::{ClientError, ClientWrapper, Message, Role, TokenUsage};
use crate::group_chat::ChatMessage;
use std::sync::Arc;

/// Text and accounting produced by one agent turn.
#[derive(Debug, Clone)]
pub struct AgentReply {
    /// The reply content, exactly as the model returned it.
    pub content: String,
    /// Usage reported by the client for this turn, if any.
    pub tokens_used: Option<TokenUsage>,
}

/// One role in a group chat.
pub struct Agent {
    /// Unique speaker name. Used in the transition table and shown in the transcript.
    pub name: String,
    /// System prompt sent ahead of the chat history on every turn.
    pub system_message: String,
    /// Optional short description, useful for logging and UI surfaces.
    pub description: Option<String>,
    client: Arc<dyn ClientWrapper>,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        system_message: impl Into<String>,
        client: Arc<dyn ClientWrapper>,
    ) -> Self {
        Agent {
            name: name.into(),
            system_message: system_message.into(),
            description: None,
            client,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn client(&self) -> &Arc<dyn ClientWrapper> {
        &self.client
    }

    /// Build the request for this agent's turn.
    ///
    /// The system message comes first, followed by every chat turn in order. Turns spoken by
    /// this agent are sent as `assistant`; everybody else's as `user`, tagged with the name of
    /// the agent that said it.
    pub fn build_prompt(&self, history: &[ChatMessage]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(self.system_message.as_str()));
        for turn in history {
            let role = if turn.name == self.name {
                Role::Assistant
            } else {
                Role::User
            };
            messages.push(Message::new(role, turn.content.as_str()).with_name(turn.name.as_str()));
        }
        messages
    }

    /// Ask the model for this agent's next turn given the whole group history.
    pub async fn generate_reply(&self, history: &[ChatMessage]) -> Result<AgentReply, ClientError> {
        let prompt = self.build_prompt(history);
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "Agent::generate_reply(): {} sending {} messages to {}",
                self.name,
                prompt.len(),
                self.client.model_name()
            );
        }

        let response = self.client.send_message(&prompt).await?;
        Ok(AgentReply {
            content: response.content,
            tokens_used: self.client.get_last_usage(),
        })
    }
}
