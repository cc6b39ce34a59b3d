//! Group chat event system.
//!
//! Implement [`EventHandler`] to observe a [`GroupChatManager`](crate::group_chat::GroupChatManager)
//! run in real time: when the chat starts, which agent is selected for each round, what each
//! agent answered (or why it failed) and how the chat ended.
//!
//! The handler has a default no-op implementation, so you only override what you care about.
//! [`LoggingEventHandler`] forwards every event to the `log` facade and is what the web server
//! installs.
//!
//! # Example
//!
//! ```rust,no_run
//! use tripllm::event::{ChatEvent, EventHandler};
//! use async_trait::async_trait;
//!
//! struct Progress;
//!
//! #[async_trait]
//! impl EventHandler for Progress {
//!     async fn on_chat_event(&self, event: &ChatEvent) {
//!         if let ChatEvent::SpeakerSelected { round, agent_name, .. } = event {
//!             println!("round {}: {} is thinking...", round, agent_name);
//!         }
//!     }
//! }
//! ```

use crate::client_wrapper::TokenUsage;
use async_trait::async_trait;

/// Events emitted by a group chat manager during a run.
///
/// ```text
/// ChatStarted
///   └─ SpeakerSelected { round: 2 } → AgentResponded { round: 2 }
///   └─ SpeakerSelected { round: 3 } → AgentResponded { round: 3 }
///   └─ ...
///   └─ (or AgentFailed, which ends the run)
/// ChatCompleted
/// ```
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// The initiator's message was recorded as round 1.
    ChatStarted {
        chat_id: String,
        initiator: String,
        agent_count: usize,
        max_round: usize,
    },

    /// The transition table picked the next speaker.
    SpeakerSelected {
        chat_id: String,
        round: usize,
        agent_name: String,
        previous_speaker: String,
    },

    /// The selected agent produced its turn.
    AgentResponded {
        chat_id: String,
        round: usize,
        agent_name: String,
        tokens_used: Option<TokenUsage>,
        response_length: usize,
    },

    /// The selected agent could not produce its turn; the run is aborted.
    AgentFailed {
        chat_id: String,
        round: usize,
        agent_name: String,
        error: String,
    },

    /// The run ended, either at the round cap or because no speaker may follow.
    ChatCompleted {
        chat_id: String,
        rounds: usize,
        total_tokens: usize,
        cost: f64,
        reason: TerminationReason,
    },
}

/// Why a group chat stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// `max_round` messages were recorded.
    MaxRoundReached,
    /// The last speaker has no allowed successor in the transition table.
    NoNextSpeaker,
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Called for every [`ChatEvent`]. The default implementation is a no-op.
    async fn on_chat_event(&self, _event: &ChatEvent) {}
}

/// Writes every [`ChatEvent`] to the `log` facade.
pub struct LoggingEventHandler;

#[async_trait]
impl EventHandler for LoggingEventHandler {
    async fn on_chat_event(&self, event: &ChatEvent) {
        match event {
            ChatEvent::ChatStarted {
                chat_id,
                initiator,
                agent_count,
                max_round,
            } => log::info!(
                "[{}] chat started by {} ({} agents, max_round={})",
                chat_id,
                initiator,
                agent_count,
                max_round
            ),
            ChatEvent::SpeakerSelected {
                chat_id,
                round,
                agent_name,
                previous_speaker,
            } => log::info!(
                "[{}] round {}: {} -> {}",
                chat_id,
                round,
                previous_speaker,
                agent_name
            ),
            ChatEvent::AgentResponded {
                chat_id,
                round,
                agent_name,
                tokens_used,
                response_length,
            } => log::debug!(
                "[{}] round {}: {} answered ({} chars, {:?})",
                chat_id,
                round,
                agent_name,
                response_length,
                tokens_used
            ),
            ChatEvent::AgentFailed {
                chat_id,
                round,
                agent_name,
                error,
            } => log::error!(
                "[{}] round {}: {} failed: {}",
                chat_id,
                round,
                agent_name,
                error
            ),
            ChatEvent::ChatCompleted {
                chat_id,
                rounds,
                total_tokens,
                cost,
                reason,
            } => log::info!(
                "[{}] chat completed after {} rounds ({:?}), {} tokens, ${:.6}",
                chat_id,
                rounds,
                reason,
                total_tokens,
                cost
            ),
        }
    }
}
