//! Group chat orchestration with constrained speaker transitions.
//!
//! A [`GroupChat`] is a fixed set of [`Agent`]s plus a [`TransitionTable`] stating which agent
//! may speak after which, and a round cap. A [`GroupChatManager`] runs the chat:
//!
//! ```text
//! round 1   initiator's message (recorded verbatim, no model call)
//! round 2   first allowed successor of the initiator  ── Agent::generate_reply(history)
//! round 3   first allowed successor of round 2's speaker
//! ...
//! stop      when max_round messages exist, or the last speaker has no allowed successor
//! ```
//!
//! Each run starts from an empty history, every agent sees the full history so far, and the
//! first agent failure aborts the run.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tripllm::agent::Agent;
//! use tripllm::clients::groq::{GroqClient, Model};
//! use tripllm::group_chat::{GroupChat, GroupChatManager, TransitionTable};
//!
//! # async {
//! let client = Arc::new(GroqClient::new_with_model_enum("gsk-...", Model::Llama3_8b8192));
//! let agents = vec![
//!     Agent::new("asker", "Relay the question.", client.clone()),
//!     Agent::new("answerer", "Answer the question.", client),
//! ];
//! let transitions = TransitionTable::new()
//!     .allow("asker", "answerer")
//!     .terminal("answerer");
//!
//! let chat = GroupChat::new(agents, transitions, 2).unwrap();
//! let manager = GroupChatManager::new("qa", chat);
//! let result = manager.run("asker", "Where is Kyoto?").await.unwrap();
//! println!("{}", result.summary);
//! # };
//! ```

use crate::agent::Agent;
use crate::client_wrapper::{ClientError, TokenUsage};
use crate::event::{ChatEvent, EventHandler, TerminationReason};
use crate::pricing::ModelPrice;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// One turn of a group chat.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    /// Name of the agent that spoke.
    pub name: String,
    /// What it said.
    pub content: String,
    /// When the turn was recorded.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        ChatMessage {
            name: name.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Which agent may speak after which.
///
/// Successors are kept in insertion order; when several are allowed the first one is chosen.
/// A speaker without an entry, or marked [`terminal`](TransitionTable::terminal), ends the chat.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    entries: Vec<(String, Vec<String>)>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_mut(&mut self, from: &str) -> &mut Vec<String> {
        let index = match self.entries.iter().position(|(name, _)| name == from) {
            Some(index) => index,
            None => {
                self.entries.push((from.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    /// Allow `to` to speak right after `from` (builder pattern).
    pub fn allow(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        let to = to.into();
        let successors = self.entry_mut(&from);
        if !successors.contains(&to) {
            successors.push(to);
        }
        self
    }

    /// Declare that nobody may speak after `from` (builder pattern).
    pub fn terminal(mut self, from: impl Into<String>) -> Self {
        let from = from.into();
        self.entry_mut(&from).clear();
        self
    }

    /// Successors allowed after `from`, in the order they were declared.
    pub fn allowed_after(&self, from: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(name, _)| name == from)
            .map(|(_, successors)| successors.as_slice())
            .unwrap_or(&[])
    }

    /// Every agent name mentioned by the table, as a source or a target.
    pub fn mentioned_agents(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().flat_map(|(from, successors)| {
            std::iter::once(from.as_str()).chain(successors.iter().map(String::as_str))
        })
    }
}

/// Errors from configuring or running a group chat.
#[derive(Debug, Error)]
pub enum GroupChatError {
    #[error("group chat has no agents")]
    NoAgents,

    #[error("duplicate agent name: {0}")]
    DuplicateAgent(String),

    #[error("agent not found: {0}")]
    UnknownAgent(String),

    #[error("max_round must be at least 1")]
    InvalidMaxRound,

    /// An agent's model call failed; the chat was aborted at that round.
    #[error("{agent} failed in round {round}: {source}")]
    AgentFailed {
        agent: String,
        round: usize,
        #[source]
        source: ClientError,
    },
}

/// Agents, allowed transitions and the round cap.
pub struct GroupChat {
    agents: Vec<Agent>,
    transitions: TransitionTable,
    max_round: usize,
}

impl GroupChat {
    /// Validate and assemble a group chat.
    ///
    /// Fails when there are no agents, two agents share a name, the table mentions an agent
    /// that is not a member, or `max_round` is zero.
    pub fn new(
        agents: Vec<Agent>,
        transitions: TransitionTable,
        max_round: usize,
    ) -> Result<Self, GroupChatError> {
        if agents.is_empty() {
            return Err(GroupChatError::NoAgents);
        }
        if max_round == 0 {
            return Err(GroupChatError::InvalidMaxRound);
        }

        let mut names = HashSet::new();
        for agent in &agents {
            if !names.insert(agent.name.as_str()) {
                return Err(GroupChatError::DuplicateAgent(agent.name.clone()));
            }
        }
        if let Some(unknown) = transitions
            .mentioned_agents()
            .find(|name| !names.contains(name))
        {
            return Err(GroupChatError::UnknownAgent(unknown.to_string()));
        }

        Ok(GroupChat {
            agents,
            transitions,
            max_round,
        })
    }

    pub fn agent(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.name == name)
    }

    /// Agents in the order they were supplied.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    pub fn max_round(&self) -> usize {
        self.max_round
    }

    /// The speaker that follows `current`, or `None` when the chat must end.
    pub fn next_speaker(&self, current: &str) -> Option<&Agent> {
        self.transitions
            .allowed_after(current)
            .first()
            .and_then(|name| self.agent(name))
    }
}

/// Outcome of a [`GroupChatManager::run`] call.
#[derive(Debug, Clone)]
pub struct ChatResult {
    /// Every turn in order, starting with the initiator's message.
    pub chat_history: Vec<ChatMessage>,
    /// Content of the last turn.
    pub summary: String,
    /// Usage summed over every agent turn.
    pub usage: TokenUsage,
    /// `usage` priced with the manager's [`ModelPrice`], in USD.
    pub cost: f64,
    /// Number of turns recorded.
    pub rounds: usize,
    pub termination: TerminationReason,
}

impl ChatResult {
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.chat_history.last()
    }

    /// Names of the speakers in turn order.
    pub fn speakers(&self) -> Vec<&str> {
        self.chat_history.iter().map(|m| m.name.as_str()).collect()
    }
}

/// Runs a [`GroupChat`].
pub struct GroupChatManager {
    /// Identifier used in events and logs.
    pub id: String,
    group_chat: GroupChat,
    price: ModelPrice,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl GroupChatManager {
    pub fn new(id: impl Into<String>, group_chat: GroupChat) -> Self {
        GroupChatManager {
            id: id.into(),
            group_chat,
            price: ModelPrice::default(),
            event_handler: None,
        }
    }

    /// Price used to compute [`ChatResult::cost`] (builder pattern).
    pub fn with_price(mut self, price: ModelPrice) -> Self {
        self.price = price;
        self
    }

    /// Attach an [`EventHandler`] that observes every run (builder pattern).
    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    pub fn group_chat(&self) -> &GroupChat {
        &self.group_chat
    }

    async fn emit(&self, event: ChatEvent) {
        if let Some(handler) = &self.event_handler {
            handler.on_chat_event(&event).await;
        }
    }

    /// Run one conversation started by `initiator` saying `message`.
    ///
    /// The history is always fresh: nothing from earlier runs is visible to the agents.
    pub async fn run(&self, initiator: &str, message: &str) -> Result<ChatResult, GroupChatError> {
        if self.group_chat.agent(initiator).is_none() {
            return Err(GroupChatError::UnknownAgent(initiator.to_string()));
        }

        let max_round = self.group_chat.max_round;
        let mut history = vec![ChatMessage::new(initiator, message)];
        let mut usage = TokenUsage::default();
        let mut speaker = initiator.to_string();

        self.emit(ChatEvent::ChatStarted {
            chat_id: self.id.clone(),
            initiator: speaker.clone(),
            agent_count: self.group_chat.agents.len(),
            max_round,
        })
        .await;

        let termination = loop {
            if history.len() >= max_round {
                break TerminationReason::MaxRoundReached;
            }
            let agent = match self.group_chat.next_speaker(&speaker) {
                Some(agent) => agent,
                None => break TerminationReason::NoNextSpeaker,
            };
            let round = history.len() + 1;

            self.emit(ChatEvent::SpeakerSelected {
                chat_id: self.id.clone(),
                round,
                agent_name: agent.name.clone(),
                previous_speaker: speaker.clone(),
            })
            .await;

            match agent.generate_reply(&history).await {
                Ok(reply) => {
                    if let Some(turn_usage) = reply.tokens_used {
                        usage += turn_usage;
                    }
                    self.emit(ChatEvent::AgentResponded {
                        chat_id: self.id.clone(),
                        round,
                        agent_name: agent.name.clone(),
                        tokens_used: reply.tokens_used,
                        response_length: reply.content.len(),
                    })
                    .await;
                    history.push(ChatMessage::new(agent.name.as_str(), reply.content));
                }
                Err(err) => {
                    self.emit(ChatEvent::AgentFailed {
                        chat_id: self.id.clone(),
                        round,
                        agent_name: agent.name.clone(),
                        error: err.to_string(),
                    })
                    .await;
                    return Err(GroupChatError::AgentFailed {
                        agent: agent.name.clone(),
                        round,
                        source: err,
                    });
                }
            }
            speaker = agent.name.clone();
        };

        let cost = self.price.cost(&usage);
        let rounds = history.len();
        self.emit(ChatEvent::ChatCompleted {
            chat_id: self.id.clone(),
            rounds,
            total_tokens: usage.total_tokens,
            cost,
            reason: termination,
        })
        .await;

        let summary = history
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        Ok(ChatResult {
            chat_history: history,
            summary,
            usage,
            cost,
            rounds,
            termination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successors_keep_declaration_order() {
        let table = TransitionTable::new().allow("a", "b").allow("a", "c").allow("a", "b");
        assert_eq!(table.allowed_after("a"), ["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn terminal_and_unknown_speakers_have_no_successor() {
        let table = TransitionTable::new().allow("a", "b").terminal("b");
        assert!(table.allowed_after("b").is_empty());
        assert!(table.allowed_after("zzz").is_empty());
    }

    #[test]
    fn mentioned_agents_covers_sources_and_targets() {
        let table = TransitionTable::new().allow("a", "b").terminal("c");
        let names: Vec<&str> = table.mentioned_agents().collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
