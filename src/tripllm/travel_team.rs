//! The five-agent travel planning team.
//!
//! ```text
//! User_Proxy_Agent ─► Destination_Expert_Agent ─► Itinerary_Creator_Agent
//!                                                        │
//!                  Report_Writer_Agent ◄─ Budget_Analyst_Agent
//! ```
//!
//! The user proxy opens the chat with the traveller's request, each specialist hands over to
//! the next, and the report writer's turn is the plan shown to the user. The report writer has
//! no successor and `max_round` is 5, so a run is exactly one pass.

use crate::agent::Agent;
use crate::client_wrapper::ClientWrapper;
use crate::clients::groq::GroqClient;
use crate::config::PlannerConfig;
use crate::event::EventHandler;
use crate::group_chat::{
    ChatMessage, ChatResult, GroupChat, GroupChatError, GroupChatManager, TransitionTable,
};
use crate::topic_filter::{is_travel_related, matched_keyword};
use std::sync::Arc;
use thiserror::Error;

pub const USER_PROXY: &str = "User_Proxy_Agent";
pub const DESTINATION_EXPERT: &str = "Destination_Expert_Agent";
pub const ITINERARY_CREATOR: &str = "Itinerary_Creator_Agent";
pub const BUDGET_ANALYST: &str = "Budget_Analyst_Agent";
pub const REPORT_WRITER: &str = "Report_Writer_Agent";

/// Speaking order of a complete run.
pub const SPEAKING_ORDER: [&str; 5] = [
    USER_PROXY,
    DESTINATION_EXPERT,
    ITINERARY_CREATOR,
    BUDGET_ANALYST,
    REPORT_WRITER,
];

const USER_PROXY_PROMPT: &str = "You are a user proxy agent. Relay the user's travel request to the Destination Expert and present the final plan from the Report Writer.";
const DESTINATION_EXPERT_PROMPT: &str = "You are the Destination Expert. Provide detailed travel destination info based on user preferences (climate, attractions, culture). Pass to Itinerary Creator.";
const ITINERARY_CREATOR_PROMPT: &str = "You are the Itinerary Creator. Design a day-by-day travel plan with activities, accommodations, and transportation based on the destination and preferences. Pass to Budget Analyst.";
const BUDGET_ANALYST_PROMPT: &str = "You are the Budget Analyst. Estimate costs for the itinerary (flights, accommodations, activities, food) and suggest savings tips. Pass to Report Writer.";
const REPORT_WRITER_PROMPT: &str = "You are the Report Writer. Compile a comprehensive, user-friendly travel plan from the Destination Expert, Itinerary Creator, and Budget Analyst. Deliver the final plan and terminate the conversation.";

pub const OFF_TOPIC_MESSAGE: &str = "This is a traveling agent, sorry for your inconvenience. Please provide a travel-related request.";

/// The five agents in speaking order, all sharing `client`.
pub fn travel_agents(client: Arc<dyn ClientWrapper>) -> Vec<Agent> {
    vec![
        Agent::new(USER_PROXY, USER_PROXY_PROMPT, client.clone())
            .with_description("Relays the traveller's request"),
        Agent::new(DESTINATION_EXPERT, DESTINATION_EXPERT_PROMPT, client.clone())
            .with_description("Climate, attractions and culture of the destination"),
        Agent::new(ITINERARY_CREATOR, ITINERARY_CREATOR_PROMPT, client.clone())
            .with_description("Day-by-day plan"),
        Agent::new(BUDGET_ANALYST, BUDGET_ANALYST_PROMPT, client.clone())
            .with_description("Cost estimate and savings tips"),
        Agent::new(REPORT_WRITER, REPORT_WRITER_PROMPT, client)
            .with_description("Final user-facing plan"),
    ]
}

/// Linear hand-over, report writer terminal.
pub fn travel_transitions() -> TransitionTable {
    TransitionTable::new()
        .allow(USER_PROXY, DESTINATION_EXPERT)
        .allow(DESTINATION_EXPERT, ITINERARY_CREATOR)
        .allow(ITINERARY_CREATOR, BUDGET_ANALYST)
        .allow(BUDGET_ANALYST, REPORT_WRITER)
        .terminal(REPORT_WRITER)
}

/// Why a request did not produce a plan.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("empty travel request")]
    EmptyRequest,

    #[error("{}", OFF_TOPIC_MESSAGE)]
    OffTopic,

    #[error(transparent)]
    Chat(#[from] GroupChatError),
}

/// A finished travel plan: the original request and the full conversation.
#[derive(Debug, Clone)]
pub struct TravelPlan {
    pub request: String,
    pub chat: ChatResult,
}

impl TravelPlan {
    /// The report writer's turn, or whatever the last turn was if the chat ended early.
    pub fn final_answer(&self) -> Option<&str> {
        self.chat.last_message().map(|m| m.content.as_str())
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.chat.chat_history
    }
}

/// Validates requests and runs the travel team on them.
pub struct TravelPlanner {
    manager: GroupChatManager,
}

impl TravelPlanner {
    /// Build the team around any client, using the round cap and price from `config`.
    pub fn with_client(
        client: Arc<dyn ClientWrapper>,
        config: &PlannerConfig,
    ) -> Result<Self, GroupChatError> {
        let chat = GroupChat::new(travel_agents(client), travel_transitions(), config.max_round)?;
        let manager = GroupChatManager::new("travel-planner", chat).with_price(config.price);
        Ok(TravelPlanner { manager })
    }

    /// Build the team around a Groq client configured from `config`.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, GroupChatError> {
        let client = GroqClient::new_with_base_url(&config.api_key, &config.model, &config.base_url);
        Self::with_client(Arc::new(client), config)
    }

    /// Forward every chat event to `handler` (builder pattern).
    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.manager = self.manager.with_event_handler(handler);
        self
    }

    pub fn manager(&self) -> &GroupChatManager {
        &self.manager
    }

    /// Check a request without running the chat.
    ///
    /// Only a truly empty request is `EmptyRequest`; whitespace carries no travel keyword and
    /// is rejected as off topic.
    pub fn validate(request: &str) -> Result<&str, PlanError> {
        if request.is_empty() {
            return Err(PlanError::EmptyRequest);
        }
        let request = request.trim();
        if !is_travel_related(request) {
            log::info!("rejected off-topic request ({} chars)", request.len());
            return Err(PlanError::OffTopic);
        }
        if let Some(keyword) = matched_keyword(request) {
            log::debug!("request accepted on keyword '{}'", keyword);
        }
        Ok(request)
    }

    /// Validate `request` and run the team on it, the user proxy speaking first.
    pub async fn plan(&self, request: &str) -> Result<TravelPlan, PlanError> {
        let request = Self::validate(request)?;
        let chat = self.manager.run(USER_PROXY, request).await?;
        log::info!(
            "travel plan ready: {} turns, {} tokens, ${:.6}",
            chat.rounds,
            chat.usage.total_tokens,
            chat.cost
        );
        Ok(TravelPlan {
            request: request.to_string(),
            chat,
        })
    }
}
