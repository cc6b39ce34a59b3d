//! # tripllm
//!
//! tripllm is a single-page AI travel planner. A free-text travel request is checked against a
//! list of travel keywords and then handed to a fixed group chat of five LLM agents:
//!
//! ```text
//! User_Proxy_Agent → Destination_Expert_Agent → Itinerary_Creator_Agent
//!                  → Budget_Analyst_Agent → Report_Writer_Agent
//! ```
//!
//! The report writer's turn is the plan shown to the user; the whole conversation is available
//! as a transcript.
//!
//! The crate is layered the following way:
//!
//! * **Clients**: [`ClientWrapper`] is the provider-neutral chat interface;
//!   [`clients::groq::GroqClient`] implements it over Groq's OpenAI compatible endpoint.
//! * **Agents**: an [`Agent`] is a name, a system message and a client.
//! * **Group chat**: [`group_chat::GroupChatManager`] runs agents in the order allowed by a
//!   [`group_chat::TransitionTable`], up to a round cap, emitting [`event::ChatEvent`]s.
//! * **Travel team**: [`TravelPlanner`] wires the five agents together and gates requests with
//!   [`topic_filter::is_travel_related`].
//! * **Web**: [`web::router`] serves the form and renders results per browser session.
//!
//! ## Getting Started
//!
//! ```rust,no_run
//! use tripllm::config::PlannerConfig;
//! use tripllm::TravelPlanner;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     tripllm::init_logger();
//!
//!     let config = PlannerConfig::from_env()?;
//!     let planner = TravelPlanner::from_config(&config)?;
//!
//!     let plan = planner
//!         .plan("Plan a 7-day trip to Kyoto for two, focusing on culture and food.")
//!         .await?;
//!
//!     println!("{}", plan.final_answer().unwrap_or_default());
//!     for turn in plan.transcript() {
//!         println!("{}: {} chars", turn.name, turn.content.len());
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// ```rust
/// tripllm::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

/// Like [`init_logger`], but falls back to `default_filter` when `RUST_LOG` is unset.
///
/// ```rust
/// tripllm::init_logger_with_default_filter("info");
/// ```
pub fn init_logger_with_default_filter(default_filter: &str) {
    INIT_LOGGER.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
            .init();
    });
}

// Import the top-level `tripllm` module.
pub mod tripllm;

// Re-exporting key items for easier external access.
pub use tripllm::agent;
pub use tripllm::agent::Agent;
pub use tripllm::client_wrapper;
pub use tripllm::client_wrapper::{ClientError, ClientWrapper, Message, Role, TokenUsage};
pub use tripllm::clients;
pub use tripllm::config;
pub use tripllm::config::PlannerConfig;
pub use tripllm::event;
pub use tripllm::group_chat;
pub use tripllm::pricing;
pub use tripllm::topic_filter;
pub use tripllm::travel_team;
pub use tripllm::travel_team::{PlanError, TravelPlan, TravelPlanner};
pub use tripllm::web;
