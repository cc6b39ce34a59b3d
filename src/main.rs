use std::env;
use std::error::Error;
use std::sync::Arc;

use tripllm::config::{resolve_bind_addr, ConfigError, PlannerConfig};
use tripllm::event::LoggingEventHandler;
use tripllm::web::{self, AppState};
use tripllm::TravelPlanner;

// Run from the root folder of the repo as follows:
// GROQ_API_KEY=your-groq-key-here cargo run
// then open http://127.0.0.1:8501

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tripllm::init_logger_with_default_filter("info");

    let (state, addr) = match PlannerConfig::from_env() {
        Ok(config) => {
            log::info!(
                "planning with {} at {} (max_round={})",
                config.model,
                config.base_url,
                config.max_round
            );
            let planner = TravelPlanner::from_config(&config)?
                .with_event_handler(Arc::new(LoggingEventHandler));
            (AppState::ready(planner), config.bind_addr)
        }
        Err(ConfigError::MissingApiKey) => {
            // keep serving so the browser shows why nothing works
            let addr = resolve_bind_addr(|key| env::var(key).ok())?;
            (
                AppState::unconfigured(ConfigError::MissingApiKey.to_string()),
                addr,
            )
        }
        Err(err) => return Err(err.into()),
    };

    web::serve(Arc::new(state), addr).await
}
