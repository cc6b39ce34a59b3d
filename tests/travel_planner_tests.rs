use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tripllm::client_wrapper::{ClientError, ClientWrapper, Message, Role};
use tripllm::config::PlannerConfig;
use tripllm::event::TerminationReason;
use tripllm::travel_team::{
    travel_transitions, PlanError, TravelPlanner, BUDGET_ANALYST, DESTINATION_EXPERT,
    ITINERARY_CREATOR, OFF_TOPIC_MESSAGE, REPORT_WRITER, SPEAKING_ORDER, USER_PROXY,
};

// Replies with a canned text per agent, picked from the system prompt.
struct ScriptedClient {
    calls: Mutex<Vec<Vec<Message>>>,
    fail: bool,
}

impl ScriptedClient {
    fn new() -> Self {
        ScriptedClient {
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    fn failing() -> Self {
        ScriptedClient {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ClientWrapper for ScriptedClient {
    async fn send_message(&self, messages: &[Message]) -> Result<Message, ClientError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        if self.fail {
            return Err(ClientError::Status {
                status: 401,
                body: "Invalid API Key".to_string(),
            });
        }
        let system = &messages[0].content;
        let reply = if system.starts_with("You are the Destination Expert") {
            "Kyoto: mild spring, temples, tea culture."
        } else if system.starts_with("You are the Itinerary Creator") {
            "Day 1: Fushimi Inari. Day 2: Arashiyama."
        } else if system.starts_with("You are the Budget Analyst") {
            "Estimated total: $2,400."
        } else if system.starts_with("You are the Report Writer") {
            "# Kyoto in 7 days\n\n**Budget**: $2,400"
        } else {
            "unexpected speaker"
        };
        Ok(Message::assistant(reply))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn planner(client: Arc<ScriptedClient>) -> TravelPlanner {
    TravelPlanner::with_client(client, &PlannerConfig::new("gsk-test")).unwrap()
}

#[tokio::test]
async fn test_full_run_visits_every_agent_once() {
    let client = Arc::new(ScriptedClient::new());
    let plan = planner(client.clone())
        .plan("Plan a 7-day trip to Kyoto for two, focusing on culture and food")
        .await
        .unwrap();

    assert_eq!(plan.chat.speakers(), SPEAKING_ORDER.to_vec());
    assert_eq!(plan.chat.termination, TerminationReason::MaxRoundReached);
    assert_eq!(client.call_count(), 4);
    assert_eq!(
        plan.final_answer(),
        Some("# Kyoto in 7 days\n\n**Budget**: $2,400")
    );
    assert_eq!(plan.transcript()[0].name, USER_PROXY);
    assert_eq!(
        plan.transcript()[0].content,
        "Plan a 7-day trip to Kyoto for two, focusing on culture and food"
    );
}

#[tokio::test]
async fn test_report_writer_sees_every_specialist() {
    let client = Arc::new(ScriptedClient::new());
    planner(client.clone())
        .plan("Plan a beach holiday in Portugal")
        .await
        .unwrap();

    let calls = client.calls.lock().unwrap();
    let last = calls.last().unwrap();
    assert_eq!(last[0].role, Role::System);
    assert!(last[0].content.starts_with("You are the Report Writer"));
    let names: Vec<&str> = last[1..]
        .iter()
        .filter_map(|m| m.name.as_deref())
        .collect();
    assert_eq!(
        names,
        vec![USER_PROXY, DESTINATION_EXPERT, ITINERARY_CREATOR, BUDGET_ANALYST]
    );
}

#[tokio::test]
async fn test_request_is_trimmed() {
    let client = Arc::new(ScriptedClient::new());
    let plan = planner(client)
        .plan("   weekend city break in Lisbon \n")
        .await
        .unwrap();
    assert_eq!(plan.request, "weekend city break in Lisbon");
    assert_eq!(plan.transcript()[0].content, "weekend city break in Lisbon");
}

#[tokio::test]
async fn test_off_topic_request_never_reaches_the_model() {
    let client = Arc::new(ScriptedClient::new());
    let err = planner(client.clone())
        .plan("What is the capital of France")
        .await
        .unwrap_err();

    assert!(matches!(err, PlanError::OffTopic));
    assert_eq!(err.to_string(), OFF_TOPIC_MESSAGE);
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_empty_request_is_rejected() {
    let client = Arc::new(ScriptedClient::new());
    let err = planner(client.clone()).plan("").await.unwrap_err();
    assert!(matches!(err, PlanError::EmptyRequest));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_whitespace_only_request_is_off_topic() {
    let client = Arc::new(ScriptedClient::new());
    let err = planner(client.clone()).plan("   \n\t").await.unwrap_err();
    assert!(matches!(err, PlanError::OffTopic));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_model_failure_is_reported() {
    let client = Arc::new(ScriptedClient::failing());
    let err = planner(client.clone())
        .plan("Plan a trip to Kyoto")
        .await
        .unwrap_err();

    assert!(matches!(err, PlanError::Chat(_)));
    let text = err.to_string();
    assert!(text.contains(DESTINATION_EXPERT));
    assert!(text.contains("Invalid API Key"));
    // the run stops at the first failing agent
    assert_eq!(client.call_count(), 1);
}

#[test]
fn test_transitions_form_a_single_chain() {
    let table = travel_transitions();
    for pair in SPEAKING_ORDER.windows(2) {
        assert_eq!(table.allowed_after(pair[0]), [pair[1].to_string()]);
    }
    assert!(table.allowed_after(REPORT_WRITER).is_empty());
}

#[test]
fn test_validate_accepts_travel_requests() {
    assert_eq!(
        TravelPlanner::validate("  Find me a hotel in Rome ").unwrap(),
        "Find me a hotel in Rome"
    );
}
