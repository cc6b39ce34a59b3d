use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;
use tripllm::client_wrapper::{ClientError, ClientWrapper, Message};
use tripllm::config::{PlannerConfig, MISSING_API_KEY_MESSAGE};
use tripllm::travel_team::{TravelPlanner, OFF_TOPIC_MESSAGE};
use tripllm::web::render::{RESULT_HEADER, SUBMIT_LABEL};
use tripllm::web::session::SESSION_COOKIE;
use tripllm::web::{router, AppState};

struct StubClient {
    calls: AtomicUsize,
    fail: AtomicBool,
}

#[async_trait]
impl ClientWrapper for StubClient {
    async fn send_message(&self, messages: &[Message]) -> Result<Message, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ClientError::Status {
                status: 401,
                body: "Invalid API Key".to_string(),
            });
        }
        if messages[0].content.starts_with("You are the Report Writer") {
            Ok(Message::assistant("# Kyoto in 7 days\n\nTemples and tea."))
        } else {
            Ok(Message::assistant("specialist notes"))
        }
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

fn state(fail: bool) -> (Arc<AppState>, Arc<StubClient>) {
    let client = Arc::new(StubClient {
        calls: AtomicUsize::new(0),
        fail: AtomicBool::new(fail),
    });
    let planner =
        TravelPlanner::with_client(client.clone(), &PlannerConfig::new("gsk-test")).unwrap();
    (Arc::new(AppState::ready(planner)), client)
}

fn get(cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post(request: &str, cookie: Option<&str>) -> Request<Body> {
    let body = format!("request={}", request.replace(' ', "+"));
    let mut builder = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// `name=value` part of the session `Set-Cookie` header.
fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

#[tokio::test]
async fn test_get_renders_the_form_and_sets_a_session() {
    let (state, _) = state(false);
    let response = router(state).oneshot(get(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).unwrap();
    assert!(cookie.starts_with(&format!("{}=", SESSION_COOKIE)));

    let body = body_text(response).await;
    assert!(body.contains("AI Travel Planner"));
    assert!(body.contains("<form"));
    assert!(body.contains(SUBMIT_LABEL));
    assert!(!body.contains(RESULT_HEADER));
}

#[tokio::test]
async fn test_unconfigured_server_only_shows_the_error() {
    let state = Arc::new(AppState::unconfigured(MISSING_API_KEY_MESSAGE));

    let response = router(state.clone()).oneshot(get(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_text(response).await;
    assert!(body.contains("GROQ_API_KEY not found."));
    assert!(!body.contains("<form"));

    let response = router(state)
        .oneshot(post("Plan a trip to Kyoto", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_off_topic_request_shows_the_banner() {
    let (state, client) = state(false);
    let response = router(state)
        .oneshot(post("What is the capital of France", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(OFF_TOPIC_MESSAGE));
    assert!(!body.contains(RESULT_HEADER));
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_successful_plan_renders_answer_and_transcript() {
    let (state, client) = state(false);
    let response = router(state)
        .oneshot(post("Plan a 7-day trip to Kyoto", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(RESULT_HEADER));
    assert!(body.contains("<h1>Kyoto in 7 days</h1>"));
    assert!(body.contains("View Conversation History"));
    assert!(body.contains("<strong>Budget_Analyst_Agent</strong>"));
    // the request is put back into the textarea
    assert!(body.contains("Plan a 7-day trip to Kyoto</textarea>"));
    assert_eq!(client.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_failed_plan_shows_error_and_hint() {
    let (state, _) = state(true);
    let response = router(state)
        .oneshot(post("Plan a trip to Kyoto", None))
        .await
        .unwrap();

    let body = body_text(response).await;
    assert!(body.contains("An error occurred:"));
    assert!(body.contains("Invalid API Key"));
    assert!(body.contains("<code>GROQ_API_KEY</code>"));
    assert!(!body.contains(RESULT_HEADER));
}

#[tokio::test]
async fn test_plan_is_kept_for_the_session() {
    let (state, _) = state(false);
    let app = router(state);

    let response = app
        .clone()
        .oneshot(post("Plan a trip to Kyoto", None))
        .await
        .unwrap();
    let cookie = session_cookie(&response).unwrap();

    let response = app.clone().oneshot(get(Some(&cookie))).await.unwrap();
    // a known session gets no new cookie
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let body = body_text(response).await;
    assert!(body.contains("<h1>Kyoto in 7 days</h1>"));

    // other browsers do not see it
    let body = body_text(app.oneshot(get(None)).await.unwrap()).await;
    assert!(!body.contains(RESULT_HEADER));
}

#[tokio::test]
async fn test_empty_submission_keeps_the_previous_plan() {
    let (state, client) = state(false);
    let app = router(state);

    let response = app
        .clone()
        .oneshot(post("Plan a trip to Kyoto", None))
        .await
        .unwrap();
    let cookie = session_cookie(&response).unwrap();

    let response = app.oneshot(post("", Some(&cookie))).await.unwrap();
    let body = body_text(response).await;
    assert!(body.contains(RESULT_HEADER));
    assert!(!body.contains("class=\"error\""));
    assert_eq!(client.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_whitespace_only_request_is_off_topic() {
    let (state, client) = state(false);
    let response = router(state).oneshot(post("   ", None)).await.unwrap();

    let body = body_text(response).await;
    assert!(body.contains(OFF_TOPIC_MESSAGE));
    assert!(!body.contains(RESULT_HEADER));
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_off_topic_submission_hides_but_keeps_the_plan() {
    let (state, _) = state(false);
    let app = router(state);

    let response = app
        .clone()
        .oneshot(post("Plan a trip to Kyoto", None))
        .await
        .unwrap();
    let cookie = session_cookie(&response).unwrap();

    let response = app
        .clone()
        .oneshot(post("What is the capital of France", Some(&cookie)))
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains(OFF_TOPIC_MESSAGE));
    assert!(!body.contains(RESULT_HEADER));

    let body = body_text(app.oneshot(get(Some(&cookie))).await.unwrap()).await;
    assert!(body.contains("<h1>Kyoto in 7 days</h1>"));
}

#[tokio::test]
async fn test_failed_submission_clears_the_previous_plan() {
    let (state, client) = state(false);
    let app = router(state);

    let response = app
        .clone()
        .oneshot(post("Plan a trip to Kyoto", None))
        .await
        .unwrap();
    let cookie = session_cookie(&response).unwrap();
    assert!(body_text(response).await.contains(RESULT_HEADER));

    client.fail.store(true, Ordering::SeqCst);
    let response = app
        .clone()
        .oneshot(post("Plan a trip to Lisbon", Some(&cookie)))
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("An error occurred:"));
    assert!(!body.contains(RESULT_HEADER));

    let body = body_text(app.oneshot(get(Some(&cookie))).await.unwrap()).await;
    assert!(!body.contains(RESULT_HEADER));
}
