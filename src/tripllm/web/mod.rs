//! The single-page web front end.
//!
//! ```text
//! GET  /   render the form plus the session's last plan
//! POST /   request=<text>  →  validate → run the travel team → render
//! ```
//!
//! When the planner could not be configured (no API key) every page is replaced by the
//! startup error.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tripllm::config::PlannerConfig;
//! use tripllm::travel_team::TravelPlanner;
//! use tripllm::web::{self, AppState};
//!
//! # async {
//! let config = PlannerConfig::from_env().unwrap();
//! let planner = TravelPlanner::from_config(&config).unwrap();
//! web::serve(Arc::new(AppState::ready(planner)), config.bind_addr).await.unwrap();
//! # };
//! ```

pub mod render;
pub mod session;

use crate::travel_team::{PlanError, TravelPlanner, OFF_TOPIC_MESSAGE};
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use render::{planner_page, startup_error_page, PageView, API_KEY_HINT};
use serde::Deserialize;
use session::{SessionId, SessionStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Whether the server can plan trips.
pub enum PlannerMode {
    Ready(TravelPlanner),
    /// Configuration failed; the message is all the page shows.
    Unconfigured(String),
}

/// Shared state behind every handler.
pub struct AppState {
    mode: PlannerMode,
    sessions: SessionStore,
}

impl AppState {
    pub fn ready(planner: TravelPlanner) -> Self {
        AppState {
            mode: PlannerMode::Ready(planner),
            sessions: SessionStore::new(),
        }
    }

    pub fn unconfigured(message: impl Into<String>) -> Self {
        AppState {
            mode: PlannerMode::Unconfigured(message.into()),
            sessions: SessionStore::new(),
        }
    }

    pub fn mode(&self) -> &PlannerMode {
        &self.mode
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

/// Body of the form post.
#[derive(Debug, Deserialize)]
pub struct PlanForm {
    #[serde(default)]
    pub request: String,
}

/// Build the router. Exposed separately from [`serve`] so it can be driven in-process.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(show_page).post(submit_request))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(
    state: Arc<AppState>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("AI Travel Planner listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                log::error!("cannot listen for Ctrl-C: {}", err);
                std::future::pending::<()>().await;
            }
            log::info!("shutting down");
        })
        .await?;
    Ok(())
}

fn with_session_cookie(mut response: Response, session: &SessionId) -> Response {
    if session.is_new {
        if let Ok(value) = HeaderValue::from_str(&session.cookie()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

fn startup_error(message: &str) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Html(startup_error_page(message)),
    )
        .into_response()
}

async fn show_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let PlannerMode::Unconfigured(message) = &state.mode {
        return startup_error(message);
    }
    let session = SessionId::from_headers(&headers);
    let plan = state.sessions.current_plan(&session.id).await;
    let view = PageView {
        plan: plan.as_ref(),
        ..PageView::default()
    };
    with_session_cookie(Html(planner_page(&view)).into_response(), &session)
}

async fn submit_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<PlanForm>,
) -> Response {
    let planner = match &state.mode {
        PlannerMode::Ready(planner) => planner,
        PlannerMode::Unconfigured(message) => return startup_error(message),
    };
    let session = SessionId::from_headers(&headers);
    let request = form.request.as_str();

    // nothing submitted: keep showing whatever the session already has
    if request.is_empty() {
        let plan = state.sessions.current_plan(&session.id).await;
        let view = PageView {
            request,
            plan: plan.as_ref(),
            ..PageView::default()
        };
        return with_session_cookie(Html(planner_page(&view)).into_response(), &session);
    }

    if let Err(PlanError::OffTopic) = TravelPlanner::validate(request) {
        let view = PageView {
            request,
            errors: vec![OFF_TOPIC_MESSAGE.to_string()],
            ..PageView::default()
        };
        return with_session_cookie(Html(planner_page(&view)).into_response(), &session);
    }

    state.sessions.set_plan(&session.id, None).await;
    let page = match planner.plan(request).await {
        Ok(plan) => {
            let page = planner_page(&PageView {
                request,
                plan: Some(&plan),
                ..PageView::default()
            });
            state.sessions.set_plan(&session.id, Some(plan)).await;
            page
        }
        Err(err) => {
            log::error!("travel plan generation failed: {}", err);
            planner_page(&PageView {
                request,
                errors: vec![format!("An error occurred: {}", err)],
                notes: vec![API_KEY_HINT],
                plan: None,
            })
        }
    };
    with_session_cookie(Html(page).into_response(), &session)
}
