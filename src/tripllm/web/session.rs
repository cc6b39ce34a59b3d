//! Per-browser session state.
//!
//! Each browser gets a random `tripllm_session` cookie; the store keeps the last travel plan
//! produced for it so reloading the page shows the same result. Sessions idle for longer than
//! [`SESSION_TTL`] are dropped.

use crate::travel_team::TravelPlan;
use axum::http::{header, HeaderMap};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "tripllm_session";
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

struct Session {
    plan: Option<TravelPlan>,
    last_seen: Instant,
}

impl Session {
    fn new() -> Self {
        Session {
            plan: None,
            last_seen: Instant::now(),
        }
    }
}

/// Session id extracted from (or minted for) a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId {
    pub id: Uuid,
    /// `true` when the browser did not send a usable cookie and one must be set.
    pub is_new: bool,
}

impl SessionId {
    /// Read the session cookie from `headers`, minting a fresh id when absent or invalid.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let existing = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok());

        match existing {
            Some(id) => SessionId { id, is_new: false },
            None => SessionId {
                id: Uuid::new_v4(),
                is_new: true,
            },
        }
    }

    /// `Set-Cookie` value for this session.
    pub fn cookie(&self) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, self.id
        )
    }
}

/// All live sessions.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn prune(sessions: &mut HashMap<Uuid, Session>) {
        let before = sessions.len();
        sessions.retain(|_, session| session.last_seen.elapsed() < SESSION_TTL);
        let dropped = before - sessions.len();
        if dropped > 0 {
            log::debug!("dropped {} idle sessions", dropped);
        }
    }

    /// The plan stored for `id`, touching the session. Unknown ids are not recorded; sessions
    /// only come into existence through [`set_plan`](SessionStore::set_plan).
    pub async fn current_plan(&self, id: &Uuid) -> Option<TravelPlan> {
        let mut sessions = self.sessions.lock().await;
        Self::prune(&mut sessions);
        let session = sessions.get_mut(id)?;
        session.last_seen = Instant::now();
        session.plan.clone()
    }

    /// Replace the plan stored for `id`. `None` clears it.
    pub async fn set_plan(&self, id: &Uuid, plan: Option<TravelPlan>) {
        let mut sessions = self.sessions.lock().await;
        Self::prune(&mut sessions);
        let session = sessions.entry(*id).or_insert_with(Session::new);
        session.last_seen = Instant::now();
        session.plan = plan;
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
