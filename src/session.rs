use axum::http::{header, HeaderMap};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "planos_session";

/// Per-visitor context handed to handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub is_admin: bool,
}

const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// In-memory sessions. They expire after a fixed lifetime and end when the
/// process exits.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, (Session, Instant)>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(SESSION_TTL)
    }
}

impl SessionStore {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn resolve(&self, headers: &HeaderMap) -> Session {
        let Some(id) = session_id(headers) else {
            return Session::default();
        };
        self.sessions
            .lock()
            .await
            .get(&id)
            .filter(|(_, issued)| issued.elapsed() < self.ttl)
            .map(|(session, _)| *session)
            .unwrap_or_default()
    }

    /// Returns the caller's live admin session id, or starts a new one.
    /// Expired sessions are dropped on the way.
    pub async fn grant_admin(&self, headers: &HeaderMap) -> String {
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, (_, issued)| issued.elapsed() < self.ttl);

        if let Some(id) = session_id(headers) {
            if sessions.get(&id).is_some_and(|(session, _)| session.is_admin) {
                return id;
            }
        }

        let id = Uuid::new_v4().to_string();
        sessions.insert(id.clone(), (Session { is_admin: true }, Instant::now()));
        id
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Strict")
}
