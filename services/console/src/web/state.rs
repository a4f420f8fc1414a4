//! services/console/src/web/state.rs
//!
//! Defines the application's shared state and the per-browser session state.

use crate::adapters::layers::SessionInvalidator;
use crate::config::Config;
use fieldtest_core::domain::{AuthState, Bearer};
use fieldtest_core::ports::{DocumentRenderer, RemoteApi};
use fieldtest_core::store::ConsoleState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info};

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn RemoteApi>,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub sessions: Arc<SessionRegistry>,
    pub config: Arc<Config>,
}

//=========================================================================================
// UserSession (Specific to One Browser)
//=========================================================================================

/// Everything the console keeps for one browser between requests.
pub struct UserSession {
    pub bearer: Bearer,
    pub state: tokio::sync::Mutex<ConsoleState>,
}

impl UserSession {
    /// An empty session. Nothing is registered until `SessionRegistry::start`.
    pub fn new(bearer: Bearer) -> Self {
        Self {
            bearer,
            state: tokio::sync::Mutex::new(ConsoleState::new()),
        }
    }
}

//=========================================================================================
// SessionRegistry
//=========================================================================================

/// How long a session may sit unused before it is dropped.
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(8 * 60 * 60);
/// Upper bound on concurrently registered sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct Entry {
    session: Arc<UserSession>,
    last_seen: Instant,
}

/// Live sessions keyed by their bearer token.
///
/// Dropping an entry is the console's equivalent of clearing the browser's session
/// storage: the next request with the same token starts from an empty state.
/// Entries only come from `start`, expire after `idle` without a request, and the
/// least recently used one is evicted once `max` is reached.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Entry>>,
    idle: Duration,
    max: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_limits(DEFAULT_SESSION_IDLE, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(idle: Duration, max: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle,
            max: max.max(1),
        }
    }

    fn map(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn prune(&self, map: &mut HashMap<String, Entry>, now: Instant) {
        let before = map.len();
        map.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle);
        if map.len() < before {
            debug!("Expired {} idle session(s)", before - map.len());
        }
    }

    /// Starts a fresh session for a successful login, replacing any old one.
    pub async fn start(&self, bearer: Bearer, auth: AuthState) -> Arc<UserSession> {
        let session = Arc::new(UserSession::new(bearer.clone()));
        session.state.lock().await.login(auth);

        let now = Instant::now();
        let mut map = self.map();
        self.prune(&mut map, now);
        map.remove(bearer.as_str());
        while map.len() >= self.max {
            let oldest = map
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    map.remove(&key);
                    info!("Session limit of {} reached; evicted the least recently used", self.max);
                }
                None => break,
            }
        }
        map.insert(
            bearer.as_str().to_string(),
            Entry {
                session: session.clone(),
                last_seen: now,
            },
        );
        session
    }

    /// The live session for a token, refreshing its idle timer.
    pub fn get(&self, bearer: &Bearer) -> Option<Arc<UserSession>> {
        let now = Instant::now();
        let mut map = self.map();
        self.prune(&mut map, now);
        map.get_mut(bearer.as_str()).map(|entry| {
            entry.last_seen = now;
            entry.session.clone()
        })
    }

    pub fn remove(&self, bearer: &Bearer) -> bool {
        self.map().remove(bearer.as_str()).is_some()
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionInvalidator for SessionRegistry {
    fn invalidate(&self, bearer: &Bearer) {
        if self.remove(bearer) {
            info!("Session cleared after the remote API rejected its token");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldtest_core::domain::Role;

    fn auth() -> AuthState {
        AuthState {
            role: Role::Admin,
            role_id: 2,
            username: "ops".into(),
            email: "ops@example.com".into(),
        }
    }

    #[tokio::test]
    async fn start_replaces_existing_state() {
        let registry = SessionRegistry::new();
        let bearer = Bearer::new("tok");
        let stale = registry.start(bearer.clone(), auth()).await;
        stale.state.lock().await.dashboard.begin();

        let fresh = registry.start(bearer.clone(), auth()).await;
        let state = fresh.state.lock().await;
        assert!(!state.dashboard.loading);
        assert_eq!(state.auth().map(|a| a.username.as_str()), Some("ops"));
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&registry.get(&bearer).unwrap(), &fresh));
    }

    #[test]
    fn lookup_never_registers() {
        let registry = SessionRegistry::new();
        for i in 0..20 {
            assert!(registry.get(&Bearer::new(format!("forged-{}", i))).is_none());
        }
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let registry = SessionRegistry::with_limits(Duration::ZERO, 10);
        registry.start(Bearer::new("a"), auth()).await;
        assert!(registry.get(&Bearer::new("a")).is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn cap_evicts_least_recently_used() {
        let registry = SessionRegistry::with_limits(DEFAULT_SESSION_IDLE, 2);
        registry.start(Bearer::new("a"), auth()).await;
        registry.start(Bearer::new("b"), auth()).await;
        // Touch "a" so "b" is now the oldest.
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(registry.get(&Bearer::new("a")).is_some());
        registry.start(Bearer::new("c"), auth()).await;

        assert_eq!(registry.len(), 2);
        assert!(registry.get(&Bearer::new("a")).is_some());
        assert!(registry.get(&Bearer::new("b")).is_none());
        assert!(registry.get(&Bearer::new("c")).is_some());
    }

    #[tokio::test]
    async fn invalidate_drops_matching_token_only() {
        let registry = SessionRegistry::new();
        registry.start(Bearer::new("a"), auth()).await;
        registry.start(Bearer::new("b"), auth()).await;
        registry.invalidate(&Bearer::new("a"));
        assert!(registry.get(&Bearer::new("a")).is_none());
        assert!(registry.get(&Bearer::new("b")).is_some());
    }
}
