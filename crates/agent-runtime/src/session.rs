//! Session storage for runner invocations
//!
//! A session is the conversation a run reads from and appends to. It is
//! identified by the `(app_name, user_id, session_id)` triple.

use agent_core::{Error, Event, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Identity of a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }

    fn not_found(&self) -> Error {
        Error::SessionNotFound {
            app_name: self.app_name.clone(),
            user_id: self.user_id.clone(),
            session_id: self.session_id.clone(),
        }
    }
}

/// A stored conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub key: SessionKey,
    /// Events in the order they were appended
    pub events: Vec<Event>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    fn new(key: SessionKey) -> Self {
        let now = Utc::now();
        Self {
            key,
            events: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Session id
    pub fn id(&self) -> &str {
        &self.key.session_id
    }
}

/// Storage backend for sessions
pub trait SessionService: Send + Sync {
    /// Create an empty session with a fresh id
    fn create_session(&self, app_name: &str, user_id: &str) -> Result<Session>;

    /// Fetch a snapshot of a session
    fn get_session(&self, app_name: &str, user_id: &str, session_id: &str) -> Result<Session>;

    /// Append an event to an existing session
    fn append_event(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        event: Event,
    ) -> Result<()>;

    /// Remove a session, returning whether it existed
    fn delete_session(&self, app_name: &str, user_id: &str, session_id: &str) -> Result<bool>;

    /// Number of live sessions
    fn session_count(&self) -> Result<usize>;
}

/// Process-local session store
#[derive(Debug, Default)]
pub struct InMemorySessionService {
    sessions: RwLock<HashMap<SessionKey, Session>>,
}

impl InMemorySessionService {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::Generic("session store lock poisoned".to_string())
}

impl SessionService for InMemorySessionService {
    fn create_session(&self, app_name: &str, user_id: &str) -> Result<Session> {
        let key = SessionKey::new(app_name, user_id, Uuid::new_v4().to_string());
        let session = Session::new(key.clone());

        self.sessions
            .write()
            .map_err(poisoned)?
            .insert(key, session.clone());
        debug!("Created session {}", session.id());

        Ok(session)
    }

    fn get_session(&self, app_name: &str, user_id: &str, session_id: &str) -> Result<Session> {
        let key = SessionKey::new(app_name, user_id, session_id);
        self.sessions
            .read()
            .map_err(poisoned)?
            .get(&key)
            .cloned()
            .ok_or_else(|| key.not_found())
    }

    fn append_event(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        event: Event,
    ) -> Result<()> {
        let key = SessionKey::new(app_name, user_id, session_id);
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let session = sessions.get_mut(&key).ok_or_else(|| key.not_found())?;

        session.updated_at = event.timestamp;
        session.events.push(event);
        Ok(())
    }

    fn delete_session(&self, app_name: &str, user_id: &str, session_id: &str) -> Result<bool> {
        let key = SessionKey::new(app_name, user_id, session_id);
        let removed = self
            .sessions
            .write()
            .map_err(poisoned)?
            .remove(&key)
            .is_some();
        if removed {
            debug!("Deleted session {session_id}");
        }
        Ok(removed)
    }

    fn session_count(&self) -> Result<usize> {
        Ok(self.sessions.read().map_err(poisoned)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_create_and_get_session() {
        let store = InMemorySessionService::new();
        let session = store.create_session("app", "user").unwrap();

        assert!(Uuid::parse_str(session.id()).is_ok());
        assert!(session.events.is_empty());

        let fetched = store.get_session("app", "user", session.id()).unwrap();
        assert_eq!(fetched.key, session.key);
        assert_eq!(assert_ok!(store.session_count()), 1);
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        let store = InMemorySessionService::new();
        let a = store.create_session("app", "user").unwrap();
        let b = store.create_session("app", "user").unwrap();

        assert_ne!(a.id(), b.id());
        assert_eq!(assert_ok!(store.session_count()), 2);
    }

    #[test]
    fn test_append_event_preserves_order() {
        let store = InMemorySessionService::new();
        let session = store.create_session("app", "user").unwrap();

        assert_ok!(store.append_event("app", "user", session.id(), Event::user("inv", "first")));
        assert_ok!(store.append_event(
            "app",
            "user",
            session.id(),
            Event::agent("inv", "bot", "second")
        ));

        let events = store.get_session("app", "user", session.id()).unwrap().events;
        let texts: Vec<_> = events.iter().filter_map(|e| e.text.as_deref()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_lookup_is_scoped_by_user() {
        let store = InMemorySessionService::new();
        let session = store.create_session("app", "alice").unwrap();

        let err = store.get_session("app", "bob", session.id()).unwrap_err();
        assert!(matches!(err, Error::SessionNotFound { ref user_id, .. } if user_id == "bob"));
    }

    #[test]
    fn test_append_to_missing_session_fails() {
        let store = InMemorySessionService::new();
        let err = assert_err!(store.append_event("app", "user", "nope", Event::user("inv", "hi")));
        assert!(matches!(err, Error::SessionNotFound { .. }));
    }

    #[test]
    fn test_delete_session() {
        let store = InMemorySessionService::new();
        let session = store.create_session("app", "user").unwrap();

        assert!(store.delete_session("app", "user", session.id()).unwrap());
        assert!(!store.delete_session("app", "user", session.id()).unwrap());
        assert_eq!(assert_ok!(store.session_count()), 0);
    }

    #[test]
    fn test_poisoned_store_reports_errors() {
        let store = std::sync::Arc::new(InMemorySessionService::new());
        let poisoner = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.sessions.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        let err = assert_err!(store.session_count());
        assert!(matches!(err, Error::Generic(_)));
        assert_err!(store.create_session("app", "user"));
    }
}
