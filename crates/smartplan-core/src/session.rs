//! Bearer-token session tracking.
//!
//! Tokens are opaque strings minted by the caller; the store maps them to
//! authenticated users with an expiry. The trait keeps the HTTP layer
//! independent of where sessions live, so a shared cache can replace the
//! in-process map without touching handlers.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use smartplan_db::models::Role;

/// Default session lifetime.
pub const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: Uuid, username: String, role: Role) -> Self {
        Self {
            user_id,
            username,
            role,
            expires_at: Utc::now() + Duration::hours(SESSION_TTL_HOURS),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up a live session. Expired sessions are treated as absent.
    async fn get(&self, token: &str) -> Result<Option<Session>>;

    async fn set(&self, token: &str, session: Session) -> Result<()>;

    async fn remove(&self, token: &str) -> Result<()>;

    /// Drop every expired session.
    async fn expire_stale(&self) -> Result<usize>;
}

/// Process-local session store backed by a map.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, token: &str) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(token).filter(|s| !s.is_expired()).cloned())
    }

    async fn set(&self, token: &str, session: Session) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(token.to_owned(), session);
        Ok(())
    }

    async fn remove(&self, token: &str) -> Result<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    async fn expire_stale(&self) -> Result<usize> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        Ok(before - sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_session() -> Session {
        Session::new(Uuid::new_v4(), "casey".to_owned(), Role::User)
    }

    fn expired_session() -> Session {
        Session {
            expires_at: Utc::now() - Duration::minutes(1),
            ..live_session()
        }
    }

    #[tokio::test]
    async fn set_then_get_returns_the_session() {
        let store = MemorySessionStore::new();
        let session = live_session();
        store.set("tok", session.clone()).await.unwrap();

        let found = store.get("tok").await.unwrap();
        assert_eq!(found, Some(session));
    }

    #[tokio::test]
    async fn unknown_token_is_absent() {
        let store = MemorySessionStore::new();
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_session_reads_as_absent() {
        let store = MemorySessionStore::new();
        store.set("tok", expired_session()).await.unwrap();
        assert!(store.get("tok").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_drops_the_session() {
        let store = MemorySessionStore::new();
        store.set("tok", live_session()).await.unwrap();
        store.remove("tok").await.unwrap();
        assert!(store.get("tok").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expire_stale_keeps_live_sessions() {
        let store = MemorySessionStore::new();
        store.set("live", live_session()).await.unwrap();
        store.set("stale", expired_session()).await.unwrap();

        let dropped = store.expire_stale().await.unwrap();
        assert_eq!(dropped, 1);
        assert!(store.get("live").await.unwrap().is_some());
    }
}
