//! Login sessions.
//!
//! A [`Session`] is created at login, handed to every operation explicitly and destroyed at
//! logout or once it is older than the store's time to live. The store only maps bearer tokens
//! to sessions; it holds no per-request state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::aggregates::{Role, User, UserId};
use crate::{Result, StorefrontError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: Uuid,
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn for_user(user: &User) -> Self {
        Self {
            token: Uuid::new_v4(),
            user_id: user.id,
            username: user.username.to_string(),
            role: user.role,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool { self.role.is_admin() }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at >= ttl
    }

    /// # Errors
    ///
    /// Returns `StorefrontError::PermissionDenied` for non-admin sessions.
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() { Ok(()) } else { Err(StorefrontError::PermissionDenied) }
    }
}

pub const SESSION_TTL_HOURS: i64 = 24;

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self { Self::with_ttl(Duration::hours(SESSION_TTL_HOURS)) }
}

impl SessionStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { inner: Arc::default(), ttl }
    }

    /// Stores a new session, dropping any that have expired.
    pub async fn insert(&self, session: Session) {
        let mut sessions = self.inner.write().await;
        let now = Utc::now();
        sessions.retain(|_, s| !s.is_expired(now, self.ttl));
        sessions.insert(session.token, session);
    }

    /// A live session for the token. An expired one is removed and reported as absent.
    pub async fn get(&self, token: &Uuid) -> Option<Session> {
        let now = Utc::now();
        {
            let sessions = self.inner.read().await;
            match sessions.get(token) {
                None => return None,
                Some(s) if !s.is_expired(now, self.ttl) => return Some(s.clone()),
                Some(_) => {}
            }
        }
        let mut sessions = self.inner.write().await;
        if sessions.get(token).is_some_and(|s| s.is_expired(now, self.ttl)) {
            sessions.remove(token);
            tracing::debug!("session expired");
        }
        None
    }

    /// Drops every expired session and returns how many went.
    pub async fn sweep(&self) -> usize {
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        let now = Utc::now();
        sessions.retain(|_, s| !s.is_expired(now, self.ttl));
        before - sessions.len()
    }

    pub async fn remove(&self, token: &Uuid) -> Option<Session> {
        self.inner.write().await.remove(token)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
