//! Registration, login and logout.

use std::sync::Arc;

use sqlx::SqlitePool;
use uuid::Uuid;

use super::session::{Session, SessionStore};
use crate::domain::aggregates::{Role, User};
use crate::domain::events::{DomainEvent, UserEvent};
use crate::domain::value_objects::{PasswordDigest, Username};
use crate::notify::{self, Notifier};
use crate::store::UserRepository;
use crate::{Result, StorefrontError};

#[derive(Clone)]
pub struct AuthService {
    pool: SqlitePool,
    sessions: SessionStore,
    notifier: Arc<dyn Notifier>,
}

impl AuthService {
    pub fn new(pool: SqlitePool, sessions: SessionStore, notifier: Arc<dyn Notifier>) -> Self {
        Self { pool, sessions, notifier }
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty username or password, `DuplicateUsername` when the name is taken.
    #[tracing::instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str, role: Role) -> Result<User> {
        let username = Username::new(username)?;
        if password.is_empty() {
            return Err(StorefrontError::validation("password must not be empty"));
        }
        let user = UserRepository::new(&self.pool).create(&username, &PasswordDigest::of(password), role).await?;
        tracing::info!(user_id = user.id, role = %role, "user registered");
        notify::publish(
            self.notifier.as_ref(),
            &DomainEvent::User(UserEvent::Registered { user_id: user.id, username: username.to_string(), role }),
        );
        Ok(user)
    }

    /// Verifies credentials and opens a session.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown user or wrong password; the two are indistinguishable to the caller.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let user = UserRepository::new(&self.pool).find_by_username(username.trim()).await?;
        let Some(user) = user.filter(|u| u.verify_password(password)) else {
            tracing::warn!("login failed");
            return Err(StorefrontError::InvalidCredentials);
        };
        let session = Session::for_user(&user);
        self.sessions.insert(session.clone()).await;
        tracing::info!(user_id = user.id, "user logged in");
        Ok(session)
    }

    /// Ends a session. Returns `false` when the token was not live.
    pub async fn logout(&self, token: &Uuid) -> bool {
        let removed = self.sessions.remove(token).await;
        if let Some(session) = &removed {
            tracing::info!(user_id = session.user_id, "user logged out");
        }
        removed.is_some()
    }

    /// Forgets expired sessions. Lookups already ignore them; this bounds memory for tokens never used again.
    pub async fn sweep_sessions(&self) -> usize {
        let removed = self.sessions.sweep().await;
        if removed > 0 {
            tracing::info!(removed, "expired sessions swept");
        }
        removed
    }

    /// # Errors
    ///
    /// `Unauthenticated` when the token does not belong to a live or unexpired session.
    pub async fn session(&self, token: &Uuid) -> Result<Session> {
        self.sessions.get(token).await.ok_or(StorefrontError::Unauthenticated)
    }
}
