#![allow(clippy::significant_drop_tightening)]

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use super::repository::{SessionRepository, UserRepository};
use super::types::{Session, User};
use crate::AuthError;

/// In-memory user repository for tests.
///
/// Clones share storage, the same way the Postgres repositories share a
/// connection pool.
#[derive(Clone)]
pub struct MockUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Seeds a user record.
    pub fn push(&self, user: User) {
        if let Ok(mut users) = self.users.write() {
            users.push(user);
        }
    }
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AuthError> {
        let users = self
            .users
            .read()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let users = self
            .users
            .read()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }
}

/// In-memory session repository for tests, keyed by token.
#[derive(Clone)]
pub struct MockSessionRepository {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl MockSessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seeds a session record.
    pub fn push(&self, session: Session) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.insert(session.token.clone(), session);
        }
    }
}

impl Default for MockSessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for MockSessionRepository {
    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, AuthError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        Ok(sessions.get(token).cloned())
    }

    async fn set_active_organization(
        &self,
        session_id: &str,
        organization_id: Option<&str>,
    ) -> Result<Session, AuthError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;

        let session = sessions
            .values_mut()
            .find(|s| s.id == session_id)
            .ok_or(AuthError::NotFound)?;
        session.active_organization_id = organization_id.map(str::to_owned);
        session.updated_at = Utc::now();

        Ok(session.clone())
    }
}
