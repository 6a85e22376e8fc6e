//! Shared state and request context for the API layer.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::auth::SessionRegistry;
use crate::mailer::MailTransport;
use crate::models::Role;

/// Shared context for all routes and middleware. The single SQLite
/// connection sits behind a mutex; handlers take the guard, do their
/// synchronous work, and drop it before any await point.
#[derive(Clone)]
pub struct ApiContext {
    pub db: Arc<Mutex<Connection>>,
    pub mailer: Arc<dyn MailTransport>,
    pub sessions: Arc<Mutex<SessionRegistry>>,
}

impl ApiContext {
    pub fn new(conn: Connection, mailer: Arc<dyn MailTransport>) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            mailer,
            sessions: Arc::new(Mutex::new(SessionRegistry::new())),
        }
    }

    pub fn lock_db(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".into()))
    }
}

/// Authenticated user context, injected into request extensions by the
/// auth middleware after token resolution.
#[derive(Debug, Clone, Copy)]
pub struct UserContext {
    pub user_id: Uuid,
    pub role: Role,
}

impl UserContext {
    /// Capability check: the session's role must match.
    pub fn require_role(&self, role: Role) -> Result<(), ApiError> {
        if self.role == role {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}
