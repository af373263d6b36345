//! Shared application state.
//!
//! `CoreState` is created once at startup, wrapped in `Arc` and handed to
//! the HTTP layer. It owns the database location, the identity hand-over
//! secret and the session registry. Connections are opened per operation.

use std::path::PathBuf;
use std::sync::{RwLock, RwLockWriteGuard};
use std::time::{Duration, Instant};

use subtle::ConstantTimeEq;

use crate::config::ServerConfig;
use crate::db;
use crate::session::{hash_token, Identity, SessionHandle, SessionRegistry};

pub struct CoreState {
    /// SQLite database file for the practice.
    pub db_path: PathBuf,
    /// SHA-256 of the identity hand-over secret.
    identity_secret_hash: [u8; 32],
    sessions: RwLock<SessionRegistry>,
}

impl CoreState {
    pub fn new(db_path: PathBuf, identity_secret: &str, session_idle: Duration) -> Self {
        Self {
            db_path,
            identity_secret_hash: hash_token(identity_secret),
            sessions: RwLock::new(SessionRegistry::new(session_idle)),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config.db_path.clone(),
            &config.identity_secret,
            config.session_idle,
        )
    }

    /// Open a database connection (migrations applied).
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(&self.db_path).map_err(CoreError::Database)
    }

    /// Constant-time check of a presented hand-over secret.
    pub fn verify_identity_secret(&self, presented: &str) -> bool {
        let presented = hash_token(presented);
        self.identity_secret_hash.ct_eq(&presented).unwrap_u8() == 1
    }

    fn write_sessions(&self) -> Result<RwLockWriteGuard<'_, SessionRegistry>, CoreError> {
        self.sessions.write().map_err(|_| CoreError::LockPoisoned)
    }

    // ── Session lifecycle ───────────────────────────────────

    /// Open a session for a vouched-for practitioner, creating their
    /// profile on first sign-in.
    pub fn open_session(&self, identity: Identity) -> Result<(String, SessionHandle), CoreError> {
        let conn = self.open_db()?;
        let created = db::ensure_profile(
            &conn,
            &identity.practitioner_id,
            &identity.full_name,
            identity.email.as_deref(),
        )?;
        if created {
            tracing::info!(practitioner_id = %identity.practitioner_id, "Profile created on first sign-in");
        }
        Ok(self.write_sessions()?.sign_in(identity))
    }

    /// Resolve a bearer token. Touches the session.
    pub fn resolve_session(&self, token: &str) -> Result<SessionHandle, CoreError> {
        self.write_sessions()?
            .resolve(token)
            .ok_or(CoreError::NoSession)
    }

    pub fn close_session(&self, token: &str) -> Result<bool, CoreError> {
        Ok(self.write_sessions()?.sign_out(token))
    }

    /// Drop idle sessions. Returns how many were dropped.
    pub fn prune_sessions(&self) -> Result<usize, CoreError> {
        Ok(self.write_sessions()?.prune_expired(Instant::now()))
    }

    pub fn session_count(&self) -> Result<usize, CoreError> {
        self.sessions
            .read()
            .map(|s| s.len())
            .map_err(|_| CoreError::LockPoisoned)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No active session")]
    NoSession,
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn state(dir: &tempfile::TempDir) -> CoreState {
        CoreState::new(dir.path().join("practice.db"), "hand-over", Duration::from_secs(60))
    }

    fn identity() -> Identity {
        Identity {
            practitioner_id: Uuid::new_v4(),
            full_name: "Dr. Margaret Tyler".into(),
            email: Some("tyler@example.org".into()),
        }
    }

    #[test]
    fn identity_secret_check() {
        let dir = tempfile::tempdir().unwrap();
        let core = state(&dir);
        assert!(core.verify_identity_secret("hand-over"));
        assert!(!core.verify_identity_secret("hand-ove"));
        assert!(!core.verify_identity_secret(""));
    }

    #[test]
    fn open_session_creates_profile_once() {
        let dir = tempfile::tempdir().unwrap();
        let core = state(&dir);
        let id = identity();

        let (token, handle) = core.open_session(id.clone()).unwrap();
        assert_eq!(handle.practitioner_id(), id.practitioner_id);
        core.open_session(id.clone()).unwrap();

        let conn = core.open_db().unwrap();
        let profile = db::get_profile(&conn, &id.practitioner_id).unwrap().unwrap();
        assert_eq!(profile.full_name, "Dr. Margaret Tyler");
        assert_eq!(profile.contact_email.as_deref(), Some("tyler@example.org"));
        assert_eq!(core.session_count().unwrap(), 2);

        assert!(core.resolve_session(&token).is_ok());
    }

    #[test]
    fn closed_session_no_longer_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let core = state(&dir);
        let (token, _) = core.open_session(identity()).unwrap();

        assert!(core.close_session(&token).unwrap());
        assert!(matches!(core.resolve_session(&token), Err(CoreError::NoSession)));
    }
}
