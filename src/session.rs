//! Practitioner sessions.
//!
//! Identity is established by an external service that hands the signed-in
//! practitioner over to us. Each hand-over opens a session with its own
//! bearer token and its own repertory workspace. Only the SHA-256 of a
//! token is kept in memory.
//!
//! Key properties:
//! - Sessions idle longer than the configured window are dropped on access
//! - Sign-out invalidates the workspace, so searches still in flight for
//!   that session are discarded when they complete

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repertory::RepertoryWorkspace;

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

// ═══════════════════════════════════════════════════════════
// Identity: what the identity service vouches for
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub practitioner_id: Uuid,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

// ═══════════════════════════════════════════════════════════
// Session handle: cloned into request context
// ═══════════════════════════════════════════════════════════

/// Per-request view of a live session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub session_id: Uuid,
    pub identity: Identity,
    pub workspace: Arc<Mutex<RepertoryWorkspace>>,
}

impl SessionHandle {
    pub fn practitioner_id(&self) -> Uuid {
        self.identity.practitioner_id
    }
}

struct PractitionerSession {
    session_id: Uuid,
    identity: Identity,
    workspace: Arc<Mutex<RepertoryWorkspace>>,
    last_activity: Instant,
}

impl PractitionerSession {
    fn handle(&self) -> SessionHandle {
        SessionHandle {
            session_id: self.session_id,
            identity: self.identity.clone(),
            workspace: Arc::clone(&self.workspace),
        }
    }

    fn close(&self) {
        match self.workspace.lock() {
            Ok(mut ws) => ws.invalidate(),
            Err(_) => tracing::warn!(session_id = %self.session_id, "Workspace lock poisoned on close"),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// SessionRegistry: all open sessions
// ═══════════════════════════════════════════════════════════

pub struct SessionRegistry {
    sessions: HashMap<[u8; 32], PractitionerSession>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            idle_timeout,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Open a session and return its bearer token. The plaintext token is
    /// never stored.
    pub fn sign_in(&mut self, identity: Identity) -> (String, SessionHandle) {
        let token = generate_token();
        let session = PractitionerSession {
            session_id: Uuid::new_v4(),
            identity,
            workspace: Arc::new(Mutex::new(RepertoryWorkspace::new())),
            last_activity: Instant::now(),
        };
        let handle = session.handle();
        tracing::info!(
            session_id = %handle.session_id,
            practitioner_id = %handle.practitioner_id(),
            "Session opened"
        );
        self.sessions.insert(hash_token(&token), session);
        (token, handle)
    }

    pub fn resolve(&mut self, token: &str) -> Option<SessionHandle> {
        self.resolve_at(token, Instant::now())
    }

    /// Look up a token, touching the session. An idle session is closed
    /// and reads as absent.
    pub fn resolve_at(&mut self, token: &str, now: Instant) -> Option<SessionHandle> {
        let key = hash_token(token);
        let session = self.sessions.get_mut(&key)?;
        if now.saturating_duration_since(session.last_activity) > self.idle_timeout {
            if let Some(expired) = self.sessions.remove(&key) {
                tracing::info!(session_id = %expired.session_id, "Session expired");
                expired.close();
            }
            return None;
        }
        session.last_activity = now;
        Some(session.handle())
    }

    /// Close the session for `token`. Returns `false` if none was open.
    pub fn sign_out(&mut self, token: &str) -> bool {
        match self.sessions.remove(&hash_token(token)) {
            Some(session) => {
                tracing::info!(session_id = %session.session_id, "Session closed");
                session.close();
                true
            }
            None => false,
        }
    }

    /// Drop every session idle at `now`. Returns how many were dropped.
    pub fn prune_expired(&mut self, now: Instant) -> usize {
        let idle = self.idle_timeout;
        let before = self.sessions.len();
        self.sessions.retain(|_, s| {
            let keep = now.saturating_duration_since(s.last_activity) <= idle;
            if !keep {
                s.close();
            }
            keep
        });
        before - self.sessions.len()
    }
}
