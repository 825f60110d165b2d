use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::auth_token::Role;
use crate::error::{Result, VaultVoiceError};

/// Who an auth session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    pub role: Role,
    /// Investigator id or case id, depending on `role`.
    pub subject: String,
}

impl Principal {
    pub fn investigator(investigator_id: impl Into<String>) -> Self {
        Self {
            role: Role::Investigator,
            subject: investigator_id.into(),
        }
    }

    pub fn whistleblower(case_id: impl Into<String>) -> Self {
        Self {
            role: Role::Whistleblower,
            subject: case_id.into(),
        }
    }

    fn key(&self) -> String {
        match self.role {
            Role::Investigator => format!("investigator:{}", self.subject),
            Role::Whistleblower => format!("case:{}", self.subject),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionData {
    pub session_id: String,
    pub principal: Principal,
    pub expires_at: Instant,
}

impl SessionData {
    pub fn new(principal: Principal, expiry_hours: u64) -> Self {
        let now = Instant::now();
        Self {
            session_id: Uuid::new_v4().to_string(),
            principal,
            expires_at: now + Duration::from_secs(expiry_hours * 3600),
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Clone)]
pub struct SessionManager {
    // session_id -> SessionData
    sessions: Arc<DashMap<String, SessionData>>,
    // principal key -> session_id
    principal_sessions: Arc<DashMap<String, String>>,
    expiry_hours: u64,
}

impl SessionManager {
    pub fn new(expiry_hours: u64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            principal_sessions: Arc::new(DashMap::new()),
            expiry_hours,
        }
    }

    /// Opens a session, replacing any live session of the same principal.
    pub fn create_session(&self, principal: Principal) -> SessionData {
        let key = principal.key();

        let old_session_id = self
            .principal_sessions
            .get(&key)
            .map(|entry| entry.value().clone());
        if let Some(old_session_id) = old_session_id {
            self.invalidate_session(&old_session_id);
            log::info!("Replaced previous session for {}", key);
        }

        let session_data = SessionData::new(principal, self.expiry_hours);

        self.sessions
            .insert(session_data.session_id.clone(), session_data.clone());
        self.principal_sessions
            .insert(key.clone(), session_data.session_id.clone());

        log::debug!("Created session for {}", key);

        session_data
    }

    pub fn validate_session(&self, session_id: &str) -> Result<SessionData> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or(VaultVoiceError::InvalidSession)?;

        if session.is_expired() {
            drop(session);
            self.invalidate_session(session_id);
            return Err(VaultVoiceError::InvalidSession);
        }

        Ok(session.clone())
    }

    pub fn invalidate_session(&self, session_id: &str) {
        if let Some((_, session)) = self.sessions.remove(session_id) {
            let key = session.principal.key();
            self.principal_sessions
                .remove_if(&key, |_, current| current == session_id);

            log::debug!("Invalidated session for {}", key);
        }
    }

    pub fn cleanup_expired(&self) -> usize {
        let mut removed = 0;

        self.sessions.retain(|session_id, session| {
            if session.is_expired() {
                self.principal_sessions
                    .remove_if(&session.principal.key(), |_, current| current == session_id);
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            log::info!("Cleaned up {} expired sessions", removed);
        }

        removed
    }

    pub fn active_session_count(&self) -> usize {
        self.sessions.len()
    }
}
