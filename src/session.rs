//! Login gate
//!
//! Each browser gets a session id in a cookie. A session starts
//! unauthenticated and the only transition is a successful login; nothing
//! moves it back short of restarting the process. Only authenticated ids are
//! stored, so anonymous traffic leaves no state behind.

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "watch_console_session";

/// The single demo account allowed into the console.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn verify(&self, email: &str, password: &str) -> Result<()> {
        if email == self.email && password == self.password {
            Ok(())
        } else {
            Err(Error::Auth)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

pub struct SessionStore {
    credentials: Credentials,
    authenticated: RwLock<HashSet<Uuid>>,
}

impl SessionStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            authenticated: RwLock::new(HashSet::new()),
        }
    }

    /// Mint an id for a new, unauthenticated session. Nothing is stored
    /// until the session logs in.
    pub fn open(&self) -> Uuid {
        let id = Uuid::new_v4();
        tracing::debug!("Opened session {}", id);
        id
    }

    pub fn state(&self, id: Uuid) -> AuthState {
        let authenticated = self
            .authenticated
            .read()
            .unwrap_or_else(|e| e.into_inner());
        if authenticated.contains(&id) {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    pub fn is_authenticated(&self, id: Uuid) -> bool {
        self.state(id) == AuthState::Authenticated
    }

    /// Check the submitted credentials and, on success, authenticate the
    /// session. A failed attempt leaves the session as it was.
    pub fn login(&self, id: Uuid, email: &str, password: &str) -> Result<()> {
        if let Err(e) = self.credentials.verify(email, password) {
            tracing::warn!("Rejected login attempt for '{}'", email);
            return Err(e);
        }

        self.authenticated
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id);
        tracing::info!("Session {} authenticated as {}", id, email);
        Ok(())
    }

    /// Number of sessions held in memory.
    pub fn authenticated_count(&self) -> usize {
        self.authenticated
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

/// Pull the session id out of a `Cookie` header value.
pub fn session_id_from_cookie_header(header: &str) -> Option<Uuid> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn session_cookie(id: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}
