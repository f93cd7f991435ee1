//! The session store: owner of the current authentication state.

use anyhow::Result;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::warn;

use super::storage::{keys, SessionStorage};

/// Snapshot of the current authenticated identity.
///
/// `user` is opaque to this crate; whatever profile record the identity
/// service returns is carried as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<Value>,
}

impl Session {
    /// Derived, never stored: a session is authenticated iff both tokens
    /// are present.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }
}

/// Sole owner of session state. Other components read snapshots via
/// [`current`](SessionStore::current) or go through the mutation methods;
/// none hold a copy that can go stale beyond the current call.
///
/// Each mutation holds the write lock across both the storage write and the
/// in-memory update, so readers never observe a half-applied mutation and
/// the durable mirror never diverges from memory within one operation.
pub struct SessionStore {
    state: RwLock<Session>,
    storage: Box<dyn SessionStorage>,
}

impl SessionStore {
    /// Hydrate the store from durable storage. Missing keys are absent
    /// fields; a stored profile that no longer parses is discarded.
    pub fn open(storage: Box<dyn SessionStorage>) -> Result<Self> {
        let access_token = storage.read(keys::ACCESS_TOKEN)?;
        let refresh_token = storage.read(keys::REFRESH_TOKEN)?;
        let user = match storage.read(keys::USER)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(user) => Some(user),
                Err(err) => {
                    warn!(error = %err, "discarding unreadable stored user profile");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            state: RwLock::new(Session {
                access_token,
                refresh_token,
                user,
            }),
            storage,
        })
    }

    /// Non-blocking snapshot of the in-memory state.
    pub fn current(&self) -> Session {
        self.state.read().clone()
    }

    /// Unconditionally overwrite the session with a freshly granted one.
    pub fn login(&self, access_token: String, refresh_token: String, user: Value) -> Result<()> {
        let mut state = self.state.write();
        self.storage.write(keys::ACCESS_TOKEN, &access_token)?;
        self.storage.write(keys::REFRESH_TOKEN, &refresh_token)?;
        self.storage.write(keys::USER, &user.to_string())?;
        *state = Session {
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            user: Some(user),
        };
        Ok(())
    }

    /// Clear every field, in memory and in storage. Sending the user to a
    /// login surface afterwards is the caller's job.
    pub fn logout(&self) -> Result<()> {
        let mut state = self.state.write();
        self.storage.remove(keys::ACCESS_TOKEN)?;
        self.storage.remove(keys::REFRESH_TOKEN)?;
        self.storage.remove(keys::USER)?;
        *state = Session::default();
        Ok(())
    }

    /// Replace the access token; the refresh token only when the identity
    /// service rotated it. The profile is untouched.
    pub fn update_tokens(&self, access_token: String, refresh_token: Option<String>) -> Result<()> {
        let mut state = self.state.write();
        self.storage.write(keys::ACCESS_TOKEN, &access_token)?;
        if let Some(ref refresh_token) = refresh_token {
            self.storage.write(keys::REFRESH_TOKEN, refresh_token)?;
        }
        state.access_token = Some(access_token);
        if refresh_token.is_some() {
            state.refresh_token = refresh_token;
        }
        Ok(())
    }

    /// Replace the cached profile; tokens are untouched.
    pub fn update_user(&self, user: Value) -> Result<()> {
        let mut state = self.state.write();
        self.storage.write(keys::USER, &user.to_string())?;
        state.user = Some(user);
        Ok(())
    }
}
