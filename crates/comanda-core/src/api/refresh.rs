//! Single-flight access-token renewal.

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::SessionStore;

use super::ApiError;

#[derive(Debug, Deserialize)]
struct RefreshGrant {
    access: String,
    /// Identity services may rotate the refresh token; absent means keep
    /// the current one.
    refresh: Option<String>,
}

/// Renews the access token against the identity backend's refresh endpoint.
///
/// One refresher is shared by every service client. Callers that observe a
/// 401 while a renewal is already in flight wait on the same renewal instead
/// of spending the refresh token a second time: whoever acquires the gate
/// first performs the call, and every waiter proceeds with the token it
/// produced.
pub struct TokenRefresher {
    http: Client,
    refresh_url: String,
    session: Arc<SessionStore>,
    gate: Mutex<()>,
}

impl TokenRefresher {
    pub fn new(http: Client, refresh_url: String, session: Arc<SessionStore>) -> Self {
        Self {
            http,
            refresh_url,
            session,
            gate: Mutex::new(()),
        }
    }

    /// Renew the access token. `rejected` is the token the backend just
    /// refused; if the stored token has already moved past it, a concurrent
    /// caller finished the renewal while we waited and there is nothing
    /// left to do.
    ///
    /// Any failure (missing refresh token, network error, non-success
    /// status) means the session cannot be renewed.
    pub async fn refresh(&self, rejected: Option<&str>) -> Result<(), ApiError> {
        let _guard = self.gate.lock().await;

        let current = self.session.current();
        if current.access_token.as_deref() != rejected {
            debug!("access token already renewed by a concurrent request");
            return Ok(());
        }
        let Some(refresh_token) = current.refresh_token else {
            return Err(ApiError::SessionExpired);
        };

        let response = self
            .http
            .post(&self.refresh_url)
            .json(&json!({ "refresh": refresh_token }))
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "refresh endpoint rejected the token");
            return Err(ApiError::SessionExpired);
        }

        let grant: RefreshGrant = response.json().await?;
        self.session
            .update_tokens(grant.access, grant.refresh)
            .map_err(|err| ApiError::Storage(err.to_string()))?;
        debug!("access token renewed");
        Ok(())
    }
}
