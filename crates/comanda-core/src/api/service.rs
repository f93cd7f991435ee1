//! One operation per business action, routed to the owning backend.
//!
//! The router contributes no request logic of its own: it resolves which
//! client serves an operation at construction time, substitutes entity ids
//! into path templates, and delegates. Payloads stay opaque JSON; their
//! business meaning lives with the callers.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::auth::{Session, SessionStore};
use crate::config::{Backend, Config};
use crate::notify::Notifications;

use super::client::{default_http_client, Payload, ServiceClient};
use super::endpoints::{identity, operations, pos};
use super::{ApiError, Navigator, TokenRefresher};

/// Identity backend's answer to a successful login.
#[derive(Debug, Deserialize)]
struct LoginGrant {
    access: String,
    refresh: String,
    user: Value,
}

/// The full client surface: one `ServiceClient` per backend over one shared
/// connection pool and one shared token refresher.
pub struct ServiceRouter {
    identity: ServiceClient,
    operations: ServiceClient,
    pos: ServiceClient,
    session: Arc<SessionStore>,
}

impl ServiceRouter {
    pub fn new(
        config: &Config,
        session: Arc<SessionStore>,
        notify: Notifications,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let http = default_http_client()?;
        let refresher = Arc::new(TokenRefresher::new(
            http.clone(),
            format!("{}{}", config.base_url(Backend::Identity), identity::REFRESH),
            session.clone(),
        ));

        let client = |backend: Backend| {
            ServiceClient::new(
                http.clone(),
                config.base_url(backend),
                session.clone(),
                refresher.clone(),
                notify.clone(),
                navigator.clone(),
            )
        };

        Ok(Self {
            identity: client(Backend::Identity),
            operations: client(Backend::Operations),
            pos: client(Backend::PointOfSale),
            session,
        })
    }

    /// The client bound to the identity backend, for calls outside the
    /// fixed operation set.
    pub fn identity(&self) -> &ServiceClient {
        &self.identity
    }

    pub fn operations(&self) -> &ServiceClient {
        &self.operations
    }

    pub fn pos(&self) -> &ServiceClient {
        &self.pos
    }

    // ===== Identity =====

    /// Exchange credentials for a token pair and store the granted session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let payload = self
            .identity
            .post(identity::LOGIN, &json!({ "email": email, "password": password }))
            .await?;
        let grant: LoginGrant = payload.into_json()?;
        self.session
            .login(grant.access, grant.refresh, grant.user)
            .map_err(|err| ApiError::Storage(err.to_string()))?;
        Ok(self.session.current())
    }

    /// Revoke the refresh token server-side, then clear the local session.
    /// Revocation is best-effort: a dead identity service must not trap the
    /// user in a session, so the clear always runs.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Some(refresh_token) = self.session.current().refresh_token {
            if let Err(err) = self
                .identity
                .post(identity::LOGOUT, &json!({ "refresh": refresh_token }))
                .await
            {
                warn!(error = %err, "server-side token revocation failed");
            }
        }
        self.session
            .logout()
            .map_err(|err| ApiError::Storage(err.to_string()))
    }

    pub async fn register(&self, details: &Value) -> Result<Payload, ApiError> {
        self.identity.post(identity::REGISTER, details).await
    }

    pub async fn profile(&self) -> Result<Payload, ApiError> {
        self.identity.get(identity::PROFILE, &[]).await
    }

    /// Update the profile and mirror the fresh record into the session.
    pub async fn update_profile(&self, details: &Value) -> Result<Payload, ApiError> {
        let payload = self.identity.patch(identity::PROFILE, details).await?;
        if let Some(user) = payload.as_json() {
            self.session
                .update_user(user.clone())
                .map_err(|err| ApiError::Storage(err.to_string()))?;
        }
        Ok(payload)
    }

    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<Payload, ApiError> {
        self.identity
            .post(
                identity::CHANGE_PASSWORD,
                &json!({
                    "old_password": old_password,
                    "new_password": new_password,
                    "new_password2": new_password,
                }),
            )
            .await
    }

    pub async fn validate_token(&self, token: &str) -> Result<Payload, ApiError> {
        self.identity
            .post(identity::VALIDATE, &json!({ "token": token }))
            .await
    }

    pub async fn roles(&self) -> Result<Payload, ApiError> {
        self.identity.get(identity::ROLES, &[]).await
    }

    pub async fn users(&self) -> Result<Payload, ApiError> {
        self.identity.get(identity::USERS, &[]).await
    }

    // ===== Operations: inventory =====

    pub async fn products(&self, params: &[(&str, &str)]) -> Result<Payload, ApiError> {
        self.operations.get(operations::PRODUCTS, params).await
    }

    pub async fn create_product(&self, details: &Value) -> Result<Payload, ApiError> {
        self.operations.post(operations::PRODUCTS, details).await
    }

    pub async fn update_product(&self, id: u64, details: &Value) -> Result<Payload, ApiError> {
        self.operations.patch(&operations::product(id), details).await
    }

    pub async fn delete_product(&self, id: u64) -> Result<Payload, ApiError> {
        self.operations.delete(&operations::product(id)).await
    }

    pub async fn adjust_stock(&self, id: u64, details: &Value) -> Result<Payload, ApiError> {
        self.operations
            .post(&operations::product_adjust_stock(id), details)
            .await
    }

    pub async fn categories(&self) -> Result<Payload, ApiError> {
        self.operations.get(operations::CATEGORIES, &[]).await
    }

    pub async fn create_category(&self, details: &Value) -> Result<Payload, ApiError> {
        self.operations.post(operations::CATEGORIES, details).await
    }

    pub async fn suppliers(&self) -> Result<Payload, ApiError> {
        self.operations.get(operations::SUPPLIERS, &[]).await
    }

    pub async fn create_supplier(&self, details: &Value) -> Result<Payload, ApiError> {
        self.operations.post(operations::SUPPLIERS, details).await
    }

    pub async fn update_supplier(&self, id: u64, details: &Value) -> Result<Payload, ApiError> {
        self.operations.patch(&operations::supplier(id), details).await
    }

    pub async fn delete_supplier(&self, id: u64) -> Result<Payload, ApiError> {
        self.operations.delete(&operations::supplier(id)).await
    }

    pub async fn purchases(&self, params: &[(&str, &str)]) -> Result<Payload, ApiError> {
        self.operations.get(operations::PURCHASES, params).await
    }

    pub async fn create_purchase(&self, details: &Value) -> Result<Payload, ApiError> {
        self.operations.post(operations::PURCHASES, details).await
    }

    pub async fn recipes(&self) -> Result<Payload, ApiError> {
        self.operations.get(operations::RECIPES, &[]).await
    }

    pub async fn create_recipe(&self, details: &Value) -> Result<Payload, ApiError> {
        self.operations.post(operations::RECIPES, details).await
    }

    pub async fn update_recipe(&self, id: u64, details: &Value) -> Result<Payload, ApiError> {
        self.operations.patch(&operations::recipe(id), details).await
    }

    pub async fn delete_recipe(&self, id: u64) -> Result<Payload, ApiError> {
        self.operations.delete(&operations::recipe(id)).await
    }

    // ===== Point of sale =====

    pub async fn menu_categories(&self) -> Result<Payload, ApiError> {
        self.pos.get(pos::MENU_CATEGORIES, &[]).await
    }

    pub async fn menu_items(&self, params: &[(&str, &str)]) -> Result<Payload, ApiError> {
        self.pos.get(pos::MENU_ITEMS, params).await
    }

    pub async fn available_menu_items(&self) -> Result<Payload, ApiError> {
        self.pos.get(pos::MENU_ITEMS_AVAILABLE, &[]).await
    }

    pub async fn create_menu_item(&self, details: &Value) -> Result<Payload, ApiError> {
        self.pos.post(pos::MENU_ITEMS, details).await
    }

    pub async fn update_menu_item(&self, id: u64, details: &Value) -> Result<Payload, ApiError> {
        self.pos.patch(&pos::menu_item(id), details).await
    }

    pub async fn recalculate_menu_item_cost(&self, id: u64) -> Result<Payload, ApiError> {
        self.pos
            .post(&pos::menu_item_recalculate_cost(id), &json!({}))
            .await
    }

    pub async fn zones(&self) -> Result<Payload, ApiError> {
        self.pos.get(pos::ZONES, &[]).await
    }

    pub async fn tables(&self, params: &[(&str, &str)]) -> Result<Payload, ApiError> {
        self.pos.get(pos::TABLES, params).await
    }

    pub async fn update_table_status(&self, id: u64, status: &str) -> Result<Payload, ApiError> {
        self.pos
            .post(&pos::table_update_status(id), &json!({ "status": status }))
            .await
    }

    pub async fn tables_summary(&self) -> Result<Payload, ApiError> {
        self.pos.get(pos::TABLES_STATUS_SUMMARY, &[]).await
    }

    pub async fn orders(&self, params: &[(&str, &str)]) -> Result<Payload, ApiError> {
        self.pos.get(pos::ORDERS, params).await
    }

    pub async fn create_order(&self, details: &Value) -> Result<Payload, ApiError> {
        self.pos.post(pos::ORDERS, details).await
    }

    pub async fn update_order_status(&self, id: u64, status: &str) -> Result<Payload, ApiError> {
        self.pos
            .post(&pos::order_change_status(id), &json!({ "status": status }))
            .await
    }

    pub async fn add_order_item(&self, id: u64, details: &Value) -> Result<Payload, ApiError> {
        self.pos.post(&pos::order_add_item(id), details).await
    }

    pub async fn add_order_payment(&self, id: u64, details: &Value) -> Result<Payload, ApiError> {
        self.pos.post(&pos::order_add_payment(id), details).await
    }

    pub async fn kitchen_orders(&self) -> Result<Payload, ApiError> {
        self.pos.get(pos::ORDERS_KDS, &[]).await
    }

    pub async fn daily_summary(&self) -> Result<Payload, ApiError> {
        self.pos.get(pos::ORDERS_DAILY_SUMMARY, &[]).await
    }
}
