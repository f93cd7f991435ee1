//! Backend addressing configuration.
//!
//! Every request targets one of three backend services. Deployments either
//! address each service directly (development) or send everything through a
//! single reverse-proxy gateway (production). The choice is made once, when
//! the configuration is built; client code only ever asks for a base URL.

use serde::{Deserialize, Serialize};

/// Default identity service address (direct, no gateway).
const DEFAULT_IDENTITY_URL: &str = "http://localhost:8001";

/// Default operations service address (direct, no gateway).
const DEFAULT_OPERATIONS_URL: &str = "http://localhost:8000";

/// Default point-of-sale service address (direct, no gateway).
const DEFAULT_POS_URL: &str = "http://localhost:8002";

/// The backend services the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Authentication, token renewal, user accounts.
    Identity,
    /// Inventory: products, categories, suppliers, purchases, recipes.
    Operations,
    /// Floor operations: menu, zones, tables, orders.
    PointOfSale,
}

/// Base addresses for every backend, fixed at configuration time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub gateway_url: String,
    pub identity_url: String,
    pub operations_url: String,
    pub pos_url: String,
    /// Route every backend through `gateway_url` instead of its own address.
    pub use_gateway: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway_url: String::new(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            operations_url: DEFAULT_OPERATIONS_URL.to_string(),
            pos_url: DEFAULT_POS_URL.to_string(),
            use_gateway: false,
        }
    }
}

impl Config {
    /// Build a configuration from `COMANDA_*` environment variables, falling
    /// back to the direct localhost defaults. The gateway is used when
    /// `COMANDA_USE_GATEWAY` says so, or by default whenever a gateway
    /// address is set.
    pub fn from_env() -> Self {
        let gateway_url = std::env::var("COMANDA_GATEWAY_URL").unwrap_or_default();
        let use_gateway = match std::env::var("COMANDA_USE_GATEWAY") {
            Ok(value) => value != "false" && value != "0",
            Err(_) => !gateway_url.is_empty(),
        };
        Self {
            identity_url: std::env::var("COMANDA_IDENTITY_URL")
                .unwrap_or_else(|_| DEFAULT_IDENTITY_URL.to_string()),
            operations_url: std::env::var("COMANDA_OPERATIONS_URL")
                .unwrap_or_else(|_| DEFAULT_OPERATIONS_URL.to_string()),
            pos_url: std::env::var("COMANDA_POS_URL")
                .unwrap_or_else(|_| DEFAULT_POS_URL.to_string()),
            gateway_url,
            use_gateway,
        }
    }

    /// Resolve the base address for a backend under the current deployment.
    pub fn base_url(&self, backend: Backend) -> &str {
        if self.use_gateway {
            return &self.gateway_url;
        }
        match backend {
            Backend::Identity => &self.identity_url,
            Backend::Operations => &self.operations_url,
            Backend::PointOfSale => &self.pos_url,
        }
    }
}
