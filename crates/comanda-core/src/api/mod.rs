//! HTTP clients for the backend services.
//!
//! This module provides:
//! - `ServiceClient`: one backend, one base address; credential attachment,
//!   transparent re-authentication, error normalization
//! - `TokenRefresher`: single-flight access-token renewal
//! - `ServiceRouter`: one operation per business action, routed to the
//!   backend that owns it
//!
//! Backends use JSON REST with bearer-token authentication; the identity
//! service issues short-lived access tokens renewed against its refresh
//! endpoint.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod refresh;
pub mod service;

pub use client::{merge_headers, Envelope, Payload, ServiceClient};
pub use error::ApiError;
pub use refresh::TokenRefresher;
pub use service::ServiceRouter;

/// Host-application hook for sending the user to the login surface after an
/// unrecoverable session failure. Navigation itself lives outside this
/// crate; the client only ever invokes it by name.
pub trait Navigator: Send + Sync {
    fn goto_login(&self);
}
