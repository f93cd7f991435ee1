//! Data-access layer for the comanda point-of-sale application.
//!
//! This crate talks to three backend services (identity, operations,
//! point-of-sale) through one HTTP contract, keeps the user session alive
//! across short-lived access tokens, and reports failures to a user-facing
//! notification queue without ever swallowing them.
//!
//! The host application supplies navigation (see [`Navigator`]) and decides
//! where session state is mirrored (see [`SessionStorage`]); everything else
//! lives here.

pub mod api;
pub mod auth;
pub mod config;
pub mod notify;

pub use api::{
    ApiError, Envelope, Navigator, Payload, ServiceClient, ServiceRouter, TokenRefresher,
};
pub use auth::storage::{FileStorage, KeyringStorage, MemoryStorage, SessionStorage};
pub use auth::{Session, SessionStore};
pub use config::{Backend, Config};
pub use notify::{Notification, Notifications, Severity};
