//! Session state and its durable mirrors.
//!
//! This module provides:
//! - `SessionStore`: the single owner of the current authentication state
//! - `SessionStorage`: pluggable durable storage (files, OS keychain, memory)
//!
//! Every mutation is mirrored to storage, so a process restart observes the
//! same session.

pub mod session;
pub mod storage;

pub use session::{Session, SessionStore};
pub use storage::{FileStorage, KeyringStorage, MemoryStorage, SessionStorage};
