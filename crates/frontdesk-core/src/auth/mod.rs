//! Authentication module for the console session.
//!
//! This module provides:
//! - `token`: structural decoding of bearer credentials (expiry only, no signature check)
//! - `SessionStore`: the process-wide session, persisted through a `SessionStorage`
//! - `AuthGateway`: login/logout against the backend
//!
//! The session is persisted under a single key and rehydrated at startup.

pub mod gateway;
pub mod session;
pub mod storage;
pub mod token;

pub use gateway::AuthGateway;
pub use session::{SessionData, SessionStore, SESSION_STORAGE_KEY};
pub use storage::{FileStorage, KeyringStorage, MemoryStorage, SessionStorage};
pub use token::{DecodeError, TokenClaims};
