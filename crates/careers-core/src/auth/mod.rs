//! Session management for applicant authentication.
//!
//! This module provides:
//! - `SessionStore`: persisted storage for the bearer credential, with
//!   in-memory, file and OS keychain backends
//! - `SessionGuard`: attaches the credential to authenticated requests and
//!   tears the session down when the server answers 401
//!
//! There is no refresh or sliding expiry; a credential stays valid until
//! logout or until the server rejects it.

pub mod guard;
pub mod store;

pub use guard::{LogOnlyHandler, SessionExpiredHandler, SessionGuard, LOGIN_PATH};
pub use store::{
    FileSessionStore, KeyringSessionStore, MemorySessionStore, SessionData, SessionStore,
    StoreError, TOKEN_KEY,
};
