//! REST API client module for the careers portal.
//!
//! - `ClientFactory` builds anonymous and authenticated `HttpClient`s
//! - `HttpClient` issues verb-level requests and maps failures to `ApiError`
//! - `CareersApi` wraps the portal endpoints with typed requests and responses
//!
//! Authenticated requests carry `Authorization: Bearer <token>`; see
//! `crate::auth::SessionGuard` for how a 401 ends the session.

pub mod careers;
pub mod client;
pub mod error;
pub mod factory;

pub use careers::{confirm_password, CareersApi};
pub use client::HttpClient;
pub use error::ApiError;
pub use factory::{ApiClients, ClientFactory};
