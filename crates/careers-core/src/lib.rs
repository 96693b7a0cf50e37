//! Client core for the Coretech careers portal.
//!
//! Browsing jobs, applying, and managing an applicant account all go
//! through a remote REST API. This crate holds everything below the
//! presentation layer: client factory, session guard and stores, typed
//! endpoints, models, settings and formatting helpers.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod settings;
pub mod utils;

pub use api::{ApiClients, ApiError, CareersApi, ClientFactory, HttpClient};
pub use auth::{SessionExpiredHandler, SessionGuard, SessionStore};
pub use config::{ClientConfig, Config};
pub use settings::PortalSettings;
