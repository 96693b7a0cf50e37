use std::fmt;
use std::sync::Arc;

use reqwest::RequestBuilder;
use tracing::{debug, warn};

use super::SessionStore;
use crate::api::ApiError;

/// Route the applicant is sent to when the session is no longer valid.
pub const LOGIN_PATH: &str = "/careers/login";

/// Notified when the server rejects the stored credential.
///
/// Implementations should discard any in-memory applicant state and
/// send the user back to `login_path`.
pub trait SessionExpiredHandler: Send + Sync {
    fn session_expired(&self, login_path: &str);
}

impl<F> SessionExpiredHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn session_expired(&self, login_path: &str) {
        self(login_path)
    }
}

/// Handler that only logs. Useful when there is nowhere to redirect to.
pub struct LogOnlyHandler;

impl SessionExpiredHandler for LogOnlyHandler {
    fn session_expired(&self, login_path: &str) {
        warn!(login_path, "Session expired");
    }
}

/// Request/response interceptor pair for the authenticated client.
#[derive(Clone)]
pub struct SessionGuard {
    store: Arc<dyn SessionStore>,
    on_expired: Arc<dyn SessionExpiredHandler>,
    login_path: String,
}

impl fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionGuard")
            .field("login_path", &self.login_path)
            .finish_non_exhaustive()
    }
}

impl SessionGuard {
    pub fn new(
        store: Arc<dyn SessionStore>,
        on_expired: Arc<dyn SessionExpiredHandler>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            store,
            on_expired,
            login_path: login_path.into(),
        }
    }

    /// Attach the stored credential, if there is one. Never fails.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.get() {
            Some(token) => request.bearer_auth(token),
            None => {
                debug!("No session credential stored, sending request without Authorization");
                request
            }
        }
    }

    /// Inspect a failed call. A 401 tears the session down and fires the
    /// expiry handler; the error is always handed back unchanged.
    pub fn reject(&self, error: ApiError) -> ApiError {
        if error.is_unauthorized() {
            // Clear before signalling so no later request can carry the token
            if let Err(e) = self.store.clear() {
                warn!(error = %e, "Failed to clear session credential after 401");
            }
            warn!(login_path = %self.login_path, "Server rejected session credential");
            self.on_expired.session_expired(&self.login_path);
        }
        error
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }
}
