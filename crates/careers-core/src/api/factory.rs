use std::sync::Arc;

use super::{ApiError, HttpClient};
use crate::auth::{SessionExpiredHandler, SessionGuard, SessionStore};
use crate::config::ClientConfig;

/// The two clients a view needs: one anonymous, one carrying the session.
#[derive(Clone, Debug)]
pub struct ApiClients {
    pub api: HttpClient,
    pub auth_api: HttpClient,
}

/// Builds configured clients. Stateless apart from the injected
/// collaborators; instances are not cached.
#[derive(Clone)]
pub struct ClientFactory {
    config: ClientConfig,
    store: Arc<dyn SessionStore>,
    on_expired: Arc<dyn SessionExpiredHandler>,
}

impl ClientFactory {
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn SessionStore>,
        on_expired: Arc<dyn SessionExpiredHandler>,
    ) -> Self {
        Self {
            config,
            store,
            on_expired,
        }
    }

    pub fn create(&self, with_auth: bool) -> Result<HttpClient, ApiError> {
        let guard = with_auth.then(|| {
            SessionGuard::new(
                self.store.clone(),
                self.on_expired.clone(),
                self.config.login_path.clone(),
            )
        });
        HttpClient::new(self.config.clone(), guard)
    }

    pub fn anonymous(&self) -> Result<HttpClient, ApiError> {
        self.create(false)
    }

    pub fn authenticated(&self) -> Result<HttpClient, ApiError> {
        self.create(true)
    }

    pub fn clients(&self) -> Result<ApiClients, ApiError> {
        Ok(ApiClients {
            api: self.anonymous()?,
            auth_api: self.authenticated()?,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{LogOnlyHandler, MemorySessionStore};

    fn factory() -> ClientFactory {
        ClientFactory::new(
            ClientConfig::new("http://api.test:5000"),
            Arc::new(MemorySessionStore::new()),
            Arc::new(LogOnlyHandler),
        )
    }

    #[test]
    fn test_create_respects_flag() {
        let f = factory();
        assert!(!f.create(false).unwrap().is_authenticated());
        assert!(f.create(true).unwrap().is_authenticated());
    }

    #[test]
    fn test_repeated_calls_are_equivalent() {
        let f = factory();
        let a = f.authenticated().unwrap();
        let b = f.authenticated().unwrap();
        assert_eq!(a.base_url(), b.base_url());
        assert_eq!(a.config(), b.config());
        assert_eq!(a.is_authenticated(), b.is_authenticated());

        let pair = f.clients().unwrap();
        assert_eq!(pair.api.base_url(), "http://api.test:5000");
        assert!(!pair.api.is_authenticated());
        assert!(pair.auth_api.is_authenticated());
    }
}
