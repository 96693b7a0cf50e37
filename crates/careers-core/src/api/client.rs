//! Verb-level HTTP client for the portal REST API.
//!
//! An `HttpClient` is either anonymous or authenticated. The authenticated
//! variant routes every request through a `SessionGuard`. Nothing is
//! retried: a failed call stays failed and the caller decides what to show.

use reqwest::multipart::Form;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::ApiError;
use crate::auth::SessionGuard;
use crate::config::ClientConfig;

/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
    guard: Option<SessionGuard>,
}

impl HttpClient {
    /// Build a client. Performs no network I/O.
    pub fn new(config: ClientConfig, guard: Option<SessionGuard>) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            config,
            guard,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_authenticated(&self) -> bool {
        self.guard.is_some()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path).query(query)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    /// POST a multipart body; the form sets its own boundary content type.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        self.send(self.request(Method::POST, path).multipart(form)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::DELETE, path)).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.url(path);
        debug!(method = %method, url = %url, authenticated = self.is_authenticated(), "Sending request");
        let request = self.client.request(method, url);
        match &self.guard {
            Some(guard) => guard.authorize(request),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        match Self::execute(request).await {
            Ok(value) => Ok(value),
            Err(e) => Err(match &self.guard {
                Some(guard) => guard.reject(e),
                None => e,
            }),
        }
    }

    async fn execute<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        let body = match response.text().await {
            Ok(body) => body,
            // A failed call is classified by its status even if the body is lost
            Err(e) if !status.is_success() => {
                debug!(status = status.as_u16(), error = %e, "Failed to read error body");
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        if !status.is_success() {
            debug!(status = status.as_u16(), url = %url, "Request failed");
            return Err(ApiError::from_status(status, &body));
        }

        // Empty bodies (204, bare acknowledgements) decode as JSON null
        let text = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }
}
