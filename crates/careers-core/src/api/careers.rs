//! Typed wrapper over the portal endpoints.
//!
//! Public browsing and the password-reset flow go through the anonymous
//! client; anything tied to the applicant's account goes through the
//! authenticated one.

use std::borrow::Cow;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{ApiClients, ApiError, ClientFactory};
use crate::auth::SessionStore;
use crate::models::{
    Ack, Applicant, ApplicantProfile, Application, ApplicationSubmission, ApiResponse,
    AuthResponse, Credentials, Job, JobFilters, Registration,
};
use crate::settings::PortalSettings;

#[derive(Clone)]
pub struct CareersApi {
    clients: ApiClients,
    store: Arc<dyn SessionStore>,
    settings: PortalSettings,
}

impl CareersApi {
    pub fn new(factory: &ClientFactory) -> Result<Self, ApiError> {
        Ok(Self {
            clients: factory.clients()?,
            store: factory.store().clone(),
            settings: PortalSettings::default(),
        })
    }

    pub fn with_settings(mut self, settings: PortalSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &PortalSettings {
        &self.settings
    }

    pub fn clients(&self) -> &ApiClients {
        &self.clients
    }

    pub fn is_logged_in(&self) -> bool {
        self.store.is_present()
    }

    // ===== Jobs =====

    pub async fn list_jobs(&self, filters: &JobFilters) -> Result<Vec<Job>, ApiError> {
        let resp: ApiResponse<Vec<Job>> = self
            .clients
            .api
            .get_with_query("/api/jobs/public", filters)
            .await?;
        debug!(count = resp.data.len(), "Fetched public jobs");
        Ok(resp.data)
    }

    pub async fn get_job(&self, job_id: &str) -> Result<Job, ApiError> {
        let path = format!("/api/jobs/{}", path_segment(job_id)?);
        let resp: ApiResponse<Job> = self.clients.api.get(&path).await?;
        Ok(resp.data)
    }

    /// Fetch several jobs concurrently; results keep the order of `job_ids`.
    pub async fn get_jobs(&self, job_ids: &[String]) -> Vec<Result<Job, ApiError>> {
        join_all(job_ids.iter().map(|id| self.get_job(id))).await
    }

    // ===== Applications =====

    /// Validate locally, then upload the application as multipart form data.
    pub async fn apply(
        &self,
        job: &Job,
        submission: ApplicationSubmission,
    ) -> Result<Ack, ApiError> {
        if !job.is_open() {
            return Err(ApiError::validation("Applications Closed"));
        }
        submission.validate(&self.settings, &job.questions)?;

        let path = format!("/api/applications/jobs/{}/apply", path_segment(&job.id)?);
        let ack: Option<Ack> = self
            .clients
            .auth_api
            .post_multipart(&path, submission.into_form()?)
            .await?;
        info!(job_id = %job.id, "Application submitted");
        Ok(ack.unwrap_or_default())
    }

    pub async fn list_applications(&self) -> Result<Vec<Application>, ApiError> {
        let resp: ApiResponse<Vec<Application>> =
            self.clients.auth_api.get("/api/applications").await?;
        Ok(resp.data)
    }

    // ===== Account =====

    /// Log in and store the returned credential.
    pub async fn login(&self, credentials: &Credentials) -> Result<Option<Applicant>, ApiError> {
        let resp: AuthResponse = self.clients.api.post("/api/auth/login", credentials).await?;
        self.store_session(resp, "Login failed")
    }

    pub async fn register(&self, registration: &Registration) -> Result<Option<Applicant>, ApiError> {
        let resp: AuthResponse = self
            .clients
            .api
            .post("/api/auth/register", registration)
            .await?;
        self.store_session(resp, "Registration failed")
    }

    fn store_session(&self, resp: AuthResponse, fallback: &str) -> Result<Option<Applicant>, ApiError> {
        let token = resp.token().map(str::to_string).ok_or_else(|| {
            ApiError::InvalidResponse(
                resp.message.clone().unwrap_or_else(|| fallback.to_string()),
            )
        })?;
        self.store.set(&token)?;
        info!("Session started");
        Ok(resp.into_user())
    }

    /// Forget the local credential. No server call is made.
    pub fn logout(&self) -> Result<(), ApiError> {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear session on logout");
            return Err(e.into());
        }
        info!("Logged out");
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>, ApiError> {
        let ack: Option<Ack> = self
            .clients
            .api
            .post("/api/auth/forgot-password", &json!({ "email": email }))
            .await?;
        Ok(ack.and_then(|a| a.message))
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<Option<String>, ApiError> {
        let ack: Option<Ack> = self
            .clients
            .api
            .post(
                "/api/auth/reset-password",
                &json!({ "token": token, "password": password }),
            )
            .await?;
        Ok(ack.and_then(|a| a.message))
    }

    // ===== Profile =====

    pub async fn get_profile(&self) -> Result<ApplicantProfile, ApiError> {
        let resp: ApiResponse<ApplicantProfile> =
            self.clients.auth_api.get("/api/applicant/profile").await?;
        Ok(resp.data)
    }

    pub async fn update_profile(&self, profile: &ApplicantProfile) -> Result<ApplicantProfile, ApiError> {
        let resp: ApiResponse<ApplicantProfile> = self
            .clients
            .auth_api
            .put("/api/applicant/profile", profile)
            .await?;
        Ok(resp.data)
    }
}

/// Escape an id for use as a single path segment. Ids that would be
/// resolved away as dot segments are rejected outright.
fn path_segment(id: &str) -> Result<Cow<'_, str>, ApiError> {
    match id.trim() {
        "" | "." | ".." => Err(ApiError::validation(format!("Invalid id: '{}'", id))),
        _ => Ok(urlencoding::encode(id)),
    }
}

/// Reject mismatched password confirmation before anything is sent.
pub fn confirm_password(password: &str, confirmation: &str) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::validation("Password cannot be empty"));
    }
    if password != confirmation {
        return Err(ApiError::validation("Passwords do not match"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segment_escapes_separators() {
        assert_eq!(path_segment("64f1c0ffee").unwrap(), "64f1c0ffee");
        assert_eq!(path_segment("../applications").unwrap(), "..%2Fapplications");
        assert_eq!(path_segment("1?x=2#top").unwrap(), "1%3Fx%3D2%23top");
        assert_eq!(path_segment("a b").unwrap(), "a%20b");
        for bad in ["", " ", ".", ".."] {
            assert!(matches!(path_segment(bad), Err(ApiError::Validation(_))), "{:?}", bad);
        }
    }

    #[test]
    fn test_confirm_password() {
        assert!(confirm_password("s3cret", "s3cret").is_ok());
        assert_eq!(
            confirm_password("s3cret", "secret").unwrap_err().to_string(),
            "Passwords do not match"
        );
        assert!(confirm_password("", "").is_err());
    }
}
