//! Data models for careers portal entities.
//!
//! - `Job`, `JobFilters` and the job enumerations
//! - `Application` and the multipart `ApplicationSubmission`
//! - `ApplicantProfile`, `Applicant` and the auth request/response types
//! - `ApiResponse<T>`: the `{ success, data, message }` envelope

pub mod application;
pub mod job;
pub mod user;

use serde::Deserialize;

pub use application::{
    Application, ApplicationData, ApplicationJob, ApplicationSubmission, ResumeUpload,
};
pub use job::{Job, JobCategory, JobFilters, JobStatus, JobType};
pub use user::{
    Applicant, ApplicantProfile, AuthResponse, Credentials, ProfileDetails, Registration,
    APPLICANT_ROLE,
};

/// Response envelope used by every portal endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: Option<bool>,
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

/// Responses whose payload the client does not model (password reset,
/// application receipts). `data` is kept verbatim for the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}
