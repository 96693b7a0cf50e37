use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::settings::PortalSettings;

/// Job summary embedded in an application listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ApplicationJob {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(rename = "type", default)]
    pub job_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ApplicationData {
    #[serde(rename = "coverLetter", default)]
    pub cover_letter: Option<String>,
    /// Server-side location of the uploaded resume
    #[serde(default)]
    pub resume: Option<String>,
    #[serde(default)]
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: String,
    pub job: ApplicationJob,
    #[serde(rename = "appliedAt", default)]
    pub applied_at: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "applicationData", default)]
    pub application_data: ApplicationData,
}

impl Application {
    pub fn location(&self) -> String {
        match (&self.job.city, &self.job.state) {
            (Some(city), Some(state)) => format!("{}, {}", city, state),
            (Some(city), None) => city.clone(),
            (None, Some(state)) => state.clone(),
            (None, None) => String::new(),
        }
    }
}

/// Resume file attached to an application
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ResumeUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a resume from disk, inferring the MIME type from its extension
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ApiError::validation(format!("Invalid resume path: {}", path.display())))?
            .to_string();
        let mime_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(PortalSettings::mime_for_extension)
            .ok_or_else(|| {
                ApiError::validation("Accepted formats: PDF, DOC, DOCX")
            })?;
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ApiError::validation(format!("Could not read {}: {}", path.display(), e))
        })?;
        Ok(Self::new(file_name, mime_type, bytes))
    }

    pub fn validate(&self, settings: &PortalSettings) -> Result<(), ApiError> {
        if self.bytes.is_empty() {
            return Err(ApiError::validation("Resume file is empty"));
        }
        if self.bytes.len() as u64 > settings.max_file_size {
            return Err(ApiError::validation(format!(
                "Resume exceeds the maximum size of {} MB",
                settings.max_file_size / (1024 * 1024)
            )));
        }
        if !settings.is_allowed_file_type(&self.mime_type) {
            return Err(ApiError::validation("Accepted formats: PDF, DOC, DOCX"));
        }
        Ok(())
    }
}

/// Everything the applicant submits for one job
#[derive(Debug, Clone)]
pub struct ApplicationSubmission {
    pub cover_letter: String,
    pub resume: ResumeUpload,
    /// One answer per screening question, in question order
    pub answers: Vec<String>,
}

impl ApplicationSubmission {
    pub fn new(cover_letter: impl Into<String>, resume: ResumeUpload) -> Self {
        Self {
            cover_letter: cover_letter.into(),
            resume,
            answers: Vec::new(),
        }
    }

    pub fn with_answers(mut self, answers: Vec<String>) -> Self {
        self.answers = answers;
        self
    }

    pub fn validate(&self, settings: &PortalSettings, questions: &[String]) -> Result<(), ApiError> {
        self.resume.validate(settings)?;
        if self.answers.len() < questions.len()
            || self.answers.iter().take(questions.len()).any(|a| a.trim().is_empty())
        {
            return Err(ApiError::validation(format!(
                "Please answer all {} screening questions",
                questions.len()
            )));
        }
        Ok(())
    }

    /// Multipart body: `coverLetter`, `resume` file part, `answers` as a JSON array string
    pub fn into_form(self) -> Result<Form, ApiError> {
        let answers = serde_json::to_string(&self.answers)
            .map_err(|e| ApiError::validation(format!("Invalid answers: {}", e)))?;
        let resume = Part::bytes(self.resume.bytes)
            .file_name(self.resume.file_name)
            .mime_str(&self.resume.mime_type)
            .map_err(|e| ApiError::validation(format!("Invalid resume type: {}", e)))?;
        Ok(Form::new()
            .text("coverLetter", self.cover_letter)
            .part("resume", resume)
            .text("answers", answers))
    }
}
