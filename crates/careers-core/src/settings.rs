//! Portal-wide presentation settings.
//!
//! These are consumed by front ends (formatting, upload checks, filter
//! choices); the HTTP layer does not read them.

use serde::Serialize;

use crate::models::{JobCategory, JobStatus, JobType};

/// 5 MiB
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub default_page_size: usize,
    pub page_size_options: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortalSettings {
    pub app_name: String,
    pub default_currency: String,
    /// chrono format string, renders like "Mar 05, 2025"
    pub date_format: String,
    pub time_format: String,
    pub max_file_size: u64,
    pub allowed_file_types: Vec<String>,
    pub pagination: Pagination,
    pub job_types: Vec<JobType>,
    pub job_categories: Vec<JobCategory>,
    pub job_statuses: Vec<JobStatus>,
    pub currencies: Vec<String>,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            app_name: "Coretech".to_string(),
            default_currency: "USD".to_string(),
            date_format: "%b %d, %Y".to_string(),
            time_format: "%H:%M".to_string(),
            max_file_size: MAX_UPLOAD_BYTES,
            allowed_file_types: vec![MIME_PDF.into(), MIME_DOC.into(), MIME_DOCX.into()],
            pagination: Pagination {
                default_page_size: 10,
                page_size_options: vec![5, 10, 25, 50],
            },
            job_types: JobType::ALL.to_vec(),
            job_categories: JobCategory::ALL.to_vec(),
            job_statuses: vec![JobStatus::Active, JobStatus::Closed, JobStatus::Draft],
            currencies: ["USD", "EUR", "GBP", "INR", "AUD", "CAD"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl PortalSettings {
    pub fn is_allowed_file_type(&self, mime: &str) -> bool {
        self.allowed_file_types.iter().any(|t| t.eq_ignore_ascii_case(mime))
    }

    /// Map a file extension onto one of the accepted document types
    pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(MIME_PDF),
            "doc" => Some(MIME_DOC),
            "docx" => Some(MIME_DOCX),
            _ => None,
        }
    }
}
