use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::{pluralize, strip_html, truncate_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum JobType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Internship,
}

impl JobType {
    pub const ALL: [JobType; 4] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Internship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Internship => "Internship",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = String;

    /// Accepts "Full-time", "full-time", "fulltime", "full_time", ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "fulltime" => Ok(JobType::FullTime),
            "parttime" => Ok(JobType::PartTime),
            "contract" => Ok(JobType::Contract),
            "internship" => Ok(JobType::Internship),
            _ => Err(format!(
                "unknown job type '{}' (expected one of: {})",
                s,
                JobType::ALL.map(|t| t.as_str()).join(", ")
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum JobCategory {
    Engineering,
    Design,
    Marketing,
    Sales,
    Operations,
}

impl JobCategory {
    pub const ALL: [JobCategory; 5] = [
        JobCategory::Engineering,
        JobCategory::Design,
        JobCategory::Marketing,
        JobCategory::Sales,
        JobCategory::Operations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobCategory::Engineering => "Engineering",
            JobCategory::Design => "Design",
            JobCategory::Marketing => "Marketing",
            JobCategory::Sales => "Sales",
            JobCategory::Operations => "Operations",
        }
    }
}

impl fmt::Display for JobCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown category '{}' (expected one of: {})",
                    s,
                    JobCategory::ALL.map(|c| c.as_str()).join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JobStatus {
    Active,
    Closed,
    Draft,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Active => write!(f, "Active"),
            JobStatus::Closed => write!(f, "Closed"),
            JobStatus::Draft => write!(f, "Draft"),
            JobStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub company: String,
    // Kept as text so unexpected values from the server still parse
    #[serde(rename = "type", default)]
    pub job_type: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(rename = "postedDate", default)]
    pub posted_date: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub applicants: u32,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub questions: Vec<String>,
}

/// Characters of description shown in list previews
const PREVIEW_LENGTH: usize = 150;

impl Job {
    /// Applications are only accepted while the posting is active
    pub fn is_open(&self) -> bool {
        self.status == JobStatus::Active
    }

    pub fn location(&self) -> String {
        [&self.city, &self.state, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn parsed_type(&self) -> Option<JobType> {
        self.job_type.parse().ok()
    }

    pub fn applicants_display(&self) -> String {
        pluralize(self.applicants as usize, "applicant", "applicants")
    }

    /// Plain-text preview of the HTML description
    pub fn preview(&self) -> String {
        truncate_string(&strip_html(&self.description), PREVIEW_LENGTH)
    }
}

/// Query filters for the public job listing. Empty filters are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobFilters {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<JobCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

fn non_blank(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.trim().is_empty() {
        None
    } else {
        Some(value.trim().to_string())
    }
}

impl JobFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_type(mut self, job_type: JobType) -> Self {
        self.job_type = Some(job_type);
        self
    }

    pub fn category(mut self, category: JobCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = non_blank(search);
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = non_blank(location);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
