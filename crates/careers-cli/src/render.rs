//! Plain-text rendering of portal data.

use careers_core::config::ClientConfig;
use careers_core::models::{ApplicantProfile, Application, Job};
use careers_core::utils::{format_date, format_optional, format_salary, pluralize, strip_html};
use careers_core::PortalSettings;

/// Width of the rule drawn under headings
const RULE_WIDTH: usize = 60;

fn heading(title: &str) {
    println!("{}", title);
    println!("{}", "-".repeat(title.chars().count().min(RULE_WIDTH)));
}

fn salary(job: &Job, settings: &PortalSettings) -> Option<String> {
    let currency = job.currency.as_deref().unwrap_or(&settings.default_currency);
    job.salary.map(|s| format_salary(s, currency))
}

pub fn job_list(jobs: &[Job], settings: &PortalSettings) {
    println!(
        "Found {} in {} departments\n",
        pluralize(jobs.len(), "role", "roles"),
        settings.job_categories.len()
    );
    if jobs.is_empty() {
        println!("No positions match. Try adjusting your filters or check back later for new opportunities.");
        return;
    }
    for job in jobs {
        println!("{}  [{}] [{}]  {}", job.title, job.job_type, job.category, job.status);
        println!("  id: {}", job.id);
        println!("  {} | {}", job.company, job.location());
        println!("  {}", job.preview());
        let mut meta = Vec::new();
        if let Some(posted) = &job.posted_date {
            meta.push(format!("Posted {}", format_date(posted)));
        }
        if let Some(deadline) = &job.deadline {
            meta.push(format!("Deadline: {}", format_date(deadline)));
        }
        meta.push(job.applicants_display());
        println!("  {}\n", meta.join(" | "));
    }
}

pub fn job_detail(job: &Job, settings: &PortalSettings) {
    heading(&job.title);
    println!("{}", job.company);
    println!("Location:  {}", job.location());
    println!("Job type:  {}", job.job_type);
    if let Some(salary) = salary(job, settings) {
        println!("Salary:    {}", salary);
    }
    if let Some(posted) = &job.posted_date {
        println!("Posted:    {}", format_date(posted));
    }
    if let Some(deadline) = &job.deadline {
        println!("Deadline:  {}", format_date(deadline));
    }
    println!("Applicants: {}", job.applicants_display());
    println!();
    println!("{}", strip_html(&job.description));
    if let Some(requirements) = &job.requirements {
        println!("\nRequirements:\n{}", strip_html(requirements));
    }
    if !job.questions.is_empty() {
        println!("\nScreening questions (answer each with --answer, in order):");
        for (i, q) in job.questions.iter().enumerate() {
            println!("  {}. {}", i + 1, q);
        }
    }
    println!();
    if job.is_open() {
        println!("Apply with: careers apply {} --resume <file>", job.id);
    } else {
        println!("Applications Closed");
    }
    println!();
}

pub fn applications(applications: &[Application], config: &ClientConfig) {
    if applications.is_empty() {
        println!("You have not applied for any positions yet.");
        return;
    }
    heading("My Applications");
    for app in applications {
        println!("{} - {}", app.job.title, app.job.company);
        println!("  Location: {}", app.location());
        println!("  Type:     {}", format_optional(&app.job.job_type, "-"));
        println!(
            "  Applied:  {}",
            app.applied_at.as_deref().map(format_date).unwrap_or_else(|| "-".to_string())
        );
        println!("  Status:   {}", app.status);
        if let Some(resume) = &app.application_data.resume {
            println!("  Resume:   {}", config.upload_link(resume));
        }
        println!();
    }
}

pub fn profile(profile: &ApplicantProfile) {
    heading("Profile");
    println!("Name:       {}", profile.name);
    println!("Email:      {}", profile.email);
    println!("Phone:      {}", profile.phone);
    println!("Education:  {}", profile.profile.education);
    println!("Experience: {}", profile.profile.experience);
    println!("Skills:     {}", profile.profile.skills);
    if !profile.profile.resume.is_empty() {
        println!("Resume:     {}", profile.profile.resume);
    }
}

pub fn settings(settings: &PortalSettings) {
    heading(&settings.app_name);
    println!("Currency:        {}", settings.default_currency);
    println!(
        "Max upload:      {} MB",
        settings.max_file_size / (1024 * 1024)
    );
    println!("Upload types:    {}", settings.allowed_file_types.join(", "));
    println!(
        "Job types:       {}",
        settings.job_types.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
    );
    println!(
        "Categories:      {}",
        settings.job_categories.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", ")
    );
    println!(
        "Page sizes:      {:?} (default {})",
        settings.pagination.page_size_options, settings.pagination.default_page_size
    );
}
