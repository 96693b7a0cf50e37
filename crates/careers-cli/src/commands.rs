//! Subcommand handlers.
//!
//! Each handler issues its calls through `CareersApi` and turns failures into
//! a one-line message: the server's own message when it sent one, otherwise
//! a generic fallback. Nothing is retried; the user re-runs the command.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::warn;

use careers_core::api::confirm_password;
use careers_core::models::{ApplicationSubmission, Credentials, JobFilters, Registration, ResumeUpload};
use careers_core::{ApiError, CareersApi, Config};

use crate::render;
use crate::{Command, ProfileCommand};

/// Turn an API failure into the message shown to the user
fn fail(err: ApiError, fallback: &str) -> anyhow::Error {
    match err {
        // Local storage problems are reported as-is
        ApiError::Session(_) => anyhow!(err),
        _ => anyhow!(err.user_message(fallback).to_string()),
    }
}

pub async fn run(command: Command, api: &CareersApi, config: &mut Config) -> Result<()> {
    match command {
        Command::Jobs {
            job_type,
            category,
            search,
            location,
        } => {
            let mut filters = JobFilters::new();
            filters.job_type = job_type;
            filters.category = category;
            if let Some(search) = search {
                filters = filters.search(search);
            }
            if let Some(location) = location {
                filters = filters.location(location);
            }
            let jobs = api
                .list_jobs(&filters)
                .await
                .map_err(|e| fail(e, "Failed to fetch jobs. Please try again later."))?;
            render::job_list(&jobs, api.settings());
        }

        Command::Job { ids } => {
            let mut failed = 0;
            for (id, result) in ids.iter().zip(api.get_jobs(&ids).await) {
                match result {
                    Ok(job) => render::job_detail(&job, api.settings()),
                    Err(e) => {
                        failed += 1;
                        eprintln!("{}: {}", id, e.user_message("Error fetching job details"));
                    }
                }
            }
            if failed > 0 {
                return Err(anyhow!("{} of {} jobs could not be loaded", failed, ids.len()));
            }
        }

        Command::Apply {
            job_id,
            resume,
            cover_letter,
            cover_letter_file,
            answers,
        } => {
            if !api.is_logged_in() {
                return Err(anyhow!("Please log in to apply: careers login"));
            }
            let job = api
                .get_job(&job_id)
                .await
                .map_err(|e| fail(e, "Error fetching job details"))?;

            let cover_letter = match (cover_letter, cover_letter_file) {
                (Some(text), _) => text,
                (None, Some(path)) => read_text(&path)?,
                (None, None) => String::new(),
            };
            let resume = ResumeUpload::from_path(&resume)
                .await
                .map_err(|e| fail(e, "Could not read resume"))?;
            let submission = ApplicationSubmission::new(cover_letter, resume).with_answers(answers);

            let ack = api
                .apply(&job, submission)
                .await
                .map_err(|e| fail(e, "Error submitting application"))?;
            println!(
                "{}",
                ack.message.as_deref().unwrap_or("Application submitted successfully!")
            );
        }

        Command::Applications => {
            let applications = api
                .list_applications()
                .await
                .map_err(|e| fail(e, "Failed to fetch applications. Please try again later."))?;
            render::applications(&applications, api.clients().auth_api.config());
        }

        Command::Login { email } => {
            let email = match email.or_else(|| config.last_email.clone()) {
                Some(email) => email,
                None => prompt("Email: ")?,
            };
            let password = rpassword::prompt_password("Password: ")?;
            let user = api
                .login(&Credentials::new(email.clone(), password))
                .await
                .map_err(|e| fail(e, "Login failed"))?;

            remember_email(config, email);
            match user {
                Some(user) if !user.name.is_empty() => println!("Welcome back, {}!", user.name),
                _ => println!("Logged in."),
            }
        }

        Command::Register { name, email, phone } => {
            let password = rpassword::prompt_password("Password: ")?;
            let confirmation = rpassword::prompt_password("Confirm password: ")?;
            confirm_password(&password, &confirmation).map_err(|e| fail(e, "Registration failed"))?;

            api.register(&Registration::new(name, email.clone(), password, phone))
                .await
                .map_err(|e| fail(e, "Registration failed"))?;
            remember_email(config, email);
            println!("Account created. You are now logged in.");
        }

        Command::Logout => {
            api.logout().map_err(|e| fail(e, "Logout failed"))?;
            println!("Logged out.");
        }

        Command::ForgotPassword { email } => {
            let message = api
                .forgot_password(&email)
                .await
                .map_err(|e| fail(e, "Failed to send reset email"))?;
            println!(
                "{}",
                message.as_deref().unwrap_or("Password reset link sent to your email")
            );
        }

        Command::ResetPassword { token } => {
            let password = rpassword::prompt_password("New password: ")?;
            let confirmation = rpassword::prompt_password("Confirm new password: ")?;
            confirm_password(&password, &confirmation)
                .map_err(|e| fail(e, "Failed to reset password"))?;

            api.reset_password(&token, &password)
                .await
                .map_err(|e| fail(e, "Failed to reset password"))?;
            println!("Password reset successfully. Run `careers login` to sign in.");
        }

        Command::Profile(ProfileCommand::Show) => {
            let profile = api
                .get_profile()
                .await
                .map_err(|e| fail(e, "Error fetching profile"))?;
            render::profile(&profile);
        }

        Command::Profile(ProfileCommand::Update {
            name,
            email,
            phone,
            education,
            experience,
            skills,
        }) => {
            let mut profile = api
                .get_profile()
                .await
                .map_err(|e| fail(e, "Error fetching profile"))?;

            let mut changed = false;
            for (slot, value) in [
                (&mut profile.name, name),
                (&mut profile.email, email),
                (&mut profile.phone, phone),
                (&mut profile.profile.education, education),
                (&mut profile.profile.experience, experience),
                (&mut profile.profile.skills, skills),
            ] {
                if let Some(value) = value {
                    *slot = value;
                    changed = true;
                }
            }
            if !changed {
                return Err(anyhow!("Nothing to update; pass at least one field"));
            }

            let updated = api
                .update_profile(&profile)
                .await
                .map_err(|e| fail(e, "Error updating profile"))?;
            println!("Profile updated successfully");
            render::profile(&updated);
        }

        Command::Settings => render::settings(api.settings()),
    }
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{} is required", label.trim_end_matches(": ")));
    }
    Ok(value)
}

fn remember_email(config: &mut Config, email: String) {
    if config.last_email.as_deref() == Some(email.as_str()) {
        return;
    }
    config.last_email = Some(email);
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }
}
