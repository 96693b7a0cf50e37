//! Careers CLI - browse open positions and manage applications from the terminal.
//!
//! Talks to the Coretech careers portal API. Set `CAREERS_API_URL` (or put it
//! in a `.env` file) to point at a non-local server.

mod commands;
mod render;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use careers_core::auth::{FileSessionStore, KeyringSessionStore, SessionExpiredHandler, SessionStore};
use careers_core::config::{ClientConfig, Config, SessionBackend, UPLOAD_URL_ENV};
use careers_core::models::{JobCategory, JobType};
use careers_core::{CareersApi, ClientFactory};

#[derive(Debug, Parser)]
#[command(name = "careers", version, about = "Browse jobs and manage applications on the careers portal")]
struct Cli {
    /// API base address (overrides CAREERS_API_URL and the saved config)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List open positions
    Jobs {
        #[arg(long = "type")]
        job_type: Option<JobType>,
        #[arg(long)]
        category: Option<JobCategory>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Show full details for one or more jobs
    Job {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Apply for a job
    Apply {
        job_id: String,
        /// Resume file (PDF, DOC or DOCX, max 5MB)
        #[arg(long)]
        resume: PathBuf,
        #[arg(long, conflicts_with = "cover_letter_file")]
        cover_letter: Option<String>,
        #[arg(long)]
        cover_letter_file: Option<PathBuf>,
        /// Answer to a screening question; repeat once per question, in order
        #[arg(long = "answer")]
        answers: Vec<String>,
    },
    /// List your submitted applications
    Applications,
    /// Sign in
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an applicant account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Email a password reset link
    ForgotPassword { email: String },
    /// Set a new password using the token from the reset email
    ResetPassword { token: String },
    /// View or edit your profile
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Print portal settings (upload limits, job types, ...)
    Settings,
}

#[derive(Debug, Subcommand)]
enum ProfileCommand {
    Show,
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        education: Option<String>,
        #[arg(long)]
        experience: Option<String>,
        #[arg(long)]
        skills: Option<String>,
    },
}

/// Terminal stand-in for the browser redirect to the login page.
struct LoginPrompt;

impl SessionExpiredHandler for LoginPrompt {
    fn session_expired(&self, login_path: &str) {
        warn!(login_path, "Session expired, login required");
        eprintln!("Your session has expired. Run `careers login` to sign in again.");
    }
}

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes buffered output on drop.
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

fn session_store(config: &Config) -> Result<Arc<dyn SessionStore>> {
    let store: Arc<dyn SessionStore> = match config.session_backend {
        SessionBackend::File => Arc::new(FileSessionStore::new(config.data_dir()?)),
        SessionBackend::Keyring => Arc::new(KeyringSessionStore::new()?),
    };
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing();

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable config file");
        Config::default()
    });

    let client_config = match cli.api_url {
        Some(url) => ClientConfig::resolve(Some(url), None, std::env::var(UPLOAD_URL_ENV).ok()),
        None => config.client_config(),
    };
    info!(base_url = %client_config.base_url, "Careers CLI starting");

    let factory = ClientFactory::new(client_config, session_store(&config)?, Arc::new(LoginPrompt));
    let api = CareersApi::new(&factory)?;

    commands::run(cli.command, &api, &mut config).await
}
