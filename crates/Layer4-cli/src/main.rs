//! JobPilot CLI - Main entry point

mod brief;
mod cli;
mod console;

use brief::{ApplicationBrief, ContactBrief};
use clap::{Parser, Subcommand, ValueEnum};
use jobpilot_foundation::WorkerSettings;
use jobpilot_task::{ClassifyContext, TaskKind};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// JobPilot - delegate job applications and HR contact searches to the automation worker
#[derive(Parser, Debug)]
#[command(name = "jobpilot")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Worker base URL (overrides env and config)
    #[arg(long, global = true)]
    worker_url: Option<String>,

    /// API key forwarded to the worker (overrides env and config)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Seconds between status queries
    #[arg(long, global = true)]
    poll_interval: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Auto-apply to a job posting
    Apply {
        /// Job title
        #[arg(long)]
        title: String,

        /// Company name
        #[arg(long)]
        company: String,

        /// Job posting URL
        #[arg(long)]
        url: Option<String>,

        /// File with the applicant profile (resume text, contact details)
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Maximum runtime in seconds
        #[arg(long)]
        deadline: Option<u64>,
    },
    /// Find HR / recruiting contacts at a company
    Contacts {
        /// Company name
        #[arg(long)]
        company: String,

        /// Role family the contacts should hire for
        #[arg(long)]
        role: Option<String>,

        /// Preferred location
        #[arg(long)]
        location: Option<String>,

        /// Maximum runtime in seconds
        #[arg(long)]
        deadline: Option<u64>,
    },
    /// Query the worker for a task's status
    Status {
        task_id: String,
    },
    /// Ask the worker to stop a task
    Stop {
        task_id: String,
    },
    /// Classify a saved worker report without contacting the worker
    Classify {
        #[arg(long, value_enum)]
        kind: KindArg,

        /// Report file (plain text or JSON)
        #[arg(long)]
        file: PathBuf,

        #[arg(long, default_value = "")]
        title: String,

        #[arg(long, default_value = "")]
        company: String,
    },
    /// Show effective worker settings
    Config {
        /// Write the effective settings to the global config
        #[arg(long)]
        save_global: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum KindArg {
    Application,
    Contacts,
}

impl From<KindArg> for TaskKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Application => TaskKind::Application,
            KindArg::Contacts => TaskKind::ContactSearch,
        }
    }
}

/// Defaults < global file < project file < env < flags
fn resolve_settings(args: &Args) -> anyhow::Result<WorkerSettings> {
    let mut settings = WorkerSettings::load()?;
    if let Some(url) = &args.worker_url {
        settings = settings.base_url(url.clone());
    }
    if let Some(key) = &args.api_key {
        settings = settings.api_key(key.clone());
    }
    if let Some(secs) = args.poll_interval {
        settings = settings.poll_interval_secs(secs);
    }
    settings.validate()?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging (stderr keeps stdout clean for --json)
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let settings = resolve_settings(&args)?;
    let json = args.json;

    let outcome = match args.command {
        Command::Apply {
            title,
            company,
            url,
            profile,
            deadline,
        } => {
            let profile = match profile {
                Some(path) => Some(std::fs::read_to_string(&path).map_err(|e| {
                    anyhow::anyhow!("Failed to read profile {}: {}", path.display(), e)
                })?),
                None => None,
            };
            let brief = ApplicationBrief {
                title,
                company,
                url,
                profile,
            };
            Some(cli::apply(&settings, brief, deadline, json).await?)
        }
        Command::Contacts {
            company,
            role,
            location,
            deadline,
        } => {
            let brief = ContactBrief {
                company,
                role,
                location,
            };
            Some(cli::contacts(&settings, brief, deadline, json).await?)
        }
        Command::Status { task_id } => {
            cli::status(&settings, &task_id, json).await?;
            None
        }
        Command::Stop { task_id } => {
            cli::stop(&settings, &task_id).await?;
            None
        }
        Command::Classify {
            kind,
            file,
            title,
            company,
        } => Some(cli::classify(
            kind.into(),
            &file,
            ClassifyContext::new(title, company),
            json,
        )?),
        Command::Config { save_global } => {
            cli::show_config(&settings, save_global)?;
            None
        }
    };

    if let Some(outcome) = outcome {
        let code = cli::exit_code(outcome.status);
        if code != 0 {
            std::process::exit(code);
        }
    }

    Ok(())
}
