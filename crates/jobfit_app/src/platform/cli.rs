use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use jobfit_core::AnalysisInput;

use super::logging::LogDestination;

/// Submit a resume and job description for analysis and follow the results live.
#[derive(Debug, Parser)]
#[command(name = "jobfit", version)]
pub struct Cli {
    /// Base URL of the analysis server.
    #[arg(long, env = "JOBFIT_SERVER_URL", default_value = "http://localhost:8000", global = true)]
    pub server_url: String,

    /// Directory holding the persisted session.
    #[arg(long, env = "JOBFIT_STATE_DIR", global = true)]
    pub state_dir: Option<PathBuf>,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogDestination::File, global = true)]
    pub log: LogDestination,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a new analysis, replacing any persisted session.
    Analyze(AnalyzeArgs),
    /// Continue the persisted session, re-opening its status channel if needed.
    Resume,
    /// Print the persisted session without contacting the server.
    Status,
    /// Forget the persisted session.
    Reset,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Company name.
    #[arg(long)]
    pub company: String,

    /// Job description text.
    #[arg(long, conflicts_with = "job_description_file")]
    pub job_description: Option<String>,

    /// Read the job description from a file.
    #[arg(long)]
    pub job_description_file: Option<PathBuf>,

    /// Role or position title.
    #[arg(long, default_value = "")]
    pub position: String,

    /// Resume file to upload.
    #[arg(long)]
    pub resume_file: Option<PathBuf>,

    /// Resume pasted as text.
    #[arg(long, conflicts_with = "resume_text_file")]
    pub resume_text: Option<String>,

    /// Read the resume text from a file.
    #[arg(long)]
    pub resume_text_file: Option<PathBuf>,
}

impl AnalyzeArgs {
    /// Collects the form fields. Presence rules are checked later by the core.
    pub fn into_input(self) -> anyhow::Result<AnalysisInput> {
        let job_description = match (self.job_description, self.job_description_file) {
            (Some(text), _) => text,
            (None, Some(path)) => read_text(&path)?,
            (None, None) => String::new(),
        };
        let resume_text = match (self.resume_text, self.resume_text_file) {
            (Some(text), _) => text,
            (None, Some(path)) => read_text(&path)?,
            (None, None) => String::new(),
        };

        Ok(AnalysisInput {
            resume_file: self.resume_file,
            resume_text,
            company_name: self.company,
            job_description,
            position: self.position,
        })
    }
}

fn read_text(path: &PathBuf) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_url: String,
    pub state_dir: PathBuf,
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        let state_dir = cli.state_dir.clone().unwrap_or_else(default_state_dir);
        Self {
            server_url: cli.server_url.clone(),
            state_dir,
        }
    }
}

fn default_state_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("jobfit"))
        .unwrap_or_else(|| PathBuf::from(".jobfit"))
}
