//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// id-dss - Guided instructional design from the terminal.
#[derive(Debug, Parser)]
#[command(name = "id-dss")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a config file (replaces ~/.id-dss/config.yml and .id-dss.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the design-support API
    #[arg(long, global = true, env = "ID_DSS_API_BASE", value_name = "URL")]
    pub api_base: Option<String>,

    /// Show verbose output, including raw AI responses
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check that the API is reachable and the AI backend is configured
    Status(StatusArgs),

    /// Create, update, show and list design sessions
    Session(SessionArgs),

    /// List the design steps of a session
    Steps(StepsArgs),

    /// Analyze learning objectives with the AI backend
    Analyze(AnalyzeArgs),

    /// Suggest learning activities for the objectives
    Activities(ActivitiesArgs),

    /// Recommend assessments for objectives and activities
    Assess(AssessArgs),

    /// Record a decision on a recommendation
    Action(ActionArgs),

    /// Export a session as JSON, a text plan, or a document
    Export(ExportArgs),

    /// Walk through the whole design interactively (default)
    Guided(GuidedArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {}

/// Arguments for the `session` command.
#[derive(Debug, Clone, clap::Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionSubcommand,
}

/// `session` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum SessionSubcommand {
    /// Create a session from a course context
    Create(SessionCreateArgs),

    /// Change fields of an existing session
    Update(SessionUpdateArgs),

    /// Show a session with its latest AI results
    Show(SessionShowArgs),

    /// List all sessions
    List,
}

/// Course context fields shared by `session create` and `session update`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CourseContextArgs {
    /// Course title
    #[arg(long)]
    pub title: Option<String>,

    /// Education level (e.g. undergraduate, graduate, professional)
    #[arg(long)]
    pub level: Option<String>,

    /// Delivery modality (e.g. online, in-person, hybrid)
    #[arg(long)]
    pub modality: Option<String>,

    /// Constraints such as class size or available time
    #[arg(long)]
    pub constraints: Option<String>,

    /// Learning objectives, one per line
    #[arg(long)]
    pub objectives: Option<String>,
}

/// Arguments for `session create`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SessionCreateArgs {
    #[command(flatten)]
    pub context: CourseContextArgs,
}

/// Arguments for `session update`.
#[derive(Debug, Clone, clap::Args)]
pub struct SessionUpdateArgs {
    /// Session ID
    pub session_id: i64,

    #[command(flatten)]
    pub context: CourseContextArgs,
}

/// Arguments for `session show`.
#[derive(Debug, Clone, clap::Args)]
pub struct SessionShowArgs {
    /// Session ID
    pub session_id: i64,
}

/// Arguments for the `steps` command.
#[derive(Debug, Clone, clap::Args)]
pub struct StepsArgs {
    /// Session ID
    pub session_id: i64,
}

/// Arguments for the `analyze` command.
#[derive(Debug, Clone, clap::Args)]
pub struct AnalyzeArgs {
    /// Session ID
    pub session_id: i64,

    /// Objectives to analyze (defaults to the session's saved objectives)
    #[arg(long)]
    pub objectives: Option<String>,
}

/// Arguments for the `activities` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ActivitiesArgs {
    /// Session ID
    pub session_id: i64,

    /// Objectives to plan for (defaults to the session's saved objectives)
    #[arg(long)]
    pub objectives: Option<String>,
}

/// Arguments for the `assess` command.
#[derive(Debug, Clone, clap::Args)]
pub struct AssessArgs {
    /// Session ID
    pub session_id: i64,

    /// Objectives to assess (defaults to the session's saved objectives)
    #[arg(long)]
    pub objectives: Option<String>,

    /// Planned activities (defaults to the latest suggested activities)
    #[arg(long)]
    pub activities: Option<String>,
}

/// Arguments for the `action` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ActionArgs {
    /// Step ID the decision belongs to
    pub step_id: i64,

    /// Kind of decision
    #[arg(value_parser = ["accept", "reject", "edit", "comment", "regenerate"])]
    pub action_type: String,

    /// Recommendation ID the decision applies to
    #[arg(long)]
    pub recommendation: Option<i64>,

    /// Replacement content for an edit
    #[arg(long)]
    pub edited: Option<String>,

    /// Free-text comment (an `activity-N` comment targets one activity)
    #[arg(long)]
    pub comment: Option<String>,
}

/// Arguments for the `export` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ExportArgs {
    /// Session ID
    pub session_id: i64,

    /// Output format
    #[arg(short, long, default_value = "json", value_parser = ["json", "plan", "docx", "pdf"])]
    pub format: String,

    /// Directory to write into (defaults to export_dir from config, then .)
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

/// Arguments for the `guided` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct GuidedArgs {
    /// Continue an existing session instead of creating one
    #[arg(long, value_name = "SESSION_ID")]
    pub resume: Option<i64>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
