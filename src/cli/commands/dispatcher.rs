//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::api::ApiClient;
use crate::cli::args::{Cli, Commands, GuidedArgs, SessionSubcommand};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config: ClientConfig,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the effective client configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.config)
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it. With no subcommand the guided flow runs.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        use super::*;

        match &cli.command {
            Some(Commands::Status(_)) => {
                let cmd = status::StatusCommand::new(self.client()?);
                cmd.execute(ui)
            }
            Some(Commands::Session(args)) => match &args.command {
                SessionSubcommand::Create(args) => {
                    let cmd = session::SessionCreateCommand::new(self.client()?, args.clone());
                    cmd.execute(ui)
                }
                SessionSubcommand::Update(args) => {
                    let cmd = session::SessionUpdateCommand::new(self.client()?, args.clone());
                    cmd.execute(ui)
                }
                SessionSubcommand::Show(args) => {
                    let cmd = session::SessionShowCommand::new(self.client()?, args.clone());
                    cmd.execute(ui)
                }
                SessionSubcommand::List => {
                    let cmd = session::SessionListCommand::new(self.client()?);
                    cmd.execute(ui)
                }
            },
            Some(Commands::Steps(args)) => {
                let cmd = steps::StepsCommand::new(self.client()?, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Analyze(args)) => {
                let cmd = analyze::AnalyzeCommand::new(self.client()?, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Activities(args)) => {
                let cmd = activities::ActivitiesCommand::new(self.client()?, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Assess(args)) => {
                let cmd = assess::AssessCommand::new(self.client()?, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Action(args)) => {
                let cmd = action::ActionCommand::new(self.client()?, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Export(args)) => {
                let cmd =
                    export::ExportCommand::new(self.client()?, args.clone(), self.config.export_dir());
                cmd.execute(ui)
            }
            Some(Commands::Guided(args)) => {
                let cmd =
                    guided::GuidedCommand::new(self.client()?, args.clone(), self.config.export_dir());
                cmd.execute(ui)
            }
            Some(Commands::Completions(args)) => {
                let cmd = completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
            None => {
                let cmd = guided::GuidedCommand::new(
                    self.client()?,
                    GuidedArgs::default(),
                    self.config.export_dir(),
                );
                cmd.execute(ui)
            }
        }
    }
}
