//! Export command implementation.
//!
//! The `id-dss export` command writes a session to disk as the JSON
//! snapshot, the cleaned text plan, or a server-rendered DOCX/PDF.

use std::path::PathBuf;

use crate::api::ApiClient;
use crate::cli::args::ExportArgs;
use crate::error::Result;
use crate::ui::UserInterface;
use crate::workflow::{ExportTarget, Workflow};

use super::dispatcher::{Command, CommandResult};

/// The export command implementation.
pub struct ExportCommand {
    api: ApiClient,
    args: ExportArgs,
    default_dir: PathBuf,
}

impl ExportCommand {
    /// Create a new export command writing to `default_dir` unless `--out` is set.
    pub fn new(api: ApiClient, args: ExportArgs, default_dir: PathBuf) -> Self {
        Self {
            api,
            args,
            default_dir,
        }
    }

    fn output_dir(&self) -> PathBuf {
        self.args
            .out
            .clone()
            .unwrap_or_else(|| self.default_dir.clone())
    }
}

impl Command for ExportCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let target: ExportTarget = self.args.format.parse()?;
        let mut workflow = Workflow::new(self.api.clone());
        workflow.open_session(self.args.session_id)?;

        let mut spinner = ui.start_spinner(&format!(
            "Exporting session {} as {}...",
            self.args.session_id,
            target.extension()
        ));
        match workflow.export(target, &self.output_dir()) {
            Ok(path) => {
                spinner.finish_success(&format!("Saved {}", path.display()));
                Ok(CommandResult::success())
            }
            Err(e) => {
                spinner.finish_error(&e.user_message());
                Ok(CommandResult::failure(1))
            }
        }
    }
}
