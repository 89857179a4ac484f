//! id-dss CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use id_dss::cli::{Cli, CommandDispatcher};
use id_dss::config::{load_client_config, ClientConfig, ConfigPaths};
use id_dss::ui::{create_ui, theme, OutputMode};
use id_dss::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("id_dss=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("id_dss=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Config files, then `ID_DSS_*` variables, then `--api-base`.
fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let paths = match &cli.config {
        Some(path) => ConfigPaths::explicit(path),
        None => ConfigPaths::discover(&std::env::current_dir()?),
    };
    let config = load_client_config(&paths, |key| std::env::var(key).ok())?;
    Ok(match &cli.api_base {
        Some(url) => config.with_api_base(url),
        None => config,
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("id-dss starting with args: {:?}", cli);

    if cli.no_color {
        theme::disable_colors();
    }

    let output_mode = OutputMode::from_flags(cli.verbose, cli.quiet);
    let is_interactive = std::env::var_os("CI").is_none();
    let mut ui = create_ui(is_interactive, output_mode);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            ui.error(&format!("Error: {}", e.user_message()));
            return ExitCode::from(1);
        }
    };

    let dispatcher = CommandDispatcher::new(config);
    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e.user_message()));
            ExitCode::from(1)
        }
    }
}
