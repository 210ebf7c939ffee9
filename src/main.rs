//! `pot`: builds, watches and projects nugget translations.

mod cli;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::OnceLock;

use clap::Parser;
use nugget_i18n::build::run_build;
use nugget_i18n::config::ConfigManager;
use nugget_i18n::project::run_project;
use nugget_i18n::watch::watch;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;

/// Keeps the file writer flushing until exit.
static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Installs the tracing subscriber: stderr, or the `--log-file` file.
fn init_logging(args: &Args) {
    let default_level = if args.verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file = args.log_file.as_ref().map(|path| {
        std::fs::OpenOptions::new().create(true).append(true).open(path).map(|file| (path, file))
    });
    match file {
        Some(Ok((path, file))) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_ansi(false)
                .with_writer(non_blocking)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::debug!(path = %path.display(), "Logging initialized");
        }
        Some(Err(error)) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
            tracing::warn!(%error, "Failed to open log file; using stderr");
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Loads the settings of the project directory; errors are logged.
fn load_config(args: &Args) -> Option<ConfigManager> {
    let project_root = match &args.project_dir {
        Some(directory) => directory.clone(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    let project_root = std::path::absolute(&project_root).unwrap_or(project_root);
    tracing::debug!(project_root = %project_root.display(), "Project directory");

    let mut config_manager = ConfigManager::new(project_root);
    match config_manager.load_settings(args.config_path.as_deref()) {
        Ok(()) => Some(config_manager),
        Err(error) => {
            tracing::error!(%error, "Failed to load settings");
            None
        }
    }
}

/// Runs a watch, a projection or a single build, as the flags ask.
#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);

    let Some(config_manager) = load_config(&args) else {
        return ExitCode::FAILURE;
    };

    if args.watch {
        return match watch(config_manager, args.watch_options()).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                tracing::error!(%error, "Watch failed");
                ExitCode::FAILURE
            }
        };
    }

    if let Some(options) = args.project_options() {
        return match run_project(&config_manager, &options) {
            Ok(report) if report.is_success() => ExitCode::SUCCESS,
            Ok(report) => {
                tracing::error!(failed = report.failures.len(), "Some files failed to project");
                ExitCode::FAILURE
            }
            Err(error) => {
                tracing::error!(%error, "Projection failed");
                ExitCode::FAILURE
            }
        };
    }

    match run_build(&config_manager, args.build_options()) {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(_) => {
            tracing::error!("Some languages failed to merge");
            ExitCode::FAILURE
        }
        Err(error) => {
            tracing::error!(%error, "Build failed");
            ExitCode::FAILURE
        }
    }
}
