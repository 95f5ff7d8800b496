mod action;
mod app;
mod call;
mod cli;
mod components;
mod config;
mod error;
mod input;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use color_eyre::eyre::Result;
use tokio::runtime::Runtime;

use call::{CallBackend, CallController, CallRequestDraft, HttpCallBackend, SubmissionState};
use cli::{Cli, Command};
use config::ConfigManager;
use logging::LogTarget;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse_args();

    let mut config = match &cli.config {
        Some(path) => ConfigManager::from_file(path)?,
        None => ConfigManager::new()?,
    };
    config.apply_overrides(cli.api_url.as_deref(), cli.log_level.as_deref());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command {
        None => run_interactive(&config, &runtime),
        Some(Command::Call {
            phone_number,
            no_wait,
        }) => run_call(&config, &runtime, phone_number, !no_wait),
        Some(Command::Health) => run_health(&config, &runtime),
        Some(Command::InitConfig) => {
            for warning in config.warnings() {
                eprintln!("Warning: {}", warning);
            }
            let path = config.write_default_config()?;
            println!("{}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_backend(config: &ConfigManager) -> Result<Arc<dyn CallBackend>> {
    let backend_config = &config.app_config().backend;
    let backend = HttpCallBackend::new(&backend_config.base_url, backend_config.connect_timeout())?;
    Ok(Arc::new(backend))
}

fn run_interactive(config: &ConfigManager, runtime: &Runtime) -> Result<ExitCode> {
    let general = &config.app_config().general;
    let _log_guard = logging::init(
        &general.log_level,
        LogTarget::File {
            dir: config.log_dir(),
            file: general.log_file.clone(),
        },
    )?;
    config.log_warnings();

    let backend = build_backend(config)?;
    tracing::info!("Starting interactive session against {}", backend.endpoint());

    // Request tasks are spawned from the UI thread
    let _enter = runtime.enter();
    let mut app = app::App::new(config, backend)?;
    app.run()?;

    Ok(ExitCode::SUCCESS)
}

fn run_call(
    config: &ConfigManager,
    runtime: &Runtime,
    phone_number: String,
    wait_for_answer: bool,
) -> Result<ExitCode> {
    logging::init(&config.app_config().general.log_level, LogTarget::Stderr)?;
    config.log_warnings();

    let backend = build_backend(config)?;
    let mut controller =
        CallController::new(backend, CallRequestDraft::new(phone_number, wait_for_answer));

    match runtime.block_on(controller.submit()) {
        SubmissionState::Settled {
            success: true,
            message,
        } => {
            println!("{}", message);
            Ok(ExitCode::SUCCESS)
        }
        SubmissionState::Settled {
            success: false,
            message,
        } => {
            eprintln!("Error: {}", message);
            Ok(ExitCode::FAILURE)
        }
        state => {
            eprintln!("Error: call request did not settle ({:?})", state);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_health(config: &ConfigManager, runtime: &Runtime) -> Result<ExitCode> {
    logging::init(&config.app_config().general.log_level, LogTarget::Stderr)?;
    config.log_warnings();

    let backend = build_backend(config)?;
    match runtime.block_on(backend.health()) {
        Ok(health) if health.is_ok() => {
            println!("{}: {}", backend.endpoint(), health.status);
            Ok(ExitCode::SUCCESS)
        }
        Ok(health) => {
            eprintln!("{}: {}", backend.endpoint(), health.status);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            eprintln!("{}: {}", backend.endpoint(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}
