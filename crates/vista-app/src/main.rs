#![warn(missing_docs)]
//! # vista binary
//!
//! Terminal shell for the vista dashboard.

use std::io::Write as _;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use time::OffsetDateTime;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use vista_api::{ApiGateway, ReqwestTransport};
use vista_app::{
    AppConfig, AppError, Command, Dashboard, FileReportSink, HELP_TEXT, app_version,
    init_logging, parse_command,
};
use vista_session::{FileTokenStore, SessionManager};

/// CLI entry point.
fn main() -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("failed to start vista runtime: {error}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("vista: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let log_file = init_logging(config.log_dir())?;
    info!(
        stage = "bootstrap",
        action = "start",
        version = app_version(),
        api_base = %config.api().base_url(),
        log_file = ?log_file,
    );

    let transport = ReqwestTransport::new(config.api().timeout())?;
    let dashboard = Dashboard::new(
        SessionManager::new(Arc::new(FileTokenStore::new(config.state_file()))),
        ApiGateway::new(config.api().clone(), Arc::new(transport)),
        Arc::new(FileReportSink::new(config.report_dir())),
        config.render_options(),
    );

    println!("vista {} (type 'help' for commands)", app_version());
    dashboard.start().await;
    print_screen(&dashboard)?;

    let mut pending = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                println!("{error}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        execute(&dashboard, command, &mut pending).await?;
    }

    for handle in pending {
        if let Err(error) = handle.await {
            warn!(stage = "session", action = "logout_task_failed", %error);
        }
    }
    info!(stage = "bootstrap", action = "exit");
    Ok(())
}

async fn execute(
    dashboard: &Dashboard,
    command: Command,
    pending: &mut Vec<JoinHandle<()>>,
) -> Result<(), AppError> {
    match command {
        Command::User(name) => dashboard.set_username(name),
        Command::Password(secret) => dashboard.set_password(secret),
        Command::Login(fields) => {
            if let Some((user, password)) = fields {
                dashboard.set_username(user);
                dashboard.set_password(password);
            }
            dashboard.submit_login().await;
        }
        Command::Upload(path) => upload(dashboard, &path).await,
        Command::History => dashboard.refresh_history().await,
        Command::Export => {
            if let Some(path) = dashboard.export_report(OffsetDateTime::now_utc()).await {
                println!("report saved to {}", path.display());
            }
        }
        Command::Logout => pending.extend(dashboard.logout()),
        Command::Show => {}
        Command::Help => {
            println!("{HELP_TEXT}");
            return Ok(());
        }
        Command::Quit => return Ok(()),
    }
    print_screen(dashboard)
}

async fn upload(dashboard: &Dashboard, path: &Path) {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.csv".to_string());
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            dashboard.upload(&file_name, bytes).await;
        }
        Err(error) => {
            warn!(stage = "upload", action = "read_failed", %error);
            dashboard.show_error(format!("Cannot read {}: {error}", path.display()));
        }
    }
}

fn print_screen(dashboard: &Dashboard) -> Result<(), AppError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout)?;
    write!(stdout, "{}", dashboard.screen())?;
    stdout.flush()?;
    Ok(())
}
