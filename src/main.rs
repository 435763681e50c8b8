use clap::Parser;
use dotenvy::dotenv;
use shop_console::{
    app::App,
    cli::Cli,
    config::load_settings_from,
    core::{FileStorage, ReqwestTransport},
    errors::Result,
    ui::render,
};
use std::{
    io::{self, BufRead, Write},
    process::ExitCode,
    sync::Arc,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // 1. Initialize tracing (as early as possible). Logs go to stderr, the screen to stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Runs one command and prints the resulting screen. Returns whether the command succeeded.
async fn run(cli: Cli) -> Result<bool> {
    let settings = load_settings_from(cli.config.as_deref())?;
    info!(session = ?settings.session_path, "Starting console");
    let transport = ReqwestTransport::new(settings.request_timeout())?;
    let storage = Arc::new(FileStorage::new(settings.session_path.clone()));
    let mut app = App::new(settings, transport, storage);

    let succeeded = match cli.command {
        Some(command) => command.execute(&mut app, &mut prompt).await.is_ok(),
        None => {
            app.boot().await;
            true
        }
    };

    println!("{}", render(app.screen(), app.view(), app.notifier()));
    Ok(succeeded)
}

/// Asks a yes/no question on the terminal. Anything but `y`/`yes` declines.
fn prompt(question: &str) -> Result<bool> {
    let mut stdout = io::stdout();
    write!(stdout, "{question} [y/N] ")?;
    stdout.flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
