//! Stockroom - a terminal admin console for the stockroom inventory API.
//!
//! Keyboard-driven product management behind an authenticated session.
//! Every view is guarded: a stored session is verified with the server
//! before protected data is shown.

mod app;
mod ui;
mod utils;

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stockroom_core::config::API_URL_ENV;
use stockroom_core::{Config, GuardState, InventoryClient, Route, RouteGuard};

use app::{App, AppState, PASSWORD_ENV, USERNAME_ENV};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE_NAME: &str = "stockroom.log";

const USAGE: &str = "\
Usage: stockroom [COMMAND]

Commands:
  --login          Sign in from the command line and store the session
  --logout         Sign out and clear the stored session
  --verify         Check whether the stored session is still valid
  --open <PATH>    Start the console on a route (e.g. /product)
  --help           Show this message

Environment:
  STOCKROOM_API_URL     API base URL (default http://localhost:8080/api)
  STOCKROOM_USERNAME    Prefill the login username
  STOCKROOM_PASSWORD    Prefill the login password
  RUST_LOG              Log filter (default warn)";

/// Initialize the tracing subscriber for logging.
///
/// The terminal belongs to the UI, so log lines go to a daily rolling file
/// in the cache directory. The returned guard flushes on drop.
fn init_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: failed to load config ({}), using defaults", e);
        Config::default().with_api_url_override(std::env::var(API_URL_ENV).ok())
    });

    // Initialize logging
    let _log_guard = match config.cache_dir() {
        Ok(dir) => match init_tracing(&dir) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("Warning: logging disabled: {:#}", e);
                None
            }
        },
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        }
    };
    info!(base_url = %config.api_base_url, "Stockroom starting");

    // Check for CLI commands
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut start_route = Route::Products;
    match args.first().map(String::as_str) {
        None => {}
        Some("--help") | Some("-h") => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some("--login") => return login_command(config).await,
        Some("--logout") => return logout_command(&config).await,
        Some("--verify") => return verify_command(&config).await,
        Some("--open") => {
            let path = args
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("--open requires a path\n\n{}", USAGE))?;
            start_route = Route::from_path(path);
        }
        Some(other) => {
            anyhow::bail!("Unknown argument: {}\n\n{}", other, USAGE);
        }
    }

    // Create app before touching the terminal so setup errors print normally
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.open(start_route);

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Stockroom shutting down");
    Ok(())
}

/// Sign in from the command line, prompting for anything not in the environment
async fn login_command(mut config: Config) -> Result<()> {
    let client = InventoryClient::from_config(&config)?;

    let default_username = std::env::var(USERNAME_ENV)
        .ok()
        .or_else(|| config.last_username.clone())
        .unwrap_or_default();
    let username = prompt_username(&default_username)?;
    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password("Password: ")?,
    };

    let session = client
        .login(&username, &password)
        .await
        .map_err(|e| anyhow::anyhow!(app::login_error_message(&e)))?;

    config.last_username = Some(session.username.clone());
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    println!("Signed in as {}", session.username);
    Ok(())
}

fn prompt_username(default: &str) -> Result<String> {
    if default.is_empty() {
        print!("Username: ");
    } else {
        print!("Username [{}]: ", default);
    }
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    let username = username.trim();
    if username.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(username.to_string())
    }
}

async fn logout_command(config: &Config) -> Result<()> {
    let client = InventoryClient::from_config(config)?;
    if !client.is_authenticated() {
        println!("Not signed in");
        return Ok(());
    }
    client.logout().await?;
    println!("Signed out");
    Ok(())
}

/// Run the same check the console runs before showing a protected view
async fn verify_command(config: &Config) -> Result<()> {
    let client = InventoryClient::from_config(config)?;
    let mut guard = RouteGuard::new(Route::Products);
    let state = guard.check(&client, &CancellationToken::new()).await;

    match state {
        Some(GuardState::Valid) => {
            let who = client.username().unwrap_or_else(|| "unknown user".to_string());
            println!("Session valid ({})", who);
            Ok(())
        }
        _ => anyhow::bail!("No valid session. Run `stockroom --login` to sign in."),
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks().await;

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
