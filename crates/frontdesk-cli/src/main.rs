//! frontdesk - terminal front end for the hotel administration console.
//!
//! Logs staff in and out, shows the session state, and reads backend
//! resources through the authorized transport.

mod commands;
mod output;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use frontdesk_core::{AppContext, Config, RecordingNavigator};

/// Directory for rolling log files; unset means stderr only
const LOG_DIR_ENV: &str = "FRONTDESK_LOG_DIR";

/// Prefix of the daily log files
const LOG_FILE_PREFIX: &str = "frontdesk.log";

const USAGE: &str = "\
Usage: frontdesk <command> [args]

Commands:
  login [email]          Sign in (prompts for the password)
  logout                 Sign out, locally even if the server is unreachable
  status                 Show the current session
  list <resource>        List hotel, rooms, reservation, reservation-status, ...
  get <resource> <id>    Show one record
  dashboard              KPIs and the latest reservations
  open <route>           Resolve a console route, e.g. /dashboard/reservas";

/// Initialize the tracing subscriber for logging
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", USAGE);
        return Ok(());
    };

    let config = Config::load()?;
    info!(api_url = %config.api_url, storage = %config.storage, "frontdesk starting");

    let navigator = Arc::new(RecordingNavigator::new());
    let mut ctx = AppContext::from_config(config, navigator.clone())?;

    let result = match (command.as_str(), &args[1..]) {
        ("login", rest) => commands::login(&mut ctx, rest.first().map(String::as_str)).await,
        ("logout", []) => commands::logout(&ctx).await,
        ("status", []) => commands::status(&ctx),
        ("list", [resource]) => commands::list(&ctx, resource).await,
        ("get", [resource, id]) => commands::get(&ctx, resource, id).await,
        ("dashboard", []) => commands::dashboard(&ctx).await,
        ("open", [route]) => commands::open(&ctx, route),
        ("help" | "--help" | "-h", _) => {
            println!("{}", USAGE);
            Ok(())
        }
        _ => Err(anyhow::anyhow!("Unrecognized command\n\n{}", USAGE)),
    };

    if navigator.forced_login() {
        eprintln!("The server rejected your session. Run `frontdesk login` to sign in again.");
    }

    result
}
