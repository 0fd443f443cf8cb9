//! shopadmin - terminal admin client for a small e-commerce catalog.
//!
//! Manages products and branding settings through the catalog API, behind
//! a short-lived local login session.

mod cli;
mod commands;

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shopadmin::app::App;
use shopadmin::config::Config;
use shopadmin::scope::ViewScope;

use cli::Cli;

/// Directory for an additional log file, when set
const LOG_DIR_ENV: &str = "SHOPADMIN_LOG_DIR";

/// Conventional exit status after SIGINT
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` wins over the `-v` count. The returned guard flushes the log
/// file and must live until exit.
fn init_tracing(verbosity: u8) -> Option<WorkerGuard> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV).ok().filter(|d| !d.is_empty()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "shopadmin.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.verbose);
    debug!("shopadmin starting");

    let config = Config::load()?;
    let mut app = App::new(config)?;

    // One scope per command; Ctrl+C disposes it so in-flight requests are
    // abandoned without touching state. With nothing in flight the command
    // is blocked on a prompt, so exit right away.
    let scope = ViewScope::new();
    let cancel = scope.handle();
    let activity = scope.activity();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted");
            cancel.cancel();
            if activity.is_idle() {
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        }
    });

    commands::handle(&mut app, cli.command, &scope).await
}
