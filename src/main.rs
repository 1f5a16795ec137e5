//! winshift — remote window positioning and focus daemon for X11.
//!
//! Accepts JSON commands over a small TCP protocol and applies them to
//! windows resolved by owning process id, optional title, and stacking
//! order.

mod command;
mod config;
mod error;
mod server;
mod wm;

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wm::directory::{Directory, X11Directory};
use wm::title;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "winshift=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting winshift");

    // An X11 session is a hard precondition; fail fast at startup.
    std::env::var("DISPLAY")
        .context("DISPLAY is not set; winshift requires an active X11 session")?;

    let config = config::Config::load().context("Failed to load configuration")?;
    let home_dir = config.home_dir();

    let x11 = X11Directory::connect().context("Failed to connect to X server")?;
    info!("X11 window directory initialized");
    log_window_inventory(&x11);

    // All workers share this one directory connection; the lock serializes
    // their access to it.
    let dir: Arc<Mutex<dyn Directory>> = Arc::new(Mutex::new(x11));

    let listener = server::bind(&config).await?;
    info!("Server is listening on {}:{}", config.bind, config.port);

    tokio::select! {
        result = server::serve(listener, dir, home_dir, config.command_timeout()) => result,
        result = shutdown_signal() => {
            result?;
            info!("Shutting down");
            Ok(())
        }
    }
}

/// Resolve on SIGTERM or SIGINT.
async fn shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = sigint.recv() => info!("Received SIGINT"),
    }
    Ok(())
}

/// Log every visible window at startup: id, pid, class, title.
fn log_window_inventory(dir: &X11Directory) {
    let windows = match dir.client_windows() {
        Ok(windows) => windows,
        Err(e) => {
            warn!("Error getting window list: {:#}", e);
            return;
        }
    };

    debug!("Listing all windows:");
    for window in windows {
        if !matches!(dir.is_viewable(window), Ok(true)) {
            continue;
        }
        let pid = dir.window_pid(window).ok().flatten();
        let class = dir.window_class(window).ok().flatten();
        let name = dir
            .window_title(window)
            .map(|t| title::strip_suffix(&t).to_string())
            .unwrap_or_default();
        debug!(
            "Window info - id: {}, pid: {:?}, class: {:?}, title: {:?}",
            window, pid, class, name
        );
    }
    debug!("End window list");
}
