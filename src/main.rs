use std::sync::Mutex;

use anyhow::{Result, anyhow};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod directory;
mod handler;
mod location;
mod predict;
mod stats;
mod tui;
mod ui;

use app::App;
use config::Config;
use tui::EventHandler;

/// Log to a file under the config dir; the TUI owns the terminal.
fn init_logging() -> Result<()> {
    let log_dir = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?
        .join("symptoms");
    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::File::create(log_dir.join("symptoms.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            warn!("failed to load config, using defaults: {err:#}");
            Config::new()
        }
    };
    if let Err(err) = config.ensure_saved() {
        warn!("could not write config template: {err:#}");
    }
    info!("using prediction service at {}", config.server_url());

    let mut app = App::new(&config)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, events: &mut EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event).await?;
        }

        // Settle background work; ticks keep the loop turning even when
        // the keyboard is idle.
        app.poll_prediction().await;
        app.poll_location().await;
    }
    Ok(())
}
