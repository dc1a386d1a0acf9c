mod frontend;
mod term;

use std::{fs::File, sync::Mutex};

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use frontend::{Flow, SnakeGame};
use snake::{GameConfig, config::LogConfig};

fn main() -> Result<()> {
    let (config, load_error) = match GameConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (GameConfig::default(), Some(e)),
    };
    init_logging(&config.log)?;

    if let Some(e) = load_error {
        warn!(error = %e, "using default settings");
    }

    let mut game = SnakeGame::new(config)?;
    game.initialize()?;

    let result = run(&mut game);

    // Leave the alternate screen even if the game loop failed
    game.restore()?;
    result?;

    info!(score = game.score(), "bye");
    Ok(())
}

fn run(game: &mut SnakeGame) -> Result<()> {
    if let Flow::Quit = game.show_intro()? {
        return Ok(());
    }

    loop {
        if let Flow::Quit = game.play()? {
            return Ok(());
        }
    }
}

/// The terminal is taken over by the game, so logs go to a file.
fn init_logging(log: &LogConfig) -> Result<()> {
    if log.file.is_empty() {
        return Ok(());
    }

    let file = File::create(&log.file)
        .with_context(|| format!("creating log file {}", log.file))?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.filter))
        .context("invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
