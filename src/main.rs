mod config;
mod driver;
mod error;
mod game;
mod snake;
mod term;

use std::fs::File;

use anyhow::Context;
use log::info;
use simplelog::{Config, WriteLogger};

use config::GameConfig;
use driver::{Outcome, TickDriver};
use game::GameState;
use term::{Surface, TermEvents, TermManager};

pub type TermInt = u16;
pub type Coords = (u16, u16);

fn main() -> anyhow::Result<()> {
    let config = GameConfig::from_env();

    init_logging(&config);

    let mut term = TermManager::new().context("Couldn't read the terminal size")?;
    let state = GameState::new(term.size(), config.initial_heading)?;
    info!("Starting on a {:?} board", state.board_size());

    term.setup().context("Couldn't set up the terminal")?;

    let driver = TickDriver::new(state, config.tick_interval);
    let outcome = driver.run(&mut term, TermEvents);

    // Put the terminal back before reporting anything
    term.restore().context("Couldn't restore the terminal")?;

    match outcome? {
        Outcome::Died { score } => {
            info!("Died with a score of {}", score);
            println!("You died");
        },
        Outcome::Quit => {}
    }

    // Returning ends the process, input thread included
    Ok(())
}

/// Logs to the configured file, if any. The screen belongs to the game, and
/// a log that can't be opened is not worth refusing to play over.
fn init_logging(config: &GameConfig) {
    let path = match config.log_target() {
        Some(path) => path,
        None => return,
    };

    if let Ok(log_file) = File::create(path) {
        let _ = WriteLogger::init(config.log_level, Config::default(), log_file);
    }
}
