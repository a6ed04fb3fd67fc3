//! Tunables and the knobs read from the environment at startup.
use std::{env, path::{Path, PathBuf}, str::FromStr, time::Duration};

use log::LevelFilter;

use crate::snake::Direction;

/// Roughly 22 game steps per second
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000 / 22);

pub const INITIAL_HEADING: Direction = Direction::Up;

pub const SCORE_LABEL: &str = "Score:";

/// First column of the score digits, leaving a space after the label
pub const SCORE_COLUMN: u16 = 7;

pub const SNAKE_CHAR: char = '█';
pub const APPLE_CHAR: char = '█';

pub const LOG_LEVEL_VAR: &str = "SNAKE_LOG";
pub const LOG_FILE_VAR: &str = "SNAKE_LOG_FILE";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub tick_interval: Duration,
    pub initial_heading: Direction,
    pub log_level: LevelFilter,
    /// Logging is off unless a file is given
    pub log_file: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            tick_interval: TICK_INTERVAL,
            initial_heading: INITIAL_HEADING,
            log_level: DEFAULT_LOG_LEVEL,
            log_file: None,
        }
    }
}

impl GameConfig {
    pub fn from_env() -> Self {
        Self::from_vars(env::var(LOG_LEVEL_VAR).ok(), env::var(LOG_FILE_VAR).ok())
    }

    fn from_vars(level: Option<String>, file: Option<String>) -> Self {
        let mut config = GameConfig::default();

        if let Some(level) = level {
            // A typo in the level shouldn't keep anyone from playing
            config.log_level = LevelFilter::from_str(level.trim()).unwrap_or(DEFAULT_LOG_LEVEL);
        }

        if let Some(file) = file.filter(|f| !f.trim().is_empty()) {
            config.log_file = Some(PathBuf::from(file));
        }

        config
    }

    /// Where logs should go, if anywhere.
    pub fn log_target(&self) -> Option<&Path> {
        if self.log_level == LevelFilter::Off {
            return None;
        }

        self.log_file.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_is_about_22_hz() {
        assert_eq!(TICK_INTERVAL, Duration::from_millis(45));
    }

    #[test]
    fn defaults_without_vars() {
        assert_eq!(GameConfig::from_vars(None, None), GameConfig::default());
    }

    #[test]
    fn reads_level_and_file() {
        let config = GameConfig::from_vars(Some("debug".into()), Some("/tmp/snake.log".into()));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/snake.log")));
        assert_eq!(config.log_target(), Some(Path::new("/tmp/snake.log")));
    }

    #[test]
    fn bad_level_falls_back() {
        let config = GameConfig::from_vars(Some("loud".into()), Some("  ".into()));
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn no_file_means_no_logging() {
        let config = GameConfig::from_vars(Some("debug".into()), None);
        assert_eq!(config.log_target(), None);
        assert_eq!(GameConfig::default().log_target(), None);
    }

    #[test]
    fn off_level_skips_the_file() {
        let config = GameConfig::from_vars(Some("off".into()), Some("/tmp/snake.log".into()));
        assert_eq!(config.log_target(), None);
    }
}
