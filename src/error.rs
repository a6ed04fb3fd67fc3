use thiserror::Error;

use crate::TermInt;

#[derive(Error, Debug)]
pub enum SnakeError {
    #[error("Terminal error:")]
    TerminalError {
        #[from]
        source: crossterm::ErrorKind,
    },
    #[error("I/O error:")]
    IoError {
        #[from]
        source: std::io::Error,
    },
    #[error("A {width}x{height} board is too small to play on")]
    BoardTooSmall { width: TermInt, height: TermInt },
    #[error("The game state lock was poisoned")]
    LockPoisoned,
    #[error("The input listener stopped")]
    InputClosed,
}

pub type Result<T> = std::result::Result<T, SnakeError>;
