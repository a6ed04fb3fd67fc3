use std::sync::{Arc, Mutex, MutexGuard};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Result, SnakeError};
use crate::game::{GameState, Step};
use crate::snake::Direction::{*, self};
use crate::term::{EventSource, Surface};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{info, warn};
use rand::{rngs::StdRng, Rng};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    Quit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Died { score: u32 },
    Quit,
}

// What the input thread reports back to the ticker
enum Signal {
    Quit,
    Failed(SnakeError),
}

/// Steps the game at a fixed rate while a background thread feeds it turns.
pub struct TickDriver<R = StdRng> {
    state: Arc<Mutex<GameState<R>>>,
    interval: Duration,
}

impl<R: Rng + Send + 'static> TickDriver<R> {
    pub fn new(state: GameState<R>, interval: Duration) -> Self {
        TickDriver { state: Arc::new(Mutex::new(state)), interval }
    }

    /// Plays until the snake dies or the player quits. The surface is only
    /// touched from the calling thread.
    pub fn run<S, E>(&self, surface: &mut S, events: E) -> Result<Outcome>
    where
        S: Surface,
        E: EventSource + Send + 'static,
    {
        lock(&self.state)?.draw_initial(surface)?;

        let (signals, signal_rx) = mpsc::channel();
        let state = Arc::clone(&self.state);
        thread::Builder::new()
            .name("input".to_string())
            .spawn(move || listen(state, events, signals))?;

        let mut next_tick = Instant::now() + self.interval;

        loop {
            let wait = next_tick.saturating_duration_since(Instant::now());

            match signal_rx.recv_timeout(wait) {
                Ok(Signal::Quit) => {
                    info!("Quit requested");
                    return Ok(Outcome::Quit);
                },
                Ok(Signal::Failed(err)) => return Err(err),
                Err(RecvTimeoutError::Disconnected) => return Err(SnakeError::InputClosed),
                Err(RecvTimeoutError::Timeout) => {},
            }

            let now = Instant::now();
            if now < next_tick {
                continue;
            }

            // Skip missed ticks instead of bursting to catch up
            next_tick += self.interval;
            if next_tick <= now {
                next_tick = now + self.interval;
            }

            // The guard is dropped before anything else happens on game over
            let (step, score, length) = {
                let mut state = lock(&self.state)?;
                let step = state.advance_one_step(surface)?;
                (step, state.score(), state.snake_body().len())
            };

            if step == Step::GameOver {
                info!("Game over with a score of {} and a length of {}", score, length);
                return Ok(Outcome::Died { score });
            }
        }
    }
}

fn listen<R, E>(state: Arc<Mutex<GameState<R>>>, mut events: E, signals: Sender<Signal>)
where
    R: Rng,
    E: EventSource,
{
    loop {
        let key_ev = match events.poll_event() {
            Ok(ev) => ev,
            Err(err) => {
                warn!("Stopped reading input: {}", err);
                // The ticker may already be gone, nothing left to tell then
                let _ = signals.send(Signal::Failed(err));
                return;
            },
        };

        match key_command(&key_ev) {
            Some(Command::Turn(dir)) => match lock(&state) {
                Ok(mut state) => {
                    state.change_direction(dir);
                },
                Err(err) => {
                    let _ = signals.send(Signal::Failed(err));
                    return;
                },
            },
            Some(Command::Quit) => {
                let _ = signals.send(Signal::Quit);
                return;
            },
            None => {},
        }
    }
}

pub fn key_command(ev: &KeyEvent) -> Option<Command> {
    if is_ctrl_c(ev) {
        return Some(Command::Quit);
    }

    match ev.code {
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Some(Command::Turn(Up)),
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Some(Command::Turn(Left)),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Some(Command::Turn(Down)),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Some(Command::Turn(Right)),
        _ => None,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}

fn lock<R>(state: &Mutex<GameState<R>>) -> Result<MutexGuard<'_, GameState<R>>> {
    state.lock().map_err(|_| SnakeError::LockPoisoned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction::Up;
    use crate::term::BufferSurface;
    use rand::SeedableRng;
    use std::sync::mpsc::Receiver;

    struct ScriptedEvents(Receiver<KeyEvent>);

    impl EventSource for ScriptedEvents {
        fn poll_event(&mut self) -> Result<KeyEvent> {
            self.0.recv().map_err(|_| SnakeError::InputClosed)
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent { code, modifiers: KeyModifiers::NONE }
    }

    fn ctrl_c() -> KeyEvent {
        KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL }
    }

    fn driver(surface_size: (u16, u16), interval: Duration) -> TickDriver {
        let state = GameState::with_rng(surface_size, Up, StdRng::seed_from_u64(7)).unwrap();
        TickDriver::new(state, interval)
    }

    #[test]
    fn maps_arrows_and_wasd() {
        assert_eq!(key_command(&key(KeyCode::Up)), Some(Command::Turn(Up)));
        assert_eq!(key_command(&key(KeyCode::Char('a'))), Some(Command::Turn(Left)));
        assert_eq!(key_command(&key(KeyCode::Char('S'))), Some(Command::Turn(Down)));
        assert_eq!(key_command(&key(KeyCode::Right)), Some(Command::Turn(Right)));
    }

    #[test]
    fn ctrl_c_quits_and_the_rest_is_ignored() {
        assert_eq!(key_command(&ctrl_c()), Some(Command::Quit));
        assert_eq!(key_command(&key(KeyCode::Char('c'))), None);
        assert_eq!(key_command(&key(KeyCode::Esc)), None);
        assert_eq!(key_command(&key(KeyCode::Enter)), None);
    }

    #[test]
    fn quit_key_stops_the_game() {
        let (keys, rx) = mpsc::channel();
        keys.send(key(KeyCode::Left)).unwrap();
        keys.send(ctrl_c()).unwrap();

        let mut surface = BufferSurface::new(20, 11);
        let outcome = driver((20, 11), Duration::from_secs(60))
            .run(&mut surface, ScriptedEvents(rx))
            .unwrap();

        assert_eq!(outcome, Outcome::Quit);
        // Only the initial frame was drawn
        assert_eq!(surface.shows, 1);
        assert_eq!(surface.row(10), "Score: 0");
    }

    #[test]
    fn ticks_until_the_snake_dies() {
        let (_keys, rx) = mpsc::channel();

        // Two rows to climb before the top edge
        let mut surface = BufferSurface::new(4, 3);
        let outcome = driver((4, 3), Duration::from_millis(1))
            .run(&mut surface, ScriptedEvents(rx))
            .unwrap();

        assert_eq!(outcome, Outcome::Died { score: 0 });
        assert_eq!(surface.shows, 2);
    }

    #[test]
    fn turns_reach_the_shared_state() {
        let (keys, rx) = mpsc::channel();
        keys.send(key(KeyCode::Right)).unwrap();
        keys.send(ctrl_c()).unwrap();

        let driver = driver((20, 11), Duration::from_secs(60));
        let mut surface = BufferSurface::new(20, 11);

        assert_eq!(driver.run(&mut surface, ScriptedEvents(rx)).unwrap(), Outcome::Quit);

        // Right is still queued, so another turn can't get in before a tick
        assert!(!driver.state.lock().unwrap().change_direction(Up));
    }

    #[test]
    fn lost_input_is_an_error() {
        let (keys, rx) = mpsc::channel::<KeyEvent>();
        drop(keys);

        let mut surface = BufferSurface::new(20, 11);
        let res = driver((20, 11), Duration::from_secs(60)).run(&mut surface, ScriptedEvents(rx));

        assert!(matches!(res, Err(SnakeError::InputClosed)));
    }
}
