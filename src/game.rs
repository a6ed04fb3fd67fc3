use crate::{Coords, TermInt};
use crate::config::{APPLE_CHAR, SCORE_COLUMN, SCORE_LABEL, SNAKE_CHAR};
use crate::error::{Result, SnakeError};
use crate::snake::{Direction, Snake};
use crate::term::{CellStyle, Surface};

use log::{debug, info, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Continue,
    GameOver,
}

/// Everything that changes while playing. Only `change_direction` and
/// `advance_one_step` mutate it.
pub struct GameState<R = StdRng> {
    rng: R,
    width: TermInt,
    height: TermInt,
    snake: Snake,
    apple: Option<Coords>,
    score: u32,
    // Set by input, consumed by the next step
    heading: Option<Direction>,
    last_heading: Direction,
}

impl GameState<StdRng> {
    pub fn new(surface_size: Coords, initial_heading: Direction) -> Result<Self> {
        GameState::with_rng(surface_size, initial_heading, StdRng::from_entropy())
    }
}

impl<R: Rng> GameState<R> {
    /// Builds the starting state for a surface of `surface_size`. The bottom
    /// row of the surface is kept for the status bar.
    pub fn with_rng(surface_size: Coords, initial_heading: Direction, rng: R) -> Result<Self> {
        let (width, surface_height) = surface_size;
        let height = surface_height.saturating_sub(1);

        if width < 2 || height < 1 {
            return Err(SnakeError::BoardTooSmall { width, height });
        }

        // Start at the bottom, on an even column so the segment lines up
        // with the movement grid
        let half_width = width / 2;
        let start = (half_width - half_width % 2, height - 1);

        Ok(GameState {
            rng,
            width,
            height,
            snake: Snake::new(start),
            apple: None,
            score: 0,
            heading: None,
            last_heading: initial_heading,
        })
    }

    pub fn board_size(&self) -> Coords {
        (self.width, self.height)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn snake_body(&self) -> &[Coords] {
        self.snake.body()
    }

    /// Queues a turn for the next step. Only the first turn between two steps
    /// counts, and a snake longer than one segment can't reverse onto itself.
    /// Returns whether the turn was taken.
    pub fn change_direction(&mut self, requested: Direction) -> bool {
        if self.heading.is_some() {
            trace!("Dropping {:?}, a turn is already queued", requested);
            return false;
        }

        if self.snake.len() > 1 && requested == self.last_heading.opposite() {
            trace!("Dropping {:?}, can't reverse while heading {:?}", requested, self.last_heading);
            return false;
        }

        debug!("Turning {:?}", requested);
        self.heading = Some(requested);
        true
    }

    /// Moves the snake one step, eating and respawning the apple as needed,
    /// and pushes the new frame to `surface`.
    pub fn advance_one_step<S: Surface>(&mut self, surface: &mut S) -> Result<Step> {
        let heading = self.heading.unwrap_or(self.last_heading);

        let new_head = match self.snake.next_head(heading, self.width, self.height) {
            Some(pos) => pos,
            None => {
                info!("Left the board at {:?} heading {:?}", self.snake.head(), heading);
                return Ok(Step::GameOver);
            }
        };

        if self.snake.occupies(new_head) {
            info!("Ran into itself at {:?}", new_head);
            return Ok(Step::GameOver);
        }

        self.erase(surface);

        let grow = self.apple == Some(new_head);
        if grow {
            self.score += 1;
            info!("Ate the apple at {:?}, score is now {}", new_head, self.score);
        }

        self.snake.advance(new_head, grow);

        // Placed after moving so a fresh apple never lands under the new head
        if grow || self.apple.is_none() {
            self.place_apple();
        }

        self.last_heading = heading;
        self.heading = None;

        self.draw(surface);
        surface.show()?;

        Ok(Step::Continue)
    }

    /// Draws the status label and the starting snake.
    pub fn draw_initial<S: Surface>(&self, surface: &mut S) -> Result<()> {
        for (i, ch) in SCORE_LABEL.chars().enumerate() {
            surface.set_cell((i as TermInt, self.height), CellStyle::Plain, ch);
        }

        self.draw(surface);
        surface.show()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn place_apple(&mut self) {
        // One slot per even column and row
        let slots = (self.width / 2) as usize * self.height as usize;
        if self.snake.len() >= slots {
            debug!("No room left for an apple");
            self.apple = None;
            return;
        }

        loop {
            let x = snap_to_grid(self.rng.gen_range(0..self.width), self.width);
            let y = self.rng.gen_range(0..self.height);

            if !self.snake.occupies((x, y)) {
                debug!("New apple at {:?}", (x, y));
                self.apple = Some((x, y));
                return;
            }
        }
    }

    fn erase<S: Surface>(&self, surface: &mut S) {
        if let Some(apple) = self.apple {
            paint_pair(surface, apple, CellStyle::Plain, ' ');
        }

        for pos in self.snake.body() {
            paint_pair(surface, *pos, CellStyle::Plain, ' ');
        }

        for x in SCORE_COLUMN..self.width {
            surface.set_cell((x, self.height), CellStyle::Plain, ' ');
        }
    }

    fn draw<S: Surface>(&self, surface: &mut S) {
        if let Some(apple) = self.apple {
            paint_pair(surface, apple, CellStyle::Apple, APPLE_CHAR);
        }

        let head = self.snake.head();
        for pos in self.snake.body() {
            let style = if *pos == head {CellStyle::Head} else {CellStyle::Plain};
            paint_pair(surface, *pos, style, SNAKE_CHAR);
        }

        for (i, ch) in self.score.to_string().chars().enumerate() {
            surface.set_cell((SCORE_COLUMN + i as TermInt, self.height), CellStyle::Plain, ch);
        }
    }
}

/// Moves `x` onto an even column whose two-cell glyph fits in `width`.
fn snap_to_grid(x: TermInt, width: TermInt) -> TermInt {
    let x = x + x % 2;
    if x >= width.saturating_sub(1) {
        x.saturating_sub(2)
    } else {
        x
    }
}

fn paint_pair<S: Surface>(surface: &mut S, pos: Coords, style: CellStyle, ch: char) {
    surface.set_cell(pos, style, ch);
    surface.set_cell((pos.0 + 1, pos.1), style, ch);
}
