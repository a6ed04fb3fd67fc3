use crate::{Coords, TermInt};
use Direction::*;

/// Horizontal steps cover two cells, since terminal characters are about
/// twice as tall as they are wide
pub const HORIZONTAL_STEP: TermInt = 2;
pub const VERTICAL_STEP: TermInt = 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }
}

pub struct Snake {
    // Tail first, head last
    body: Vec<Coords>,
}

impl Snake {
    pub fn new(pos: Coords) -> Self {
        Snake { body: vec![pos] }
    }

    #[cfg(test)]
    pub fn from_body(body: Vec<Coords>) -> Self {
        assert!(!body.is_empty(), "a snake needs at least one segment");
        Snake { body }
    }

    pub fn body(&self) -> &[Coords] {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Coords {
        self.body[self.body.len() - 1]
    }

    pub fn occupies(&self, pos: Coords) -> bool {
        self.body.contains(&pos)
    }

    /// Where the head ends up after one step, or `None` if that step leaves
    /// the `width` x `height` playfield.
    pub fn next_head(&self, direction: Direction, width: TermInt, height: TermInt) -> Option<Coords> {
        let (x, y) = self.head();

        let new_head = match direction {
            Up => (x, y.checked_sub(VERTICAL_STEP)?),
            Down => (x, y.checked_add(VERTICAL_STEP)?),
            Left => (x.checked_sub(HORIZONTAL_STEP)?, y),
            Right => (x.checked_add(HORIZONTAL_STEP)?, y),
        };

        // The segment spans (x, x + 1), so its left cell must stop at width - 2
        if new_head.0 >= width.saturating_sub(1) || new_head.1 >= height {
            return None;
        }

        Some(new_head)
    }

    /// Appends `new_head`, dropping the tail unless `grow` is set. Returns the
    /// dropped tail, if any.
    pub fn advance(&mut self, new_head: Coords, grow: bool) -> Option<Coords> {
        self.body.push(new_head);

        if grow {
            None
        } else {
            self.body.drain(0..1).next()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposites() {
        assert_eq!(Up.opposite(), Down);
        assert_eq!(Down.opposite(), Up);
        assert_eq!(Left.opposite(), Right);
        assert_eq!(Right.opposite(), Left);
    }

    #[test]
    fn horizontal_moves_step_two_columns() {
        let snake = Snake::new((4, 3));
        assert_eq!(snake.next_head(Right, 20, 10), Some((6, 3)));
        assert_eq!(snake.next_head(Left, 20, 10), Some((2, 3)));
        assert_eq!(snake.next_head(Up, 20, 10), Some((4, 2)));
        assert_eq!(snake.next_head(Down, 20, 10), Some((4, 4)));
    }

    #[test]
    fn leaving_the_board_has_no_head() {
        assert_eq!(Snake::new((0, 5)).next_head(Left, 20, 10), None);
        assert_eq!(Snake::new((4, 0)).next_head(Up, 20, 10), None);
        assert_eq!(Snake::new((4, 9)).next_head(Down, 20, 10), None);
        assert_eq!(Snake::new((18, 5)).next_head(Right, 20, 10), None);
        // Odd widths leave the last column unused
        assert_eq!(Snake::new((18, 5)).next_head(Right, 21, 10), None);
        assert_eq!(Snake::new((16, 5)).next_head(Right, 21, 10), Some((18, 5)));
    }

    #[test]
    fn advance_moves_or_extends() {
        let mut snake = Snake::from_body(vec![(0, 0), (2, 0)]);

        assert_eq!(snake.advance((4, 0), false), Some((0, 0)));
        assert_eq!(snake.body(), &[(2, 0), (4, 0)]);

        assert_eq!(snake.advance((6, 0), true), None);
        assert_eq!(snake.body(), &[(2, 0), (4, 0), (6, 0)]);
        assert_eq!(snake.head(), (6, 0));
    }
}
