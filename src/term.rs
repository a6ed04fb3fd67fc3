use crate::error::Result;
use crate::{Coords, TermInt};
use std::io::{Stdout, Write, stdout};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellStyle {
    Plain,
    Head,
    Apple,
}

impl CellStyle {
    fn color(self) -> Color {
        match self {
            CellStyle::Plain => Color::Reset,
            CellStyle::Head => Color::Green,
            CellStyle::Apple => Color::Red,
        }
    }
}

/// A grid of styled character cells the game draws onto. Changes stay
/// pending until `show` is called.
pub trait Surface {
    fn size(&self) -> Coords;

    fn set_cell(&mut self, pos: Coords, style: CellStyle, ch: char);

    /// The character last set at `pos`, or `None` if `pos` is off-screen.
    // Part of the surface contract; the game checks bounds itself instead
    #[allow(dead_code)]
    fn get_content(&self, pos: Coords) -> Option<char>;

    fn show(&mut self) -> Result<()>;
}

pub trait EventSource {
    /// Blocks until the next key press.
    fn poll_event(&mut self) -> Result<KeyEvent>;
}

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<(char, CellStyle)>,
    dirty: Vec<bool>,
    pending: Vec<Coords>,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size()?;
        let cells = width as usize * height as usize;
        Ok(TermManager {
            width,
            height,
            stdout: stdout(),
            screen: vec![(' ', CellStyle::Plain); cells],
            dirty: vec![false; cells],
            pending: vec![],
        })
    }

    /// Takes over the terminal. If any part fails, whatever did take effect
    /// is restored before the error is returned.
    pub fn setup(&mut self) -> Result<()> {
        let res = self.enter();
        undo_on_error(res, || {
            let _ = self.restore();
        })
    }

    pub fn restore(&mut self) -> Result<()> {
        self.set_raw_mode(false)?;
        self.set_cursor_visibility(true)?;
        self.set_cursor_blink(true)?;
        execute!(self.stdout, LeaveAlternateScreen)?;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![(' ', CellStyle::Plain); self.width as usize * self.height as usize];
        self.dirty = vec![false; self.screen.len()];
        self.pending.clear();
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn enter(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        self.set_raw_mode(true)?;
        self.set_cursor_visibility(false)?;
        self.set_cursor_blink(false)?;
        self.clear()
    }

    fn index(&self, pos: Coords) -> Option<usize> {
        if pos.0 < self.width && pos.1 < self.height {
            Some(self.width as usize * pos.1 as usize + pos.0 as usize)
        } else {
            None
        }
    }

    fn set_raw_mode(&self, option: bool) -> Result<()> {
        if option {
            terminal::enable_raw_mode()?;
        } else {
            terminal::disable_raw_mode()?;
        }

        Ok(())
    }

    fn set_cursor_blink(&mut self, option: bool) -> Result<()> {
        if option {
            execute!(self.stdout, cursor::EnableBlinking)?;
        } else {
            execute!(self.stdout, cursor::DisableBlinking)?;
        }

        Ok(())
    }

    fn set_cursor_visibility(&mut self, option: bool) -> Result<()> {
        if option {
            execute!(self.stdout, cursor::Show)?;
        } else {
            execute!(self.stdout, cursor::Hide)?;
        }

        Ok(())
    }
}

impl Surface for TermManager {
    fn size(&self) -> Coords {
        (self.width, self.height)
    }

    fn set_cell(&mut self, pos: Coords, style: CellStyle, ch: char) {
        // Writes past the edge are dropped, like the terminal would
        if let Some(i) = self.index(pos) {
            self.screen[i] = (ch, style);
            if !self.dirty[i] {
                self.dirty[i] = true;
                self.pending.push(pos);
            }
        }
    }

    fn get_content(&self, pos: Coords) -> Option<char> {
        self.index(pos).map(|i| self.screen[i].0)
    }

    fn show(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);

        for pos in pending {
            let i = self.width as usize * pos.1 as usize + pos.0 as usize;
            let (ch, cell_style) = self.screen[i];
            self.dirty[i] = false;

            queue!(
                self.stdout,
                cursor::MoveTo(pos.0, pos.1),
                style::SetForegroundColor(cell_style.color()),
                style::Print(ch),
                style::ResetColor
            )?;
        }

        self.stdout.flush()?;
        Ok(())
    }
}

fn undo_on_error<T>(res: Result<T>, undo: impl FnOnce()) -> Result<T> {
    if res.is_err() {
        undo();
    }
    res
}

/// Key presses from the controlling terminal.
pub struct TermEvents;

impl EventSource for TermEvents {
    fn poll_event(&mut self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                return Ok(ev);
            }
        }
    }
}

/// In-memory surface for exercising drawing code without a terminal.
#[cfg(test)]
pub struct BufferSurface {
    pub width: TermInt,
    pub height: TermInt,
    pub cells: std::collections::HashMap<Coords, (char, CellStyle)>,
    pub shows: usize,
}

#[cfg(test)]
impl BufferSurface {
    pub fn new(width: TermInt, height: TermInt) -> Self {
        BufferSurface { width, height, cells: Default::default(), shows: 0 }
    }

    pub fn style_at(&self, pos: Coords) -> Option<CellStyle> {
        self.cells.get(&pos).map(|c| c.1)
    }

    /// The characters of row `y`, trailing blanks trimmed.
    pub fn row(&self, y: TermInt) -> String {
        let line: String = (0..self.width)
            .map(|x| self.get_content((x, y)).unwrap_or(' '))
            .collect();
        line.trim_end().to_string()
    }
}

#[cfg(test)]
impl Surface for BufferSurface {
    fn size(&self) -> Coords {
        (self.width, self.height)
    }

    fn set_cell(&mut self, pos: Coords, style: CellStyle, ch: char) {
        if pos.0 < self.width && pos.1 < self.height {
            self.cells.insert(pos, (ch, style));
        }
    }

    fn get_content(&self, pos: Coords) -> Option<char> {
        if pos.0 < self.width && pos.1 < self.height {
            Some(self.cells.get(&pos).map_or(' ', |c| c.0))
        } else {
            None
        }
    }

    fn show(&mut self) -> Result<()> {
        self.shows += 1;
        Ok(())
    }
}
