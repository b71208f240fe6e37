use std::io::{Stdout, Write, stdout};
use std::time::Duration;

use crossterm::{cursor, execute, queue, style, terminal, Result};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};

use crate::render::{Color, FrameBuffer, Glyph};

/// Owns the terminal while a game runs and presents frame buffers onto it.
pub struct TermManager {
    stdout: Stdout,
    // what is currently on screen; None forces a full repaint
    shown: Option<FrameBuffer>,
    active: bool,
}

impl TermManager {
    pub fn new() -> Self {
        TermManager { stdout: stdout(), shown: None, active: false }
    }

    pub fn get_terminal_size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        self.active = true;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;
        self.clear()
    }

    pub fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        terminal::disable_raw_mode()?;
        execute!(self.stdout, style::ResetColor, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
    }

    /// Key events that arrived since the last call, without blocking.
    pub fn read_key_events_queue(&self) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(0))? {
            if let Event::Key(ev) = read()? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    /// Writes the cells of `frame` that differ from what is on screen.
    pub fn present(&mut self, frame: &FrameBuffer) -> Result<()> {
        let same_size = matches!(&self.shown, Some(shown)
            if shown.width() == frame.width() && shown.height() == frame.height());
        if !same_size && self.shown.is_some() {
            self.clear()?;
        }

        match &self.shown {
            Some(shown) => {
                for (x, y, glyph) in frame.diff(shown) {
                    queue_glyph(&mut self.stdout, x, y, glyph)?;
                }
            }
            None => {
                for (x, y, glyph) in frame.cells() {
                    queue_glyph(&mut self.stdout, x, y, glyph)?;
                }
            }
        }
        self.stdout.flush()?;
        self.shown = Some(frame.clone());
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, style::ResetColor, terminal::Clear(ClearType::All))?;
        self.shown = None;
        Ok(())
    }
}

impl Drop for TermManager {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

fn queue_glyph(out: &mut Stdout, x: u16, y: u16, glyph: &Glyph) -> Result<()> {
    queue!(
        out,
        cursor::MoveTo(x, y),
        style::SetForegroundColor(to_term_color(glyph.fg)),
        style::SetBackgroundColor(to_term_color(glyph.bg)),
        style::Print(glyph.ch)
    )
}

fn to_term_color(color: Color) -> style::Color {
    style::Color::Rgb { r: color.r, g: color.g, b: color.b }
}
