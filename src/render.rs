use std::ops::Range;

use serde::{Deserialize, Serialize};

/// RGBA fill color. Alpha is carried along but terminals ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }
}

/// Axis-aligned rectangle in screen units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }
}

/// Anything the core can draw filled rectangles onto.
pub trait Canvas {
    /// Width and height in screen units.
    fn size(&self) -> (f32, f32);

    fn fill_rect(&mut self, rect: Rect, color: Color);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Glyph {
    pub fn blank(bg: Color) -> Self {
        Glyph { ch: ' ', fg: Color::WHITE, bg }
    }
}

/// A canvas of terminal character cells, one screen unit per cell.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Glyph>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16, bg: Color) -> Self {
        let cells = vec![Glyph::blank(bg); width as usize * height as usize];
        FrameBuffer { width, height, cells }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn fill(&mut self, bg: Color) {
        self.cells.iter_mut().for_each(|cell| *cell = Glyph::blank(bg));
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Glyph> {
        if x < self.width && y < self.height {
            self.cells.get(self.index(x, y))
        } else {
            None
        }
    }

    pub fn put(&mut self, x: u16, y: u16, glyph: Glyph) {
        if x < self.width && y < self.height {
            let i = self.index(x, y);
            self.cells[i] = glyph;
        }
    }

    /// Draws `lines` centered on screen inside a padded box.
    pub fn show_message(&mut self, lines: &[String], fg: Color, bg: Color) {
        let msg_height = lines.len() as u16 + 2;
        let msg_width = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0) as u16 + 2;
        let left = (self.width / 2).saturating_sub(msg_width / 2);
        let top = (self.height / 2).saturating_sub(msg_height / 2);

        for y_diff in 0..msg_height {
            for x_diff in 0..msg_width {
                self.put(left + x_diff, top + y_diff, Glyph { ch: ' ', fg, bg });
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top + i as u16 + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.put(left + x_diff as u16, y, Glyph { ch, fg, bg });
            }
        }
    }

    /// Cells that differ from `other`, which must have the same dimensions.
    pub fn diff<'a>(&'a self, other: &'a FrameBuffer) -> impl Iterator<Item = (u16, u16, &'a Glyph)> + 'a {
        let width = self.width;
        self.cells
            .iter()
            .zip(other.cells.iter())
            .enumerate()
            .filter(|(_, (mine, theirs))| mine != theirs)
            .map(move |(i, (mine, _))| ((i % width as usize) as u16, (i / width as usize) as u16, mine))
    }

    pub fn cells(&self) -> impl Iterator<Item = (u16, u16, &Glyph)> {
        let width = self.width as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, glyph)| ((i % width) as u16, (i / width) as u16, glyph))
    }

    fn index(&self, x: u16, y: u16) -> usize {
        self.width as usize * y as usize + x as usize
    }
}

impl Canvas for FrameBuffer {
    fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        for y in cell_span(rect.y, rect.h, self.height) {
            for x in cell_span(rect.x, rect.w, self.width) {
                self.put(x, y, Glyph::blank(color));
            }
        }
    }
}

/// Whole cells covered by `[start, start + len)`, edges rounded to the
/// nearest cell boundary. A positive extent always covers at least one cell.
pub fn cell_span(start: f32, len: f32, limit: u16) -> Range<u16> {
    if len.is_nan() || len <= 0.0 {
        return 0..0;
    }
    let first = start.round();
    let last = (start + len).round().max(first + 1.0);
    let clamp = |v: f32| v.max(0.0).min(limit as f32) as u16;
    clamp(first)..clamp(last)
}
