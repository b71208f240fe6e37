use crate::entity::{Collidable, Renderable};
use crate::error::{Error, Result};
use crate::grid::TileGrid;
use crate::render::{Canvas, Color, Rect};

/// One integer grid coordinate.
pub type Cell = (i32, i32);

pub const SNAKE_TAG: &str = "snake";
pub const FOOD_TAG: &str = "food";

/// A colored, tagged rectangle occupying one grid cell.
///
/// Size and offset are fractions of a grid cell. Cloning deep-copies the tags,
/// so a tile stamped onto the grid never shares state with its prototype.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    w: f32,
    h: f32,
    offset_x: f32,
    offset_y: f32,
    color: Color,
    tags: Vec<String>,
}

impl Tile {
    /// Fails if either dimension is not strictly positive.
    pub fn new(x: i32, y: i32, w: f32, h: f32, color: Color) -> Result<Self> {
        if w.is_nan() || h.is_nan() || w <= 0.0 || h <= 0.0 {
            return Err(Error::InvalidTileSize { w, h });
        }
        Ok(Tile { x, y, w, h, offset_x: 0.0, offset_y: 0.0, color, tags: vec![] })
    }

    pub fn with_offset(mut self, offset_x: f32, offset_y: f32) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn set_coords(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn coords(&self) -> Cell {
        (self.x, self.y)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Screen-space rectangle of this tile on `grid`.
    pub fn screen_rect(&self, grid: &TileGrid) -> Rect {
        let (piv_x, piv_y) = grid.pivot();
        let x = grid.x_o() + (self.x as f32 + self.offset_x - piv_x * self.w) * grid.tile_w();
        let y = grid.y_o() + (self.y as f32 + self.offset_y - piv_y * self.h) * grid.tile_h();
        Rect::new(x, y, grid.tile_w() * self.w, grid.tile_h() * self.h)
    }
}

impl Renderable for Tile {
    fn render(&self, canvas: &mut dyn Canvas, grid: &TileGrid) {
        canvas.fill_rect(self.screen_rect(grid), self.color);
    }
}

impl Collidable for Tile {
    fn cell(&self) -> Cell {
        self.coords()
    }
}
