use std::collections::HashMap;

use crate::entity::Renderable;
use crate::error::{Error, Result};
use crate::render::{Canvas, Color, Rect};
use crate::tile::{Cell, Tile};

/// Both coordinates squeezed into one map key.
fn pack(x: i32, y: i32) -> u64 {
    ((x as u32 as u64) << 32) | y as u32 as u64
}

/// Sparse map from grid cells to the tiles stacked on them.
///
/// A cell is present in the map only while it holds at least one tile, and
/// tiles within a cell keep their insertion order. Lookups on absent cells
/// are never errors: they yield empty results.
#[derive(Debug, Clone)]
pub struct TileGrid {
    x_o: f32,
    y_o: f32,
    tile_w: f32,
    tile_h: f32,
    tile_piv_x: f32,
    tile_piv_y: f32,
    coord_tiles: HashMap<u64, Vec<Tile>>,
}

impl TileGrid {
    /// Grid whose cell (0, 0) is centered on the pivot at `(x_o, y_o)`.
    pub fn new(x_o: f32, y_o: f32, tile_w: f32, tile_h: f32) -> Result<Self> {
        Self::with_pivot(x_o, y_o, tile_w, tile_h, (0.5, 0.5))
    }

    pub fn with_pivot(x_o: f32, y_o: f32, tile_w: f32, tile_h: f32, pivot: (f32, f32)) -> Result<Self> {
        if tile_w.is_nan() || tile_h.is_nan() || tile_w <= 0.0 || tile_h <= 0.0 {
            return Err(Error::InvalidCellSize { w: tile_w, h: tile_h });
        }
        Ok(TileGrid {
            x_o,
            y_o,
            tile_w,
            tile_h,
            tile_piv_x: pivot.0,
            tile_piv_y: pivot.1,
            coord_tiles: HashMap::new(),
        })
    }

    pub fn x_o(&self) -> f32 {
        self.x_o
    }

    pub fn y_o(&self) -> f32 {
        self.y_o
    }

    pub fn tile_w(&self) -> f32 {
        self.tile_w
    }

    pub fn tile_h(&self) -> f32 {
        self.tile_h
    }

    pub fn pivot(&self) -> (f32, f32) {
        (self.tile_piv_x, self.tile_piv_y)
    }

    pub fn clear(&mut self) {
        self.coord_tiles.clear();
    }

    /// Stacks `tile` on its cell. Tiles are never deduplicated.
    pub fn add_tile(&mut self, tile: Tile) {
        self.coord_tiles.entry(pack(tile.x, tile.y)).or_default().push(tile);
    }

    /// Tiles on `(x, y)`, optionally only those carrying `tag`.
    pub fn get_tiles(&self, x: i32, y: i32, tag: Option<&str>) -> Vec<&Tile> {
        match self.coord_tiles.get(&pack(x, y)) {
            Some(tiles) => tiles.iter().filter(|t| tag.map_or(true, |tag| t.has_tag(tag))).collect(),
            None => vec![],
        }
    }

    /// Removes and returns every tile on `(x, y)` matching `tag` (all if `None`).
    pub fn pop_tiles(&mut self, x: i32, y: i32, tag: Option<&str>) -> Vec<Tile> {
        let key = pack(x, y);
        let tag = match tag {
            Some(tag) => tag,
            None => return self.coord_tiles.remove(&key).unwrap_or_default(),
        };

        let tiles = match self.coord_tiles.get_mut(&key) {
            Some(tiles) => tiles,
            None => return vec![],
        };
        let (popped, kept): (Vec<Tile>, Vec<Tile>) = tiles.drain(..).partition(|t| t.has_tag(tag));
        *tiles = kept;
        if tiles.is_empty() {
            self.coord_tiles.remove(&key);
        }
        popped
    }

    /// Removes and returns the first tile on `(x, y)` matching `tag`
    /// (the first tile at all if `None`). The rest keep their order.
    pub fn pop_tile(&mut self, x: i32, y: i32, tag: Option<&str>) -> Option<Tile> {
        let key = pack(x, y);
        let tiles = self.coord_tiles.get_mut(&key)?;
        let index = tiles.iter().position(|t| tag.map_or(true, |tag| t.has_tag(tag)))?;
        let tile = tiles.remove(index);
        if tiles.is_empty() {
            self.coord_tiles.remove(&key);
        }
        Some(tile)
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.coord_tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coord_tiles.is_empty()
    }

    pub fn occupied_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.coord_tiles.values().filter_map(|tiles| tiles.first()).map(|t| t.coords())
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.coord_tiles.values().flatten()
    }

    /// Grid lines through every cell border visible on `canvas`, one screen
    /// unit thick.
    pub fn draw_grid(&self, canvas: &mut dyn Canvas, color: Color) {
        let (scr_w, scr_h) = canvas.size();
        for dir in [-1.0f32, 1.0] {
            let mut x = self.x_o + (dir.min(0.0) - self.tile_piv_x) * self.tile_w;
            while 0.0 <= x && x < scr_w {
                canvas.fill_rect(Rect::new(x, 0.0, 1.0, scr_h), color);
                x += dir * self.tile_w;
            }
            let mut y = self.y_o + (dir.min(0.0) - self.tile_piv_y) * self.tile_h;
            while 0.0 <= y && y < scr_h {
                canvas.fill_rect(Rect::new(0.0, y, scr_w, 1.0), color);
                y += dir * self.tile_h;
            }
        }
    }

    pub fn render_tiles(&self, canvas: &mut dyn Canvas) {
        for tile in self.tiles() {
            tile.render(canvas, self);
        }
    }
}
