//! Capabilities a game object can opt into. Each concrete type implements
//! only the ones it actually supports.

use crate::grid::TileGrid;
use crate::render::Canvas;
use crate::tile::Cell;

/// Advances with the frame clock.
pub trait Updatable {
    /// `dt` is the time since the previous frame, in seconds.
    fn update(&mut self, grid: &mut TileGrid, dt: f64);
}

/// Draws itself relative to a grid.
pub trait Renderable {
    fn render(&self, canvas: &mut dyn Canvas, grid: &TileGrid);
}

/// Occupies a single grid cell.
pub trait Collidable {
    fn cell(&self) -> Cell;

    fn collides_with(&self, other: &dyn Collidable) -> bool {
        self.cell() == other.cell()
    }
}
