use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::render::Color;

/// Inclusive range of playable grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl Bounds {
    pub fn contains(&self, (x, y): (i32, i32)) -> bool {
        self.x_min <= x && x <= self.x_max && self.y_min <= y && y <= self.y_max
    }

    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (self.y_min..=self.y_max).flat_map(move |y| (self.x_min..=self.x_max).map(move |x| (x, y)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    /// Segments stacked on the start cell.
    pub start_len: usize,
    /// Cells per second.
    pub speed: f64,
    pub color: Color,
    /// Fraction of a grid cell.
    pub size: f32,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        SnakeConfig { start_len: 5, speed: 10.0, color: Color::rgb(255, 100, 200), size: 0.8 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodConfig {
    pub color: Color,
    pub size: f32,
}

impl Default for FoodConfig {
    fn default() -> Self {
        FoodConfig { color: Color::rgb(255, 255, 0), size: 0.8 }
    }
}

/// Tunables for one game session. Screen units are terminal cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen_width: u16,
    pub screen_height: u16,
    pub tile_width: u16,
    pub tile_height: u16,
    pub tile_pivot: (f32, f32),
    /// Frame rate cap.
    pub fps: f64,
    pub snake: SnakeConfig,
    pub food: FoodConfig,
    pub background: Color,
    pub grid_color: Color,
    pub show_grid: bool,
    /// Fixed RNG seed for reproducible apple placement.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            screen_width: 80,
            screen_height: 24,
            tile_width: 2,
            tile_height: 1,
            tile_pivot: (0.5, 0.5),
            fps: 60.0,
            snake: SnakeConfig::default(),
            food: FoodConfig::default(),
            background: Color::rgb(10, 30, 10),
            grid_color: Color::rgb(30, 60, 30),
            show_grid: false,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Reads a RON file; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn to_ron(&self) -> std::result::Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    pub fn validate(&self) -> Result<()> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(Error::InvalidCellSize { w: self.tile_width as f32, h: self.tile_height as f32 });
        }
        if self.screen_width < self.tile_width || self.screen_height < self.tile_height {
            return Err(Error::InvalidScreen { width: self.screen_width, height: self.screen_height });
        }
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(Error::InvalidFps(self.fps));
        }
        if self.snake.start_len == 0 {
            return Err(Error::InvalidLength(self.snake.start_len));
        }
        if !self.snake.speed.is_finite() || self.snake.speed <= 0.0 {
            return Err(Error::InvalidSpeed(self.snake.speed));
        }
        for size in [self.snake.size, self.food.size] {
            if size.is_nan() || size <= 0.0 {
                return Err(Error::InvalidTileSize { w: size, h: size });
            }
        }
        Ok(())
    }

    /// Playable cells for the configured screen, centered on cell (0, 0).
    pub fn bounds(&self) -> Bounds {
        let cols = (self.screen_width / self.tile_width) as i32;
        let rows = (self.screen_height / self.tile_height) as i32;
        Bounds { x_min: -cols / 2 + 1, x_max: cols / 2, y_min: -rows / 2 + 1, y_max: rows / 2 }
    }

    /// Screen position of the pivot of cell (0, 0).
    pub fn grid_origin(&self) -> (f32, f32) {
        (
            self.screen_width as f32 / 2.0 - self.tile_width as f32 / 2.0,
            self.screen_height as f32 / 2.0 - self.tile_height as f32 / 2.0,
        )
    }
}
