use std::collections::HashSet;

use crossterm::event::KeyCode;
use log::trace;

use crate::entity::{Collidable, Updatable};
use crate::error::{Error, Result};
use crate::grid::TileGrid;
use crate::tile::{Cell, Tile, FOOD_TAG, SNAKE_TAG};
use Direction::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self, Up | Down)
    }
}

/// Keys currently held down, as seen by the input collaborator this frame.
pub trait KeyState {
    fn is_pressed(&self, key: KeyCode) -> bool;
}

impl KeyState for HashSet<KeyCode> {
    fn is_pressed(&self, key: KeyCode) -> bool {
        self.contains(&key)
    }
}

/// Keys steering one snake.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Controls {
    pub up: KeyCode,
    pub down: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
}

impl Default for Controls {
    fn default() -> Self {
        Controls { up: KeyCode::Up, down: KeyCode::Down, left: KeyCode::Left, right: KeyCode::Right }
    }
}

/// A snake living on a [`TileGrid`].
///
/// Body coordinates are head first. Every body coordinate is backed by one
/// `"snake"` tile on the grid, stamped from the prototype.
#[derive(Debug)]
pub struct Snake {
    x: i32,
    y: i32,
    bodypart_pre: Tile,
    part_coords: Vec<Cell>,
    pending_growth: usize,
    dir: Direction,
    prev_dir: Direction,
    move_clock: f64,
    speed: f64,
    controls: Controls,
}

impl Snake {
    /// Places `start_len` segments stacked on `(x, y)`, heading up.
    /// `speed` is in cells per second.
    pub fn new(
        grid: &mut TileGrid,
        x: i32,
        y: i32,
        mut bodypart_pre: Tile,
        start_len: usize,
        speed: f64,
        controls: Controls,
    ) -> Result<Self> {
        if start_len == 0 {
            return Err(Error::InvalidLength(start_len));
        }
        if !speed.is_finite() || speed <= 0.0 {
            return Err(Error::InvalidSpeed(speed));
        }

        bodypart_pre.set_coords(x, y);
        for _ in 0..start_len {
            grid.add_tile(bodypart_pre.clone());
        }

        Ok(Snake {
            x,
            y,
            bodypart_pre,
            part_coords: vec![(x, y); start_len],
            pending_growth: 0,
            dir: Up,
            prev_dir: Up,
            move_clock: 0.0,
            speed,
            controls,
        })
    }

    pub fn head(&self) -> Cell {
        (self.x, self.y)
    }

    pub fn part_coords(&self) -> &[Cell] {
        &self.part_coords
    }

    pub fn len(&self) -> usize {
        self.part_coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.part_coords.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.dir
    }

    pub fn prev_direction(&self) -> Direction {
        self.prev_dir
    }

    pub fn move_clock(&self) -> f64 {
        self.move_clock
    }

    /// Grows the body by `amount` segments over the following moves.
    pub fn increase_length(&mut self, amount: usize) {
        self.pending_growth += amount;
    }

    /// Advances one cell in the current direction.
    ///
    /// A pending growth segment keeps the old tail in place instead of
    /// vacating it, so the body gets one longer on this move.
    pub fn move_step(&mut self, grid: &mut TileGrid) {
        let tail = self.part_coords[self.part_coords.len() - 1];
        let grows = self.pending_growth > 0;
        if grows {
            self.pending_growth -= 1;
            self.part_coords.push(tail);
        }

        self.part_coords.rotate_right(1);
        let (dx, dy) = self.dir.delta();
        self.x += dx;
        self.y += dy;
        self.part_coords[0] = (self.x, self.y);
        self.prev_dir = self.dir;

        if !grows {
            grid.pop_tile(tail.0, tail.1, Some(SNAKE_TAG));
        }
        self.bodypart_pre.set_coords(self.x, self.y);
        grid.add_tile(self.bodypart_pre.clone());

        trace!("snake moved {:?} to ({}, {}), length {}", self.dir, self.x, self.y, self.len());
    }

    /// Turns are only taken perpendicular to the last committed direction.
    /// Left wins over right and up wins over down when both are held.
    pub fn check_key_pressed(&mut self, keys: &impl KeyState) {
        if self.prev_dir.is_vertical() {
            if keys.is_pressed(self.controls.left) {
                self.dir = Left;
            } else if keys.is_pressed(self.controls.right) {
                self.dir = Right;
            }
        } else if keys.is_pressed(self.controls.up) {
            self.dir = Up;
        } else if keys.is_pressed(self.controls.down) {
            self.dir = Down;
        }
    }
}

impl Updatable for Snake {
    /// At most one move per call, however much time has piled up.
    fn update(&mut self, grid: &mut TileGrid, dt: f64) {
        self.move_clock += dt;
        let move_delay_time = 1.0 / self.speed;
        if self.move_clock >= move_delay_time {
            self.move_clock -= move_delay_time;
            self.move_step(grid);

            // Running into our own body is judged by the caller, not here.
            let on_body = grid.get_tiles(self.x, self.y, Some(SNAKE_TAG)).len() == 2;
            if !on_body && grid.get_tiles(self.x, self.y, Some(FOOD_TAG)).len() == 1 {
                self.increase_length(1);
            }
        }
    }
}

impl Collidable for Snake {
    fn cell(&self) -> Cell {
        self.head()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Color;

    fn prototype() -> Tile {
        Tile::new(0, 0, 0.8, 0.8, Color::rgb(255, 100, 200)).unwrap().with_tag(SNAKE_TAG)
    }

    fn setup(start_len: usize, speed: f64) -> (TileGrid, Snake) {
        let mut grid = TileGrid::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let snake = Snake::new(&mut grid, 0, 0, prototype(), start_len, speed, Controls::default()).unwrap();
        (grid, snake)
    }

    fn keys(pressed: &[KeyCode]) -> HashSet<KeyCode> {
        pressed.iter().copied().collect()
    }

    fn snake_tiles(grid: &TileGrid) -> usize {
        grid.tiles().filter(|t| t.has_tag(SNAKE_TAG)).count()
    }

    fn food_at(grid: &mut TileGrid, x: i32, y: i32) {
        grid.add_tile(Tile::new(x, y, 0.8, 0.8, Color::rgb(255, 255, 0)).unwrap().with_tag(FOOD_TAG));
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let mut grid = TileGrid::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let c = Controls::default();
        assert!(matches!(Snake::new(&mut grid, 0, 0, prototype(), 0, 5.0, c), Err(Error::InvalidLength(0))));
        assert!(matches!(Snake::new(&mut grid, 0, 0, prototype(), 3, 0.0, c), Err(Error::InvalidSpeed(_))));
        assert!(Snake::new(&mut grid, 0, 0, prototype(), 3, f64::INFINITY, c).is_err());
        assert!(grid.is_empty());
    }

    #[test]
    fn test_creation_stacks_segments() {
        let (grid, snake) = setup(3, 5.0);
        assert_eq!(snake.part_coords(), &[(0, 0), (0, 0), (0, 0)]);
        assert_eq!(grid.get_tiles(0, 0, Some(SNAKE_TAG)).len(), 3);
        assert_eq!(snake.direction(), Up);
        assert_eq!(snake.prev_direction(), Up);
    }

    #[test]
    fn test_single_update_moves_once() {
        let (mut grid, mut snake) = setup(3, 5.0);
        snake.update(&mut grid, 0.2);

        assert_eq!(snake.head(), (0, -1));
        assert_eq!(snake.move_clock(), 0.0);
        assert_eq!(snake.part_coords(), &[(0, -1), (0, 0), (0, 0)]);
        assert_eq!(grid.get_tiles(0, 0, Some(SNAKE_TAG)).len(), 2);
        assert_eq!(grid.get_tiles(0, -1, Some(SNAKE_TAG)).len(), 1);
    }

    #[test]
    fn test_short_frames_accumulate() {
        let (mut grid, mut snake) = setup(3, 5.0);
        snake.update(&mut grid, 0.125);
        assert_eq!(snake.head(), (0, 0));
        snake.update(&mut grid, 0.125);
        assert_eq!(snake.head(), (0, -1));
        assert!((snake.move_clock() - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_slow_frame_moves_only_once() {
        let (mut grid, mut snake) = setup(3, 5.0);
        snake.update(&mut grid, 1.0);

        assert_eq!(snake.head(), (0, -1));
        assert!((snake.move_clock() - 0.8).abs() < 1e-9);

        // leftover time still yields one move per call
        snake.update(&mut grid, 0.0);
        assert_eq!(snake.head(), (0, -2));
    }

    #[test]
    fn test_move_keeps_length_and_head() {
        let (mut grid, mut snake) = setup(4, 5.0);
        for _ in 0..6 {
            snake.move_step(&mut grid);
            assert_eq!(snake.len(), 4);
            assert_eq!(snake.part_coords()[0], snake.head());
            assert_eq!(snake_tiles(&grid), 4);
        }
        assert_eq!(snake.part_coords(), &[(0, -6), (0, -5), (0, -4), (0, -3)]);
        assert!(grid.get_tiles(0, 0, None).is_empty());
    }

    #[test]
    fn test_growth_appears_on_next_move() {
        let (mut grid, mut snake) = setup(3, 5.0);
        for _ in 0..3 {
            snake.move_step(&mut grid);
        }
        let old_tail = *snake.part_coords().last().unwrap();

        snake.increase_length(1);
        assert_eq!(snake.len(), 3);

        snake.move_step(&mut grid);
        assert_eq!(snake.len(), 4);
        assert_eq!(*snake.part_coords().last().unwrap(), old_tail);
        assert_eq!(grid.get_tiles(old_tail.0, old_tail.1, Some(SNAKE_TAG)).len(), 1);
        assert_eq!(snake_tiles(&grid), 4);

        snake.move_step(&mut grid);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake_tiles(&grid), 4);
    }

    #[test]
    fn test_eating_defers_growth() {
        let (mut grid, mut snake) = setup(3, 5.0);
        food_at(&mut grid, 0, -1);

        snake.update(&mut grid, 0.2);
        assert_eq!(snake.head(), (0, -1));
        assert_eq!(snake.len(), 3);

        snake.update(&mut grid, 0.2);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.part_coords(), &[(0, -2), (0, -1), (0, 0), (0, 0)]);
    }

    #[test]
    fn test_head_on_body_does_not_grow() {
        let (mut grid, mut snake) = setup(3, 5.0);
        // a stray body tile and food where the head lands
        let mut stray = prototype();
        stray.set_coords(0, -1);
        grid.add_tile(stray);
        food_at(&mut grid, 0, -1);

        snake.update(&mut grid, 0.2);
        assert_eq!(grid.get_tiles(0, -1, Some(SNAKE_TAG)).len(), 2);

        snake.update(&mut grid, 0.2);
        assert_eq!(snake.len(), 3);
    }

    #[test]
    fn test_turns_perpendicular_only() {
        let (mut grid, mut snake) = setup(3, 5.0);

        // heading up: vertical keys ignored
        snake.check_key_pressed(&keys(&[KeyCode::Down]));
        assert_eq!(snake.direction(), Up);
        snake.check_key_pressed(&keys(&[KeyCode::Up]));
        assert_eq!(snake.direction(), Up);
        snake.check_key_pressed(&keys(&[KeyCode::Right]));
        assert_eq!(snake.direction(), Right);
        snake.check_key_pressed(&keys(&[KeyCode::Left]));
        assert_eq!(snake.direction(), Left);

        snake.move_step(&mut grid);
        assert_eq!(snake.prev_direction(), Left);

        // heading left: horizontal keys ignored
        snake.check_key_pressed(&keys(&[KeyCode::Right]));
        assert_eq!(snake.direction(), Left);
        snake.check_key_pressed(&keys(&[KeyCode::Down]));
        assert_eq!(snake.direction(), Down);
        snake.check_key_pressed(&keys(&[KeyCode::Up]));
        assert_eq!(snake.direction(), Up);
    }

    #[test]
    fn test_direction_latched_at_move_time() {
        let (mut grid, mut snake) = setup(3, 5.0);
        snake.check_key_pressed(&keys(&[KeyCode::Left]));
        // still allowed to pick the other horizontal before moving
        snake.check_key_pressed(&keys(&[KeyCode::Right]));
        assert_eq!(snake.direction(), Right);
        // no reversal to down possible before the turn is committed
        snake.check_key_pressed(&keys(&[KeyCode::Down]));
        assert_eq!(snake.direction(), Right);

        snake.move_step(&mut grid);
        assert_eq!(snake.head(), (1, 0));
    }

    #[test]
    fn test_simultaneous_keys_use_fixed_priority() {
        let (mut grid, mut snake) = setup(3, 5.0);
        snake.check_key_pressed(&keys(&[KeyCode::Right, KeyCode::Left]));
        assert_eq!(snake.direction(), Left);

        snake.move_step(&mut grid);
        snake.check_key_pressed(&keys(&[KeyCode::Down, KeyCode::Up]));
        assert_eq!(snake.direction(), Up);
    }

    #[test]
    fn test_custom_controls() {
        let mut grid = TileGrid::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let controls = Controls {
            up: KeyCode::Char('i'),
            down: KeyCode::Char('k'),
            left: KeyCode::Char('j'),
            right: KeyCode::Char('l'),
        };
        let mut snake = Snake::new(&mut grid, 0, 0, prototype(), 3, 5.0, controls).unwrap();

        snake.check_key_pressed(&keys(&[KeyCode::Left]));
        assert_eq!(snake.direction(), Up);
        snake.check_key_pressed(&keys(&[KeyCode::Char('l')]));
        assert_eq!(snake.direction(), Right);
    }

    #[test]
    fn test_collides_with_tile() {
        let (mut grid, mut snake) = setup(3, 5.0);
        let apple = Tile::new(0, -1, 0.8, 0.8, Color::WHITE).unwrap();
        assert!(!snake.collides_with(&apple));
        snake.move_step(&mut grid);
        assert!(snake.collides_with(&apple));
    }
}
