use std::collections::HashSet;

use crossterm::event::KeyCode;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::{Bounds, GameConfig};
use crate::entity::{Collidable, Updatable};
use crate::error::Result;
use crate::grid::TileGrid;
use crate::render::Canvas;
use crate::snake::{Controls, Snake};
use crate::tile::{Cell, Tile, FOOD_TAG, SNAKE_TAG};

const HIGH_SCORES_KEPT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Menu,
    Playing,
    GameOver,
    HighScore,
}

/// Everything one game session needs between frames.
pub struct Session {
    config: GameConfig,
    bounds: Bounds,
    grid: TileGrid,
    bodypart_pre: Tile,
    snake: Snake,
    apple: Tile,
    state: GameState,
    paused: bool,
    won: bool,
    last_score: usize,
    high_scores: Vec<usize>,
    rng: StdRng,
}

impl Session {
    /// Validates `config` and lays out a first round behind the menu.
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;

        let (x_o, y_o) = config.grid_origin();
        let mut grid = TileGrid::with_pivot(
            x_o,
            y_o,
            config.tile_width as f32,
            config.tile_height as f32,
            config.tile_pivot,
        )?;
        let snake_size = config.snake.size;
        let bodypart_pre = Tile::new(0, 0, snake_size, snake_size, config.snake.color)?.with_tag(SNAKE_TAG);
        let apple = Tile::new(0, 0, config.food.size, config.food.size, config.food.color)?.with_tag(FOOD_TAG);
        let snake = Snake::new(
            &mut grid,
            0,
            0,
            bodypart_pre.clone(),
            config.snake.start_len,
            config.snake.speed,
            Controls::default(),
        )?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut session = Session {
            bounds: config.bounds(),
            config,
            grid,
            bodypart_pre,
            snake,
            apple,
            state: GameState::Menu,
            paused: false,
            won: false,
            last_score: 0,
            high_scores: vec![],
            rng,
        };
        session.place_apple();
        Ok(session)
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn apple(&self) -> &Tile {
        &self.apple
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn score(&self) -> usize {
        self.snake.len().saturating_sub(self.config.snake.start_len)
    }

    pub fn high_scores(&self) -> &[usize] {
        &self.high_scores
    }

    /// Advances the session by one frame. `keys` are the keys pressed since
    /// the previous frame.
    pub fn frame(&mut self, dt: f64, keys: &HashSet<KeyCode>) -> Result<()> {
        match self.state {
            GameState::Menu => {
                if confirmed(keys) {
                    self.start_round()?;
                }
            }
            GameState::Playing => self.play(dt, keys),
            GameState::GameOver => {
                if confirmed(keys) {
                    self.set_state(GameState::HighScore);
                }
            }
            GameState::HighScore => {
                if confirmed(keys) {
                    self.set_state(GameState::Menu);
                }
            }
        }
        Ok(())
    }

    pub fn start_round(&mut self) -> Result<()> {
        self.grid.clear();
        self.snake = Snake::new(
            &mut self.grid,
            0,
            0,
            self.bodypart_pre.clone(),
            self.config.snake.start_len,
            self.config.snake.speed,
            Controls::default(),
        )?;
        self.paused = false;
        self.won = false;
        self.place_apple();
        info!("round started, snake length {}", self.snake.len());
        self.set_state(GameState::Playing);
        Ok(())
    }

    fn play(&mut self, dt: f64, keys: &HashSet<KeyCode>) {
        if keys.contains(&KeyCode::Esc) {
            self.paused = !self.paused;
            debug!("paused: {}", self.paused);
        }
        if self.paused {
            return;
        }

        let (x, y) = self.snake.head();
        if self.snake.collides_with(&self.apple) {
            self.grid.pop_tile(self.apple.x, self.apple.y, Some(FOOD_TAG));
            if !self.place_apple() {
                self.won = true;
                self.game_over();
                return;
            }
        } else if self.bites_itself() || !self.bounds.contains((x, y)) {
            self.game_over();
            return;
        }

        self.snake.update(&mut self.grid, dt);
        self.snake.check_key_pressed(keys);
    }

    /// More than one body tile under the head, once the starting stack has
    /// begun to unroll.
    fn bites_itself(&self) -> bool {
        let head = self.snake.head();
        let still_stacked = self.snake.part_coords().iter().all(|c| *c == head);
        !still_stacked && self.grid.get_tiles(head.0, head.1, Some(SNAKE_TAG)).len() > 1
    }

    /// Moves the apple to a random free cell. False when the snake fills
    /// the whole board.
    fn place_apple(&mut self) -> bool {
        match self.free_cell() {
            Some((x, y)) => {
                self.apple.set_coords(x, y);
                self.grid.add_tile(self.apple.clone());
                debug!("apple placed at ({}, {})", x, y);
                true
            }
            None => false,
        }
    }

    fn free_cell(&mut self) -> Option<Cell> {
        let grid = &self.grid;
        let choices: Vec<Cell> = self
            .bounds
            .cells()
            .filter(|&(x, y)| grid.get_tiles(x, y, Some(SNAKE_TAG)).is_empty())
            .collect();
        choices.choose(&mut self.rng).copied()
    }

    fn game_over(&mut self) {
        self.last_score = self.score();
        self.high_scores.push(self.last_score);
        self.high_scores.sort_unstable_by(|a, b| b.cmp(a));
        self.high_scores.truncate(HIGH_SCORES_KEPT);
        self.grid.clear();
        info!("game over at {:?}, score {}, won: {}", self.snake.head(), self.last_score, self.won);
        self.set_state(GameState::GameOver);
    }

    fn set_state(&mut self, state: GameState) {
        debug!("{:?} -> {:?}", self.state, state);
        self.state = state;
    }

    pub fn render(&self, canvas: &mut dyn Canvas) {
        if self.state != GameState::Playing {
            return;
        }
        if self.config.show_grid {
            self.grid.draw_grid(canvas, self.config.grid_color);
        }
        self.grid.render_tiles(canvas);
    }

    /// Message box for the current state, if any.
    pub fn banner(&self) -> Option<Vec<String>> {
        let lines: Vec<String> = match self.state {
            GameState::Menu => vec![
                "Snake".into(),
                "".into(),
                "Arrow keys or WASD to move".into(),
                "Esc to pause".into(),
                "q or CTRL+C to quit".into(),
                "".into(),
                "Press Enter to begin".into(),
            ],
            GameState::Playing if self.paused => {
                vec!["Paused".into(), "Press Esc to resume".into(), "or q to quit".into()]
            }
            GameState::Playing => return None,
            GameState::GameOver => vec![
                String::from(if self.won { "You won!" } else { "Game over!" }),
                format!("Score: {}", self.last_score),
                "".into(),
                "Press Enter to continue".into(),
            ],
            GameState::HighScore => {
                let mut lines = vec!["High scores".to_string(), "".into()];
                lines.extend(self.high_scores.iter().enumerate().map(|(i, s)| format!("{}. {}", i + 1, s)));
                lines.push("".into());
                lines.push("Press Enter for the menu".into());
                lines
            }
        };
        Some(lines)
    }
}

fn confirmed(keys: &HashSet<KeyCode>) -> bool {
    keys.contains(&KeyCode::Enter) || keys.contains(&KeyCode::Char(' '))
}
