use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use tile_snake::config::GameConfig;
use tile_snake::game::SnakeGame;

#[derive(Parser)]
#[command(name = "tile-snake")]
#[command(version, about = "Snake on a sparse tile grid, played in the terminal")]
struct Cli {
    /// RON file with game settings; unset fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Snake speed in cells per second
    #[arg(long)]
    speed: Option<f64>,

    /// Initial snake length
    #[arg(long)]
    start_len: Option<usize>,

    /// Frame rate cap
    #[arg(long)]
    fps: Option<f64>,

    /// Tile width in terminal columns
    #[arg(long)]
    tile_width: Option<u16>,

    /// Tile height in terminal rows
    #[arg(long)]
    tile_height: Option<u16>,

    /// Seed for apple placement
    #[arg(long)]
    seed: Option<u64>,

    /// Draw grid lines behind the tiles
    #[arg(long)]
    show_grid: bool,

    /// Print the effective settings as RON and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => GameConfig::default(),
        };

        if let Some(speed) = self.speed {
            config.snake.speed = speed;
        }
        if let Some(start_len) = self.start_len {
            config.snake.start_len = start_len;
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if let Some(tile_width) = self.tile_width {
            config.tile_width = tile_width;
        }
        if let Some(tile_height) = self.tile_height {
            config.tile_height = tile_height;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.show_grid |= self.show_grid;

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Logs go to stderr; redirect it while playing, e.g. `2>snake.log`.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = cli.game_config()?;

    if cli.print_config {
        println!("{}", config.to_ron()?);
        return Ok(());
    }

    let mut game = SnakeGame::new(config);
    game.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from(["tile-snake", "--speed", "4", "--start-len", "3", "--seed", "9", "--show-grid"]);
        let config = cli.game_config().unwrap();

        assert_eq!(config.snake.speed, 4.0);
        assert_eq!(config.snake.start_len, 3);
        assert_eq!(config.seed, Some(9));
        assert!(config.show_grid);
        assert_eq!(config.fps, 60.0);
    }

    #[test]
    fn test_invalid_flags_rejected() {
        let cli = Cli::parse_from(["tile-snake", "--speed", "0"]);
        assert!(cli.game_config().is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let cli = Cli::parse_from(["tile-snake", "--config", "/nonexistent/snake.ron"]);
        assert!(cli.game_config().is_err());
    }
}
