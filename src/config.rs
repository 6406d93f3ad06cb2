use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::snake::{Cell, Direction};

/// Where the snake starts every round, head first.
pub const INITIAL_SNAKE: [Cell; 3] = [Cell::new(5, 10), Cell::new(4, 10), Cell::new(3, 10)];
pub const INITIAL_DIRECTION: Direction = Direction::Right;

/// Key under which the best score is persisted.
pub const HIGH_SCORE_KEY: &str = "snakeHighScore";

/// Configuration for the game surface and timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Surface width in pixels
    pub canvas_width: u32,
    /// Surface height in pixels
    pub canvas_height: u32,
    /// Pixels per grid cell
    pub grid_size: u32,
    /// Milliseconds per tick
    pub game_speed_ms: u64,
    /// Points awarded per food eaten
    pub food_score: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_width: 400,
            canvas_height: 400,
            grid_size: 20,
            game_speed_ms: 100,
            food_score: 10,
        }
    }
}

impl GameConfig {
    /// Load a config from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn grid_width(&self) -> i32 {
        (self.canvas_width / self.grid_size.max(1)) as i32
    }

    pub fn grid_height(&self) -> i32 {
        (self.canvas_height / self.grid_size.max(1)) as i32
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.game_speed_ms)
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.grid_width() && cell.y >= 0 && cell.y < self.grid_height()
    }

    /// The fixed starting snake has to fit on the grid with room for food.
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            bail!("grid_size must be positive");
        }
        if self.game_speed_ms == 0 {
            bail!("game_speed_ms must be positive");
        }
        if !INITIAL_SNAKE.iter().all(|c| self.in_bounds(*c)) {
            bail!(
                "a {}x{} grid is too small for the starting snake",
                self.grid_width(),
                self.grid_height()
            );
        }
        Ok(())
    }
}
