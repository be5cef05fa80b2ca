use log::{debug, info};

use crate::engine::{self, Direction, Grid, Position, DEFAULT_TARGET_TILE};
use crate::error::ConfigError;
use crate::spawn::{self, RandomSpawner, SpawnPolicy, TileSpawner};

// ============================================================================
// Configuration
// ============================================================================

pub const STARTING_TILES: usize = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GameConfig {
    pub target_tile: u32,
    pub spawn_policy: SpawnPolicy,
}

impl GameConfig {
    pub fn new(target_tile: u32, spawn_policy: SpawnPolicy) -> Result<Self, ConfigError> {
        if target_tile < 4 || !target_tile.is_power_of_two() {
            return Err(ConfigError::InvalidTarget(target_tile));
        }
        Ok(Self {
            target_tile,
            spawn_policy,
        })
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            target_tile: DEFAULT_TARGET_TILE,
            spawn_policy: SpawnPolicy::default(),
        }
    }
}

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameStatus {
    NotStarted,
    InProgress,
    GameOver,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    GameStarted,
    TilesMoved { score_delta: u32 },
    TilesMerged(usize),
    TileSpawned { position: Position, value: u32 },
    NewBestScore(u32),
    TargetReached(u32),
    GameOver,
}

/// Everything a renderer needs after one move.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Turn {
    pub grid: Grid,
    pub score: u32,
    pub best_score: u32,
    pub status: GameStatus,
    pub moved: bool,
    pub merged: Vec<Position>,
    /// The tile placed after the move, if the move changed the grid.
    pub spawned: Option<Position>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Snapshot {
    pub grid: Grid,
    pub score: u32,
    pub best_score: u32,
    pub status: GameStatus,
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    grid: Grid,
    score: u32,
    best_score: u32,
    status: GameStatus,
    target_reached: bool,
    config: GameConfig,
    spawner: Box<dyn TileSpawner>,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(config: GameConfig, spawner: Box<dyn TileSpawner>) -> Self {
        Self {
            grid: Grid::empty(),
            score: 0,
            best_score: 0,
            status: GameStatus::NotStarted,
            target_reached: false,
            config,
            spawner,
            events: Vec::new(),
        }
    }

    /// Entropy-seeded spawner drawing from `config.spawn_policy`.
    pub fn with_config(config: GameConfig) -> Self {
        Self::new(config, Box::new(RandomSpawner::new(config.spawn_policy)))
    }

    /// A game already in progress on `grid`, for scripted scenarios.
    pub fn with_grid(grid: Grid, config: GameConfig, spawner: Box<dyn TileSpawner>) -> Self {
        let mut game = Self::new(config, spawner);
        game.grid = grid;
        game.status = if engine::is_terminal(&grid) {
            GameStatus::GameOver
        } else {
            GameStatus::InProgress
        };
        game.target_reached = grid.max_tile() >= config.target_tile;
        game
    }

    pub fn with_best_score(mut self, best_score: u32) -> Self {
        self.best_score = best_score;
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    pub fn target_reached(&self) -> bool {
        self.target_reached
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid,
            score: self.score,
            best_score: self.best_score,
            status: self.status,
        }
    }

    /// Events the caller has not drained yet stay queued ahead of
    /// `GameStarted`.
    pub fn start(&mut self) -> Snapshot {
        self.events.push(GameEvent::GameStarted);

        let mut grid = Grid::empty();
        for _ in 0..STARTING_TILES {
            let (next, spawned) = spawn::place_random_tile(&grid, self.spawner.as_mut());
            if let Some(pos) = spawned {
                self.events.push(GameEvent::TileSpawned {
                    position: pos,
                    value: next.get(pos),
                });
            }
            grid = next;
        }

        self.grid = grid;
        self.score = 0;
        self.status = GameStatus::InProgress;
        self.target_reached = false;
        info!("new game started (target {})", self.config.target_tile);

        self.snapshot()
    }

    /// Abandons the current game, whatever its status, and starts a new one.
    pub fn restart(&mut self) -> Snapshot {
        self.start()
    }

    /// Slides the board. Does nothing unless the game is in progress or when
    /// the move cannot change the grid.
    pub fn make_move(&mut self, direction: Direction) -> Turn {
        if self.status != GameStatus::InProgress {
            return self.idle_turn();
        }

        let result = engine::apply_move(&self.grid, direction);
        if !result.moved {
            return self.idle_turn();
        }

        debug_assert!(
            !result.grid.is_full(),
            "a grid-changing move must leave an empty cell"
        );
        let (grid, spawned) = spawn::place_random_tile(&result.grid, self.spawner.as_mut());
        let score = self.score.saturating_add(result.score_delta);
        let over = engine::is_terminal(&grid);

        // Commit.
        self.grid = grid;
        self.score = score;
        self.events.push(GameEvent::TilesMoved {
            score_delta: result.score_delta,
        });
        if !result.merged.is_empty() {
            self.events.push(GameEvent::TilesMerged(result.merged.len()));
        }
        if let Some(pos) = spawned {
            self.events.push(GameEvent::TileSpawned {
                position: pos,
                value: grid.get(pos),
            });
        }
        if score > self.best_score {
            self.best_score = score;
            self.events.push(GameEvent::NewBestScore(score));
        }
        if !self.target_reached && result.grid.max_tile() >= self.config.target_tile {
            self.target_reached = true;
            self.events.push(GameEvent::TargetReached(self.config.target_tile));
            info!("reached target tile {}", self.config.target_tile);
        }
        debug!(
            "moved {direction}: +{} (score {score}), {} merge(s)",
            result.score_delta,
            result.merged.len()
        );
        if over {
            self.status = GameStatus::GameOver;
            self.events.push(GameEvent::GameOver);
            info!("game over with score {score}");
        }

        Turn {
            grid,
            score,
            best_score: self.best_score,
            status: self.status,
            moved: true,
            merged: result.merged,
            spawned,
        }
    }

    fn idle_turn(&self) -> Turn {
        Turn {
            grid: self.grid,
            score: self.score,
            best_score: self.best_score,
            status: self.status,
            moved: false,
            merged: Vec::new(),
            spawned: None,
        }
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::with_config(GameConfig::default())
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::spawn::SequenceSpawner;

    pub fn grid(rows: [[u32; 4]; 4]) -> Grid {
        match Grid::from_cells(rows) {
            Ok(grid) => grid,
            Err(err) => panic!("bad test grid: {err}"),
        }
    }

    /// Full board with no equal neighbours.
    pub fn checkerboard() -> Grid {
        grid([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]])
    }

    pub fn scripted_game(start: Grid, values: Vec<u32>) -> Game {
        Game::with_grid(
            start,
            GameConfig::default(),
            Box::new(SequenceSpawner::new(values)),
        )
    }
}
