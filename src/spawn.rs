//! New-tile placement. This is the only place the game consumes randomness,
//! and it does so through the [`TileSpawner`] trait so tests can script it.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::engine::{Grid, Position};
use crate::error::ParseError;

// ============================================================================
// Spawn Policy
// ============================================================================

/// Weighted distribution of the values a new tile can take.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SpawnPolicy {
    /// 2 (90%) or 4 (10%).
    #[default]
    Classic,
    /// 2 (70%), 4 (20%) or 8 (10%).
    Extended,
}

impl SpawnPolicy {
    /// `(value, weight)` pairs.
    pub fn weights(self) -> &'static [(u32, u32)] {
        match self {
            SpawnPolicy::Classic => &[(2, 9), (4, 1)],
            SpawnPolicy::Extended => &[(2, 7), (4, 2), (8, 1)],
        }
    }

    pub fn values(self) -> impl Iterator<Item = u32> {
        self.weights().iter().map(|&(value, _)| value)
    }

    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> u32 {
        let weights = self.weights();
        let total: u32 = weights.iter().map(|&(_, weight)| weight).sum();
        let mut roll = rng.gen_range(0..total);
        for &(value, weight) in weights {
            if roll < weight {
                return value;
            }
            roll -= weight;
        }
        weights[0].0
    }
}

impl FromStr for SpawnPolicy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(SpawnPolicy::Classic),
            "extended" => Ok(SpawnPolicy::Extended),
            _ => Err(ParseError::SpawnPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for SpawnPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnPolicy::Classic => f.write_str("classic"),
            SpawnPolicy::Extended => f.write_str("extended"),
        }
    }
}

// ============================================================================
// Tile Spawner Trait
// ============================================================================

pub trait TileSpawner {
    /// Picks an empty cell of `grid` and the value to put there.
    /// Returns `None` when the grid is full.
    fn spawn(&mut self, grid: &Grid) -> Option<(Position, u32)>;
}

pub struct RandomSpawner<R: Rng = StdRng> {
    rng: R,
    policy: SpawnPolicy,
}

impl RandomSpawner<StdRng> {
    pub fn new(policy: SpawnPolicy) -> Self {
        Self::with_rng(StdRng::from_entropy(), policy)
    }

    pub fn seeded(seed: u64, policy: SpawnPolicy) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), policy)
    }
}

impl<R: Rng> RandomSpawner<R> {
    pub fn with_rng(rng: R, policy: SpawnPolicy) -> Self {
        Self { rng, policy }
    }

    pub fn policy(&self) -> SpawnPolicy {
        self.policy
    }
}

impl<R: Rng> TileSpawner for RandomSpawner<R> {
    fn spawn(&mut self, grid: &Grid) -> Option<(Position, u32)> {
        let empty = grid.empty_cells();
        let &pos = empty.choose(&mut self.rng)?;
        Some((pos, self.policy.sample(&mut self.rng)))
    }
}

/// Deterministic spawner: cycles through `values` and always fills the first
/// empty cell in row-major order.
pub struct SequenceSpawner {
    values: Vec<u32>,
    index: usize,
}

impl SequenceSpawner {
    pub fn new(values: Vec<u32>) -> Self {
        assert!(!values.is_empty(), "sequence spawner needs at least one value");
        Self { values, index: 0 }
    }

    /// Number of tiles handed out so far.
    pub fn spawned(&self) -> usize {
        self.index
    }
}

impl TileSpawner for SequenceSpawner {
    fn spawn(&mut self, grid: &Grid) -> Option<(Position, u32)> {
        let pos = grid.empty_cells().into_iter().next()?;
        let value = self.values[self.index % self.values.len()];
        self.index += 1;
        Some((pos, value))
    }
}

// ============================================================================
// Placement
// ============================================================================

/// Places one new tile on a copy of `grid`. A full grid comes back unchanged
/// with no position.
pub fn place_random_tile(grid: &Grid, spawner: &mut dyn TileSpawner) -> (Grid, Option<Position>) {
    match spawner.spawn(grid) {
        Some((pos, value)) => {
            debug_assert_eq!(grid.get(pos), 0, "spawner picked an occupied cell");
            (grid.with_tile(pos, value), Some(pos))
        }
        None => (*grid, None),
    }
}
