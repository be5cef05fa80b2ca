//! Grid engine: sliding, merging and terminal detection on a 4x4 board.
//!
//! Everything in here is a pure function of its inputs. `Grid` is a `Copy`
//! value, so a move always produces a fresh snapshot and the caller's grid is
//! left untouched.

use std::fmt;
use std::str::FromStr;

use crate::error::{GridError, ParseError};

// ============================================================================
// Configuration
// ============================================================================

pub const GRID_SIZE: usize = 4;
pub const DEFAULT_TARGET_TILE: u32 = 4096;
/// Largest tile a `u32` cell can hold. Two of these never merge.
pub const MAX_TILE: u32 = 1 << 31;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl FromStr for Direction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            _ => Err(ParseError::Direction(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// True for `0` (empty) and for powers of two from 2 up to [`MAX_TILE`].
pub fn is_valid_tile(value: u32) -> bool {
    value == 0 || (value >= 2 && value <= MAX_TILE && value.is_power_of_two())
}

/// Two tiles merge when they are equal, nonzero and below [`MAX_TILE`].
pub fn can_merge(a: u32, b: u32) -> bool {
    a == b && a != 0 && a < MAX_TILE
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Grid {
    cells: [[u32; GRID_SIZE]; GRID_SIZE],
}

impl Grid {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: [[u32; GRID_SIZE]; GRID_SIZE]) -> Result<Self, GridError> {
        for (row, line) in cells.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                if !is_valid_tile(value) {
                    return Err(GridError::InvalidTile { row, col, value });
                }
            }
        }
        Ok(Self { cells })
    }

    pub fn from_rows(rows: &[Vec<u32>]) -> Result<Self, GridError> {
        if rows.len() != GRID_SIZE {
            return Err(GridError::RowCount(rows.len()));
        }
        let mut cells = [[0; GRID_SIZE]; GRID_SIZE];
        for (row, line) in rows.iter().enumerate() {
            if line.len() != GRID_SIZE {
                return Err(GridError::RowLength { row, len: line.len() });
            }
            cells[row].copy_from_slice(line);
        }
        Self::from_cells(cells)
    }

    pub fn cells(&self) -> &[[u32; GRID_SIZE]; GRID_SIZE] {
        &self.cells
    }

    pub fn get(&self, pos: Position) -> u32 {
        self.cells[pos.row][pos.col]
    }

    /// Returns a copy of this grid with `value` written at `pos`.
    pub fn with_tile(&self, pos: Position, value: u32) -> Self {
        debug_assert!(is_valid_tile(value), "invalid tile value {value}");
        let mut next = *self;
        next.cells[pos.row][pos.col] = value;
        next
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Position> {
        positions().filter(|&pos| self.get(pos) == 0).collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(|&value| value != 0)
    }

    pub fn tile_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&value| value != 0).count()
    }

    pub fn max_tile(&self) -> u32 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn sum(&self) -> u64 {
        self.cells.iter().flatten().map(|&value| u64::from(value)).sum()
    }
}

/// Every position on the board in row-major order.
pub fn positions() -> impl Iterator<Item = Position> {
    (0..GRID_SIZE).flat_map(|row| (0..GRID_SIZE).map(move |col| Position::new(row, col)))
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let line: Vec<String> = row.iter().map(u32::to_string).collect();
            write!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// Parses whitespace-separated rows, one row per non-blank line.
impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.split_whitespace()
                    .map(|token| {
                        token
                            .parse::<u32>()
                            .map_err(|_| GridError::Token(token.to_string()))
                    })
                    .collect::<Result<Vec<u32>, GridError>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(&rows)
    }
}

/// Outcome of sliding one grid in one direction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MoveResult {
    pub grid: Grid,
    /// Sum of every tile created by a merge during this move.
    pub score_delta: u32,
    pub moved: bool,
    pub merged: Vec<Position>,
}

/// One line after compaction and merging, indexed from the leading edge.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LineShift {
    pub values: [u32; GRID_SIZE],
    pub merged: [bool; GRID_SIZE],
    pub score: u32,
}

// ============================================================================
// Move Computation
// ============================================================================

/// Compacts `line` toward index 0 and merges equal neighbours.
///
/// A tile produced by a merge is locked for the rest of the pass, so
/// `[2, 2, 2, 0]` becomes `[4, 2, 0, 0]` rather than `[8, 0, 0, 0]`.
/// Tiles at [`MAX_TILE`] only compact.
pub fn slide_line(line: [u32; GRID_SIZE]) -> LineShift {
    let mut values = [0; GRID_SIZE];
    let mut merged = [false; GRID_SIZE];
    let mut score = 0;
    let mut len = 0;

    for value in line.into_iter().filter(|&v| v != 0) {
        if len > 0 && !merged[len - 1] && can_merge(values[len - 1], value) {
            values[len - 1] = value * 2;
            merged[len - 1] = true;
            score = u32::saturating_add(score, value * 2);
        } else {
            values[len] = value;
            len += 1;
        }
    }

    LineShift {
        values,
        merged,
        score,
    }
}

/// Positions of line `index`, ordered from the edge tiles move toward.
pub fn line_positions(direction: Direction, index: usize) -> [Position; GRID_SIZE] {
    let last = GRID_SIZE - 1;
    std::array::from_fn(|step| match direction {
        Direction::Left => Position::new(index, step),
        Direction::Right => Position::new(index, last - step),
        Direction::Up => Position::new(step, index),
        Direction::Down => Position::new(last - step, index),
    })
}

pub fn apply_move(grid: &Grid, direction: Direction) -> MoveResult {
    let mut next = *grid;
    let mut score_delta = 0;
    let mut merged = Vec::new();

    for index in 0..GRID_SIZE {
        let line = line_positions(direction, index);
        let shift = slide_line(line.map(|pos| grid.get(pos)));

        for (step, pos) in line.into_iter().enumerate() {
            next.cells[pos.row][pos.col] = shift.values[step];
            if shift.merged[step] {
                merged.push(pos);
            }
        }
        score_delta = u32::saturating_add(score_delta, shift.score);
    }

    MoveResult {
        moved: next != *grid,
        grid: next,
        score_delta,
        merged,
    }
}

// ============================================================================
// Terminal Detection
// ============================================================================

/// True when the grid is full and no two orthogonal neighbours can merge.
pub fn is_terminal(grid: &Grid) -> bool {
    if !grid.is_full() {
        return false;
    }

    let cells = grid.cells();
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let value = cells[row][col];
            if col + 1 < GRID_SIZE && can_merge(value, cells[row][col + 1]) {
                return false;
            }
            if row + 1 < GRID_SIZE && can_merge(value, cells[row + 1][col]) {
                return false;
            }
        }
    }
    true
}

// ============================================================================
// Tests
// ============================================================================
