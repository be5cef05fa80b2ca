//! Tests for the grid engine
//!
//! Test categories:
//! - Compaction and merging along a single line
//! - Whole-grid moves and score accounting
//! - Direction symmetry
//! - Terminal detection
//! - Grid construction and parsing

use tiles4096::engine::{
    apply_move, is_terminal, line_positions, slide_line, Direction, Grid, Position, GRID_SIZE,
    MAX_TILE,
};
use tiles4096::error::{GridError, ParseError};
use tiles4096::game::test_helpers::*;

/// Every line over `alphabet`, written from the leading edge.
fn all_lines(alphabet: &[u32]) -> Vec<[u32; GRID_SIZE]> {
    let mut lines = Vec::new();
    for &a in alphabet {
        for &b in alphabet {
            for &c in alphabet {
                for &d in alphabet {
                    lines.push([a, b, c, d]);
                }
            }
        }
    }
    lines
}

/// Grid with `line` written into line 1 for `direction`, leading edge first.
fn grid_with_line(direction: Direction, line: [u32; GRID_SIZE]) -> Grid {
    line_positions(direction, 1)
        .into_iter()
        .zip(line)
        .fold(Grid::empty(), |grid, (pos, value)| grid.with_tile(pos, value))
}

fn read_line(grid: &Grid, direction: Direction) -> [u32; GRID_SIZE] {
    line_positions(direction, 1).map(|pos| grid.get(pos))
}

fn transpose(grid: &Grid) -> Grid {
    let cells = grid.cells();
    grid_from(std::array::from_fn(|row| std::array::from_fn(|col| cells[col][row])))
}

fn mirror(grid: &Grid) -> Grid {
    let cells = grid.cells();
    grid_from(std::array::from_fn(|row| {
        std::array::from_fn(|col| cells[row][GRID_SIZE - 1 - col])
    }))
}

fn grid_from(cells: [[u32; GRID_SIZE]; GRID_SIZE]) -> Grid {
    grid(cells)
}

// ============================================================================
// Line Tests
// ============================================================================

mod line {
    use super::*;

    #[test]
    fn distinct_tiles_keep_order_and_close_gaps() {
        for line in all_lines(&[0, 2, 4, 8]) {
            let tiles: Vec<u32> = line.iter().copied().filter(|&v| v != 0).collect();
            let mut unique = tiles.clone();
            unique.sort_unstable();
            unique.dedup();
            if unique.len() != tiles.len() {
                continue;
            }

            for direction in Direction::ALL {
                let result = apply_move(&grid_with_line(direction, line), direction);
                let mut expected = [0; GRID_SIZE];
                expected[..tiles.len()].copy_from_slice(&tiles);
                assert_eq!(read_line(&result.grid, direction), expected, "{line:?} {direction}");
                assert_eq!(result.score_delta, 0);
            }
        }
    }

    #[test]
    fn no_gap_before_any_tile() {
        for line in all_lines(&[0, 2, 4]) {
            let shift = slide_line(line);
            let first_empty = shift.values.iter().position(|&v| v == 0).unwrap_or(GRID_SIZE);
            assert!(
                shift.values[first_empty..].iter().all(|&v| v == 0),
                "{line:?} -> {:?}",
                shift.values
            );
        }
    }

    #[test]
    fn tile_sum_is_conserved() {
        for line in all_lines(&[0, 2, 4]) {
            let shift = slide_line(line);
            assert_eq!(
                shift.values.iter().sum::<u32>(),
                line.iter().sum::<u32>(),
                "{line:?}"
            );
        }
    }

    #[test]
    fn triple_merges_only_once() {
        let shift = slide_line([2, 2, 2, 0]);
        assert_eq!(shift.values, [4, 2, 0, 0]);
        assert_eq!(shift.score, 4);
    }

    #[test]
    fn four_equal_tiles_make_two_pairs() {
        let shift = slide_line([2, 2, 2, 2]);
        assert_eq!(shift.values, [4, 4, 0, 0]);
        assert_eq!(shift.merged, [true, true, false, false]);
        assert_eq!(shift.score, 8);
    }

    #[test]
    fn merged_tile_does_not_cascade() {
        assert_eq!(slide_line([2, 2, 4, 0]).values, [4, 4, 0, 0]);
        assert_eq!(slide_line([4, 4, 8, 8]).values, [8, 16, 0, 0]);
    }

    #[test]
    fn single_tile_only_compacts() {
        let shift = slide_line([0, 0, 0, 8]);
        assert_eq!(shift.values, [8, 0, 0, 0]);
        assert_eq!(shift.merged, [false; GRID_SIZE]);
        assert_eq!(shift.score, 0);
    }

    #[test]
    fn merges_across_gaps() {
        assert_eq!(slide_line([2, 0, 0, 2]).values, [4, 0, 0, 0]);
    }

    #[test]
    fn max_tiles_only_compact() {
        let shift = slide_line([0, MAX_TILE, 0, MAX_TILE]);
        assert_eq!(shift.values, [MAX_TILE, MAX_TILE, 0, 0]);
        assert_eq!(shift.merged, [false; GRID_SIZE]);
        assert_eq!(shift.score, 0);
    }

    #[test]
    fn merging_up_to_the_ceiling_saturates_score() {
        let half = MAX_TILE / 2;
        let shift = slide_line([half; GRID_SIZE]);
        assert_eq!(shift.values, [MAX_TILE, MAX_TILE, 0, 0]);
        assert_eq!(shift.merged, [true, true, false, false]);
        assert_eq!(shift.score, u32::MAX);
    }
}

// ============================================================================
// Grid Move Tests
// ============================================================================

mod grid_moves {
    use super::*;

    #[test]
    fn round_trip_left_example() {
        let start: Grid = "2 0 0 2\n0 0 0 0\n0 0 0 0\n0 0 0 0".parse().unwrap();
        let result = apply_move(&start, Direction::Left);

        assert_eq!(
            result.grid,
            grid([[4, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]])
        );
        assert_eq!(result.score_delta, 4);
        assert!(result.moved);
        assert_eq!(result.merged, vec![Position::new(0, 0)]);
    }

    #[test]
    fn triple_in_a_row_moving_right() {
        let start = grid([[0, 2, 2, 2], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let result = apply_move(&start, Direction::Right);

        assert_eq!(result.grid.cells()[0], [0, 0, 2, 4]);
        assert_eq!(result.merged, vec![Position::new(0, 3)]);
        assert_eq!(result.score_delta, 4);
    }

    #[test]
    fn score_delta_is_sum_of_merged_tiles() {
        let start = grid([[2, 2, 4, 4], [0, 0, 0, 0], [2, 0, 2, 0], [8, 8, 8, 8]]);

        for direction in Direction::ALL {
            let result = apply_move(&start, direction);
            let merged_sum: u32 = result.merged.iter().map(|&pos| result.grid.get(pos)).sum();
            assert_eq!(result.score_delta, merged_sum, "{direction}");
        }
    }

    #[test]
    fn horizontal_moves_score_the_same() {
        let start = grid([[2, 2, 4, 4], [0, 0, 0, 0], [2, 0, 2, 0], [8, 8, 8, 8]]);

        assert_eq!(apply_move(&start, Direction::Left).score_delta, 48);
        assert_eq!(apply_move(&start, Direction::Right).score_delta, 48);
    }

    #[test]
    fn blocked_move_is_a_no_op() {
        let start = grid([[2, 4, 8, 16], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let result = apply_move(&start, Direction::Left);

        assert!(!result.moved);
        assert_eq!(result.grid, start);
        assert_eq!(result.score_delta, 0);
        assert!(result.merged.is_empty());
    }

    #[test]
    fn empty_grid_never_moves() {
        for direction in Direction::ALL {
            assert!(!apply_move(&Grid::empty(), direction).moved);
        }
    }

    #[test]
    fn input_grid_is_untouched() {
        let start = grid([[2, 2, 0, 0], [0, 4, 0, 4], [0, 0, 0, 0], [8, 0, 0, 8]]);
        let copy = start;

        let _ = apply_move(&start, Direction::Down);

        assert_eq!(start, copy);
    }

    #[test]
    fn merges_happen_in_every_line() {
        let start = grid([[2, 2, 0, 0], [4, 0, 4, 0], [0, 8, 0, 8], [16, 0, 0, 16]]);
        let result = apply_move(&start, Direction::Left);

        assert_eq!(
            result.grid,
            grid([[4, 0, 0, 0], [8, 0, 0, 0], [16, 0, 0, 0], [32, 0, 0, 0]])
        );
        assert_eq!(result.merged.len(), 4);
        assert_eq!(result.score_delta, 4 + 8 + 16 + 32);
    }
}

// ============================================================================
// Direction Symmetry Tests
// ============================================================================

mod symmetry {
    use super::*;

    fn sample() -> Grid {
        grid([[2, 0, 2, 4], [0, 4, 4, 4], [8, 0, 0, 8], [2, 2, 2, 0]])
    }

    #[test]
    fn single_tile_reaches_each_edge() {
        let start = Grid::empty().with_tile(Position::new(1, 2), 2);

        let up = apply_move(&start, Direction::Up);
        assert_eq!(up.grid.get(Position::new(0, 2)), 2);

        let down = apply_move(&up.grid, Direction::Down);
        assert!(down.moved);
        assert_eq!(down.grid.get(Position::new(3, 2)), 2);
        assert_eq!(down.grid.tile_count(), 1);

        let left = apply_move(&start, Direction::Left);
        assert_eq!(left.grid.get(Position::new(1, 0)), 2);

        let right = apply_move(&left.grid, Direction::Right);
        assert_eq!(right.grid.get(Position::new(1, 3)), 2);
    }

    #[test]
    fn up_is_transposed_left() {
        let grid = sample();
        let up = apply_move(&grid, Direction::Up);
        let left = apply_move(&transpose(&grid), Direction::Left);

        assert_eq!(transpose(&left.grid), up.grid);
        assert_eq!(left.score_delta, up.score_delta);
    }

    #[test]
    fn down_is_transposed_right() {
        let grid = sample();
        let down = apply_move(&grid, Direction::Down);
        let right = apply_move(&transpose(&grid), Direction::Right);

        assert_eq!(transpose(&right.grid), down.grid);
        assert_eq!(right.score_delta, down.score_delta);
    }

    #[test]
    fn right_is_mirrored_left() {
        let grid = sample();
        let right = apply_move(&grid, Direction::Right);
        let left = apply_move(&mirror(&grid), Direction::Left);

        assert_eq!(mirror(&left.grid), right.grid);
        assert_eq!(left.score_delta, right.score_delta);
    }

    #[test]
    fn opposite_directions_pair_up() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_ne!(direction.opposite(), direction);
        }
    }
}

// ============================================================================
// Terminal Detection Tests
// ============================================================================

mod terminal {
    use super::*;

    #[test]
    fn checkerboard_is_terminal() {
        assert!(is_terminal(&checkerboard()));
    }

    #[test]
    fn checkerboard_with_a_hole_is_not_terminal() {
        let grid = checkerboard().with_tile(Position::new(2, 1), 0);
        assert!(!is_terminal(&grid));
    }

    #[test]
    fn full_grid_with_equal_neighbours_is_not_terminal() {
        let horizontal = checkerboard().with_tile(Position::new(0, 0), 4);
        assert!(horizontal.is_full());
        assert!(!is_terminal(&horizontal));

        let vertical = checkerboard().with_tile(Position::new(3, 3), 4);
        assert!(!is_terminal(&vertical));
    }

    #[test]
    fn terminal_grid_cannot_move() {
        let grid = checkerboard();
        for direction in Direction::ALL {
            assert!(!apply_move(&grid, direction).moved);
        }
    }

    #[test]
    fn empty_grid_is_not_terminal() {
        assert!(!is_terminal(&Grid::empty()));
    }

    #[test]
    fn board_of_max_tiles_is_terminal() {
        let grid = grid_from([[MAX_TILE; GRID_SIZE]; GRID_SIZE]);
        assert!(is_terminal(&grid));
        for direction in Direction::ALL {
            assert!(!apply_move(&grid, direction).moved);
        }
    }
}

// ============================================================================
// Construction Tests
// ============================================================================

mod construction {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let text = "2 0 0 2\n0 4 0 0\n0 0 8 0\n0 0 0 4096";
        let grid: Grid = text.parse().unwrap();

        assert_eq!(grid.get(Position::new(3, 3)), 4096);
        assert_eq!(grid.to_string(), text);
    }

    #[test]
    fn rejects_wrong_row_count() {
        let err = "2 0 0 2\n0 0 0 0".parse::<Grid>().unwrap_err();
        assert_eq!(err, GridError::RowCount(2));
    }

    #[test]
    fn rejects_short_row() {
        let rows = vec![vec![0; 4], vec![0; 3], vec![0; 4], vec![0; 4]];
        assert_eq!(
            Grid::from_rows(&rows).unwrap_err(),
            GridError::RowLength { row: 1, len: 3 }
        );
    }

    #[test]
    fn rejects_non_power_of_two() {
        let err = "2 0 0 3\n0 0 0 0\n0 0 0 0\n0 0 0 0".parse::<Grid>().unwrap_err();
        assert_eq!(
            err,
            GridError::InvalidTile {
                row: 0,
                col: 3,
                value: 3
            }
        );
    }

    #[test]
    fn rejects_one() {
        assert!(Grid::from_cells([[1, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
    }

    #[test]
    fn rejects_garbage_token() {
        let err = "2 0 x 0\n0 0 0 0\n0 0 0 0\n0 0 0 0".parse::<Grid>().unwrap_err();
        assert_eq!(err, GridError::Token("x".to_string()));
    }

    #[test]
    fn parses_directions() {
        assert_eq!("UP".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!(" left ".parse::<Direction>().unwrap(), Direction::Left);
        assert_eq!(
            "north".parse::<Direction>().unwrap_err(),
            ParseError::Direction("north".to_string())
        );
    }

    #[test]
    fn grid_queries() {
        let grid = grid([[2, 0, 0, 2], [0, 0, 0, 0], [0, 0, 64, 0], [0, 0, 0, 0]]);

        assert_eq!(grid.tile_count(), 3);
        assert_eq!(grid.max_tile(), 64);
        assert_eq!(grid.sum(), 68);
        assert_eq!(grid.empty_cells().len(), 13);
        assert_eq!(grid.empty_cells()[0], Position::new(0, 1));
        assert!(!grid.is_full());
    }

    #[test]
    fn max_tiles_are_accepted_and_kept() {
        let grid = Grid::from_cells([[MAX_TILE, MAX_TILE, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        assert_eq!(grid.sum(), 2 * u64::from(MAX_TILE));

        let left = apply_move(&grid, Direction::Left);
        assert!(!left.moved);
        assert_eq!(left.grid, grid);

        let right = apply_move(&grid, Direction::Right);
        assert!(right.moved);
        assert_eq!(right.score_delta, 0);
        assert_eq!(right.grid.cells()[0], [0, 0, MAX_TILE, MAX_TILE]);
    }
}
