//! 2048 Game Engine
//!
//! A deterministic grid-state engine for the 2048 sliding-tile puzzle.
//! The rules live in pure functions over [`Grid`] (`compress`, `merge`,
//! `slide`, `can_move`, `spawn_random_tile`); [`GameState`] wraps one grid
//! together with the score, the game-over flag and its own random source.

use std::fmt;
use std::str::FromStr;

use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

// =============================================================================
// Section 1: Basic types and constants
// =============================================================================

/// Cell value: 0 for empty, otherwise a power of two >= 2
pub type Tile = u64;

/// Cumulative or per-move score
pub type Score = u64;

pub const DEFAULT_GRID_SIZE: usize = 4;
pub const MIN_GRID_SIZE: usize = 2;

/// log2 of the largest tile a `Tile` can hold
pub const MAX_TILE_EXPONENT: u32 = Tile::BITS - 1;

/// Probability that a spawned tile is a 2 (otherwise 4)
pub const SPAWN_TWO_PROBABILITY: f64 = 0.9;

/// Direction to slide/merge tiles.
///
/// Discriminants follow the RL action table (0=up, 1=down, 2=left, 3=right).
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Convert from u8 index to Direction
    pub fn from_index(idx: u8) -> Option<Direction> {
        match idx {
            0 => Some(Direction::Up),
            1 => Some(Direction::Down),
            2 => Some(Direction::Left),
            3 => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for Direction {
    type Error = EngineError;

    fn try_from(idx: u8) -> Result<Self, Self::Error> {
        Direction::from_index(idx).ok_or_else(|| EngineError::InvalidDirection(idx.to_string()))
    }
}

impl FromStr for Direction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(EngineError::InvalidDirection(s.to_string())),
        }
    }
}

/// Errors raised at the engine boundary for malformed input
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum EngineError {
    #[error("grid size must be at least 2, got {0}")]
    InvalidSize(usize),
    #[error("grid is not square: expected {expected} cells in row {row}, found {found}")]
    NotSquare {
        expected: usize,
        row: usize,
        found: usize,
    },
    #[error("cell ({row}, {col}) holds {value}, expected 0 or a power of two >= 2")]
    InvalidTile { row: usize, col: usize, value: Tile },
    #[error("invalid direction: {0:?}")]
    InvalidDirection(String),
}

// =============================================================================
// Section 2: Grid
// =============================================================================

/// Square matrix of tiles, stored row-major
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Tile>,
}

impl Grid {
    /// An all-empty `size × size` grid
    pub fn new(size: usize) -> Result<Self, EngineError> {
        if size < MIN_GRID_SIZE {
            return Err(EngineError::InvalidSize(size));
        }
        Ok(Grid {
            size,
            cells: vec![0; size * size],
        })
    }

    /// Build a grid from explicit rows, validating shape and tile values.
    pub fn from_rows<R: AsRef<[Tile]>>(rows: &[R]) -> Result<Self, EngineError> {
        let mut grid = Grid::new(rows.len())?;
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != grid.size {
                return Err(EngineError::NotSquare {
                    expected: grid.size,
                    row: r,
                    found: row.len(),
                });
            }
            for (c, &value) in row.iter().enumerate() {
                if value != 0 && (value < 2 || !value.is_power_of_two()) {
                    return Err(EngineError::InvalidTile { row: r, col: c, value });
                }
                grid.set(r, c, value);
            }
        }
        Ok(grid)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Tile {
        self.cells[row * self.size + col]
    }

    #[inline]
    fn set(&mut self, row: usize, col: usize, value: Tile) {
        self.cells[row * self.size + col] = value;
    }

    /// All cells in row-major order
    pub fn cells(&self) -> &[Tile] {
        &self.cells
    }

    fn row_mut(&mut self, row: usize) -> &mut [Tile] {
        &mut self.cells[row * self.size..(row + 1) * self.size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.cells.chunks(self.size)
    }

    pub fn to_rows(&self) -> Vec<Vec<Tile>> {
        self.rows().map(<[Tile]>::to_vec).collect()
    }

    /// Coordinates of every empty cell, row-major
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        (0..self.size)
            .flat_map(|r| (0..self.size).map(move |c| (r, c)))
            .filter(|&(r, c)| self.get(r, c) == 0)
            .collect()
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    /// Highest tile on the grid (0 if empty)
    pub fn highest_tile(&self) -> Tile {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Swap rows and columns
    pub fn transpose(&self) -> Grid {
        let mut out = self.clone();
        for r in 0..self.size {
            for c in 0..self.size {
                out.set(c, r, self.get(r, c));
            }
        }
        out
    }

    /// Reverse every row (left-right flip)
    pub fn mirror(&self) -> Grid {
        let mut out = self.clone();
        for r in 0..self.size {
            out.row_mut(r).reverse();
        }
        out
    }
}

// =============================================================================
// Section 3: Row operations (canonical left-move)
// =============================================================================

/// Slide non-zero tiles to the left edge, keeping their order.
pub fn compress(row: &mut [Tile]) {
    let mut write = 0;
    for read in 0..row.len() {
        if row[read] != 0 {
            row[write] = row[read];
            write += 1;
        }
    }
    for cell in &mut row[write..] {
        *cell = 0;
    }
}

/// Merge equal neighbours in one left-to-right pass over a compressed row.
///
/// The right tile of a merged pair is zeroed, so the doubled tile cannot pair
/// again within the same pass. Returns the score gained.
pub fn merge(row: &mut [Tile]) -> Score {
    let mut gain = 0;
    for i in 0..row.len().saturating_sub(1) {
        if row[i] != 0 && row[i] == row[i + 1] {
            row[i] *= 2;
            gain += row[i];
            row[i + 1] = 0;
        }
    }
    gain
}

/// Compress, merge, re-compress. Returns the score gained.
pub fn slide_row_left(row: &mut [Tile]) -> Score {
    compress(row);
    let gain = merge(row);
    compress(row);
    gain
}

// =============================================================================
// Section 4: Orientation and whole-grid moves
// =============================================================================

/// Reorient `grid` so that moving in `direction` becomes a left move.
pub fn orient(grid: &Grid, direction: Direction) -> Grid {
    match direction {
        Direction::Left => grid.clone(),
        Direction::Right => grid.mirror(),
        Direction::Up => grid.transpose(),
        Direction::Down => grid.transpose().mirror(),
    }
}

/// Inverse of [`orient`].
pub fn unorient(grid: &Grid, direction: Direction) -> Grid {
    match direction {
        Direction::Left => grid.clone(),
        Direction::Right => grid.mirror(),
        Direction::Up => grid.transpose(),
        Direction::Down => grid.mirror().transpose(),
    }
}

/// Result of sliding a grid (before any random spawn)
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MoveOutcome {
    pub grid: Grid,
    pub score_gain: Score,
    /// True iff `grid` differs from the grid the move started from
    pub moved: bool,
}

/// Slide/merge every line of `grid` towards `direction`. No random insert.
pub fn slide(grid: &Grid, direction: Direction) -> MoveOutcome {
    let mut work = orient(grid, direction);
    let mut score_gain = 0;
    for r in 0..work.size() {
        score_gain += slide_row_left(work.row_mut(r));
    }
    let result = unorient(&work, direction);
    let moved = result != *grid;
    MoveOutcome {
        grid: result,
        score_gain,
        moved,
    }
}

/// True if any move is still possible: an empty cell exists, or some
/// horizontally or vertically adjacent pair holds equal tiles.
pub fn can_move(grid: &Grid) -> bool {
    if grid.cells().contains(&0) {
        return true;
    }

    let n = grid.size();
    for r in 0..n {
        for c in 0..n {
            let value = grid.get(r, c);
            // Right neighbour
            if c + 1 < n && grid.get(r, c + 1) == value {
                return true;
            }
            // Neighbour below
            if r + 1 < n && grid.get(r + 1, c) == value {
                return true;
            }
        }
    }

    false
}

/// Place a 2 (90%) or 4 (10%) on a uniformly chosen empty cell.
///
/// Returns the placed `(row, col, value)`, or `None` when the grid is full.
pub fn spawn_random_tile(grid: &mut Grid, rng: &mut impl Rng) -> Option<(usize, usize, Tile)> {
    let empty = grid.empty_cells();
    if empty.is_empty() {
        return None;
    }

    let (row, col) = empty[rng.random_range(0..empty.len())];
    let value = if rng.random_bool(SPAWN_TWO_PROBABILITY) {
        2
    } else {
        4
    };
    grid.set(row, col, value);
    Some((row, col, value))
}

// =============================================================================
// Section 5: Game state
// =============================================================================

/// One game in progress: grid, cumulative score, terminal flag and the
/// random source used for spawns.
#[derive(Clone, Debug)]
pub struct GameState<R = StdRng> {
    grid: Grid,
    score: Score,
    game_over: bool,
    rng: R,
}

impl<R: Rng> GameState<R> {
    /// Start a new `size × size` game with two random tiles.
    pub fn new(size: usize, rng: R) -> Result<Self, EngineError> {
        let mut state = GameState {
            grid: Grid::new(size)?,
            score: 0,
            game_over: false,
            rng,
        };
        state.spawn();
        state.spawn();
        Ok(state)
    }

    pub fn with_default_size(rng: R) -> Result<Self, EngineError> {
        GameState::new(DEFAULT_GRID_SIZE, rng)
    }

    /// Resume from an existing grid with score 0. No tiles are added; the
    /// terminal flag is computed from the grid.
    pub fn from_grid(grid: Grid, rng: R) -> Self {
        let game_over = !can_move(&grid);
        GameState {
            grid,
            score: 0,
            game_over,
            rng,
        }
    }

    /// Slide in `direction`, then spawn one tile if anything changed.
    ///
    /// Returns false (and leaves the state untouched) if the game is already
    /// over or the move does not change the grid.
    pub fn apply_move(&mut self, direction: Direction) -> bool {
        if self.game_over {
            return false;
        }

        let outcome = slide(&self.grid, direction);
        if !outcome.moved {
            return false;
        }

        self.grid = outcome.grid;
        self.score += outcome.score_gain;
        self.spawn();

        if !can_move(&self.grid) {
            trace!(
                "game over after {direction}: score {}, highest tile {}",
                self.score,
                self.grid.highest_tile()
            );
            self.game_over = true;
        }

        true
    }

    fn spawn(&mut self) -> Option<(usize, usize, Tile)> {
        let placed = spawn_random_tile(&mut self.grid, &mut self.rng);
        if let Some((row, col, value)) = placed {
            trace!("spawned {value} at ({row}, {col})");
        }
        placed
    }
}

impl<R> GameState<R> {
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn highest_tile(&self) -> Tile {
        self.grid.highest_tile()
    }

    pub fn count_empty(&self) -> usize {
        self.grid.count_empty()
    }

    /// What `apply_move(direction)` would do, without spawning or mutating
    pub fn preview(&self, direction: Direction) -> MoveOutcome {
        slide(&self.grid, direction)
    }

    /// Which directions would change the grid, indexed like `Direction::ALL`.
    /// All false once the game is over.
    pub fn legal_moves(&self) -> [bool; 4] {
        if self.game_over {
            return [false; 4];
        }
        Direction::ALL.map(|d| slide(&self.grid, d).moved)
    }
}

/// Start a new game whose spawn RNG is seeded from `rng`.
pub fn new_game(size: usize, rng: &mut impl Rng) -> Result<GameState<StdRng>, EngineError> {
    GameState::new(size, StdRng::from_rng(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grid(rows: &[&[Tile]]) -> Grid {
        Grid::from_rows(rows).expect("valid test grid")
    }

    fn game_from(rows: &[&[Tile]], seed: u64) -> GameState {
        GameState::from_grid(grid(rows), StdRng::seed_from_u64(seed))
    }

    fn random_grid(size: usize, rng: &mut StdRng) -> Grid {
        let mut g = Grid::new(size).unwrap();
        for r in 0..size {
            for c in 0..size {
                if rng.random_bool(0.7) {
                    g.set(r, c, 1 << rng.random_range(1..6u32));
                }
            }
        }
        g
    }

    // =========================================================================
    // Construction
    // =========================================================================

    #[test]
    fn test_new_game_has_two_tiles() {
        let mut rng = StdRng::seed_from_u64(42);
        for size in [2, 3, 4, 6] {
            let state = new_game(size, &mut rng).unwrap();
            assert_eq!(state.size(), size);
            assert_eq!(state.score(), 0);
            assert!(!state.is_game_over());
            let tiles: Vec<Tile> = state
                .grid()
                .cells()
                .iter()
                .copied()
                .filter(|&v| v != 0)
                .collect();
            assert_eq!(tiles.len(), 2);
            assert!(tiles.iter().all(|&v| v == 2 || v == 4));
        }
    }

    #[test]
    fn test_default_size_is_four() {
        let state = GameState::with_default_size(StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(state.size(), DEFAULT_GRID_SIZE);
    }

    #[test]
    fn test_invalid_size_rejected() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(new_game(1, &mut rng).unwrap_err(), EngineError::InvalidSize(1));
        assert_eq!(new_game(0, &mut rng).unwrap_err(), EngineError::InvalidSize(0));
    }

    #[test]
    fn test_from_rows_validation() {
        let not_square: &[&[Tile]] = &[&[2, 4], &[8]];
        assert!(matches!(
            Grid::from_rows(not_square),
            Err(EngineError::NotSquare { row: 1, found: 1, .. })
        ));

        let bad_tile: &[&[Tile]] = &[&[2, 3], &[0, 0]];
        assert_eq!(
            Grid::from_rows(bad_tile).unwrap_err(),
            EngineError::InvalidTile { row: 0, col: 1, value: 3 }
        );

        let one: &[&[Tile]] = &[&[1, 0], &[0, 0]];
        assert!(Grid::from_rows(one).is_err());
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("RIGHT".parse::<Direction>().unwrap(), Direction::Right);
        assert!(matches!(
            "diagonal".parse::<Direction>(),
            Err(EngineError::InvalidDirection(_))
        ));
        assert_eq!(Direction::try_from(2).unwrap(), Direction::Left);
        assert!(Direction::try_from(4).is_err());
        for (i, d) in Direction::ALL.iter().enumerate() {
            assert_eq!(d.index(), i);
        }
    }

    // =========================================================================
    // Row operations
    // =========================================================================

    #[test]
    fn test_compress() {
        let mut row = [0, 2, 0, 4];
        compress(&mut row);
        assert_eq!(row, [2, 4, 0, 0]);

        let mut empty = [0; 4];
        compress(&mut empty);
        assert_eq!(empty, [0; 4]);

        let mut packed = [8, 2, 4, 2];
        compress(&mut packed);
        assert_eq!(packed, [8, 2, 4, 2]);
    }

    #[test]
    fn test_merge_once_per_move() {
        let mut row = [2, 2, 2, 0];
        let gain = slide_row_left(&mut row);
        assert_eq!(row, [4, 2, 0, 0]);
        assert_eq!(gain, 4);

        let mut row = [8, 8, 8];
        slide_row_left(&mut row);
        assert_eq!(row, [16, 8, 0]);
    }

    #[test]
    fn test_merged_tile_does_not_cascade() {
        // 2+2 makes 4, which must not then absorb the existing 4
        let mut row = [2, 2, 4, 0];
        let gain = slide_row_left(&mut row);
        assert_eq!(row, [4, 4, 0, 0]);
        assert_eq!(gain, 4);
    }

    #[test]
    fn test_two_pairs_in_one_row() {
        let mut row = [2, 2, 2, 2];
        assert_eq!(slide_row_left(&mut row), 8);
        assert_eq!(row, [4, 4, 0, 0]);

        let mut row = [2, 2, 4, 4];
        assert_eq!(slide_row_left(&mut row), 12);
        assert_eq!(row, [4, 8, 0, 0]);
    }

    #[test]
    fn test_merge_across_gaps() {
        let mut row = [2, 0, 0, 2];
        assert_eq!(slide_row_left(&mut row), 4);
        assert_eq!(row, [4, 0, 0, 0]);
    }

    // =========================================================================
    // Whole-grid moves
    // =========================================================================

    #[test]
    fn test_slide_each_direction() {
        let g = grid(&[&[2, 0, 2], &[0, 4, 0], &[2, 4, 8]]);

        let left = slide(&g, Direction::Left);
        assert_eq!(left.grid.to_rows(), vec![vec![4, 0, 0], vec![4, 0, 0], vec![2, 4, 8]]);
        assert_eq!(left.score_gain, 4);

        let right = slide(&g, Direction::Right);
        assert_eq!(right.grid.to_rows(), vec![vec![0, 0, 4], vec![0, 0, 4], vec![2, 4, 8]]);
        assert_eq!(right.score_gain, 4);

        let up = slide(&g, Direction::Up);
        assert_eq!(up.grid.to_rows(), vec![vec![4, 8, 2], vec![0, 0, 8], vec![0, 0, 0]]);
        assert_eq!(up.score_gain, 12);

        let down = slide(&g, Direction::Down);
        assert_eq!(down.grid.to_rows(), vec![vec![0, 0, 0], vec![0, 0, 2], vec![4, 8, 8]]);
        assert_eq!(down.score_gain, 12);
    }

    #[test]
    fn test_orient_roundtrip() {
        let mut rng = StdRng::seed_from_u64(7);
        let g = random_grid(5, &mut rng);
        for d in Direction::ALL {
            assert_eq!(unorient(&orient(&g, d), d), g, "{d}");
        }
    }

    #[test]
    fn test_directional_symmetry() {
        let mut rng = StdRng::seed_from_u64(2048);
        for _ in 0..200 {
            let g = random_grid(4, &mut rng);

            let up = slide(&g, Direction::Up);
            let via_left = slide(&g.transpose(), Direction::Left);
            assert_eq!(up.grid, via_left.grid.transpose());
            assert_eq!(up.score_gain, via_left.score_gain);

            let right = slide(&g, Direction::Right);
            let via_left = slide(&g.mirror(), Direction::Left);
            assert_eq!(right.grid, via_left.grid.mirror());
            assert_eq!(right.score_gain, via_left.score_gain);
        }
    }

    #[test]
    fn test_slide_preserves_tile_sum() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..100 {
            let g = random_grid(4, &mut rng);
            let before: Tile = g.cells().iter().sum();
            for d in Direction::ALL {
                let after: Tile = slide(&g, d).grid.cells().iter().sum();
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn test_no_op_move() {
        let mut state = game_from(&[&[2, 4], &[8, 16]], 42);
        let before = state.grid().clone();

        assert!(!state.apply_move(Direction::Left));
        assert_eq!(state.score(), 0);
        assert_eq!(state.grid(), &before);
    }

    #[test]
    fn test_no_op_move_does_not_spawn() {
        let mut state = game_from(&[&[2, 0, 0], &[4, 0, 0], &[0, 0, 0]], 42);
        assert!(!state.apply_move(Direction::Left));
        assert_eq!(state.count_empty(), 7);
        assert!(state.apply_move(Direction::Right));
        assert_eq!(state.count_empty(), 6);
    }

    #[test]
    fn test_score_accumulation() {
        let mut state = game_from(&[&[2, 2, 0, 0], &[0; 4], &[0; 4], &[0; 4]], 3);
        assert!(state.apply_move(Direction::Left));
        assert_eq!(state.score(), 4);
        assert_eq!(state.grid().get(0, 0), 4);

        let mut state = game_from(&[&[2, 2, 2, 2], &[0; 4], &[0; 4], &[0; 4]], 3);
        assert!(state.apply_move(Direction::Left));
        assert_eq!(state.score(), 8);
    }

    #[test]
    fn test_successful_move_spawns_exactly_one_tile() {
        let mut state = game_from(&[&[2, 2, 0, 0], &[0; 4], &[0; 4], &[4, 0, 0, 0]], 11);
        assert!(state.apply_move(Direction::Left));
        // 3 tiles became 2 after the merge, plus one spawn
        assert_eq!(16 - state.count_empty(), 3);
    }

    // =========================================================================
    // Spawning
    // =========================================================================

    #[test]
    fn test_spawn_distribution() {
        let mut rng = StdRng::seed_from_u64(12345);
        let trials = 10_000;
        let mut twos = 0;
        for _ in 0..trials {
            let mut g = Grid::new(4).unwrap();
            let (_, _, value) = spawn_random_tile(&mut g, &mut rng).unwrap();
            match value {
                2 => twos += 1,
                4 => {}
                other => panic!("unexpected spawn value {other}"),
            }
        }
        let ratio = twos as f64 / trials as f64;
        assert!((0.87..0.93).contains(&ratio), "ratio of twos was {ratio}");
    }

    #[test]
    fn test_spawn_lands_on_empty_cell() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..500 {
            let mut g = random_grid(4, &mut rng);
            let before = g.clone();
            match spawn_random_tile(&mut g, &mut rng) {
                Some((r, c, v)) => {
                    assert_eq!(before.get(r, c), 0);
                    assert_eq!(g.get(r, c), v);
                    assert_eq!(g.count_empty() + 1, before.count_empty());
                }
                None => assert_eq!(before.count_empty(), 0),
            }
        }
    }

    #[test]
    fn test_spawn_on_full_grid_is_noop() {
        let mut g = grid(&[&[2, 4], &[8, 16]]);
        let before = g.clone();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(spawn_random_tile(&mut g, &mut rng).is_none());
        assert_eq!(g, before);
    }

    #[test]
    fn test_seeded_games_are_reproducible() {
        let play = |seed: u64| {
            let mut state = GameState::with_default_size(StdRng::seed_from_u64(seed)).unwrap();
            for i in 0..200 {
                state.apply_move(Direction::ALL[i % 4]);
            }
            (state.grid().clone(), state.score())
        };
        assert_eq!(play(17), play(17));
    }

    // =========================================================================
    // Terminal detection
    // =========================================================================

    #[test]
    fn test_terminal_detection() {
        assert!(!can_move(&grid(&[&[2, 4], &[4, 2]])));
        assert!(game_from(&[&[2, 4], &[4, 2]], 0).is_game_over());

        assert!(can_move(&grid(&[&[2, 2], &[4, 8]])));
        assert!(!game_from(&[&[2, 2], &[4, 8]], 0).is_game_over());
    }

    #[test]
    fn test_terminal_checks_every_adjacent_pair() {
        // Only a vertical pair in the last column
        assert!(can_move(&grid(&[&[2, 4, 8], &[4, 8, 16], &[2, 4, 16]])));
        // Only a horizontal pair in the last row
        assert!(can_move(&grid(&[&[2, 4, 8], &[4, 8, 2], &[2, 16, 16]])));
        // Only a vertical pair in the first column
        assert!(can_move(&grid(&[&[2, 4, 8], &[16, 8, 2], &[16, 2, 4]])));
        // Checkerboard: nothing adjacent matches
        assert!(!can_move(&grid(&[&[2, 4, 2], &[4, 2, 4], &[2, 4, 2]])));
    }

    #[test]
    fn test_move_into_game_over() {
        // Moving down fills (0,0) with a 2 or 4; neither matches 16 or 8
        let mut state = game_from(&[&[8, 16], &[0, 32]], 9);
        assert!(state.apply_move(Direction::Down));
        assert_eq!(state.grid().get(1, 0), 8);
        assert!(state.is_game_over());
    }

    #[test]
    fn test_game_over_is_permanent() {
        let mut state = game_from(&[&[2, 4], &[4, 2]], 0);
        let before = state.grid().clone();
        for d in Direction::ALL {
            assert!(!state.apply_move(d));
        }
        assert!(state.is_game_over());
        assert_eq!(state.grid(), &before);
        assert_eq!(state.score(), 0);
        assert_eq!(state.legal_moves(), [false; 4]);
    }

    #[test]
    fn test_legal_moves_match_preview() {
        let state = game_from(&[&[2, 0, 0], &[4, 0, 0], &[8, 0, 0]], 0);
        assert_eq!(state.legal_moves(), [false, false, false, true]);
        for d in Direction::ALL {
            assert_eq!(state.legal_moves()[d.index()], state.preview(d).moved);
        }
    }

    #[test]
    fn test_random_play_terminates() {
        let mut rng = StdRng::seed_from_u64(777);
        let mut state = new_game(3, &mut rng).unwrap();
        let mut moves = 0;
        while !state.is_game_over() {
            let d = Direction::ALL[rng.random_range(0..4)];
            if state.apply_move(d) {
                moves += 1;
            }
            assert!(moves < 100_000);
        }
        assert!(!can_move(state.grid()));
    }
}
