//! Feature extraction: GameState → Observation
//!
//! Tile values grow exponentially, so observations carry log2 of each tile
//! (empty cells encode as 0), giving a roughly linear range for numeric
//! consumers.

use twenty48_engine::{GameState, Tile, MAX_TILE_EXPONENT};

use super::{Observation, ObservationSpace};

/// Converts a GameState into a fixed-shape array observation.
pub trait FeatureExtractor: Clone {
    /// Shape of every observation produced by encode()
    fn obs_shape(&self) -> Vec<usize>;

    /// Returns the length of the flattened observation.
    fn obs_size(&self) -> usize {
        self.obs_shape().iter().product()
    }

    /// Bounds of every observation produced by encode()
    fn observation_space(&self) -> ObservationSpace;

    /// Encode the state into an array of shape obs_shape().
    ///
    /// Requirements:
    /// - Deterministic given the state.
    /// - No side effects or internal randomness.
    fn encode<R>(&self, state: &GameState<R>) -> Observation;
}

/// log2 of a tile, with 0 for an empty cell
#[inline]
pub fn log2_tile(tile: Tile) -> f32 {
    if tile == 0 {
        0.0
    } else {
        // Tiles are powers of two
        tile.trailing_zeros() as f32
    }
}

/// `size × size` grid of log2 tile values
#[derive(Clone, Debug)]
pub struct Log2FeatureExtractor {
    grid_size: usize,
}

impl Log2FeatureExtractor {
    pub fn new(grid_size: usize) -> Self {
        Self { grid_size }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }
}

impl FeatureExtractor for Log2FeatureExtractor {
    fn obs_shape(&self) -> Vec<usize> {
        vec![self.grid_size, self.grid_size]
    }

    fn observation_space(&self) -> ObservationSpace {
        ObservationSpace {
            shape: self.obs_shape(),
            low: 0.0,
            high: MAX_TILE_EXPONENT as f32,
        }
    }

    fn encode<R>(&self, state: &GameState<R>) -> Observation {
        debug_assert_eq!(state.size(), self.grid_size);
        let features: Vec<f32> = state.grid().cells().iter().map(|&t| log2_tile(t)).collect();
        Observation::from_slice(&features, &self.obs_shape())
    }
}
