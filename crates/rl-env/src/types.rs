//! Core RL types for the 2048 environment

use std::collections::HashMap;

use serde::Deserialize;
use twenty48_engine::{GameState, DEFAULT_GRID_SIZE};

use super::ACTION_SPACE_SIZE;

/// Discrete action identifier (0..ACTION_SPACE_SIZE-1)
pub type ActionId = u8;

/// Reward value (float)
pub type Reward = f32;

/// Penalty returned for an action that leaves the grid unchanged
pub const INVALID_MOVE_PENALTY: Reward = -50.0;

/// Dense f32 array with an explicit shape
#[derive(Clone, Debug, PartialEq)]
pub struct SimpleArray {
    data: Vec<f32>,
    shape: Vec<usize>,
}

impl SimpleArray {
    /// Create a new array from a slice with the given shape
    pub fn from_slice(data: &[f32], shape: &[usize]) -> Self {
        let expected_len: usize = shape.iter().product();
        assert_eq!(
            data.len(),
            expected_len,
            "Data length {} doesn't match shape {:?}",
            data.len(),
            shape
        );
        Self {
            data: data.to_vec(),
            shape: shape.to_vec(),
        }
    }

    /// Create a zero-filled array with the given shape
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: vec![0.0; shape.iter().product()],
            shape: shape.to_vec(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Element at (row, col) of a rank-2 array
    pub fn get(&self, row: usize, col: usize) -> f32 {
        debug_assert_eq!(self.ndim(), 2);
        self.data[row * self.shape[1] + col]
    }
}

/// Observation: `size × size` array of log2 tile values
pub type Observation = SimpleArray;

/// Auxiliary per-step information. Always empty; kept for the
/// (observation, reward, done, info) contract.
pub type StepInfo = HashMap<String, f32>;

/// Bounds of the observation space
#[derive(Clone, Debug, PartialEq)]
pub struct ObservationSpace {
    pub shape: Vec<usize>,
    pub low: f32,
    pub high: f32,
}

impl ObservationSpace {
    pub fn contains(&self, obs: &Observation) -> bool {
        obs.shape() == self.shape.as_slice()
            && obs
                .as_slice()
                .iter()
                .all(|&v| (self.low..=self.high).contains(&v))
    }
}

/// Reward schemes supported by the environment
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardScheme {
    /// Dense incremental reward: score_after - score_before for every move
    /// that changes the grid.
    #[default]
    DenseScoreDelta,

    /// Terminal-only reward: 0 until game over, then the final score.
    TerminalOnly,
}

/// How step() treats action ids outside the action space and steps taken
/// after the episode has ended
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPolicy {
    /// Unknown action ids move left; stepping a finished episode yields the
    /// invalid-move penalty with done = true.
    #[default]
    Lenient,

    /// Unknown action ids and steps after done are errors.
    Strict,
}

/// Environment configuration parameters
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Side length of the grid (>= 2)
    pub grid_size: usize,

    /// Reward computation strategy
    pub reward_scheme: RewardScheme,

    /// Handling of out-of-range actions and steps after done
    pub action_policy: ActionPolicy,

    /// Reward for an action that does not change the grid
    pub invalid_move_penalty: Reward,

    /// If true, EnvStep.state contains a full GameState clone for debugging
    pub include_full_state_in_step: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            reward_scheme: RewardScheme::default(),
            action_policy: ActionPolicy::default(),
            invalid_move_penalty: INVALID_MOVE_PENALTY,
            include_full_state_in_step: false,
        }
    }
}

/// Error types for Environment::step()
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum StepError {
    /// step() called after the episode has already terminated
    #[error("step() called after the episode terminated")]
    EpisodeDone,

    /// ActionId is outside 0..ACTION_SPACE_SIZE
    #[error("action id {0} is outside the action space")]
    InvalidActionId(ActionId),
}

/// The result of either reset() or step() in an environment
#[derive(Clone, Debug)]
pub struct EnvStep<O, R> {
    pub observation: O,

    /// Reward for the most recent transition. 0 for reset().
    pub reward: R,

    /// True if the episode has terminated (game over)
    pub done: bool,

    /// Whether the last action changed the grid. False for reset().
    pub moved: bool,

    /// legal_action_mask[id] == true if that action would change the grid
    pub legal_action_mask: [bool; ACTION_SPACE_SIZE],

    /// The last action taken, if any. None for reset().
    pub last_action: Option<ActionId>,

    pub info: StepInfo,

    /// Populated only if EnvConfig.include_full_state_in_step is true.
    pub state: Option<GameState>,
}

/// Transition struct for storing experience in a replay buffer
#[derive(Clone, Debug)]
pub struct Transition {
    pub observation_before: Observation,
    pub action_id: ActionId,
    pub reward: Reward,
    pub observation_after: Observation,
    pub done: bool,
}
