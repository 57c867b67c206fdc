//! RL Environment trait and Twenty48Env implementation

use log::debug;
use rand::Rng;
use twenty48_engine::{new_game, EngineError, GameState, Score};

use super::{
    ActionEncoder, ActionId, ActionPolicy, EnvConfig, EnvStep, FeatureExtractor, Observation,
    Reward, RewardScheme, StepError, StepInfo, ACTION_SPACE_SIZE,
};

/// Generic environment interface for RL
pub trait Environment {
    /// Type used to represent observations
    type ObservationType;

    /// Type used to represent actions
    type ActionType;

    /// Type used to represent rewards
    type RewardType;

    /// Reset the environment to a fresh episode (new game).
    ///
    /// Returns the first EnvStep, representing the initial state prior
    /// to any actions.
    fn reset(&mut self, rng: &mut impl Rng) -> EnvStep<Self::ObservationType, Self::RewardType>;

    /// Apply an action, advance the environment by one step, and return the
    /// resulting EnvStep.
    fn step(
        &mut self,
        action: Self::ActionType,
    ) -> Result<EnvStep<Self::ObservationType, Self::RewardType>, StepError>;
}

/// 2048 RL Environment
pub struct Twenty48Env<F: FeatureExtractor> {
    /// Underlying engine state. Replaced wholesale on reset().
    pub game_state: GameState,

    /// Fixed at construction; `reset` relies on its grid_size
    config: EnvConfig,

    features: F,

    /// Last action applied (ActionId), if any
    pub last_action: Option<ActionId>,

    /// Whether this episode has ended
    pub done: bool,
}

impl<F: FeatureExtractor> Twenty48Env<F> {
    /// Create a new Twenty48Env with a game already dealt from `rng`.
    ///
    /// Fails if `config.grid_size` is below 2.
    pub fn new(config: EnvConfig, features: F, rng: &mut impl Rng) -> Result<Self, EngineError> {
        let game_state = new_game(config.grid_size, rng)?;
        assert_eq!(
            features.obs_shape(),
            vec![config.grid_size, config.grid_size],
            "feature extractor shape must match grid_size"
        );

        Ok(Self {
            game_state,
            config,
            features,
            last_action: None,
            done: false,
        })
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Feature extractor for building observations
    pub fn features(&self) -> &F {
        &self.features
    }

    /// Build the legal action mask for the current state
    pub fn build_legal_action_mask(&self) -> [bool; ACTION_SPACE_SIZE] {
        self.game_state.legal_moves()
    }

    pub fn observation(&self) -> Observation {
        self.features.encode(&self.game_state)
    }

    fn compute_reward(&self, moved: bool, prev_score: Score) -> Reward {
        if !moved {
            return self.config.invalid_move_penalty;
        }

        let score = self.game_state.score();
        match self.config.reward_scheme {
            RewardScheme::DenseScoreDelta => (score - prev_score) as Reward,
            RewardScheme::TerminalOnly => {
                if self.game_state.is_game_over() {
                    score as Reward
                } else {
                    0.0
                }
            }
        }
    }

    fn state_snapshot(&self) -> Option<GameState> {
        if self.config.include_full_state_in_step {
            Some(self.game_state.clone())
        } else {
            None
        }
    }
}

impl<F: FeatureExtractor> Environment for Twenty48Env<F> {
    type ObservationType = Observation;
    type ActionType = ActionId;
    type RewardType = Reward;

    fn reset(&mut self, rng: &mut impl Rng) -> EnvStep<Self::ObservationType, Self::RewardType> {
        // config is private and grid_size was validated in new()
        self.game_state = new_game(self.config.grid_size, rng)
            .expect("grid_size validated in Twenty48Env::new");
        self.last_action = None;
        self.done = false;
        debug!("reset: new {0}x{0} game", self.config.grid_size);

        EnvStep {
            observation: self.observation(),
            reward: 0.0,
            done: false,
            moved: false,
            legal_action_mask: self.build_legal_action_mask(),
            last_action: None,
            info: StepInfo::new(),
            state: self.state_snapshot(),
        }
    }

    fn step(
        &mut self,
        action_id: Self::ActionType,
    ) -> Result<EnvStep<Self::ObservationType, Self::RewardType>, StepError> {
        // 1. Under the lenient policy a finished game is left to the engine,
        //    which rejects every move.
        if self.done && self.config.action_policy == ActionPolicy::Strict {
            return Err(StepError::EpisodeDone);
        }

        // 2. Decode action
        let direction = ActionEncoder::decode_with_policy(action_id, self.config.action_policy)?;

        // 3. Apply via engine
        let prev_score = self.game_state.score();
        let moved = self.game_state.apply_move(direction);

        // 4. Reward, done
        let reward = self.compute_reward(moved, prev_score);
        let was_done = self.done;
        self.done = self.game_state.is_game_over();
        if self.done && !was_done {
            debug!(
                "episode finished: score {}, highest tile {}",
                self.game_state.score(),
                self.game_state.highest_tile()
            );
        }

        self.last_action = Some(action_id);

        Ok(EnvStep {
            observation: self.observation(),
            reward,
            done: self.done,
            moved,
            legal_action_mask: self.build_legal_action_mask(),
            last_action: self.last_action,
            info: StepInfo::new(),
            state: self.state_snapshot(),
        })
    }
}

/// Run a self-play episode with the given agent, returning the number of
/// steps taken
pub fn self_play_episode<F: FeatureExtractor, A: super::Agent>(
    env: &mut Twenty48Env<F>,
    agent: &mut A,
    rng: &mut impl Rng,
    replay_buffer: &mut Vec<super::Transition>,
) -> usize {
    use super::{AgentInput, Transition};

    let mut step = env.reset(rng);
    let mut steps = 0;

    while !step.done {
        let input = AgentInput {
            observation: &step.observation,
            legal_action_mask: &step.legal_action_mask,
        };
        let action_id = agent.select_action(&input, rng);

        // Agents only pick legal actions from an unfinished episode
        let next_step = env.step(action_id).expect("step failed unexpectedly");

        replay_buffer.push(Transition {
            observation_before: step.observation,
            action_id,
            reward: next_step.reward,
            observation_after: next_step.observation.clone(),
            done: next_step.done,
        });

        steps += 1;
        step = next_step;
    }

    steps
}
