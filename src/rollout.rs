//! Random-agent rollouts over independent, seeded environments

use log::debug;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

use twenty48_engine::{EngineError, Score, Tile};
use twenty48_rl_env::{
    self_play_episode, EnvConfig, Log2FeatureExtractor, RandomAgent, Reward, Twenty48Env,
};

use crate::config::Rollout;

/// Outcome of one finished episode
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeSummary {
    pub seed: u64,
    pub score: Score,
    pub highest_tile: Tile,
    pub steps: usize,
    pub total_reward: Reward,
}

/// Aggregate over a batch of episodes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RolloutStats {
    pub episodes: usize,
    pub mean_score: f64,
    pub best_score: Score,
    pub best_tile: Tile,
    pub mean_steps: f64,
}

impl RolloutStats {
    pub fn from_summaries(summaries: &[EpisodeSummary]) -> Self {
        if summaries.is_empty() {
            return Self::default();
        }
        let n = summaries.len() as f64;
        Self {
            episodes: summaries.len(),
            mean_score: summaries.iter().map(|s| s.score as f64).sum::<f64>() / n,
            best_score: summaries.iter().map(|s| s.score).max().unwrap_or(0),
            best_tile: summaries.iter().map(|s| s.highest_tile).max().unwrap_or(0),
            mean_steps: summaries.iter().map(|s| s.steps as f64).sum::<f64>() / n,
        }
    }
}

/// Play one episode with a RandomAgent in a fresh environment seeded by `seed`.
pub fn run_episode(config: &EnvConfig, seed: u64) -> Result<EpisodeSummary, EngineError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let features = Log2FeatureExtractor::new(config.grid_size);
    let mut env = Twenty48Env::new(config.clone(), features, &mut rng)?;
    let mut agent = RandomAgent::new();
    let mut transitions = Vec::new();

    let steps = self_play_episode(&mut env, &mut agent, &mut rng, &mut transitions);
    let summary = EpisodeSummary {
        seed,
        score: env.game_state.score(),
        highest_tile: env.game_state.highest_tile(),
        steps,
        total_reward: transitions.iter().map(|t| t.reward).sum(),
    };
    debug!(
        "episode seed={} score={} highest_tile={} steps={}",
        summary.seed, summary.score, summary.highest_tile, summary.steps
    );
    Ok(summary)
}

/// Run `settings.episodes` episodes. Episode seeds are drawn up front from
/// `settings.seed`, so results do not depend on thread scheduling.
pub fn run_rollouts(
    config: &EnvConfig,
    settings: &Rollout,
) -> Result<Vec<EpisodeSummary>, EngineError> {
    let mut seeder = StdRng::seed_from_u64(settings.seed);
    let seeds: Vec<u64> = (0..settings.episodes).map(|_| seeder.next_u64()).collect();

    if settings.parallel {
        seeds
            .into_par_iter()
            .map(|seed| run_episode(config, seed))
            .collect()
    } else {
        seeds.into_iter().map(|seed| run_episode(config, seed)).collect()
    }
}
