//! Rollout configuration, loadable from TOML
//!
//! ```toml
//! [env]
//! grid_size = 4
//! reward_scheme = "dense_score_delta"
//! action_policy = "strict"
//! invalid_move_penalty = -50.0
//!
//! [rollout]
//! episodes = 100
//! seed = 7
//! parallel = true
//! ```

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use twenty48_rl_env::EnvConfig;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub env: EnvConfig,
    #[serde(default)]
    pub rollout: Rollout,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Rollout {
    #[serde(default = "defaults::episodes")]
    pub episodes: usize,
    #[serde(default = "defaults::seed")]
    pub seed: u64,
    /// Run episodes on the rayon pool
    #[serde(default)]
    pub parallel: bool,
}

impl Default for Rollout {
    fn default() -> Self {
        Self {
            episodes: defaults::episodes(),
            seed: defaults::seed(),
            parallel: false,
        }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = std::fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let cfg: Self = toml::from_str(&contents)?;
        Ok(cfg)
    }
}

mod defaults {
    pub fn episodes() -> usize { 10 }
    pub fn seed() -> u64 { 42 }
}
