//! Random-agent rollout CLI for the 2048 environment
//!
//! Runs a batch of episodes and logs score statistics.

use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use log::info;

use twenty48::config::Config;
use twenty48::rollout::{run_rollouts, RolloutStats};

/// Random-agent rollouts for 2048
#[derive(Parser, Debug)]
#[command(name = "twenty48")]
#[command(about = "Run random-agent episodes of 2048 and report scores", long_about = None)]
struct Args {
    /// TOML configuration file ([env] and [rollout] tables)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of episodes (overrides the config file)
    #[arg(long)]
    episodes: Option<usize>,

    /// Seed for episode seeds (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Grid side length (overrides the config file)
    #[arg(long)]
    grid_size: Option<usize>,

    /// Run episodes in parallel
    #[arg(long)]
    parallel: bool,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();

    let mut config = match &args.config {
        Some(path) => {
            info!("Using configuration file: {}", path.display());
            Config::from_toml(path)?
        }
        None => Config::default(),
    };
    if let Some(episodes) = args.episodes {
        config.rollout.episodes = episodes;
    }
    if let Some(seed) = args.seed {
        config.rollout.seed = seed;
    }
    if let Some(grid_size) = args.grid_size {
        config.env.grid_size = grid_size;
    }
    config.rollout.parallel |= args.parallel;

    info!(
        "Running {} episode(s) on a {}x{} grid (seed {}, parallel: {})",
        config.rollout.episodes,
        config.env.grid_size,
        config.env.grid_size,
        config.rollout.seed,
        config.rollout.parallel
    );

    let summaries = run_rollouts(&config.env, &config.rollout)?;
    let stats = RolloutStats::from_summaries(&summaries);

    info!(
        "Completed {} episodes: mean score {:.1}, best score {}, best tile {}, mean steps {:.1}",
        stats.episodes, stats.mean_score, stats.best_score, stats.best_tile, stats.mean_steps
    );
    Ok(())
}
