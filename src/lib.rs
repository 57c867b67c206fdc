//! 2048 Game Engine and RL Environment
//!
//! A deterministic 2048 engine with a reset/step environment on top.
//!
//! This crate re-exports the engine and rl-env crates for convenience, plus
//! the rollout harness used by the `twenty48` binary.

pub mod config;
pub mod rollout;

pub use twenty48_engine::*;
pub use twenty48_rl_env as rl_env;
