//! RL Environment for the 2048 engine
//!
//! This crate provides:
//! - Action encoding/decoding (ActionId ↔ Direction)
//! - Feature extraction (GameState → log2 Observation)
//! - Environment trait and Twenty48Env implementation
//! - Agent trait and RandomAgent

mod action_encoder;
mod agent;
mod environment;
mod feature_extractor;
mod types;

pub use action_encoder::*;
pub use agent::*;
pub use environment::*;
pub use feature_extractor::*;
pub use types::*;
