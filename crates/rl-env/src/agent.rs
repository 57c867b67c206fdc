//! Agent API for action selection

use rand::Rng;

use super::{ActionId, Observation, ACTION_SPACE_SIZE};

/// Inputs provided to an agent when selecting an action
pub struct AgentInput<'a> {
    /// Current observation
    pub observation: &'a Observation,

    /// legal_action_mask[id] == true if the action would change the grid
    pub legal_action_mask: &'a [bool; ACTION_SPACE_SIZE],
}

/// Trait for anything that can choose actions in the environment.
pub trait Agent {
    /// Choose a legal action given an observation and legal-action mask.
    ///
    /// Requirement:
    /// - Must only return ActionIds for which legal_action_mask[id as usize] == true,
    ///   unless no action is legal.
    /// - May use rng for exploration.
    fn select_action(&mut self, input: &AgentInput, rng: &mut impl Rng) -> ActionId;
}

/// Random agent that uniformly samples from legal actions.
///
/// With an all-false mask (a finished episode) it samples from every action.
#[derive(Clone, Debug, Default)]
pub struct RandomAgent;

impl RandomAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Agent for RandomAgent {
    fn select_action(&mut self, input: &AgentInput, rng: &mut impl Rng) -> ActionId {
        let legal_ids: Vec<ActionId> = input
            .legal_action_mask
            .iter()
            .enumerate()
            .filter(|(_, &legal)| legal)
            .map(|(id, _)| id as ActionId)
            .collect();

        if legal_ids.is_empty() {
            return rng.random_range(0..ACTION_SPACE_SIZE) as ActionId;
        }

        legal_ids[rng.random_range(0..legal_ids.len())]
    }
}
