//! Action encoding: Direction ↔ ActionId
//!
//! Fixed table: 0 → up, 1 → down, 2 → left, 3 → right.

use log::debug;
use twenty48_engine::Direction;

use super::{ActionId, ActionPolicy, StepError};

/// Total size of the discrete action space
pub const ACTION_SPACE_SIZE: usize = 4;

/// Direction used for out-of-range ids under `ActionPolicy::Lenient`
pub const FALLBACK_DIRECTION: Direction = Direction::Left;

/// Encodes/decodes between engine Directions and discrete ActionIds
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ActionEncoder;

impl ActionEncoder {
    pub fn encode(direction: Direction) -> ActionId {
        direction as ActionId
    }

    /// Decode an ActionId, returning None outside 0..ACTION_SPACE_SIZE
    pub fn decode(id: ActionId) -> Option<Direction> {
        Direction::from_index(id)
    }

    /// Decode an ActionId, resolving out-of-range ids per `policy`.
    pub fn decode_with_policy(id: ActionId, policy: ActionPolicy) -> Result<Direction, StepError> {
        match (Self::decode(id), policy) {
            (Some(direction), _) => Ok(direction),
            (None, ActionPolicy::Lenient) => {
                debug!("action id {id} out of range, falling back to {FALLBACK_DIRECTION}");
                Ok(FALLBACK_DIRECTION)
            }
            (None, ActionPolicy::Strict) => Err(StepError::InvalidActionId(id)),
        }
    }
}
