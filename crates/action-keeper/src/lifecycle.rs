//! Transition table for attestations.
//!
//! Handlers only judge the submitted work; which state that leads to is
//! decided here so the whole state machine reads in one place.

use crate::handlers::Verdict;
use action_types::{ActionError, ActionState, ActionType, LifecycleState, Result};

/// State an attestation moves the action to, or `None` for no change
pub fn next_state(
    action_type: ActionType,
    current: ActionState,
    verdict: &Verdict,
) -> Result<Option<ActionState>> {
    if !current.accepts_attestation() {
        return Err(ActionError::InvalidState(format!(
            "action in state {} does not accept attestations",
            current
        )));
    }

    let next = match (action_type, current, verdict) {
        (_, _, Verdict::NoChange) => return Ok(None),
        (_, _, Verdict::Failed(_)) => ActionState::Failed,

        // Sense takes two rounds
        (ActionType::Sense, ActionState::Pending, Verdict::Accepted) => ActionState::Processing,
        (ActionType::Sense, ActionState::Processing, Verdict::Accepted) => ActionState::Done,

        (ActionType::Cascade, _, Verdict::Accepted) => ActionState::Done,

        (other, _, Verdict::Accepted) => {
            return Err(ActionError::UnsupportedActionType(other.to_string()))
        }
    };

    if !current.can_transition_to(&next) {
        return Err(ActionError::InvalidState(format!(
            "invalid transition from {} to {}",
            current, next
        )));
    }
    Ok(Some(next))
}
