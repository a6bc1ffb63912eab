use crate::{ActionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trait for lifecycle states
pub trait LifecycleState: Send + Sync + Clone + fmt::Debug {
    /// Check if this is a terminal state
    fn is_terminal(&self) -> bool;

    /// Check if transition to another state is valid
    fn can_transition_to(&self, next: &Self) -> bool;
}

/// Kinds of work a client can request from the supernode committee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionType {
    Unspecified,
    /// Multi-party near-duplicate detection; two attestation rounds
    Sense,
    /// Single-party erasure-coded storage; one attestation round
    Cascade,
}

impl ActionType {
    pub const ALL: [ActionType; 2] = [ActionType::Sense, ActionType::Cascade];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Unspecified => "ACTION_TYPE_UNSPECIFIED",
            ActionType::Sense => "ACTION_TYPE_SENSE",
            ActionType::Cascade => "ACTION_TYPE_CASCADE",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = ActionError;

    /// Accepts both the short (`SENSE`) and the prefixed (`ACTION_TYPE_SENSE`) spelling.
    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let short = upper.strip_prefix("ACTION_TYPE_").unwrap_or(&upper);
        match short {
            "SENSE" => Ok(ActionType::Sense),
            "CASCADE" => Ok(ActionType::Cascade),
            _ => Err(ActionError::UnsupportedActionType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionState {
    Unspecified, // Used only before registration and as "no change" from handlers
    Pending,     // Registered, awaiting the first attestation
    Processing,  // First round attested, awaiting the next
    Done,        // Work attested, fees distributed
    Approved,    // Creator accepted the result
    Failed,      // Attested work failed verification
    Expired,     // Expiration passed before completion
}

impl ActionState {
    pub const ALL: [ActionState; 7] = [
        ActionState::Unspecified,
        ActionState::Pending,
        ActionState::Processing,
        ActionState::Done,
        ActionState::Approved,
        ActionState::Failed,
        ActionState::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionState::Unspecified => "ACTION_STATE_UNSPECIFIED",
            ActionState::Pending => "ACTION_STATE_PENDING",
            ActionState::Processing => "ACTION_STATE_PROCESSING",
            ActionState::Done => "ACTION_STATE_DONE",
            ActionState::Approved => "ACTION_STATE_APPROVED",
            ActionState::Failed => "ACTION_STATE_FAILED",
            ActionState::Expired => "ACTION_STATE_EXPIRED",
        }
    }

    /// Stable single-byte tag used in storage index keys
    pub fn code(&self) -> u8 {
        match self {
            ActionState::Unspecified => 0,
            ActionState::Pending => 1,
            ActionState::Processing => 2,
            ActionState::Done => 3,
            ActionState::Approved => 4,
            ActionState::Failed => 5,
            ActionState::Expired => 6,
        }
    }

    /// States an attestation may be submitted in
    pub fn accepts_attestation(&self) -> bool {
        matches!(self, ActionState::Pending | ActionState::Processing)
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionState {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let short = upper.strip_prefix("ACTION_STATE_").unwrap_or(&upper);
        ActionState::ALL
            .into_iter()
            .find(|state| state.as_str().strip_prefix("ACTION_STATE_") == Some(short))
            .ok_or_else(|| ActionError::InvalidState(format!("unknown action state '{}'", s)))
    }
}

impl LifecycleState for ActionState {
    fn is_terminal(&self) -> bool {
        matches!(
            self,
            ActionState::Approved | ActionState::Failed | ActionState::Expired
        )
    }

    fn can_transition_to(&self, next: &Self) -> bool {
        use ActionState::*;
        match (self, next) {
            // Registration
            (Unspecified, Pending) => true,

            // From Pending
            (Pending, Processing) => true,
            (Pending, Done) => true,
            (Pending, Failed) => true,
            (Pending, Expired) => true,

            // From Processing
            (Processing, Done) => true,
            (Processing, Failed) => true,
            (Processing, Expired) => true,

            // From Done
            (Done, Approved) => true,

            _ => false,
        }
    }
}

/// Identifier assigned at registration; empty until then
pub type ActionId = String;

/// A unit of requested work tracked through its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub creator: String,
    pub action_type: ActionType,
    /// Handler-owned canonical encoding of the type-specific metadata
    pub metadata: Vec<u8>,
    /// Single-denomination amount, e.g. `100000ulume`
    pub price: String,
    /// Unix seconds; `0` never expires
    pub expiration_time: i64,
    pub state: ActionState,
    /// Height at creation; the committee snapshot used for authorization
    pub block_height: u64,
    /// Attesting supernodes in attestation order, no duplicates
    pub super_nodes: Vec<String>,
}

impl Action {
    /// A fresh, unregistered action
    pub fn new(
        creator: impl Into<String>,
        action_type: ActionType,
        metadata: Vec<u8>,
        price: impl Into<String>,
        expiration_time: i64,
    ) -> Self {
        Self {
            id: String::new(),
            creator: creator.into(),
            action_type,
            metadata,
            price: price.into(),
            expiration_time,
            state: ActionState::Unspecified,
            block_height: 0,
            super_nodes: Vec::new(),
        }
    }

    pub fn is_registered(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn has_attested(&self, supernode: &str) -> bool {
        self.super_nodes.iter().any(|sn| sn == supernode)
    }

    /// Whether the expiration deadline is due at `now` (unix seconds)
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expiration_time != 0 && self.expiration_time <= now
    }
}
