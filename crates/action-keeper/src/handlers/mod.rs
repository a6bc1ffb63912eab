//! Per-type validation and metadata handling behind one contract.

mod cascade;
mod sense;

pub use cascade::CascadeHandler;
pub use sense::SenseHandler;

use action_types::{Action, ActionError, ActionType, MessageKind, Params, Result};

/// What an accepted attestation call concluded about the submitted work
#[derive(Debug)]
pub enum Verdict {
    /// Work verified; the engine advances the action
    Accepted,
    /// Well-formed, authentic attestation of bad work; the engine fails the action
    Failed(ActionError),
    /// Nothing to record
    NoChange,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

pub trait ActionHandler: Send + Sync {
    fn action_type(&self) -> ActionType;

    /// Check the fields `kind` requires and return the canonical encoding
    fn process(&self, metadata: &[u8], kind: MessageKind, params: &Params) -> Result<Vec<u8>>;

    /// Registration-time checks on a processed request
    fn register(&self, action: &Action) -> Result<()>;

    /// Validate an attestation by `supernode` carrying `new_metadata`.
    ///
    /// `Err` means the attestation itself is unacceptable (bad signature,
    /// malformed list) and leaves the action untouched.
    fn finalize(&self, action: &Action, supernode: &str, new_metadata: &[u8]) -> Result<Verdict>;

    fn approve(&self, action: &Action) -> Result<()>;

    /// Metadata to persist after an accepted attestation
    fn merge_metadata(&self, existing: &[u8], new_metadata: &[u8]) -> Result<Vec<u8>>;
}

/// Spot-check failures fail the action; every other verifier error rejects the call
fn spot_check_verdict(result: action_crypto::Result<()>) -> Result<Verdict> {
    match result {
        Ok(()) => Ok(Verdict::Accepted),
        Err(e @ action_crypto::CryptoError::IdMismatch { .. }) => Ok(Verdict::Failed(e.into())),
        Err(e) => Err(e.into()),
    }
}

fn require(present: bool, field: &str, kind: MessageKind) -> Result<()> {
    if present {
        Ok(())
    } else {
        Err(ActionError::InvalidMetadata(format!(
            "{} is required on {:?}",
            field, kind
        )))
    }
}
