use super::{require, spot_check_verdict, ActionHandler, Verdict};
use action_crypto::{verify_kademlia_ids, SignatureVerifier};
use action_types::metadata::{decode_metadata, encode_metadata, split_signature};
use action_types::{Action, ActionError, ActionType, MessageKind, Params, Result, SenseMetadata};
use tracing::debug;

/// Multi-party near-duplicate detection
pub struct SenseHandler {
    verifier: SignatureVerifier,
}

impl SenseHandler {
    pub fn new(verifier: SignatureVerifier) -> Self {
        Self { verifier }
    }
}

impl ActionHandler for SenseHandler {
    fn action_type(&self) -> ActionType {
        ActionType::Sense
    }

    fn process(&self, metadata: &[u8], kind: MessageKind, params: &Params) -> Result<Vec<u8>> {
        let mut meta: SenseMetadata = decode_metadata(metadata)?;
        match kind {
            MessageKind::Request => {
                require(!meta.data_hash.is_empty(), "data_hash", kind)?;
                require(meta.dd_and_fingerprints_ic.is_some(), "dd_and_fingerprints_ic", kind)?;
                meta.dd_and_fingerprints_max = params.max_dd_and_fingerprints;
                meta.dd_and_fingerprints_ids.clear();
                meta.signatures.clear();
            }
            MessageKind::Finalize => {
                require(!meta.dd_and_fingerprints_ids.is_empty(), "dd_and_fingerprints_ids", kind)?;
                require(!meta.signatures.is_empty(), "signatures", kind)?;
            }
        }
        encode_metadata(&meta)
    }

    fn register(&self, action: &Action) -> Result<()> {
        let meta: SenseMetadata = decode_metadata(&action.metadata)?;
        if meta.data_hash.is_empty() {
            return Err(ActionError::InvalidMetadata("data_hash is required".to_string()));
        }
        if meta.dd_and_fingerprints_max == 0 {
            return Err(ActionError::InvalidMetadata(
                "dd_and_fingerprints_max must be set".to_string(),
            ));
        }
        Ok(())
    }

    fn finalize(&self, action: &Action, supernode: &str, new_metadata: &[u8]) -> Result<Verdict> {
        let existing: SenseMetadata = decode_metadata(&action.metadata)?;
        let new: SenseMetadata = decode_metadata(new_metadata)?;

        if new.dd_and_fingerprints_ids.is_empty() {
            return Err(ActionError::InvalidMetadata(
                "dd_and_fingerprints_ids is required".to_string(),
            ));
        }

        let (payload, signature) = split_signature(&new.signatures)?;
        self.verifier.verify(payload, signature, supernode)?;

        debug!(
            action_id = %action.id,
            supernode = %supernode,
            ids = new.dd_and_fingerprints_ids.len(),
            "🔐 Sense attestation signature verified"
        );

        spot_check_verdict(verify_kademlia_ids(
            &new.dd_and_fingerprints_ids,
            &new.signatures,
            existing.dd_and_fingerprints_ic.unwrap_or(0),
            existing.dd_and_fingerprints_max,
        ))
    }

    fn approve(&self, _action: &Action) -> Result<()> {
        Ok(())
    }

    fn merge_metadata(&self, existing: &[u8], new_metadata: &[u8]) -> Result<Vec<u8>> {
        let mut merged: SenseMetadata = decode_metadata(existing)?;
        let new: SenseMetadata = decode_metadata(new_metadata)?;

        merged.dd_and_fingerprints_ids = new.dd_and_fingerprints_ids;
        if merged.signatures.is_empty() {
            merged.signatures = new.signatures;
        }
        encode_metadata(&merged)
    }
}
