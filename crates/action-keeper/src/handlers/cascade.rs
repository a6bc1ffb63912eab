use super::{require, spot_check_verdict, ActionHandler, Verdict};
use action_crypto::{verify_kademlia_ids, SignatureVerifier};
use action_types::metadata::{decode_metadata, encode_metadata, split_signature};
use action_types::{Action, ActionError, ActionType, CascadeMetadata, MessageKind, Params, Result};
use tracing::debug;

/// Single-party erasure-coded storage
pub struct CascadeHandler {
    verifier: SignatureVerifier,
}

impl CascadeHandler {
    pub fn new(verifier: SignatureVerifier) -> Self {
        Self { verifier }
    }
}

impl ActionHandler for CascadeHandler {
    fn action_type(&self) -> ActionType {
        ActionType::Cascade
    }

    fn process(&self, metadata: &[u8], kind: MessageKind, params: &Params) -> Result<Vec<u8>> {
        let mut meta: CascadeMetadata = decode_metadata(metadata)?;
        match kind {
            MessageKind::Request => {
                require(!meta.data_hash.is_empty(), "data_hash", kind)?;
                require(!meta.file_name.is_empty(), "file_name", kind)?;
                require(meta.rq_ids_ic.is_some(), "rq_ids_ic", kind)?;
                require(!meta.signatures.is_empty(), "signatures", kind)?;
                meta.rq_ids_max = params.max_raptor_q_symbols;
                meta.rq_ids_ids.clear();
            }
            MessageKind::Finalize => {
                require(!meta.rq_ids_ids.is_empty(), "rq_ids_ids", kind)?;
            }
        }
        encode_metadata(&meta)
    }

    fn register(&self, action: &Action) -> Result<()> {
        let meta: CascadeMetadata = decode_metadata(&action.metadata)?;
        if meta.data_hash.is_empty() || meta.file_name.is_empty() {
            return Err(ActionError::InvalidMetadata(
                "data_hash and file_name are required".to_string(),
            ));
        }
        if meta.rq_ids_max == 0 {
            return Err(ActionError::InvalidMetadata("rq_ids_max must be set".to_string()));
        }

        let (payload, signature) = split_signature(&meta.signatures)?;
        self.verifier.verify(payload, signature, &action.creator)?;
        debug!(
            creator = %action.creator,
            file_name = %meta.file_name,
            "🔐 Cascade creator signature verified"
        );
        Ok(())
    }

    fn finalize(&self, action: &Action, supernode: &str, new_metadata: &[u8]) -> Result<Verdict> {
        let existing: CascadeMetadata = decode_metadata(&action.metadata)?;
        let new: CascadeMetadata = decode_metadata(new_metadata)?;

        if new.rq_ids_ids.is_empty() {
            return Err(ActionError::InvalidMetadata("rq_ids_ids is required".to_string()));
        }

        debug!(
            action_id = %action.id,
            supernode = %supernode,
            ids = new.rq_ids_ids.len(),
            "🔎 Checking Cascade symbol identifiers"
        );

        spot_check_verdict(verify_kademlia_ids(
            &new.rq_ids_ids,
            &existing.signatures,
            existing.rq_ids_ic.unwrap_or(0),
            existing.rq_ids_max,
        ))
    }

    fn approve(&self, _action: &Action) -> Result<()> {
        Ok(())
    }

    fn merge_metadata(&self, existing: &[u8], new_metadata: &[u8]) -> Result<Vec<u8>> {
        let mut merged: CascadeMetadata = decode_metadata(existing)?;
        let new: CascadeMetadata = decode_metadata(new_metadata)?;
        merged.rq_ids_ids = new.rq_ids_ids;
        encode_metadata(&merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_crypto::{create_kademlia_ids, MemoryAccountKeeper};
    use std::sync::Arc;

    fn handler() -> CascadeHandler {
        CascadeHandler::new(SignatureVerifier::new(Arc::new(MemoryAccountKeeper::new())))
    }

    fn stored_action(signatures: &str, ic: u64, max: u64) -> Action {
        let meta = CascadeMetadata {
            data_hash: "h".into(),
            file_name: "f.bin".into(),
            rq_ids_ic: Some(ic),
            rq_ids_max: max,
            signatures: signatures.into(),
            ..Default::default()
        };
        let mut action = Action::new(
            "lumera1creator",
            ActionType::Cascade,
            encode_metadata(&meta).unwrap(),
            "100000ulume",
            0,
        );
        action.id = "1".into();
        action
    }

    fn finalize_doc(ids: &[String]) -> Vec<u8> {
        encode_metadata(&CascadeMetadata {
            rq_ids_ids: ids.to_vec(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_request_requires_signature() {
        let params = Params::default();
        let err = handler()
            .process(
                br#"{"data_hash":"h","file_name":"f","rq_ids_ic":1}"#,
                MessageKind::Request,
                &params,
            )
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidMetadata(_)));
    }

    #[test]
    fn test_honest_ids_accepted() {
        let action = stored_action("cGF5.c2ln", 5, 8);
        let ids = create_kademlia_ids("cGF5.c2ln", 5, 8).unwrap();
        let verdict = handler().finalize(&action, "sn", &finalize_doc(&ids)).unwrap();
        assert!(verdict.is_accepted());
    }

    #[test]
    fn test_forged_ids_fail_the_action() {
        let action = stored_action("cGF5.c2ln", 0, 3);
        let ids = create_kademlia_ids("forged.sig", 0, 3).unwrap();
        match handler().finalize(&action, "sn", &finalize_doc(&ids)).unwrap() {
            Verdict::Failed(ActionError::InvalidId(_)) => {}
            other => panic!("unexpected verdict {:?}", other),
        }
    }

    #[test]
    fn test_wrong_count_rejects_the_call() {
        let action = stored_action("cGF5.c2ln", 0, 3);
        let ids = create_kademlia_ids("cGF5.c2ln", 0, 2).unwrap();
        let err = handler().finalize(&action, "sn", &finalize_doc(&ids)).unwrap_err();
        assert!(matches!(err, ActionError::InvalidMetadata(_)));
    }

    #[test]
    fn test_register_rejects_unsigned_request() {
        let action = stored_action("no-separator", 0, 3);
        assert!(handler().register(&action).is_err());
    }
}
