//! Type-specific action metadata documents.
//!
//! Clients submit these as JSON; handlers persist them in canonical JSON form
//! inside `Action::metadata`.

use crate::canonical_json::to_canonical_bytes;
use crate::{ActionError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Which message a metadata document arrives with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Finalize,
}

/// Metadata for Sense (near-duplicate detection) actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseMetadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data_hash: String,

    /// Counter start for the fingerprint identifiers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dd_and_fingerprints_ic: Option<u64>,

    /// Number of fingerprint identifiers expected; set from params on request
    #[serde(default, skip_serializing_if = "is_zero")]
    pub dd_and_fingerprints_max: u64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dd_and_fingerprints_ids: Vec<String>,

    /// Combined supernode signature, `<payload_b64>.<signature_b64>`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signatures: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub collection_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group_id: String,
}

/// Metadata for Cascade (erasure-coded storage) actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeMetadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data_hash: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_name: String,

    /// Counter start for the RaptorQ symbol identifiers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rq_ids_ic: Option<u64>,

    /// Number of symbol identifiers expected; set from params on request
    #[serde(default, skip_serializing_if = "is_zero")]
    pub rq_ids_max: u64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rq_ids_ids: Vec<String>,

    /// Creator signature, `<payload_b64>.<signature_b64>`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signatures: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub public: bool,
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}

/// Parse a metadata document, rejecting empty payloads
pub fn decode_metadata<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    if bytes.is_empty() {
        return Err(ActionError::InvalidMetadata("metadata is empty".to_string()));
    }
    serde_json::from_slice(bytes)
        .map_err(|e| ActionError::InvalidMetadata(format!("malformed metadata: {}", e)))
}

/// Canonical persisted encoding of a metadata document
pub fn encode_metadata<T: Serialize>(metadata: &T) -> Result<Vec<u8>> {
    to_canonical_bytes(metadata)
}

/// Split a two-part `<payload>.<signature>` string
pub fn split_signature(signatures: &str) -> Result<(&str, &str)> {
    let mut parts = signatures.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(payload), Some(signature), None) if !payload.is_empty() && !signature.is_empty() => {
            Ok((payload, signature))
        }
        _ => Err(ActionError::InvalidMetadata(
            "signatures must be of the form '<payload>.<signature>'".to_string(),
        )),
    }
}
