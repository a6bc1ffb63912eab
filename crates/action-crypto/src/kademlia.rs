//! Kademlia identifiers and the spot-check integrity proof.
//!
//! An identifier is `base58(blake3(zstd(signature || "." || counter)))`. A
//! verifier holding the committed signature and counter range recomputes a
//! single randomly chosen element instead of the whole list.

use crate::error::{CryptoError, Result};
use rand::rngs::OsRng;
use rand::Rng;
use tracing::debug;

/// zstd level used for every identifier; changing it changes every ID
pub const COMPRESSION_LEVEL: i32 = 3;

/// Derive the identifier for `counter` under `signature`
pub fn create_kademlia_id(signature: &str, counter: u64) -> Result<String> {
    let input = format!("{}.{}", signature, counter);
    let compressed = zstd::stream::encode_all(input.as_bytes(), COMPRESSION_LEVEL)
        .map_err(|e| CryptoError::Compression(e.to_string()))?;
    let hash = blake3::hash(&compressed);
    Ok(bs58::encode(hash.as_bytes()).into_string())
}

/// Derive `count` consecutive identifiers starting at `counter_start`
pub fn create_kademlia_ids(signature: &str, counter_start: u64, count: u64) -> Result<Vec<String>> {
    (0..count)
        .map(|i| create_kademlia_id(signature, counter_start.saturating_add(i)))
        .collect()
}

/// Spot-check `ids` against `signature` at one index drawn from the OS RNG
pub fn verify_kademlia_ids(
    ids: &[String],
    signature: &str,
    counter_start: u64,
    counter_max: u64,
) -> Result<()> {
    check_list_shape(ids, signature, counter_max)?;
    let index = OsRng.gen_range(0..counter_max);
    verify_at(ids, signature, counter_start, index)
}

/// Same as [`verify_kademlia_ids`] but rechecks a caller-chosen index
pub fn verify_kademlia_ids_at(
    ids: &[String],
    signature: &str,
    counter_start: u64,
    counter_max: u64,
    index: u64,
) -> Result<()> {
    check_list_shape(ids, signature, counter_max)?;
    if index >= counter_max {
        return Err(CryptoError::InvalidIdList(format!(
            "index {} out of range 0..{}",
            index, counter_max
        )));
    }
    verify_at(ids, signature, counter_start, index)
}

fn check_list_shape(ids: &[String], signature: &str, counter_max: u64) -> Result<()> {
    if ids.is_empty() {
        return Err(CryptoError::InvalidIdList("no ids provided".to_string()));
    }
    if signature.is_empty() {
        return Err(CryptoError::InvalidIdList("no signature provided".to_string()));
    }
    if counter_max == 0 {
        return Err(CryptoError::InvalidIdList("counter max is zero".to_string()));
    }
    if ids.len() as u64 != counter_max {
        return Err(CryptoError::InvalidIdList(format!(
            "expected {} ids, got {}",
            counter_max,
            ids.len()
        )));
    }
    if let Some(pos) = ids.iter().position(|id| id.is_empty()) {
        return Err(CryptoError::InvalidIdList(format!("id at index {} is empty", pos)));
    }
    Ok(())
}

fn verify_at(ids: &[String], signature: &str, counter_start: u64, index: u64) -> Result<()> {
    let expected = create_kademlia_id(signature, counter_start.saturating_add(index))?;
    let actual = &ids[index as usize];

    if *actual != expected {
        return Err(CryptoError::IdMismatch {
            index,
            expected,
            actual: actual.clone(),
        });
    }

    debug!(index, counter_start, "🔎 Kademlia ID spot check passed");
    Ok(())
}
