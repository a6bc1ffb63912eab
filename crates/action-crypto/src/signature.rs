//! secp256k1 signature verification for action payloads.
//!
//! Two signer populations sign the same logical payload differently. API
//! clients sign the payload bytes directly; browser wallets sign an ADR-036
//! "arbitrary data" sign document wrapping the payload. Both are accepted.
//! The signature itself may arrive as fixed 64-byte `r || s` or DER.

use crate::error::{CryptoError, Result};
use action_types::canonical_json::canonicalize_value;
use base64::{engine::general_purpose, Engine};
use k256::ecdsa::signature::Verifier;
use k256::ecdsa::{Signature, VerifyingKey};
use parking_lot::RwLock;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Width of one signature scalar
const SCALAR_LEN: usize = 32;

/// Public key lookup for on-ledger accounts
pub trait AccountKeeper: Send + Sync {
    /// Compressed or uncompressed SEC1 public key of `address`, if the account has one
    fn public_key_of(&self, address: &str) -> Option<Vec<u8>>;
}

/// Verifies base64 signatures against account public keys
#[derive(Clone)]
pub struct SignatureVerifier {
    accounts: Arc<dyn AccountKeeper>,
}

impl SignatureVerifier {
    pub fn new(accounts: Arc<dyn AccountKeeper>) -> Self {
        Self { accounts }
    }

    /// Verify `signature_b64` by `signer` over `payload`, under either signing convention
    pub fn verify(&self, payload: &str, signature_b64: &str, signer: &str) -> Result<()> {
        let pubkey_bytes = self
            .accounts
            .public_key_of(signer)
            .ok_or_else(|| CryptoError::PublicKeyNotFound(signer.to_string()))?;
        let verifying_key = VerifyingKey::from_sec1_bytes(&pubkey_bytes)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;

        let raw = general_purpose::STANDARD
            .decode(signature_b64)
            .map_err(|e| CryptoError::InvalidSignatureEncoding(format!("base64: {}", e)))?;
        let fixed = normalize_signature(&raw)?;
        let signature = Signature::from_slice(&fixed)
            .map_err(|e| CryptoError::InvalidSignatureEncoding(e.to_string()))?;

        if verifying_key.verify(payload.as_bytes(), &signature).is_ok() {
            debug!(signer = %signer, "✅ Signature verified over raw payload");
            return Ok(());
        }

        let sign_doc = adr36_sign_bytes(payload, signer)?;
        if verifying_key.verify(&sign_doc, &signature).is_ok() {
            debug!(signer = %signer, "✅ Signature verified over ADR-036 sign doc");
            return Ok(());
        }

        Err(CryptoError::SignatureVerificationFailed)
    }
}

/// Canonical ADR-036 sign document bytes wrapping `payload` for `signer`
pub fn adr36_sign_bytes(payload: &str, signer: &str) -> Result<Vec<u8>> {
    let doc = json!({
        "account_number": "0",
        "chain_id": "",
        "fee": { "amount": [], "gas": "0" },
        "memo": "",
        "msgs": [{
            "type": "sign/MsgSignData",
            "value": {
                "data": general_purpose::STANDARD.encode(payload.as_bytes()),
                "signer": signer,
            }
        }],
        "sequence": "0",
    });
    serde_json::to_vec(&canonicalize_value(doc)).map_err(|e| CryptoError::Envelope(e.to_string()))
}

/// Bring a signature into fixed 64-byte `r || s` form
pub fn normalize_signature(raw: &[u8]) -> Result<[u8; 64]> {
    if raw.len() == 2 * SCALAR_LEN && !looks_like_der(raw) {
        return Ok(fixed_copy(raw));
    }
    if let Ok(signature) = Signature::from_der(raw) {
        return Ok(fixed_copy(&signature.to_bytes()));
    }
    // Non-minimal DER: redundant zero padding is trimmed per component
    match der_to_fixed(raw) {
        Ok(fixed) => Ok(fixed),
        Err(_) if raw.len() == 2 * SCALAR_LEN => Ok(fixed_copy(raw)),
        Err(e) => Err(e),
    }
}

/// SEQUENCE tag with a short-form length covering the rest of the input
fn looks_like_der(raw: &[u8]) -> bool {
    raw.len() >= 2 && raw[0] == 0x30 && raw[1] as usize == raw.len() - 2
}

fn fixed_copy(raw: &[u8]) -> [u8; 64] {
    let mut fixed = [0u8; 64];
    fixed.copy_from_slice(raw);
    fixed
}

/// SEQUENCE { INTEGER r, INTEGER s } with short-form lengths
fn der_to_fixed(der: &[u8]) -> Result<[u8; 64]> {
    if der.len() < 8 || der[0] != 0x30 {
        return Err(CryptoError::InvalidSignatureEncoding(format!(
            "expected 64-byte or DER signature, got {} bytes",
            der.len()
        )));
    }
    if der[1] as usize != der.len() - 2 {
        return Err(CryptoError::InvalidSignatureEncoding(
            "DER sequence length mismatch".to_string(),
        ));
    }

    let (r, rest) = read_integer(&der[2..])?;
    let (s, rest) = read_integer(rest)?;
    if !rest.is_empty() {
        return Err(CryptoError::InvalidSignatureEncoding(
            "trailing bytes after DER signature".to_string(),
        ));
    }

    let mut fixed = [0u8; 64];
    left_pad_into(r, &mut fixed[..SCALAR_LEN])?;
    left_pad_into(s, &mut fixed[SCALAR_LEN..])?;
    Ok(fixed)
}

fn read_integer(input: &[u8]) -> Result<(&[u8], &[u8])> {
    if input.len() < 2 || input[0] != 0x02 {
        return Err(CryptoError::InvalidSignatureEncoding(
            "expected DER integer".to_string(),
        ));
    }
    let len = input[1] as usize;
    if len == 0 || input.len() < 2 + len {
        return Err(CryptoError::InvalidSignatureEncoding(
            "truncated DER integer".to_string(),
        ));
    }
    Ok((&input[2..2 + len], &input[2 + len..]))
}

fn left_pad_into(component: &[u8], out: &mut [u8]) -> Result<()> {
    let start = component
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(component.len());
    let trimmed = &component[start..];
    if trimmed.len() > SCALAR_LEN {
        return Err(CryptoError::InvalidSignatureEncoding(format!(
            "signature component is {} bytes, exceeds {}",
            trimmed.len(),
            SCALAR_LEN
        )));
    }
    out[SCALAR_LEN - trimmed.len()..].copy_from_slice(trimmed);
    Ok(())
}

/// In-memory account keeper
#[derive(Default)]
pub struct MemoryAccountKeeper {
    keys: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryAccountKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_public_key(&self, address: impl Into<String>, public_key: Vec<u8>) {
        self.keys.write().insert(address.into(), public_key);
    }
}

impl AccountKeeper for MemoryAccountKeeper {
    fn public_key_of(&self, address: &str) -> Option<Vec<u8>> {
        self.keys.read().get(address).cloned()
    }
}
