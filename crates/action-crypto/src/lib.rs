//! Integrity proofs and signature verification for supernode actions.

pub mod error;
pub mod kademlia;
pub mod signature;

pub use error::{CryptoError, Result};
pub use kademlia::{
    create_kademlia_id, create_kademlia_ids, verify_kademlia_ids, verify_kademlia_ids_at,
    COMPRESSION_LEVEL,
};
pub use signature::{
    adr36_sign_bytes, normalize_signature, AccountKeeper, MemoryAccountKeeper, SignatureVerifier,
};
