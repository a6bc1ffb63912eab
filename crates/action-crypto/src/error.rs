use action_types::ActionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid identifier list: {0}")]
    InvalidIdList(String),

    #[error("Kademlia ID mismatch at index {index}: expected {expected}, got {actual}")]
    IdMismatch {
        index: u64,
        expected: String,
        actual: String,
    },

    #[error("Compression failed: {0}")]
    Compression(String),

    #[error("Public key not found for {0}")]
    PublicKeyNotFound(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid signature encoding: {0}")]
    InvalidSignatureEncoding(String),

    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    #[error("Failed to build sign document: {0}")]
    Envelope(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;

impl From<CryptoError> for ActionError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::InvalidIdList(msg) => ActionError::InvalidMetadata(msg),
            CryptoError::IdMismatch { .. } => ActionError::InvalidId(e.to_string()),
            CryptoError::Compression(msg) | CryptoError::Envelope(msg) => {
                ActionError::Internal(msg)
            }
            CryptoError::PublicKeyNotFound(_)
            | CryptoError::InvalidPublicKey(_)
            | CryptoError::InvalidSignatureEncoding(_)
            | CryptoError::SignatureVerificationFailed => {
                ActionError::InvalidSignature(e.to_string())
            }
        }
    }
}
