use crate::{ActionError, Result};
use bech32::{Bech32, Hrp};

pub const DEFAULT_ADDRESS_PREFIX: &str = "lumera";

/// Encode raw account bytes with the given human-readable prefix
pub fn encode_address(prefix: &str, bytes: &[u8]) -> Result<String> {
    let hrp = Hrp::parse(prefix)
        .map_err(|e| ActionError::InvalidAddress(format!("invalid prefix '{}': {}", prefix, e)))?;

    bech32::encode::<Bech32>(hrp, bytes)
        .map_err(|e| ActionError::InvalidAddress(format!("Failed to encode address: {}", e)))
}

/// Decode a bech32 account address, checking prefix and payload length
pub fn decode_address(prefix: &str, address: &str) -> Result<Vec<u8>> {
    let (hrp, data) = bech32::decode(address)
        .map_err(|e| ActionError::InvalidAddress(format!("'{}': {}", address, e)))?;

    if hrp.as_str() != prefix {
        return Err(ActionError::InvalidAddress(format!(
            "Invalid address prefix: expected '{}', got '{}'",
            prefix,
            hrp.as_str()
        )));
    }

    // 20-byte account keys and 32-byte module/contract addresses
    if data.len() != 20 && data.len() != 32 {
        return Err(ActionError::InvalidAddress(format!(
            "Invalid address length: expected 20 or 32 bytes, got {}",
            data.len()
        )));
    }

    Ok(data)
}

pub fn validate_address(prefix: &str, address: &str) -> Result<()> {
    decode_address(prefix, address).map(|_| ())
}
