//! Base58Check addresses: `network byte ‖ ripemd160(compressed public key)`.

use thiserror::Error;

use super::hash::ripemd160;
use super::keys::PublicKey;
use crate::config::ADDRESS_LENGTH;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address is not valid base58check")]
    InvalidEncoding,

    #[error("address decodes to {got} bytes, expected 21")]
    InvalidLength { got: usize },
}

pub fn from_public_key(public_key: &PublicKey, network: u8) -> String {
    let mut payload = [0u8; ADDRESS_LENGTH];
    payload[0] = network;
    payload[1..].copy_from_slice(&ripemd160(public_key.as_bytes()));
    from_bytes(&payload)
}

pub fn from_bytes(payload: &[u8; ADDRESS_LENGTH]) -> String {
    bs58::encode(payload).with_check().into_string()
}

/// Decodes an address into its raw 21-byte form.
pub fn to_bytes(address: &str) -> Result<[u8; ADDRESS_LENGTH], AddressError> {
    let decoded = bs58::decode(address)
        .with_check(None)
        .into_vec()
        .map_err(|_| AddressError::InvalidEncoding)?;
    if decoded.len() != ADDRESS_LENGTH {
        return Err(AddressError::InvalidLength { got: decoded.len() });
    }
    let mut out = [0u8; ADDRESS_LENGTH];
    out.copy_from_slice(&decoded);
    Ok(out)
}

/// Whether `address` decodes cleanly and carries `network` as its version byte.
pub fn validate(address: &str, network: u8) -> bool {
    matches!(to_bytes(address), Ok(bytes) if bytes[0] == network)
}
