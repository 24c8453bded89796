//! # Hashing Utilities
//!
//! SHA-256 hashes transactions (and, hex-encoded, names them). RIPEMD-160
//! of the compressed public key is the body of an address.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// SHA-256 of `data` as a fixed-size array.
///
/// # Example
///
/// ```
/// use ledger_transactions::crypto::sha256;
///
/// let hash = sha256(b"ledger");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// RIPEMD-160 of `data`.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().into()
}
