//! # Digital Signatures
//!
//! Transactions are signed over a 32-byte SHA-256 hash, never over the raw
//! bytes, so every operation here is a prehash operation.
//!
//! - **ECDSA**: DER-encoded, variable length (70-72 bytes in practice).
//!   Used by legacy v1 transactions.
//! - **Schnorr**: fixed 64 bytes, deterministic (zero auxiliary randomness).
//!   Used by v2 transactions and every multi-signature participant.
//!
//! Verification never errors: a malformed signature or key is simply an
//! invalid signature.

use k256::ecdsa;
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::schnorr;
use thiserror::Error;

use super::keys::{KeyPair, PublicKey};
use crate::config::SCHNORR_SIGNATURE_LENGTH;

/// Errors during signature operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signing failed")]
    SigningFailed,

    #[error("invalid signature bytes")]
    InvalidSignatureBytes,

    #[error("invalid public key")]
    InvalidPublicKey,
}

/// Which algorithm produced (or should produce) a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    Ecdsa,
    Schnorr,
}

impl SignatureScheme {
    /// v2 payloads carry either scheme; Schnorr signatures are exactly 64
    /// bytes while DER never is.
    pub fn detect(signature: &[u8]) -> Self {
        if signature.len() == SCHNORR_SIGNATURE_LENGTH {
            SignatureScheme::Schnorr
        } else {
            SignatureScheme::Ecdsa
        }
    }

    pub fn sign(self, hash: &[u8; 32], keys: &KeyPair) -> Result<Vec<u8>, SignatureError> {
        match self {
            SignatureScheme::Ecdsa => ecdsa_sign(hash, keys),
            SignatureScheme::Schnorr => schnorr_sign(hash, keys).map(|sig| sig.to_vec()),
        }
    }

    pub fn verify(self, hash: &[u8; 32], signature: &[u8], public_key: &PublicKey) -> bool {
        match self {
            SignatureScheme::Ecdsa => ecdsa_verify(hash, signature, public_key),
            SignatureScheme::Schnorr => schnorr_verify(hash, signature, public_key),
        }
    }
}

/// ECDSA over `hash`, DER-encoded. RFC6979 nonces, low-S.
pub fn ecdsa_sign(hash: &[u8; 32], keys: &KeyPair) -> Result<Vec<u8>, SignatureError> {
    let signature: ecdsa::Signature = keys
        .ecdsa_key()
        .sign_prehash(hash)
        .map_err(|_| SignatureError::SigningFailed)?;
    Ok(signature.to_der().as_bytes().to_vec())
}

pub fn ecdsa_verify(hash: &[u8; 32], signature: &[u8], public_key: &PublicKey) -> bool {
    let Ok(signature) = ecdsa::Signature::from_der(signature) else {
        return false;
    };
    let Ok(key) = public_key.ecdsa_verifying_key() else {
        return false;
    };
    key.verify_prehash(hash, &signature).is_ok()
}

/// Deterministic Schnorr over `hash`.
pub fn schnorr_sign(hash: &[u8; 32], keys: &KeyPair) -> Result<[u8; 64], SignatureError> {
    let key = keys
        .schnorr_key()
        .map_err(|_| SignatureError::SigningFailed)?;
    let signature: schnorr::Signature = key
        .sign_prehash(hash)
        .map_err(|_| SignatureError::SigningFailed)?;
    Ok(signature.to_bytes())
}

pub fn schnorr_verify(hash: &[u8; 32], signature: &[u8], public_key: &PublicKey) -> bool {
    let Ok(signature) = schnorr::Signature::try_from(signature) else {
        return false;
    };
    let Ok(key) = public_key.schnorr_verifying_key() else {
        return false;
    };
    key.verify_prehash(hash, &signature).is_ok()
}
