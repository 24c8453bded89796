//! # Key Management
//!
//! secp256k1 keypairs for transaction senders and multi-signature
//! participants.
//!
//! A keypair is usually derived from a passphrase: the secret scalar is
//! `sha256(passphrase)`. Public keys travel in compressed SEC1 form (33
//! bytes, `02`/`03` prefix) both on the wire and as 66-char hex in JSON.
//!
//! The same secret signs both ECDSA (v1) and Schnorr (v2) messages. For
//! Schnorr the x coordinate of the compressed key is the verifying key.

use std::fmt;

use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::schnorr;
use rand::rngs::OsRng;
use thiserror::Error;

use super::hash::sha256;
use crate::config::PUBLIC_KEY_LENGTH;

/// Errors that can occur during key operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid public key: expected a compressed secp256k1 point")]
    InvalidPublicKey,

    #[error("invalid hex encoding")]
    InvalidHex,
}

/// A secp256k1 signing keypair.
///
/// Deliberately not `Serialize`; exporting the secret goes through
/// [`secret_bytes`](Self::secret_bytes).
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Derives the keypair whose secret is `sha256(passphrase)`.
    ///
    /// ```
    /// use ledger_transactions::crypto::KeyPair;
    ///
    /// let keys = KeyPair::from_passphrase("this is a top secret passphrase").unwrap();
    /// assert_eq!(keys.public_key().to_hex().len(), 66);
    /// ```
    pub fn from_passphrase(passphrase: &str) -> Result<Self, KeyError> {
        Self::from_secret(&sha256(passphrase.as_bytes()))
    }

    /// Builds a keypair from a raw 32-byte secret scalar.
    pub fn from_secret(secret: &[u8]) -> Result<Self, KeyError> {
        let signing_key = SigningKey::from_slice(secret).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self { signing_key })
    }

    pub fn from_hex(secret_hex: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(secret_hex).map_err(|_| KeyError::InvalidHex)?;
        Self::from_secret(&bytes)
    }

    pub fn public_key(&self) -> PublicKey {
        let point = self.signing_key.verifying_key().to_encoded_point(true);
        let mut bytes = [0u8; PUBLIC_KEY_LENGTH];
        bytes.copy_from_slice(point.as_bytes());
        PublicKey { bytes }
    }

    /// Raw secret scalar. Never log this.
    pub fn secret_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.signing_key.to_bytes());
        out
    }

    pub(crate) fn ecdsa_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub(crate) fn schnorr_key(&self) -> Result<schnorr::SigningKey, KeyError> {
        schnorr::SigningKey::from_bytes(&self.secret_bytes()).map_err(|_| KeyError::InvalidSecretKey)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key().to_hex())
            .finish_non_exhaustive()
    }
}

/// A validated compressed secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    bytes: [u8; PUBLIC_KEY_LENGTH],
}

impl PublicKey {
    /// Accepts exactly 33 bytes that decode to a point on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != PUBLIC_KEY_LENGTH {
            return Err(KeyError::InvalidPublicKey);
        }
        VerifyingKey::from_sec1_bytes(bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        let mut out = [0u8; PUBLIC_KEY_LENGTH];
        out.copy_from_slice(bytes);
        Ok(Self { bytes: out })
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str).map_err(|_| KeyError::InvalidHex)?;
        Self::from_bytes(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    pub(crate) fn ecdsa_verifying_key(&self) -> Result<VerifyingKey, KeyError> {
        VerifyingKey::from_sec1_bytes(&self.bytes).map_err(|_| KeyError::InvalidPublicKey)
    }

    /// BIP340 keys are x-only: drop the parity prefix.
    pub(crate) fn schnorr_verifying_key(&self) -> Result<schnorr::VerifyingKey, KeyError> {
        schnorr::VerifyingKey::from_bytes(&self.bytes[1..]).map_err(|_| KeyError::InvalidPublicKey)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSPHRASE: &str = "this is a top secret passphrase";

    #[test]
    fn test_passphrase_derivation_vector() {
        let keys = KeyPair::from_passphrase(PASSPHRASE).unwrap();
        assert_eq!(
            hex::encode(keys.secret_bytes()),
            "d8839c2432bfd0a67ef10a804ba991eabba19f154a3d707917681d45822a5712"
        );
        assert_eq!(
            keys.public_key().to_hex(),
            "034151a3ec46b5670a682b0a63394f863587d1bc97483b1b6c70eb58e7f0aed192"
        );
    }

    #[test]
    fn test_generated_keys_are_compressed() {
        let keys = KeyPair::generate();
        let prefix = keys.public_key().as_bytes()[0];
        assert!(prefix == 0x02 || prefix == 0x03);
    }

    #[test]
    fn test_hex_roundtrip() {
        let keys = KeyPair::generate();
        let restored = KeyPair::from_hex(&hex::encode(keys.secret_bytes())).unwrap();
        assert_eq!(keys.public_key(), restored.public_key());

        let public = PublicKey::from_hex(&keys.public_key().to_hex()).unwrap();
        assert_eq!(public, keys.public_key());
    }

    #[test]
    fn test_zero_secret_rejected() {
        assert_eq!(
            KeyPair::from_secret(&[0u8; 32]).unwrap_err(),
            KeyError::InvalidSecretKey
        );
    }

    #[test]
    fn test_public_key_rejects_bad_input() {
        assert_eq!(
            PublicKey::from_bytes(&[0x02; 32]).unwrap_err(),
            KeyError::InvalidPublicKey
        );
        assert_eq!(PublicKey::from_hex("zz").unwrap_err(), KeyError::InvalidHex);

        // Uncompressed encodings are valid points but not accepted here.
        let keys = KeyPair::generate();
        let uncompressed = keys.ecdsa_key().verifying_key().to_encoded_point(false);
        assert!(PublicKey::from_bytes(uncompressed.as_bytes()).is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let keys = KeyPair::from_passphrase(PASSPHRASE).unwrap();
        let rendered = format!("{:?}", keys);
        assert!(!rendered.contains("d8839c24"));
        assert!(rendered.contains("034151a3"));
    }
}
