//! Transaction signing with secp256k1 key pairs.
//!
//! Three signatures can sit on a transaction, each over a different hash:
//!
//! | signature        | hash excludes                         | scheme            |
//! |------------------|---------------------------------------|-------------------|
//! | `signature`      | signature, second signature           | ECDSA v1, Schnorr v2 |
//! | `secondSignature`| second signature                      | ECDSA v1, Schnorr v2 |
//! | `signatures[i]`  | signature, second, multi-signatures   | Schnorr           |
//!
//! Multi-signature entries are the participant index (one byte, hex) followed
//! by the 64-byte Schnorr signature.

use tracing::debug;

use super::context::ProtocolContext;
use super::data::TransactionData;
use super::error::TransactionError;
use super::hashing::TransactionHasher;
use super::serializer::SerializeOptions;
use crate::config::TRANSACTION_VERSION_LEGACY;
use crate::crypto::signatures::schnorr_sign;
use crate::crypto::{KeyPair, SignatureScheme};

#[derive(Debug, Clone)]
pub struct Signer {
    hasher: TransactionHasher,
}

impl Signer {
    pub fn new(context: ProtocolContext) -> Self {
        Self {
            hasher: TransactionHasher::new(context),
        }
    }

    /// Signs the hash selected by `options` (signature and second signature
    /// excluded when `None`). The result is stored in `data.signature` only
    /// if no signature is present yet; it is returned either way.
    pub fn sign(
        &self,
        data: &mut TransactionData,
        keys: &KeyPair,
        options: Option<SerializeOptions>,
    ) -> Result<String, TransactionError> {
        let options = options.unwrap_or_else(SerializeOptions::for_signing);
        let hash = self.hasher.to_hash(data, &options)?;
        let signature = hex::encode(scheme_for(data.version).sign(&hash, keys)?);

        if data.signature.is_none() {
            data.signature = Some(signature.clone());
        }
        Ok(signature)
    }

    /// Signs everything but the second signature and stores the result.
    pub fn second_sign(
        &self,
        data: &mut TransactionData,
        keys: &KeyPair,
    ) -> Result<String, TransactionError> {
        let hash = self
            .hasher
            .to_hash(data, &SerializeOptions::for_second_signing())?;
        let signature = hex::encode(scheme_for(data.version).sign(&hash, keys)?);
        data.second_signature = Some(signature.clone());
        Ok(signature)
    }

    /// Appends a participant signature. `index` defaults to the number of
    /// signatures already collected.
    pub fn multi_sign(
        &self,
        data: &mut TransactionData,
        keys: &KeyPair,
        index: Option<u8>,
    ) -> Result<String, TransactionError> {
        let hash = self
            .hasher
            .to_hash(data, &SerializeOptions::for_multi_signing())?;
        let signature = schnorr_sign(&hash, keys)?;

        let signatures = data.signatures.get_or_insert_with(Vec::new);
        let index = match index {
            Some(index) => index,
            None => u8::try_from(signatures.len())
                .map_err(|_| TransactionError::encoding("signatures", "too many participants"))?,
        };
        let entry = format!("{:02x}{}", index, hex::encode(signature));
        signatures.push(entry.clone());

        debug!(index, collected = signatures.len(), "added multi-signature");
        Ok(entry)
    }
}

fn scheme_for(version: u8) -> SignatureScheme {
    if version == TRANSACTION_VERSION_LEGACY {
        SignatureScheme::Ecdsa
    } else {
        SignatureScheme::Schnorr
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
