//! Transaction verification: schema checks and cryptographic validation.
//!
//! Two independent questions:
//!
//! 1. **Is the data well-formed?** [`Verifier::verify_schema`] runs the
//!    variant's [`Schema`](super::schema::Schema) and reports every
//!    violation.
//! 2. **Are the signatures valid?** [`Verifier::verify`] checks the sender
//!    signature and, for multi-signature registrations, the participants.
//!
//! An invalid signature is `Ok(false)`, never an error. Errors are reserved
//! for data that cannot even be hashed.

use std::collections::HashSet;

use tracing::{debug, trace};

use super::asset::MultiSignatureAsset;
use super::context::ProtocolContext;
use super::data::TransactionData;
use super::error::TransactionError;
use super::hashing::TransactionHasher;
use super::schema::{SchemaContext, SchemaValidation, Validator};
use super::serializer::SerializeOptions;
use crate::config::{
    DEPRECATED_LEGACY_TYPES, MULTI_SIGNATURE_ENTRY_LENGTH, TRANSACTION_VERSION_LEGACY,
};
use crate::crypto::signatures::schnorr_verify;
use crate::crypto::{PublicKey, SignatureScheme};

#[derive(Debug, Clone)]
pub struct Verifier {
    context: ProtocolContext,
    hasher: TransactionHasher,
}

impl Verifier {
    pub fn new(context: ProtocolContext) -> Self {
        let hasher = TransactionHasher::new(context.clone());
        Self { context, hasher }
    }

    /// Full cryptographic check.
    ///
    /// Exception-listed ids pass unconditionally. Version-1 transactions of
    /// a deprecated type never pass.
    pub fn verify(&self, data: &TransactionData) -> Result<bool, TransactionError> {
        if self.context.is_exception(data) {
            debug!(id = ?data.id, "exception-listed transaction, skipping signature checks");
            return Ok(true);
        }

        if data.version == TRANSACTION_VERSION_LEGACY
            && DEPRECATED_LEGACY_TYPES.contains(&data.transaction_type)
        {
            return Ok(false);
        }

        let variant = self.context.registry.lookup(
            data.transaction_type,
            Some(data.type_group_or_core()),
            Some(data.version),
        )?;
        if let Some(participants) = variant.participants(data) {
            if !self.verify_signatures(data, &participants)? {
                return Ok(false);
            }
        }

        self.verify_hash(data)
    }

    /// The sender signature over the hash that excludes both signatures.
    pub fn verify_hash(&self, data: &TransactionData) -> Result<bool, TransactionError> {
        let Some(signature) = data.signature.as_deref() else {
            return Ok(false);
        };
        let hash = self
            .hasher
            .to_hash(data, &SerializeOptions::for_signing())?;
        Ok(check(data.version, &hash, signature, &data.sender_public_key))
    }

    /// The second signature against `public_key` (hex), over the hash that
    /// excludes only the second signature.
    pub fn verify_second_signature(
        &self,
        data: &TransactionData,
        public_key: &str,
    ) -> Result<bool, TransactionError> {
        let Some(signature) = data.second_signature() else {
            return Ok(false);
        };
        let hash = self
            .hasher
            .to_hash(data, &SerializeOptions::for_second_signing())?;
        Ok(check(data.version, &hash, signature, public_key))
    }

    /// Participant signatures against `multi_signature`.
    ///
    /// Passes when at least `min` signatures are present and every one of
    /// them is a valid Schnorr signature by the key at its index. A repeated
    /// index is an error.
    pub fn verify_signatures(
        &self,
        data: &TransactionData,
        multi_signature: &MultiSignatureAsset,
    ) -> Result<bool, TransactionError> {
        let signatures = match data.signatures.as_deref() {
            Some(signatures) if !signatures.is_empty() => signatures,
            _ => return Ok(false),
        };
        if signatures.len() < multi_signature.min as usize {
            trace!(
                collected = signatures.len(),
                min = multi_signature.min,
                "multi-signature below threshold"
            );
            return Ok(false);
        }

        let hash = self
            .hasher
            .to_hash(data, &SerializeOptions::for_multi_signing())?;

        let mut seen = HashSet::with_capacity(signatures.len());
        for entry in signatures {
            let Ok(bytes) = hex::decode(entry) else {
                return Ok(false);
            };
            if bytes.len() != MULTI_SIGNATURE_ENTRY_LENGTH {
                return Ok(false);
            }
            let index = bytes[0];
            if !seen.insert(index) {
                return Err(TransactionError::DuplicateParticipant { index });
            }

            let Some(key) = multi_signature.public_keys.get(index as usize) else {
                return Ok(false);
            };
            let Ok(key) = PublicKey::from_hex(key) else {
                return Ok(false);
            };
            if !schnorr_verify(&hash, &bytes[1..], &key) {
                trace!(index, "participant signature rejected");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Validates `data` against its variant's schema. An unregistered type
    /// is a [`TransactionError::SchemaId`] error; violations are reported in
    /// the returned [`SchemaValidation`].
    pub fn verify_schema(
        &self,
        data: &TransactionData,
        strict: bool,
    ) -> Result<SchemaValidation, TransactionError> {
        let variant = self
            .context
            .registry
            .lookup(
                data.transaction_type,
                Some(data.type_group_or_core()),
                Some(data.version),
            )
            .map_err(|_| TransactionError::SchemaId {
                transaction_type: data.transaction_type,
                type_group: data.type_group,
            })?;

        let context = SchemaContext {
            network_byte: self.context.network.network_byte(),
            milestone: self.context.milestone(),
            strict,
        };
        Ok(Validator::validate(&variant.schema(), data, &context))
    }
}

/// v1 is always ECDSA; later versions carry either scheme, told apart by length.
fn check(version: u8, hash: &[u8; 32], signature: &str, public_key: &str) -> bool {
    let Ok(signature) = hex::decode(signature) else {
        return false;
    };
    let Ok(public_key) = PublicKey::from_hex(public_key) else {
        return false;
    };
    let scheme = if version == TRANSACTION_VERSION_LEGACY {
        SignatureScheme::Ecdsa
    } else {
        SignatureScheme::detect(&signature)
    };
    scheme.verify(hash, &signature, &public_key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
