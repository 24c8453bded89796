//! # Transaction Factory
//!
//! The one way in for anything that should become a [`Transaction`]:
//! untrusted bytes, hex, or structured data.
//!
//! ## Pipeline
//!
//! ```text
//! bytes ──decode──▶ data ──id──▶ schema ──verify──▶ Transaction
//! data  ──schema──▶ v1 compat ──serialize──▶ bytes ──(as above)
//! ```
//!
//! Structured input always goes through its own serialized form, so a
//! transaction built from data is indistinguishable from one decoded off
//! the wire.
//!
//! ## Errors
//!
//! Version, schema and duplicate-participant errors reach the caller as
//! they are. Everything else raised while decoding is wrapped in
//! [`TransactionError::InvalidTransactionBytes`]. A bad signature is not an
//! error: the transaction comes back with `is_verified == false`.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::context::ProtocolContext;
use super::data::TransactionData;
use super::deserializer::{apply_v1_compatibility, DeserializeOptions, Deserializer};
use super::error::TransactionError;
use super::hashing::TransactionHasher;
use super::serializer::{SerializeOptions, Serializer};
use super::variant::TransactionVariant;
use super::verification::Verifier;
use crate::config::TRANSACTION_VERSION_LEGACY;

/// A decoded transaction together with the exact bytes it came from.
#[derive(Clone)]
pub struct Transaction {
    pub data: TransactionData,
    pub serialized: Vec<u8>,
    pub is_verified: bool,
    variant: Arc<dyn TransactionVariant>,
}

impl Transaction {
    pub fn id(&self) -> Option<&str> {
        self.data.id.as_deref()
    }

    pub fn serialized_hex(&self) -> String {
        hex::encode(&self.serialized)
    }

    pub fn variant(&self) -> &dyn TransactionVariant {
        self.variant.as_ref()
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.data.id)
            .field("kind", &self.variant.name())
            .field("version", &self.data.version)
            .field("is_verified", &self.is_verified)
            .field("len", &self.serialized.len())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct TransactionFactory {
    context: ProtocolContext,
    serializer: Serializer,
    deserializer: Deserializer,
    hasher: TransactionHasher,
    verifier: Verifier,
}

impl TransactionFactory {
    pub fn new(context: ProtocolContext) -> Self {
        Self {
            serializer: Serializer::new(context.clone()),
            deserializer: Deserializer::new(context.clone()),
            hasher: TransactionHasher::new(context.clone()),
            verifier: Verifier::new(context.clone()),
            context,
        }
    }

    pub fn context(&self) -> &ProtocolContext {
        &self.context
    }

    /// Decodes, identifies, validates and verifies untrusted bytes.
    /// `strict` requires an id and signatures at schema level.
    pub fn from_bytes(&self, bytes: &[u8], strict: bool) -> Result<Transaction, TransactionError> {
        self.decode(bytes, strict).map_err(|error| {
            debug!(%error, len = bytes.len(), "rejected transaction bytes");
            wrap(error)
        })
    }

    pub fn from_hex(&self, hex_str: &str, strict: bool) -> Result<Transaction, TransactionError> {
        let bytes = hex::decode(hex_str).map_err(|e| wrap(TransactionError::encoding("hex", e)))?;
        self.from_bytes(&bytes, strict)
    }

    /// Builds a transaction from structured data by way of its own
    /// serialized form.
    pub fn from_data(
        &self,
        data: &TransactionData,
        strict: bool,
    ) -> Result<Transaction, TransactionError> {
        let validation = self.verifier.verify_schema(data, strict)?;
        let mut value = validation.value;
        if let Some(error) = validation.error {
            if !self.context.is_exception(data) {
                return Err(TransactionError::Schema(error));
            }
            debug!(id = ?data.id, %error, "schema violation tolerated for exception");
        }

        if value.version == TRANSACTION_VERSION_LEGACY {
            apply_v1_compatibility(&mut value);
        }
        let bytes = self.serializer.serialize(&value, &SerializeOptions::default())?;
        self.from_bytes(&bytes, strict)
    }

    /// Decodes bytes from a trusted source: no version gate, no schema, no
    /// signature checks. The result is marked verified. `id` is computed
    /// when not supplied.
    pub fn from_bytes_unsafe(
        &self,
        bytes: &[u8],
        id: Option<String>,
    ) -> Result<Transaction, TransactionError> {
        let options = DeserializeOptions {
            accept_legacy_version: true,
            ..DeserializeOptions::default()
        };
        let build = || -> Result<Transaction, TransactionError> {
            let mut data = self.deserializer.deserialize(bytes, &options)?;
            data.id = match id {
                Some(id) => Some(id),
                None => Some(self.hasher.id_with(
                    &data,
                    &SerializeOptions {
                        accept_legacy_version: true,
                        ..SerializeOptions::default()
                    },
                )?),
            };
            let variant = self.variant_for(&data)?;
            Ok(Transaction {
                data,
                serialized: bytes.to_vec(),
                is_verified: true,
                variant,
            })
        };
        build().map_err(wrap)
    }

    /// Minimum fee the current milestone asks for `data`'s kind. Some kinds
    /// scale it with their payload. Admission does not enforce it.
    pub fn minimum_fee(&self, data: &TransactionData) -> Result<u64, TransactionError> {
        let variant = self.variant_for(data)?;
        Ok(variant.fee(data, self.context.milestone()))
    }

    fn decode(&self, bytes: &[u8], strict: bool) -> Result<Transaction, TransactionError> {
        let mut data = self
            .deserializer
            .deserialize(bytes, &DeserializeOptions::default())?;
        data.id = Some(self.hasher.id(&data)?);

        let validation = self.verifier.verify_schema(&data, strict)?;
        if let Some(error) = validation.error {
            if !self.context.is_exception(&data) {
                return Err(TransactionError::Schema(error));
            }
        }

        let is_verified = self.verifier.verify(&data)?;
        if !is_verified {
            warn!(id = ?data.id, "transaction signature did not verify");
        }

        let variant = self.variant_for(&data)?;
        Ok(Transaction {
            data,
            serialized: bytes.to_vec(),
            is_verified,
            variant,
        })
    }

    fn variant_for(
        &self,
        data: &TransactionData,
    ) -> Result<Arc<dyn TransactionVariant>, TransactionError> {
        self.context.registry.lookup(
            data.transaction_type,
            Some(data.type_group_or_core()),
            Some(data.version),
        )
    }
}

fn wrap(error: TransactionError) -> TransactionError {
    match error {
        error if error.is_propagated() => error,
        error @ TransactionError::InvalidTransactionBytes(_) => error,
        error => TransactionError::InvalidTransactionBytes(Box::new(error)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkPreset;
    use crate::crypto::{address, KeyPair};
    use crate::transaction::asset::MultiSignatureAsset;
    use crate::transaction::signing::Signer;

    fn factory() -> TransactionFactory {
        TransactionFactory::new(
            ProtocolContext::from_preset(&NetworkPreset::devnet().unwrap())
                .unwrap()
                .0,
        )
    }

    fn signed_transfer(factory: &TransactionFactory) -> TransactionData {
        let keys = KeyPair::from_passphrase("factory").unwrap();
        let mut data = TransactionData {
            nonce: Some(1),
            network: Some(30),
            sender_public_key: keys.public_key().to_hex(),
            recipient_id: Some(address::from_public_key(&keys.public_key(), 30)),
            amount: 1_000_000_000,
            fee: 10_000_000,
            expiration: Some(0),
            ..TransactionData::default()
        };
        Signer::new(factory.context().clone())
            .sign(&mut data, &keys, None)
            .unwrap();
        data
    }

    #[test]
    fn from_data_round_trips() {
        let factory = factory();
        let data = signed_transfer(&factory);
        let transaction = factory.from_data(&data, false).unwrap();
        assert!(transaction.is_verified);
        assert_eq!(transaction.variant().name(), "transfer");
        assert_eq!(transaction.id().map(str::len), Some(64));

        let again = factory.from_bytes(&transaction.serialized, true).unwrap();
        assert_eq!(again.data, transaction.data);
        assert_eq!(
            factory.from_hex(&transaction.serialized_hex(), true).unwrap().id(),
            transaction.id()
        );
    }

    #[test]
    fn bad_signature_is_unverified_not_an_error() {
        let factory = factory();
        let mut data = signed_transfer(&factory);
        data.signature = Some("11".repeat(64));
        let transaction = factory.from_data(&data, true).unwrap_err();
        // strict mode still needs an id, which structured input lacks
        assert!(matches!(transaction, TransactionError::Schema(_)));

        let transaction = factory.from_data(&data, false).unwrap();
        assert!(!transaction.is_verified);
    }

    #[test]
    fn truncated_bytes_are_wrapped() {
        let factory = factory();
        let transaction = factory
            .from_data(&signed_transfer(&factory), false)
            .unwrap();
        let truncated = &transaction.serialized[..transaction.serialized.len() - 70];
        match factory.from_bytes(truncated, false) {
            Err(TransactionError::InvalidTransactionBytes(_)) => {}
            other => panic!("expected InvalidTransactionBytes, got {:?}", other),
        }
    }

    #[test]
    fn invalid_hex_is_wrapped() {
        match factory().from_hex("zz", false) {
            Err(TransactionError::InvalidTransactionBytes(inner)) => {
                assert!(matches!(*inner, TransactionError::InvalidEncoding { .. }))
            }
            other => panic!("expected InvalidTransactionBytes, got {:?}", other),
        }
    }

    #[test]
    fn unsafe_path_trusts_the_caller() {
        let factory = factory();
        let mut data = signed_transfer(&factory);
        data.signature = Some("11".repeat(64));
        let bytes = Serializer::new(factory.context().clone())
            .serialize(&data, &SerializeOptions::default())
            .unwrap();

        let transaction = factory
            .from_bytes_unsafe(&bytes, Some("ab".repeat(32)))
            .unwrap();
        assert!(transaction.is_verified);
        assert_eq!(transaction.id(), Some("ab".repeat(32).as_str()));

        let computed = factory.from_bytes_unsafe(&bytes, None).unwrap();
        assert_eq!(computed.id().map(str::len), Some(64));
    }

    #[test]
    fn minimum_fee_follows_milestone_and_payload() {
        let factory = factory();
        let fees = &factory.context().milestone().fees;
        let transfer = signed_transfer(&factory);
        assert_eq!(
            factory.minimum_fee(&transfer).unwrap(),
            fees.static_fee("transfer").unwrap()
        );

        let mut registration = TransactionData {
            transaction_type: 4,
            nonce: Some(1),
            ..TransactionData::default()
        };
        registration.asset_mut().multi_signature = Some(MultiSignatureAsset {
            min: 2,
            public_keys: vec!["02".repeat(33); 3],
        });
        assert_eq!(
            factory.minimum_fee(&registration).unwrap(),
            fees.static_fee("multiSignature").unwrap() * 4
        );

        let unknown = TransactionData {
            transaction_type: 99,
            ..TransactionData::default()
        };
        match factory.minimum_fee(&unknown) {
            Err(TransactionError::UnknownType { .. }) => {}
            other => panic!("expected UnknownType, got {:?}", other),
        }
    }

    #[test]
    fn wrap_keeps_propagated_errors() {
        assert!(matches!(
            wrap(TransactionError::UnsupportedVersion { version: 9 }),
            TransactionError::UnsupportedVersion { version: 9 }
        ));
        assert!(matches!(
            wrap(TransactionError::MalformedSignatureBlock { remaining: 3 }),
            TransactionError::InvalidTransactionBytes(_)
        ));
    }
}
