//! Hash inputs and ids.
//!
//! Version 1 hashes the [legacy layout](super::legacy); everything newer
//! hashes the wire form produced by the [`Serializer`]. Which signature
//! blocks are included is controlled by [`SerializeOptions`].

use super::context::ProtocolContext;
use super::data::TransactionData;
use super::error::TransactionError;
use super::legacy::legacy_bytes;
use super::serializer::{SerializeOptions, Serializer};
use crate::config::TRANSACTION_VERSION_LEGACY;
use crate::crypto::sha256;

#[derive(Debug, Clone)]
pub struct TransactionHasher {
    context: ProtocolContext,
    serializer: Serializer,
}

impl TransactionHasher {
    pub fn new(context: ProtocolContext) -> Self {
        let serializer = Serializer::new(context.clone());
        Self {
            context,
            serializer,
        }
    }

    /// The bytes a hash is computed over.
    pub fn to_bytes(
        &self,
        data: &TransactionData,
        options: &SerializeOptions,
    ) -> Result<Vec<u8>, TransactionError> {
        if data.version != TRANSACTION_VERSION_LEGACY {
            return self.serializer.serialize(data, options);
        }

        self.context.ensure_supported_version(
            data.version,
            options.accept_legacy_version,
            options.disable_version_check,
        )?;
        let variant = self.context.registry.lookup(
            data.transaction_type,
            Some(data.type_group_or_core()),
            Some(data.version),
        )?;
        legacy_bytes(&self.context, variant.as_ref(), data, options)
    }

    pub fn to_hash(
        &self,
        data: &TransactionData,
        options: &SerializeOptions,
    ) -> Result<[u8; 32], TransactionError> {
        Ok(sha256(&self.to_bytes(data, options)?))
    }

    /// Hex id over the fully signed form, replaced by its recorded
    /// counterpart when the id-fix table has one.
    pub fn id(&self, data: &TransactionData) -> Result<String, TransactionError> {
        self.id_with(data, &SerializeOptions::default())
    }

    /// [`id`](Self::id) with version-gate bypasses from `options`.
    /// Signature exclusions in `options` are ignored.
    pub fn id_with(
        &self,
        data: &TransactionData,
        options: &SerializeOptions,
    ) -> Result<String, TransactionError> {
        let options = SerializeOptions {
            accept_legacy_version: options.accept_legacy_version,
            disable_version_check: options.disable_version_check,
            ..SerializeOptions::default()
        };
        let id = hex::encode(self.to_hash(data, &options)?);
        Ok(match self.context.exceptions.transaction_id_fix(&id) {
            Some(fixed) => fixed.to_string(),
            None => id,
        })
    }
}
