use thiserror::Error;

use super::schema::SchemaError;
use super::types::TransactionTypeKey;
use crate::crypto::{KeyError, SignatureError};

/// Everything that can go wrong between raw bytes (or JSON) and a verified
/// transaction.
///
/// Cryptographic verification failures are NOT errors: a bad signature
/// yields `Ok(false)` from the verifier.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// No variant registered for this type (and group, when given).
    #[error("unknown transaction type {transaction_type} in group {}", display_group(.type_group))]
    UnknownType {
        transaction_type: u16,
        type_group: Option<u32>,
    },

    /// A variant with the same key and version is already registered.
    #[error("transaction type {key} version {version} is already registered")]
    DuplicateType { key: TransactionTypeKey, version: u8 },

    /// Custom variants must use a type number at or above the custom floor.
    #[error("custom transaction type {transaction_type} is below the custom type floor")]
    InvalidCustomTypeRange { transaction_type: u16 },

    /// Built-in variants cannot be deregistered.
    #[error("transaction type {key} is not a custom type and cannot be removed")]
    CoreTypeNotRemovable { key: TransactionTypeKey },

    /// The wire version is not enabled at the current milestone.
    #[error("transaction version {version} is not supported")]
    UnsupportedVersion { version: u8 },

    /// A read or write would cross the buffer limit.
    #[error("buffer bounds exceeded: {requested} bytes at offset {offset} with limit {limit}")]
    BufferBounds {
        offset: usize,
        requested: usize,
        limit: usize,
    },

    /// The payload is structurally wrong for its variant.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Bytes left after the signatures that fit no known layout.
    #[error("malformed signature block: {remaining} trailing bytes")]
    MalformedSignatureBlock { remaining: usize },

    /// Two multi-signature entries claim the same participant index.
    #[error("duplicate multi-signature participant index {index}")]
    DuplicateParticipant { index: u8 },

    #[error("vendor field is {length} bytes, the limit is {max}")]
    VendorFieldTooLarge { length: usize, max: usize },

    /// The variant needs an asset field that the data does not carry.
    #[error("missing asset field `{0}`")]
    MissingAsset(&'static str),

    /// A hex, base58 or address field failed to decode.
    #[error("invalid {field}: {reason}")]
    InvalidEncoding { field: &'static str, reason: String },

    /// The data failed schema validation.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// No schema can be derived for the data's type.
    #[error("no schema for transaction type {transaction_type} in group {}", display_group(.type_group))]
    SchemaId {
        transaction_type: u16,
        type_group: Option<u32>,
    },

    /// Any non-propagated failure while building a transaction from bytes.
    #[error("invalid transaction bytes: {0}")]
    InvalidTransactionBytes(#[source] Box<TransactionError>),

    #[error("key error: {0}")]
    Key(#[from] KeyError),

    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),
}

impl TransactionError {
    /// Errors the factory passes through unchanged instead of wrapping them
    /// in [`TransactionError::InvalidTransactionBytes`].
    pub fn is_propagated(&self) -> bool {
        matches!(
            self,
            TransactionError::UnsupportedVersion { .. }
                | TransactionError::Schema(_)
                | TransactionError::SchemaId { .. }
                | TransactionError::DuplicateParticipant { .. }
        )
    }

    pub(crate) fn encoding(field: &'static str, reason: impl ToString) -> Self {
        TransactionError::InvalidEncoding {
            field,
            reason: reason.to_string(),
        }
    }
}

fn display_group(group: &Option<u32>) -> String {
    match group {
        Some(group) => group.to_string(),
        None => "any".to_string(),
    }
}
