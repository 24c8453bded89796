//! Pre-AIP11 byte layout used to hash version-1 transactions.
//!
//! Version-1 ids and signatures were never computed over the wire form.
//! They cover this fixed-width layout instead:
//!
//! ```text
//! type (u8) | timestamp (u32) | sender public key (33)
//! recipient (21, zeroed unless applicable)
//! vendor field (padded to 64)
//! amount (i64) | fee (i64)
//! asset bytes (variant-specific)
//! signature | second signature
//! ```

use super::context::ProtocolContext;
use super::data::TransactionData;
use super::error::TransactionError;
use super::serializer::SerializeOptions;
use super::types::CoreTransactionType;
use super::variant::TransactionVariant;
use crate::config::{ADDRESS_LENGTH, LEGACY_VENDOR_FIELD_PADDING, PUBLIC_KEY_LENGTH};
use crate::crypto::{address, PublicKey};

pub(crate) fn legacy_bytes(
    context: &ProtocolContext,
    variant: &dyn TransactionVariant,
    data: &TransactionData,
    options: &SerializeOptions,
) -> Result<Vec<u8>, TransactionError> {
    let mut bytes = Vec::with_capacity(256);

    let transaction_type = u8::try_from(data.transaction_type).map_err(|_| {
        TransactionError::MalformedPayload(format!(
            "type {} does not fit the legacy layout",
            data.transaction_type
        ))
    })?;
    bytes.push(transaction_type);
    bytes.extend_from_slice(&data.timestamp.unwrap_or(0).to_le_bytes());

    let sender = decode_hex("senderPublicKey", &data.sender_public_key)?;
    if sender.len() != PUBLIC_KEY_LENGTH {
        return Err(TransactionError::encoding(
            "senderPublicKey",
            format!("expected {} bytes, got {}", PUBLIC_KEY_LENGTH, sender.len()),
        ));
    }
    bytes.extend_from_slice(&sender);

    bytes.extend_from_slice(&recipient_bytes(context, data)?);

    match data.vendor_field.as_deref() {
        Some(vendor_field) => {
            bytes.extend_from_slice(vendor_field.as_bytes());
            let padding = LEGACY_VENDOR_FIELD_PADDING.saturating_sub(vendor_field.len());
            bytes.resize(bytes.len() + padding, 0);
        }
        None => bytes.resize(bytes.len() + LEGACY_VENDOR_FIELD_PADDING, 0),
    }

    bytes.extend_from_slice(&data.amount.to_le_bytes());
    bytes.extend_from_slice(&data.fee.to_le_bytes());
    bytes.extend_from_slice(&variant.legacy_asset_bytes(data)?);

    if !options.exclude_signature {
        if let Some(signature) = &data.signature {
            bytes.extend_from_slice(&decode_hex("signature", signature)?);
        }
    }
    if !options.exclude_second_signature {
        if let Some(second) = data.second_signature() {
            bytes.extend_from_slice(&decode_hex("secondSignature", second)?);
        }
    }

    Ok(bytes)
}

/// Second-signature and multi-signature registrations historically hashed
/// a zeroed recipient. Broken ids hashed one anyway, falling back to the
/// sender's own address when none was set.
fn recipient_bytes(
    context: &ProtocolContext,
    data: &TransactionData,
) -> Result<[u8; ADDRESS_LENGTH], TransactionError> {
    let broken = data
        .id
        .as_deref()
        .is_some_and(|id| context.exceptions.is_broken_id(id));
    let hashes_recipient = data.transaction_type != CoreTransactionType::SecondSignature.code()
        && data.transaction_type != CoreTransactionType::MultiSignature.code();

    match data.recipient_id.as_deref() {
        Some(recipient) if broken || hashes_recipient => {
            address::to_bytes(recipient).map_err(|e| TransactionError::encoding("recipientId", e))
        }
        None if broken => {
            let sender = PublicKey::from_hex(&data.sender_public_key)?;
            let network = data
                .network
                .unwrap_or_else(|| context.network.network_byte());
            let recipient = address::from_public_key(&sender, network);
            address::to_bytes(&recipient).map_err(|e| TransactionError::encoding("recipientId", e))
        }
        _ => Ok([0u8; ADDRESS_LENGTH]),
    }
}

fn decode_hex(field: &'static str, value: &str) -> Result<Vec<u8>, TransactionError> {
    hex::decode(value).map_err(|e| TransactionError::encoding(field, e))
}
