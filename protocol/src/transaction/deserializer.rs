//! # Wire Decoding
//!
//! Inverse of the [serializer](super::serializer). The header tells us the
//! version and type; the registry supplies the variant that reads the
//! payload; whatever follows is the signature block.
//!
//! ## Signature block
//!
//! The block carries no length prefixes, so its shape is inferred from the
//! number of bytes left:
//!
//! - **v1** (ECDSA): each DER signature announces its own length in its
//!   second byte. A 0xFF byte where the second signature would start
//!   introduces the legacy multi-signature block, which is kept as one hex
//!   string.
//! - **v2**: Schnorr if the remainder is 64 or 128 bytes, a multiple of 65,
//!   or 64/128 bytes followed by a multiple of 65; ECDSA otherwise. Schnorr
//!   signatures are 64 bytes; multi-signature entries are an index byte
//!   plus a signature.
//!
//! Bytes that fit neither shape are a [`TransactionError::MalformedSignatureBlock`].

use std::collections::HashSet;

use tracing::trace;

use super::context::ProtocolContext;
use super::cursor::BinaryCursor;
use super::data::TransactionData;
use super::error::TransactionError;
use super::variant::TransactionVariant;
use crate::config::{
    CORE_TYPE_GROUP, LEGACY_MULTI_SIGNATURE_MARKER, MULTI_SIGNATURE_ENTRY_LENGTH,
    PUBLIC_KEY_LENGTH, SCHNORR_SIGNATURE_LENGTH, TRANSACTION_MARKER, TRANSACTION_VERSION_LEGACY,
};
use crate::transaction::types::CoreTransactionType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeserializeOptions {
    pub accept_legacy_version: bool,
    pub disable_version_check: bool,
}

#[derive(Debug, Clone)]
pub struct Deserializer {
    context: ProtocolContext,
}

impl Deserializer {
    pub fn new(context: ProtocolContext) -> Self {
        Self { context }
    }

    pub fn deserialize(
        &self,
        bytes: &[u8],
        options: &DeserializeOptions,
    ) -> Result<TransactionData, TransactionError> {
        let mut cursor = BinaryCursor::from_bytes(bytes);
        let mut data = Self::deserialize_common(&mut cursor)?;

        self.context.ensure_supported_version(
            data.version,
            options.accept_legacy_version,
            options.disable_version_check,
        )?;

        let variant = self.context.registry.lookup(
            data.transaction_type,
            data.type_group,
            Some(data.version),
        )?;
        Self::deserialize_vendor_field(variant.as_ref(), &mut data, &mut cursor)?;
        variant.deserialize_asset(&mut data, &mut cursor)?;

        if data.version == TRANSACTION_VERSION_LEGACY {
            Self::deserialize_ecdsa(&mut data, &mut cursor)?;
            apply_v1_compatibility(&mut data);
        } else if detect_schnorr(cursor.remaining()) {
            Self::deserialize_schnorr(&mut data, &mut cursor)?;
        } else {
            Self::deserialize_ecdsa(&mut data, &mut cursor)?;
        }

        trace!(kind = variant.name(), len = bytes.len(), "deserialized transaction");
        Ok(data)
    }

    fn deserialize_common(cursor: &mut BinaryCursor) -> Result<TransactionData, TransactionError> {
        let marker = cursor.read_u8()?;
        if marker != TRANSACTION_MARKER {
            return Err(TransactionError::MalformedPayload(format!(
                "expected marker byte 0xff, got {:#04x}",
                marker
            )));
        }

        let version = cursor.read_u8()?;
        let network = cursor.read_u8()?;
        let mut data = TransactionData {
            version,
            network: Some(network),
            ..TransactionData::default()
        };

        // Anything other than v1 uses the AIP11 header.
        if version == TRANSACTION_VERSION_LEGACY {
            data.transaction_type = cursor.read_u8()? as u16;
            data.timestamp = Some(cursor.read_u32_le()?);
            data.type_group = Some(CORE_TYPE_GROUP);
        } else {
            data.type_group = Some(cursor.read_u32_le()?);
            data.transaction_type = cursor.read_u16_le()?;
            data.nonce = Some(cursor.read_u64_le()?);
        }

        data.sender_public_key = cursor.read_hex(PUBLIC_KEY_LENGTH)?;
        data.fee = cursor.read_u64_le()?;
        Ok(data)
    }

    fn deserialize_vendor_field(
        variant: &dyn TransactionVariant,
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let length = cursor.read_u8()? as usize;
        if length == 0 {
            return Ok(());
        }
        if !variant.has_vendor_field() {
            return cursor.jump(length as isize);
        }
        let bytes = cursor.read_bytes(length)?;
        let vendor_field = String::from_utf8(bytes)
            .map_err(|e| TransactionError::encoding("vendorField", e))?;
        data.vendor_field = Some(vendor_field);
        Ok(())
    }

    fn deserialize_schnorr(
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        if can_read_single_schnorr(cursor.remaining()) {
            data.signature = Some(cursor.read_hex(SCHNORR_SIGNATURE_LENGTH)?);
        }
        if can_read_single_schnorr(cursor.remaining()) {
            data.second_signature = Some(cursor.read_hex(SCHNORR_SIGNATURE_LENGTH)?);
        }

        let remaining = cursor.remaining();
        if remaining == 0 {
            return Ok(());
        }
        if remaining % MULTI_SIGNATURE_ENTRY_LENGTH != 0 {
            return Err(TransactionError::MalformedSignatureBlock { remaining });
        }

        let mut seen = HashSet::new();
        let mut signatures = Vec::with_capacity(remaining / MULTI_SIGNATURE_ENTRY_LENGTH);
        while cursor.remaining() > 0 {
            let index = cursor.peek_u8(0)?;
            if !seen.insert(index) {
                return Err(TransactionError::DuplicateParticipant { index });
            }
            signatures.push(cursor.read_hex(MULTI_SIGNATURE_ENTRY_LENGTH)?);
        }
        data.signatures = Some(signatures);
        Ok(())
    }

    fn deserialize_ecdsa(
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        if cursor.remaining() > 0 && !at_multi_signature(cursor)? {
            let length = der_length(cursor)?;
            data.signature = Some(cursor.read_hex(length)?);
        }

        if cursor.remaining() > 0 && !at_multi_signature(cursor)? {
            let length = der_length(cursor)?;
            data.second_signature = Some(cursor.read_hex(length)?);
        }

        if cursor.remaining() > 0 && at_multi_signature(cursor)? {
            cursor.jump(1)?;
            let rest = cursor.remaining();
            data.signatures = Some(vec![cursor.read_hex(rest)?]);
        }

        match cursor.remaining() {
            0 => Ok(()),
            remaining => Err(TransactionError::MalformedSignatureBlock { remaining }),
        }
    }
}

fn can_read_single_schnorr(remaining: usize) -> bool {
    remaining > 0
        && (remaining % SCHNORR_SIGNATURE_LENGTH == 0
            || remaining % MULTI_SIGNATURE_ENTRY_LENGTH != 0)
}

/// DER: 0x30, then the length of the rest.
fn der_length(cursor: &BinaryCursor) -> Result<usize, TransactionError> {
    Ok(cursor.peek_u8(1)? as usize + 2)
}

fn at_multi_signature(cursor: &BinaryCursor) -> Result<bool, TransactionError> {
    Ok(cursor.peek_u8(0)? == LEGACY_MULTI_SIGNATURE_MARKER)
}

/// Whether a v2 signature block of `remaining` bytes is Schnorr-shaped.
pub fn detect_schnorr(remaining: usize) -> bool {
    let single = SCHNORR_SIGNATURE_LENGTH;
    let double = 2 * SCHNORR_SIGNATURE_LENGTH;
    let entry = MULTI_SIGNATURE_ENTRY_LENGTH;

    remaining == single
        || remaining == double
        || remaining % entry == 0
        || (remaining > single && (remaining - single) % entry == 0)
        || (remaining > double && (remaining - double) % entry == 0)
}

/// Normalizes v1 data to the shape v2 code expects: `second_signature`
/// filled from `sign_signature`, core type group, and `+`-prefixed legacy
/// multi-signature keys.
pub fn apply_v1_compatibility(data: &mut TransactionData) {
    if data.second_signature.is_none() {
        data.second_signature = data.sign_signature.clone();
    }
    data.type_group = Some(CORE_TYPE_GROUP);

    if data.transaction_type != CoreTransactionType::MultiSignature.code() {
        return;
    }
    let legacy = data
        .asset
        .as_mut()
        .and_then(|asset| asset.multi_signature_legacy.as_mut());
    if let Some(legacy) = legacy {
        for key in &mut legacy.keysgroup {
            if !key.starts_with('+') {
                key.insert(0, '+');
            }
        }
    }
}
