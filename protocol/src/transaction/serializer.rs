//! # Wire Encoding
//!
//! Layout of a serialized transaction:
//!
//! ```text
//! 0xFF | version | network
//! v1:  type (u8)  | timestamp (u32)
//! v2:  type group (u32) | type (u16) | nonce (u64)
//! sender public key (33) | fee (u64)
//! vendor field: u8 length + UTF-8 (length 0 when absent or unsupported)
//! asset payload (variant-specific)
//! signature | second signature | multi-signature block
//! ```
//!
//! Integers are little-endian. The multi-signature block is a 0xFF marker
//! plus concatenated legacy signatures for v1, and concatenated
//! `index ‖ signature` tuples for v2.

use tracing::trace;

use super::context::ProtocolContext;
use super::cursor::BinaryCursor;
use super::data::TransactionData;
use super::error::TransactionError;
use super::variant::TransactionVariant;
use crate::config::{
    LEGACY_MULTI_SIGNATURE_MARKER, PUBLIC_KEY_LENGTH, TRANSACTION_MARKER,
    TRANSACTION_VERSION_LEGACY,
};

/// Which parts of the signature block to leave out, plus version-gate bypasses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    pub exclude_signature: bool,
    pub exclude_second_signature: bool,
    pub exclude_multi_signature: bool,
    pub accept_legacy_version: bool,
    pub disable_version_check: bool,
}

impl SerializeOptions {
    /// The layout a sender signs: no signatures at all.
    pub fn for_signing() -> Self {
        Self {
            exclude_signature: true,
            exclude_second_signature: true,
            ..Self::default()
        }
    }

    /// The layout a second signer signs: everything but the second signature.
    pub fn for_second_signing() -> Self {
        Self {
            exclude_second_signature: true,
            ..Self::default()
        }
    }

    /// The layout multi-signature participants sign.
    pub fn for_multi_signing() -> Self {
        Self {
            exclude_signature: true,
            exclude_second_signature: true,
            exclude_multi_signature: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Serializer {
    context: ProtocolContext,
}

impl Serializer {
    pub fn new(context: ProtocolContext) -> Self {
        Self { context }
    }

    pub fn serialize(
        &self,
        data: &TransactionData,
        options: &SerializeOptions,
    ) -> Result<Vec<u8>, TransactionError> {
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

        let mut cursor = BinaryCursor::with_capacity(self.context.milestone().block.max_payload);
        self.serialize_common(data, &mut cursor)?;
        self.serialize_vendor_field(variant.as_ref(), data, &mut cursor)?;
        variant.serialize_asset(data, &mut cursor)?;
        self.serialize_signatures(data, options, &mut cursor)?;

        let bytes = cursor.into_bytes();
        trace!(kind = variant.name(), len = bytes.len(), "serialized transaction");
        Ok(bytes)
    }

    fn serialize_common(
        &self,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        cursor.write_u8(TRANSACTION_MARKER)?;
        cursor.write_u8(data.version)?;
        cursor.write_u8(
            data.network
                .unwrap_or_else(|| self.context.network.network_byte()),
        )?;

        if data.version == TRANSACTION_VERSION_LEGACY {
            let transaction_type = u8::try_from(data.transaction_type).map_err(|_| {
                TransactionError::MalformedPayload(format!(
                    "type {} does not fit the legacy header",
                    data.transaction_type
                ))
            })?;
            cursor.write_u8(transaction_type)?;
            cursor.write_u32_le(data.timestamp.unwrap_or(0))?;
        } else {
            cursor.write_u32_le(data.type_group_or_core())?;
            cursor.write_u16_le(data.transaction_type)?;
            cursor.write_u64_le(data.nonce.unwrap_or(0))?;
        }

        cursor.write_hex(
            "senderPublicKey",
            &data.sender_public_key,
            Some(PUBLIC_KEY_LENGTH),
        )?;
        cursor.write_u64_le(data.fee)
    }

    fn serialize_vendor_field(
        &self,
        variant: &dyn TransactionVariant,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let vendor_field = data
            .vendor_field
            .as_deref()
            .filter(|_| variant.has_vendor_field());
        let Some(vendor_field) = vendor_field else {
            return cursor.write_u8(0);
        };

        let max = self
            .context
            .milestone()
            .vendor_field_length
            .min(u8::MAX as usize);
        let length = vendor_field.len();
        if length > max {
            return Err(TransactionError::VendorFieldTooLarge { length, max });
        }
        cursor.write_u8(length as u8)?;
        cursor.write_bytes(vendor_field.as_bytes())
    }

    fn serialize_signatures(
        &self,
        data: &TransactionData,
        options: &SerializeOptions,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        if !options.exclude_signature {
            if let Some(signature) = &data.signature {
                cursor.write_hex("signature", signature, None)?;
            }
        }

        if !options.exclude_second_signature {
            if let Some(second) = data.second_signature() {
                cursor.write_hex("secondSignature", second, None)?;
            }
        }

        if options.exclude_multi_signature {
            return Ok(());
        }
        if let Some(signatures) = &data.signatures {
            if data.version == TRANSACTION_VERSION_LEGACY {
                cursor.write_u8(LEGACY_MULTI_SIGNATURE_MARKER)?;
            }
            for signature in signatures {
                cursor.write_hex("signatures", signature, None)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Milestone, NetworkPreset, StaticNetworkConfig};
    use crate::crypto::{address, KeyPair};
    use crate::transaction::context::ProtocolContext;
    use std::sync::Arc;

    fn context() -> ProtocolContext {
        ProtocolContext::from_preset(&NetworkPreset::devnet().unwrap())
            .unwrap()
            .0
    }

    fn transfer(version: u8) -> TransactionData {
        let keys = KeyPair::from_passphrase("serializer").unwrap();
        TransactionData {
            version,
            transaction_type: 0,
            nonce: (version == 2).then_some(3),
            timestamp: (version == 1).then_some(99),
            sender_public_key: keys.public_key().to_hex(),
            fee: 10_000_000,
            amount: 1,
            recipient_id: Some(address::from_public_key(&keys.public_key(), 30)),
            ..TransactionData::default()
        }
    }

    #[test]
    fn v2_header_layout() {
        let bytes = Serializer::new(context())
            .serialize(&transfer(2), &SerializeOptions::default())
            .unwrap();
        assert_eq!(&bytes[..3], &[0xff, 2, 30]);
        assert_eq!(&bytes[3..7], &1u32.to_le_bytes());
        assert_eq!(&bytes[7..9], &0u16.to_le_bytes());
        assert_eq!(&bytes[9..17], &3u64.to_le_bytes());
        assert_eq!(&bytes[50..58], &10_000_000u64.to_le_bytes());
        // no vendor field
        assert_eq!(bytes[58], 0);
        assert_eq!(bytes.len(), 59 + 33);
    }

    #[test]
    fn v1_header_layout() {
        let bytes = Serializer::new(context())
            .serialize(&transfer(1), &SerializeOptions::default())
            .unwrap();
        assert_eq!(&bytes[..4], &[0xff, 1, 30, 0]);
        assert_eq!(&bytes[4..8], &99u32.to_le_bytes());
        assert_eq!(bytes.len(), 8 + 33 + 8 + 1 + 33);
    }

    #[test]
    fn vendor_field_over_cap_fails() {
        let mut data = transfer(2);
        data.vendor_field = Some("x".repeat(65));
        match Serializer::new(context()).serialize(&data, &SerializeOptions::default()) {
            Err(TransactionError::VendorFieldTooLarge {
                length: 65,
                max: 64,
            }) => {}
            other => panic!("expected VendorFieldTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn vendor_field_dropped_for_unsupported_kind() {
        let mut data = transfer(2);
        data.transaction_type = 7;
        data.recipient_id = None;
        data.vendor_field = Some("memo".into());
        let bytes = Serializer::new(context())
            .serialize(&data, &SerializeOptions::default())
            .unwrap();
        assert_eq!(bytes.len(), 59);
        assert_eq!(bytes[58], 0);
    }

    #[test]
    fn signature_exclusions() {
        let mut data = transfer(2);
        data.signature = Some("aa".repeat(64));
        data.second_signature = Some("bb".repeat(64));
        data.signatures = Some(vec![format!("00{}", "cc".repeat(64))]);
        let serializer = Serializer::new(context());

        let full = serializer.serialize(&data, &SerializeOptions::default()).unwrap();
        let signing = serializer.serialize(&data, &SerializeOptions::for_signing()).unwrap();
        let second = serializer
            .serialize(&data, &SerializeOptions::for_second_signing())
            .unwrap();
        let multi = serializer
            .serialize(&data, &SerializeOptions::for_multi_signing())
            .unwrap();

        assert_eq!(full.len(), signing.len() + 64 + 64);
        assert_eq!(second.len(), signing.len() + 64);
        assert_eq!(multi.len(), signing.len() - 65);
    }

    #[test]
    fn v2_rejected_before_aip11() {
        let network = Arc::new(StaticNetworkConfig::single(30, Milestone::default()));
        let context =
            ProtocolContext::with_core_types(network, Arc::new(crate::config::Exceptions::new()))
                .unwrap();
        let serializer = Serializer::new(context);
        match serializer.serialize(&transfer(2), &SerializeOptions::default()) {
            Err(TransactionError::UnsupportedVersion { version: 2 }) => {}
            other => panic!("expected UnsupportedVersion, got {:?}", other),
        }
        let options = SerializeOptions {
            accept_legacy_version: true,
            ..SerializeOptions::default()
        };
        assert!(serializer.serialize(&transfer(2), &options).is_ok());
    }
}
