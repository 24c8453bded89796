//! The canonical in-memory form of a transaction.
//!
//! [`TransactionData`] mirrors the JSON shape nodes exchange: camelCase
//! keys, hex strings for keys and signatures, base58 addresses, and
//! monetary values as decimal strings. Numbers are accepted on input for
//! monetary fields as well.

use serde::{Deserialize, Serialize};

use super::asset::{MultiSignatureAsset, TransactionAsset};
use super::types::TransactionTypeKey;
use crate::config::{CORE_TYPE_GROUP, TRANSACTION_VERSION_AIP11, TRANSACTION_VERSION_LEGACY};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// JSON without a version predates versioning and reads as v1.
    /// [`TransactionData::default`] builds new v2 records instead.
    #[serde(default = "default_version")]
    pub version: u8,

    /// Network byte; the configured network is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_group: Option<u32>,

    #[serde(rename = "type")]
    pub transaction_type: u16,

    /// v1 only: seconds since the network epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u32>,

    /// v2 only: per-sender sequence number.
    #[serde(
        default,
        with = "bignum::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub nonce: Option<u64>,

    pub sender_public_key: String,

    #[serde(with = "bignum")]
    pub fee: u64,

    #[serde(default, with = "bignum")]
    pub amount: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<TransactionAsset>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_signature: Option<String>,

    /// Legacy spelling of `second_signature`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_signature: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signatures: Option<Vec<String>>,
}

fn default_version() -> u8 {
    TRANSACTION_VERSION_LEGACY
}

/// A fresh AIP11 (v2) record in the core group. Deserialization uses
/// `default_version` instead, so versionless legacy JSON stays v1.
impl Default for TransactionData {
    fn default() -> Self {
        Self {
            id: None,
            version: TRANSACTION_VERSION_AIP11,
            network: None,
            type_group: Some(CORE_TYPE_GROUP),
            transaction_type: 0,
            timestamp: None,
            nonce: None,
            sender_public_key: String::new(),
            fee: 0,
            amount: 0,
            recipient_id: None,
            vendor_field: None,
            expiration: None,
            asset: None,
            signature: None,
            second_signature: None,
            sign_signature: None,
            signatures: None,
        }
    }
}

impl TransactionData {
    /// The effective type group: v1 transactions are always core.
    pub fn type_group_or_core(&self) -> u32 {
        if self.version == TRANSACTION_VERSION_LEGACY {
            CORE_TYPE_GROUP
        } else {
            self.type_group.unwrap_or(CORE_TYPE_GROUP)
        }
    }

    pub fn type_key(&self) -> TransactionTypeKey {
        TransactionTypeKey::new(self.type_group_or_core(), self.transaction_type)
    }

    /// `second_signature`, falling back to the legacy `sign_signature`.
    pub fn second_signature(&self) -> Option<&str> {
        self.second_signature
            .as_deref()
            .or(self.sign_signature.as_deref())
    }

    pub fn asset_mut(&mut self) -> &mut TransactionAsset {
        self.asset.get_or_insert_with(TransactionAsset::default)
    }

    pub fn multi_signature(&self) -> Option<&MultiSignatureAsset> {
        self.asset.as_ref()?.multi_signature.as_ref()
    }
}

/// Serde adapter for `u64` monetary values: written as decimal strings,
/// read from either strings or JSON numbers.
pub mod bignum {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        deserializer.deserialize_any(BigNumVisitor)
    }

    struct BigNumVisitor;

    impl<'de> Visitor<'de> for BigNumVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer or decimal string")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<u64, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<u64, E> {
            u64::try_from(value).map_err(|_| E::custom(format!("negative value {}", value)))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<u64, E> {
            value
                .parse::<u64>()
                .map_err(|_| E::custom(format!("invalid integer string {:?}", value)))
        }
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<u64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.collect_str(value),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<u64>, D::Error> {
            #[derive(Deserialize)]
            struct Wrapper(#[serde(with = "super")] u64);

            let value: Option<Wrapper> = Option::deserialize(deserializer)?;
            Ok(value.map(|Wrapper(inner)| inner))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_node_json() {
        let data: TransactionData = serde_json::from_str(
            r#"{
                "version": 2,
                "network": 30,
                "typeGroup": 1,
                "type": 0,
                "nonce": "5",
                "senderPublicKey": "03aa",
                "fee": "10000000",
                "amount": 1000000000,
                "recipientId": "D61mfSggzbvQgTUe6JhYKH2doHaqJ3Dyib"
            }"#,
        )
        .unwrap();
        assert_eq!(data.nonce, Some(5));
        assert_eq!(data.fee, 10_000_000);
        assert_eq!(data.amount, 1_000_000_000);
        assert_eq!(data.type_key(), TransactionTypeKey::core(0));
    }

    #[test]
    fn versionless_json_is_legacy_but_default_is_v2() {
        let data: TransactionData = serde_json::from_str(
            r#"{
                "type": 0,
                "timestamp": 1000,
                "senderPublicKey": "03aa",
                "fee": "10000000"
            }"#,
        )
        .unwrap();
        assert_eq!(data.version, TRANSACTION_VERSION_LEGACY);
        assert_eq!(data.type_group, None);
        assert_eq!(data.type_group_or_core(), CORE_TYPE_GROUP);

        assert_eq!(TransactionData::default().version, TRANSACTION_VERSION_AIP11);
    }

    #[test]
    fn serializes_amounts_as_strings() {
        let data = TransactionData {
            fee: 25,
            amount: 7,
            nonce: Some(3),
            ..TransactionData::default()
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["fee"], "25");
        assert_eq!(json["amount"], "7");
        assert_eq!(json["nonce"], "3");
        assert!(json.get("signature").is_none());
    }

    #[test]
    fn version_defaults_to_legacy_in_json() {
        let data: TransactionData = serde_json::from_str(
            r#"{ "type": 3, "senderPublicKey": "03aa", "fee": 1, "typeGroup": 5 }"#,
        )
        .unwrap();
        assert_eq!(data.version, 1);
        // v1 ignores whatever group the JSON claims.
        assert_eq!(data.type_group_or_core(), CORE_TYPE_GROUP);
    }

    #[test]
    fn rejects_negative_fee() {
        let result: Result<TransactionData, _> =
            serde_json::from_str(r#"{ "type": 0, "senderPublicKey": "03", "fee": -1 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn second_signature_falls_back_to_sign_signature() {
        let data = TransactionData {
            sign_signature: Some("ab".into()),
            ..TransactionData::default()
        };
        assert_eq!(data.second_signature(), Some("ab"));
    }
}
