//! Per-kind payload data carried in [`TransactionData::asset`](super::TransactionData).
//!
//! Each kind owns one field; everything is optional so the same struct
//! holds any transaction's asset. Keys no built-in kind understands are
//! kept in `custom` for plugin variants.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::data::bignum;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAsset {
    /// Second-signature registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<SecondSignatureAsset>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate: Option<DelegateAsset>,

    /// `+<pubkey>` to vote, `-<pubkey>` to unvote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_signature: Option<MultiSignatureAsset>,

    /// v1 multi-signature registration; uses the `multisignature` key on the wire JSON.
    #[serde(
        default,
        rename = "multisignature",
        skip_serializing_if = "Option::is_none"
    )]
    pub multi_signature_legacy: Option<MultiSignatureLegacyAsset>,

    /// Base58 IPFS multihash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipfs: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payments: Option<Vec<MultiPaymentItem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock: Option<HtlcLockAsset>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim: Option<HtlcClaimAsset>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund: Option<HtlcRefundAsset>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_registration: Option<BusinessRegistrationAsset>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridgechain_registration: Option<BridgechainRegistrationAsset>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridgechain_resignation: Option<BridgechainResignationAsset>,

    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondSignatureAsset {
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateAsset {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSignatureAsset {
    pub min: u8,
    pub public_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSignatureLegacyAsset {
    pub min: u8,
    pub lifetime: u8,
    /// Participant keys, each prefixed with `+` once decoded.
    pub keysgroup: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiPaymentItem {
    #[serde(with = "bignum")]
    pub amount: u64,
    pub recipient_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtlcLockExpiration {
    /// 1 = epoch timestamp, 2 = block height.
    #[serde(rename = "type")]
    pub expiration_type: u8,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtlcLockAsset {
    pub secret_hash: String,
    pub expiration: HtlcLockExpiration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtlcClaimAsset {
    pub lock_transaction_id: String,
    pub unlock_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtlcRefundAsset {
    pub lock_transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRegistrationAsset {
    pub name: String,
    pub website: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgechainRegistrationAsset {
    pub name: String,
    pub seed_nodes: Vec<String>,
    pub genesis_hash: String,
    pub bridgechain_repository: String,
    /// Service name to port, in wire order.
    pub ports: IndexMap<String, u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgechainResignationAsset {
    pub bridgechain_id: String,
}
