//! Built-in transaction kinds.
//!
//! Core group (1): transfer, second signature, delegate registration and
//! resignation, vote, multi-signature (legacy and v2), IPFS, multi-payment,
//! HTLC lock/claim/refund. Magistrate group (2): business and bridgechain
//! registration and resignation.
//!
//! Kinds that exist in both wire versions register one variant per
//! version; the payload codec is shared where the layouts agree.

mod delegate;
mod htlc;
mod ipfs;
mod magistrate;
mod multi_payment;
mod multi_signature;
mod second_signature;
mod transfer;
mod vote;

use std::sync::Arc;

pub use delegate::{DelegateRegistration, DelegateResignation};
pub use htlc::{HtlcClaim, HtlcLock, HtlcRefund};
pub use ipfs::Ipfs;
pub use magistrate::{
    BridgechainRegistration, BridgechainResignation, BusinessRegistration, BusinessResignation,
};
pub use multi_payment::MultiPayment;
pub use multi_signature::{MultiSignatureLegacy, MultiSignatureRegistration};
pub use second_signature::SecondSignature;
pub use transfer::Transfer;
pub use vote::Vote;

use super::asset::TransactionAsset;
use super::cursor::BinaryCursor;
use super::data::TransactionData;
use super::error::TransactionError;
use super::variant::TransactionVariant;
use crate::config::{ADDRESS_LENGTH, TRANSACTION_VERSION_AIP11, TRANSACTION_VERSION_LEGACY};
use crate::crypto::address;

/// Every built-in variant, v1 codecs ahead of their v2 counterparts.
pub(crate) fn builtin() -> Vec<Arc<dyn TransactionVariant>> {
    vec![
        Arc::new(Transfer::new(TRANSACTION_VERSION_LEGACY)),
        Arc::new(Transfer::new(TRANSACTION_VERSION_AIP11)),
        Arc::new(SecondSignature::new(TRANSACTION_VERSION_LEGACY)),
        Arc::new(SecondSignature::new(TRANSACTION_VERSION_AIP11)),
        Arc::new(DelegateRegistration::new(TRANSACTION_VERSION_LEGACY)),
        Arc::new(DelegateRegistration::new(TRANSACTION_VERSION_AIP11)),
        Arc::new(Vote::new(TRANSACTION_VERSION_LEGACY)),
        Arc::new(Vote::new(TRANSACTION_VERSION_AIP11)),
        Arc::new(MultiSignatureLegacy),
        Arc::new(MultiSignatureRegistration),
        Arc::new(Ipfs),
        Arc::new(MultiPayment),
        Arc::new(DelegateResignation),
        Arc::new(HtlcLock),
        Arc::new(HtlcClaim),
        Arc::new(HtlcRefund),
        Arc::new(BusinessRegistration),
        Arc::new(BusinessResignation),
        Arc::new(BridgechainRegistration),
        Arc::new(BridgechainResignation),
    ]
}

// ---------------------------------------------------------------------------
// Shared field codecs
// ---------------------------------------------------------------------------

pub(crate) fn asset(data: &TransactionData) -> Result<&TransactionAsset, TransactionError> {
    data.asset.as_ref().ok_or(TransactionError::MissingAsset("asset"))
}

/// Writes a base58check address as its raw 21 bytes.
pub(crate) fn write_address(
    cursor: &mut BinaryCursor,
    recipient: Option<&str>,
) -> Result<(), TransactionError> {
    let recipient = recipient.ok_or(TransactionError::MissingAsset("recipientId"))?;
    let bytes =
        address::to_bytes(recipient).map_err(|e| TransactionError::encoding("recipientId", e))?;
    cursor.write_bytes(&bytes)
}

pub(crate) fn read_address(cursor: &mut BinaryCursor) -> Result<String, TransactionError> {
    let bytes: [u8; ADDRESS_LENGTH] = cursor.read_array()?;
    Ok(address::from_bytes(&bytes))
}

/// u8 length prefix followed by UTF-8 bytes.
pub(crate) fn write_short_string(
    cursor: &mut BinaryCursor,
    field: &'static str,
    value: &str,
) -> Result<(), TransactionError> {
    let length = u8::try_from(value.len())
        .map_err(|_| TransactionError::encoding(field, "longer than 255 bytes"))?;
    cursor.write_u8(length)?;
    cursor.write_bytes(value.as_bytes())
}

pub(crate) fn read_short_string(
    cursor: &mut BinaryCursor,
    field: &'static str,
) -> Result<String, TransactionError> {
    let length = cursor.read_u8()? as usize;
    let bytes = cursor.read_bytes(length)?;
    String::from_utf8(bytes).map_err(|e| TransactionError::encoding(field, e))
}

/// Like [`write_short_string`], with a zero length standing for "absent".
pub(crate) fn write_optional_string(
    cursor: &mut BinaryCursor,
    field: &'static str,
    value: Option<&str>,
) -> Result<(), TransactionError> {
    match value {
        Some(value) if !value.is_empty() => write_short_string(cursor, field, value),
        _ => cursor.write_u8(0),
    }
}

pub(crate) fn read_optional_string(
    cursor: &mut BinaryCursor,
    field: &'static str,
) -> Result<Option<String>, TransactionError> {
    let value = read_short_string(cursor, field)?;
    Ok((!value.is_empty()).then_some(value))
}

pub(crate) fn count_u8(field: &'static str, count: usize) -> Result<u8, TransactionError> {
    u8::try_from(count).map_err(|_| TransactionError::encoding(field, "more than 255 entries"))
}
