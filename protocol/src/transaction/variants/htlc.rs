//! Hash time-locked contracts: lock funds behind a SHA-256 hash, claim
//! them with the preimage, or refund them after expiry.

use super::{asset, read_address, write_address};
use crate::config::HASH_LENGTH;
use crate::transaction::asset::{
    HtlcClaimAsset, HtlcLockAsset, HtlcLockExpiration, HtlcRefundAsset,
};
use crate::transaction::cursor::BinaryCursor;
use crate::transaction::data::TransactionData;
use crate::transaction::error::TransactionError;
use crate::transaction::schema::{is_hex, Bounds, FieldRule, Schema, SchemaContext, Violations};
use crate::transaction::types::CoreTransactionType;
use crate::transaction::variant::TransactionVariant;

/// Expiration measured as an epoch timestamp.
pub const EXPIRATION_EPOCH_TIMESTAMP: u8 = 1;
/// Expiration measured as a block height.
pub const EXPIRATION_BLOCK_HEIGHT: u8 = 2;

// ---------------------------------------------------------------------------
// Lock
// ---------------------------------------------------------------------------

/// Payload: amount (u64), secret hash (32), expiration type (u8),
/// expiration value (u32), recipient (21).
#[derive(Debug, Clone, Copy)]
pub struct HtlcLock;

fn check_lock(data: &TransactionData, _: &SchemaContext<'_>, out: &mut Violations) {
    let Some(lock) = data.asset.as_ref().and_then(|asset| asset.lock.as_ref()) else {
        out.push("asset.lock", "is required");
        return;
    };
    if !is_hex(&lock.secret_hash, Some(HASH_LENGTH * 2)) {
        out.push("asset.lock.secretHash", "must be 64-char hex");
    }
    let kind = lock.expiration.expiration_type;
    if kind != EXPIRATION_EPOCH_TIMESTAMP && kind != EXPIRATION_BLOCK_HEIGHT {
        out.push("asset.lock.expiration.type", "must be 1 (timestamp) or 2 (height)");
    }
}

impl TransactionVariant for HtlcLock {
    fn name(&self) -> &'static str {
        "htlcLock"
    }

    fn transaction_type(&self) -> u16 {
        CoreTransactionType::HtlcLock.code()
    }

    fn has_vendor_field(&self) -> bool {
        true
    }

    fn schema(&self) -> Schema {
        Schema::new("htlcLock")
            .fee(Bounds::at_least(1))
            .recipient(FieldRule::Required)
            .with_vendor_field()
            .requires_htlc()
            .rule(check_lock)
    }

    fn serialize_asset(
        &self,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let lock = asset(data)?
            .lock
            .as_ref()
            .ok_or(TransactionError::MissingAsset("lock"))?;
        cursor.write_u64_le(data.amount)?;
        cursor.write_hex("asset.lock.secretHash", &lock.secret_hash, Some(HASH_LENGTH))?;
        cursor.write_u8(lock.expiration.expiration_type)?;
        cursor.write_u32_le(lock.expiration.value)?;
        write_address(cursor, data.recipient_id.as_deref())
    }

    fn deserialize_asset(
        &self,
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        data.amount = cursor.read_u64_le()?;
        let secret_hash = cursor.read_hex(HASH_LENGTH)?;
        let expiration = HtlcLockExpiration {
            expiration_type: cursor.read_u8()?,
            value: cursor.read_u32_le()?,
        };
        data.recipient_id = Some(read_address(cursor)?);
        data.asset_mut().lock = Some(HtlcLockAsset {
            secret_hash,
            expiration,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Claim
// ---------------------------------------------------------------------------

/// Payload: lock transaction id (32), unlock secret (32).
#[derive(Debug, Clone, Copy)]
pub struct HtlcClaim;

fn check_claim(data: &TransactionData, _: &SchemaContext<'_>, out: &mut Violations) {
    let Some(claim) = data.asset.as_ref().and_then(|asset| asset.claim.as_ref()) else {
        out.push("asset.claim", "is required");
        return;
    };
    if !is_hex(&claim.lock_transaction_id, Some(64)) {
        out.push("asset.claim.lockTransactionId", "must be 64-char hex");
    }
    if !is_hex(&claim.unlock_secret, Some(64)) {
        out.push("asset.claim.unlockSecret", "must be 64-char hex");
    }
}

impl TransactionVariant for HtlcClaim {
    fn name(&self) -> &'static str {
        "htlcClaim"
    }

    fn transaction_type(&self) -> u16 {
        CoreTransactionType::HtlcClaim.code()
    }

    fn schema(&self) -> Schema {
        Schema::new("htlcClaim")
            .amount(Bounds::exactly(0))
            .fee(Bounds::exactly(0))
            .requires_htlc()
            .rule(check_claim)
    }

    fn serialize_asset(
        &self,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let claim = asset(data)?
            .claim
            .as_ref()
            .ok_or(TransactionError::MissingAsset("claim"))?;
        cursor.write_hex(
            "asset.claim.lockTransactionId",
            &claim.lock_transaction_id,
            Some(HASH_LENGTH),
        )?;
        cursor.write_hex("asset.claim.unlockSecret", &claim.unlock_secret, Some(32))
    }

    fn deserialize_asset(
        &self,
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let lock_transaction_id = cursor.read_hex(HASH_LENGTH)?;
        let unlock_secret = cursor.read_hex(32)?;
        data.asset_mut().claim = Some(HtlcClaimAsset {
            lock_transaction_id,
            unlock_secret,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Refund
// ---------------------------------------------------------------------------

/// Payload: lock transaction id (32).
#[derive(Debug, Clone, Copy)]
pub struct HtlcRefund;

fn check_refund(data: &TransactionData, _: &SchemaContext<'_>, out: &mut Violations) {
    match data.asset.as_ref().and_then(|asset| asset.refund.as_ref()) {
        None => out.push("asset.refund", "is required"),
        Some(refund) if !is_hex(&refund.lock_transaction_id, Some(64)) => {
            out.push("asset.refund.lockTransactionId", "must be 64-char hex")
        }
        Some(_) => {}
    }
}

impl TransactionVariant for HtlcRefund {
    fn name(&self) -> &'static str {
        "htlcRefund"
    }

    fn transaction_type(&self) -> u16 {
        CoreTransactionType::HtlcRefund.code()
    }

    fn schema(&self) -> Schema {
        Schema::new("htlcRefund")
            .amount(Bounds::exactly(0))
            .fee(Bounds::exactly(0))
            .requires_htlc()
            .rule(check_refund)
    }

    fn serialize_asset(
        &self,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let refund = asset(data)?
            .refund
            .as_ref()
            .ok_or(TransactionError::MissingAsset("refund"))?;
        cursor.write_hex(
            "asset.refund.lockTransactionId",
            &refund.lock_transaction_id,
            Some(HASH_LENGTH),
        )
    }

    fn deserialize_asset(
        &self,
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let lock_transaction_id = cursor.read_hex(HASH_LENGTH)?;
        data.asset_mut().refund = Some(HtlcRefundAsset {
            lock_transaction_id,
        });
        Ok(())
    }
}
