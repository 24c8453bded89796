use super::{asset, read_address, write_address};
use crate::crypto::address;
use crate::transaction::asset::MultiPaymentItem;
use crate::transaction::cursor::BinaryCursor;
use crate::transaction::data::TransactionData;
use crate::transaction::error::TransactionError;
use crate::transaction::schema::{Bounds, Schema, SchemaContext, Violations};
use crate::transaction::types::CoreTransactionType;
use crate::transaction::variant::TransactionVariant;

/// Pays several recipients at once.
/// Payload: u16 count, then per payment a u64 amount and a 21-byte recipient.
#[derive(Debug, Clone, Copy)]
pub struct MultiPayment;

fn check_payments(data: &TransactionData, context: &SchemaContext<'_>, out: &mut Violations) {
    let Some(payments) = data.asset.as_ref().and_then(|asset| asset.payments.as_ref()) else {
        out.push("asset.payments", "is required");
        return;
    };
    let limit = context.milestone.multi_payment_limit;
    if payments.len() < 2 || payments.len() > limit {
        out.push(
            "asset.payments",
            format!("must hold between 2 and {} payments", limit),
        );
    }
    for (index, payment) in payments.iter().enumerate() {
        if payment.amount == 0 {
            out.push(format!("asset.payments.{}.amount", index), "must be at least 1");
        }
        if !address::validate(&payment.recipient_id, context.network_byte) {
            out.push(
                format!("asset.payments.{}.recipientId", index),
                "must be an address on this network",
            );
        }
    }
}

impl TransactionVariant for MultiPayment {
    fn name(&self) -> &'static str {
        "multiPayment"
    }

    fn transaction_type(&self) -> u16 {
        CoreTransactionType::MultiPayment.code()
    }

    fn has_vendor_field(&self) -> bool {
        true
    }

    fn schema(&self) -> Schema {
        Schema::new("multiPayment")
            .amount(Bounds::exactly(0))
            .fee(Bounds::at_least(1))
            .with_vendor_field()
            .rule(check_payments)
    }

    fn serialize_asset(
        &self,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let payments = asset(data)?
            .payments
            .as_deref()
            .ok_or(TransactionError::MissingAsset("payments"))?;
        let count = u16::try_from(payments.len())
            .map_err(|_| TransactionError::encoding("asset.payments", "too many payments"))?;
        cursor.write_u16_le(count)?;
        for payment in payments {
            cursor.write_u64_le(payment.amount)?;
            write_address(cursor, Some(&payment.recipient_id))?;
        }
        Ok(())
    }

    fn deserialize_asset(
        &self,
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let count = cursor.read_u16_le()? as usize;
        let mut payments = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let amount = cursor.read_u64_le()?;
            let recipient_id = read_address(cursor)?;
            payments.push(MultiPaymentItem {
                amount,
                recipient_id,
            });
        }
        data.asset_mut().payments = Some(payments);
        Ok(())
    }
}
