use super::{read_address, write_address};
use crate::transaction::cursor::BinaryCursor;
use crate::transaction::data::TransactionData;
use crate::transaction::error::TransactionError;
use crate::transaction::schema::{Bounds, FieldRule, Schema};
use crate::transaction::types::CoreTransactionType;
use crate::transaction::variant::TransactionVariant;

/// Value transfer. Payload: amount (u64), expiration (u32), recipient (21 bytes).
/// v1 and v2 share the payload layout.
#[derive(Debug, Clone, Copy)]
pub struct Transfer {
    version: u8,
}

impl Transfer {
    pub fn new(version: u8) -> Self {
        Self { version }
    }
}

impl TransactionVariant for Transfer {
    fn name(&self) -> &'static str {
        "transfer"
    }

    fn transaction_type(&self) -> u16 {
        CoreTransactionType::Transfer.code()
    }

    fn version(&self) -> u8 {
        self.version
    }

    fn has_vendor_field(&self) -> bool {
        true
    }

    fn schema(&self) -> Schema {
        Schema::new("transfer")
            .fee(Bounds::at_least(1))
            .recipient(FieldRule::Required)
            .with_vendor_field()
    }

    fn serialize_asset(
        &self,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        cursor.write_u64_le(data.amount)?;
        cursor.write_u32_le(data.expiration.unwrap_or(0))?;
        write_address(cursor, data.recipient_id.as_deref())
    }

    fn deserialize_asset(
        &self,
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        data.amount = cursor.read_u64_le()?;
        data.expiration = Some(cursor.read_u32_le()?);
        data.recipient_id = Some(read_address(cursor)?);
        Ok(())
    }
}
