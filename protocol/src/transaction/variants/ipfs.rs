use super::asset;
use crate::transaction::cursor::BinaryCursor;
use crate::transaction::data::TransactionData;
use crate::transaction::error::TransactionError;
use crate::transaction::schema::{Bounds, Schema, SchemaContext, Violations};
use crate::transaction::types::CoreTransactionType;
use crate::transaction::variant::TransactionVariant;

/// Anchors an IPFS multihash. Payload: the raw multihash
/// (hash function byte, digest length byte, digest).
#[derive(Debug, Clone, Copy)]
pub struct Ipfs;

fn check_ipfs(data: &TransactionData, _: &SchemaContext<'_>, out: &mut Violations) {
    match data.asset.as_ref().and_then(|asset| asset.ipfs.as_ref()) {
        None => out.push("asset.ipfs", "is required"),
        Some(hash) if !(2..=90).contains(&hash.len()) => {
            out.push("asset.ipfs", "must be 2-90 base58 chars")
        }
        Some(hash) if bs58::decode(hash).into_vec().is_err() => {
            out.push("asset.ipfs", "must be base58")
        }
        Some(_) => {}
    }
}

impl TransactionVariant for Ipfs {
    fn name(&self) -> &'static str {
        "ipfs"
    }

    fn transaction_type(&self) -> u16 {
        CoreTransactionType::Ipfs.code()
    }

    fn schema(&self) -> Schema {
        Schema::new("ipfs")
            .amount(Bounds::exactly(0))
            .fee(Bounds::at_least(1))
            .rule(check_ipfs)
    }

    fn serialize_asset(
        &self,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let hash = asset(data)?
            .ipfs
            .as_deref()
            .ok_or(TransactionError::MissingAsset("ipfs"))?;
        let bytes = bs58::decode(hash)
            .into_vec()
            .map_err(|e| TransactionError::encoding("asset.ipfs", e))?;
        cursor.write_bytes(&bytes)
    }

    fn deserialize_asset(
        &self,
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let function = cursor.read_u8()?;
        let length = cursor.read_u8()?;
        let mut multihash = vec![function, length];
        multihash.extend(cursor.read_bytes(length as usize)?);
        data.asset_mut().ipfs = Some(bs58::encode(multihash).into_string());
        Ok(())
    }
}
