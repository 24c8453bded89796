//! The extension point for transaction kinds.
//!
//! A [`TransactionVariant`] knows everything kind-specific: its key and wire
//! version, whether it carries a vendor field, its schema and fee, and how
//! its asset goes to and from bytes. The serializer and deserializer handle
//! the common header and signatures and hand the cursor to the variant in
//! between. Plugins implement the trait and register with
//! [`TypeRegistry::register`](super::registry::TypeRegistry::register).

use std::fmt;

use super::asset::MultiSignatureAsset;
use super::cursor::BinaryCursor;
use super::data::TransactionData;
use super::error::TransactionError;
use super::schema::Schema;
use super::types::TransactionTypeKey;
use crate::config::{Milestone, CORE_TYPE_GROUP, TRANSACTION_VERSION_AIP11};

pub trait TransactionVariant: Send + Sync + fmt::Debug {
    /// Kind name (`transfer`, `htlcLock`, ...); also the fee table key.
    fn name(&self) -> &'static str;

    fn transaction_type(&self) -> u16;

    fn type_group(&self) -> u32 {
        CORE_TYPE_GROUP
    }

    /// Wire version this variant serializes.
    fn version(&self) -> u8 {
        TRANSACTION_VERSION_AIP11
    }

    fn key(&self) -> TransactionTypeKey {
        TransactionTypeKey::new(self.type_group(), self.transaction_type())
    }

    fn has_vendor_field(&self) -> bool {
        false
    }

    /// Fee from the milestone's static table, 0 when the kind is not listed.
    fn static_fee(&self, milestone: &Milestone) -> u64 {
        milestone.fees.static_fee(self.name()).unwrap_or(0)
    }

    /// Minimum fee for `data`, surfaced through
    /// [`TransactionFactory::minimum_fee`](super::factory::TransactionFactory::minimum_fee).
    /// Variants whose cost depends on the payload override this.
    fn fee(&self, _data: &TransactionData, milestone: &Milestone) -> u64 {
        self.static_fee(milestone)
    }

    fn schema(&self) -> Schema;

    fn serialize_asset(
        &self,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError>;

    fn deserialize_asset(
        &self,
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError>;

    /// Asset bytes for the legacy v1 hashing layout.
    fn legacy_asset_bytes(&self, _data: &TransactionData) -> Result<Vec<u8>, TransactionError> {
        Ok(Vec::new())
    }

    /// Participant set whose signatures must be checked alongside the
    /// sender's (only the v2 multi-signature registration has one).
    fn participants(&self, _data: &TransactionData) -> Option<MultiSignatureAsset> {
        None
    }
}
