use super::{asset, read_short_string, write_short_string};
use crate::transaction::asset::DelegateAsset;
use crate::transaction::cursor::BinaryCursor;
use crate::transaction::data::TransactionData;
use crate::transaction::error::TransactionError;
use crate::transaction::schema::{is_username, Bounds, Schema, SchemaContext, Violations};
use crate::transaction::types::CoreTransactionType;
use crate::transaction::variant::TransactionVariant;

/// Claims a delegate username. Payload: u8 length + UTF-8 username.
#[derive(Debug, Clone, Copy)]
pub struct DelegateRegistration {
    version: u8,
}

impl DelegateRegistration {
    pub fn new(version: u8) -> Self {
        Self { version }
    }
}

fn username(data: &TransactionData) -> Result<&str, TransactionError> {
    asset(data)?
        .delegate
        .as_ref()
        .map(|delegate| delegate.username.as_str())
        .ok_or(TransactionError::MissingAsset("delegate"))
}

fn check_username(data: &TransactionData, _: &SchemaContext<'_>, out: &mut Violations) {
    match data.asset.as_ref().and_then(|asset| asset.delegate.as_ref()) {
        None => out.push("asset.delegate", "is required"),
        Some(delegate) if !is_username(&delegate.username) => out.push(
            "asset.delegate.username",
            "must be 1-20 chars of a-z, 0-9 and !@$&_.",
        ),
        Some(_) => {}
    }
}

impl TransactionVariant for DelegateRegistration {
    fn name(&self) -> &'static str {
        "delegateRegistration"
    }

    fn transaction_type(&self) -> u16 {
        CoreTransactionType::DelegateRegistration.code()
    }

    fn version(&self) -> u8 {
        self.version
    }

    fn schema(&self) -> Schema {
        Schema::new("delegateRegistration")
            .amount(Bounds::exactly(0))
            .fee(Bounds::at_least(1))
            .rule(check_username)
    }

    fn serialize_asset(
        &self,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        write_short_string(cursor, "asset.delegate.username", username(data)?)
    }

    fn deserialize_asset(
        &self,
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let username = read_short_string(cursor, "asset.delegate.username")?;
        data.asset_mut().delegate = Some(DelegateAsset { username });
        Ok(())
    }

    fn legacy_asset_bytes(&self, data: &TransactionData) -> Result<Vec<u8>, TransactionError> {
        Ok(username(data)?.as_bytes().to_vec())
    }
}

/// Gives up delegate status. No payload.
#[derive(Debug, Clone, Copy)]
pub struct DelegateResignation;

impl TransactionVariant for DelegateResignation {
    fn name(&self) -> &'static str {
        "delegateResignation"
    }

    fn transaction_type(&self) -> u16 {
        CoreTransactionType::DelegateResignation.code()
    }

    fn schema(&self) -> Schema {
        Schema::new("delegateResignation")
            .amount(Bounds::exactly(0))
            .fee(Bounds::at_least(1))
    }

    fn serialize_asset(
        &self,
        _data: &TransactionData,
        _cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        Ok(())
    }

    fn deserialize_asset(
        &self,
        _data: &mut TransactionData,
        _cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        Ok(())
    }
}
