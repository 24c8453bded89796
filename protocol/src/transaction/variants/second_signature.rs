use super::asset;
use crate::config::PUBLIC_KEY_LENGTH;
use crate::transaction::asset::SecondSignatureAsset;
use crate::transaction::cursor::BinaryCursor;
use crate::transaction::data::TransactionData;
use crate::transaction::error::TransactionError;
use crate::transaction::schema::{is_public_key, Bounds, Schema, SchemaContext, Violations};
use crate::transaction::types::CoreTransactionType;
use crate::transaction::variant::TransactionVariant;

/// Registers a second public key for the sender. Payload: the 33-byte key.
#[derive(Debug, Clone, Copy)]
pub struct SecondSignature {
    version: u8,
}

impl SecondSignature {
    pub fn new(version: u8) -> Self {
        Self { version }
    }
}

fn second_public_key(data: &TransactionData) -> Result<&str, TransactionError> {
    asset(data)?
        .signature
        .as_ref()
        .map(|signature| signature.public_key.as_str())
        .ok_or(TransactionError::MissingAsset("signature"))
}

fn check_asset(data: &TransactionData, _: &SchemaContext<'_>, out: &mut Violations) {
    match data.asset.as_ref().and_then(|asset| asset.signature.as_ref()) {
        None => out.push("asset.signature", "is required"),
        Some(signature) if !is_public_key(&signature.public_key) => {
            out.push("asset.signature.publicKey", "must be a 66-char hex public key")
        }
        Some(_) => {}
    }
    if data.second_signature().is_some() {
        out.push("secondSignature", "cannot be set while registering one");
    }
}

impl TransactionVariant for SecondSignature {
    fn name(&self) -> &'static str {
        "secondSignature"
    }

    fn transaction_type(&self) -> u16 {
        CoreTransactionType::SecondSignature.code()
    }

    fn version(&self) -> u8 {
        self.version
    }

    fn schema(&self) -> Schema {
        Schema::new("secondSignature")
            .amount(Bounds::exactly(0))
            .fee(Bounds::at_least(1))
            .rule(check_asset)
    }

    fn serialize_asset(
        &self,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        cursor.write_hex(
            "asset.signature.publicKey",
            second_public_key(data)?,
            Some(PUBLIC_KEY_LENGTH),
        )
    }

    fn deserialize_asset(
        &self,
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let public_key = cursor.read_hex(PUBLIC_KEY_LENGTH)?;
        data.asset_mut().signature = Some(SecondSignatureAsset { public_key });
        Ok(())
    }

    fn legacy_asset_bytes(&self, data: &TransactionData) -> Result<Vec<u8>, TransactionError> {
        hex::decode(second_public_key(data)?)
            .map_err(|e| TransactionError::encoding("asset.signature.publicKey", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::transaction::variants::testing::{base, roundtrip};

    #[test]
    fn payload_is_the_raw_key() {
        let key = KeyPair::from_passphrase("second").unwrap().public_key();
        let mut data = base(2, 1);
        data.asset_mut().signature = Some(SecondSignatureAsset {
            public_key: key.to_hex(),
        });

        let (decoded, bytes) = roundtrip(&SecondSignature::new(2), &data);
        assert_eq!(bytes, key.as_bytes().to_vec());
        assert_eq!(decoded.asset, data.asset);
        assert_eq!(
            SecondSignature::new(1).legacy_asset_bytes(&data).unwrap(),
            bytes
        );
    }

    #[test]
    fn short_key_rejected() {
        let mut data = base(2, 1);
        data.asset_mut().signature = Some(SecondSignatureAsset {
            public_key: "02abcd".into(),
        });
        let mut cursor = BinaryCursor::with_capacity(64);
        assert!(SecondSignature::new(2)
            .serialize_asset(&data, &mut cursor)
            .is_err());
    }
}
