use super::{asset, count_u8};
use crate::config::{Milestone, PUBLIC_KEY_LENGTH, TRANSACTION_VERSION_LEGACY};
use crate::transaction::asset::{MultiSignatureAsset, MultiSignatureLegacyAsset};
use crate::transaction::cursor::BinaryCursor;
use crate::transaction::data::TransactionData;
use crate::transaction::error::TransactionError;
use crate::transaction::schema::{check_participants, Bounds, Schema, SchemaContext, Violations};
use crate::transaction::types::CoreTransactionType;
use crate::transaction::variant::TransactionVariant;

/// Registration fees scale with the number of participants.
fn scaled_fee(milestone: &Milestone, participants: usize) -> u64 {
    let base = milestone.fees.static_fee("multiSignature").unwrap_or(0);
    base.saturating_mul(participants as u64 + 1)
}

// ---------------------------------------------------------------------------
// v2
// ---------------------------------------------------------------------------

/// Turns the sender into an m-of-n wallet.
/// Payload: u8 min, u8 key count, 33-byte keys.
#[derive(Debug, Clone, Copy)]
pub struct MultiSignatureRegistration;

fn registration(data: &TransactionData) -> Result<&MultiSignatureAsset, TransactionError> {
    asset(data)?
        .multi_signature
        .as_ref()
        .ok_or(TransactionError::MissingAsset("multiSignature"))
}

fn check_registration(data: &TransactionData, _: &SchemaContext<'_>, out: &mut Violations) {
    let Some(multi) = data.multi_signature() else {
        out.push("asset.multiSignature", "is required");
        return;
    };
    check_participants("asset.multiSignature.publicKeys", &multi.public_keys, false, out);
    if multi.min < 1 || multi.min as usize > multi.public_keys.len() {
        out.push(
            "asset.multiSignature.min",
            "must be between 1 and the number of public keys",
        );
    }

    let signed = data.signatures.as_ref().map_or(0, Vec::len);
    if signed < multi.min as usize || signed > multi.public_keys.len() {
        out.push(
            "signatures",
            format!(
                "registration needs between {} and {} participant signatures",
                multi.min,
                multi.public_keys.len()
            ),
        );
    }
}

impl TransactionVariant for MultiSignatureRegistration {
    fn name(&self) -> &'static str {
        "multiSignature"
    }

    fn transaction_type(&self) -> u16 {
        CoreTransactionType::MultiSignature.code()
    }

    fn fee(&self, data: &TransactionData, milestone: &Milestone) -> u64 {
        let participants = data.multi_signature().map_or(0, |m| m.public_keys.len());
        scaled_fee(milestone, participants)
    }

    fn schema(&self) -> Schema {
        Schema::new("multiSignature")
            .amount(Bounds::exactly(0))
            .fee(Bounds::at_least(1))
            .rule(check_registration)
    }

    fn serialize_asset(
        &self,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let multi = registration(data)?;
        cursor.write_u8(multi.min)?;
        cursor.write_u8(count_u8("asset.multiSignature.publicKeys", multi.public_keys.len())?)?;
        for key in &multi.public_keys {
            cursor.write_hex("asset.multiSignature.publicKeys", key, Some(PUBLIC_KEY_LENGTH))?;
        }
        Ok(())
    }

    fn deserialize_asset(
        &self,
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let min = cursor.read_u8()?;
        let count = cursor.read_u8()? as usize;
        let public_keys = (0..count)
            .map(|_| cursor.read_hex(PUBLIC_KEY_LENGTH))
            .collect::<Result<Vec<_>, _>>()?;
        data.asset_mut().multi_signature = Some(MultiSignatureAsset { min, public_keys });
        Ok(())
    }

    fn participants(&self, data: &TransactionData) -> Option<MultiSignatureAsset> {
        data.multi_signature().cloned()
    }
}

// ---------------------------------------------------------------------------
// v1
// ---------------------------------------------------------------------------

/// Legacy m-of-n registration with a lifetime.
/// Payload: u8 min, u8 key count, u8 lifetime, 33-byte keys.
#[derive(Debug, Clone, Copy)]
pub struct MultiSignatureLegacy;

fn legacy(data: &TransactionData) -> Result<&MultiSignatureLegacyAsset, TransactionError> {
    asset(data)?
        .multi_signature_legacy
        .as_ref()
        .ok_or(TransactionError::MissingAsset("multisignature"))
}

fn check_legacy(data: &TransactionData, _: &SchemaContext<'_>, out: &mut Violations) {
    let Some(multi) = data
        .asset
        .as_ref()
        .and_then(|asset| asset.multi_signature_legacy.as_ref())
    else {
        out.push("asset.multisignature", "is required");
        return;
    };
    check_participants("asset.multisignature.keysgroup", &multi.keysgroup, true, out);
    if multi.min < 1 || multi.min as usize > multi.keysgroup.len() {
        out.push(
            "asset.multisignature.min",
            "must be between 1 and the keysgroup size",
        );
    }
    if !(1..=72).contains(&multi.lifetime) {
        out.push("asset.multisignature.lifetime", "must be between 1 and 72");
    }
    if matches!(&data.signatures, Some(signatures) if signatures.len() != 1) {
        out.push("signatures", "legacy registrations carry exactly one signature block");
    }
}

impl TransactionVariant for MultiSignatureLegacy {
    fn name(&self) -> &'static str {
        "multiSignature"
    }

    fn transaction_type(&self) -> u16 {
        CoreTransactionType::MultiSignature.code()
    }

    fn version(&self) -> u8 {
        TRANSACTION_VERSION_LEGACY
    }

    fn fee(&self, data: &TransactionData, milestone: &Milestone) -> u64 {
        let participants = legacy(data).map_or(0, |multi| multi.keysgroup.len());
        scaled_fee(milestone, participants)
    }

    fn schema(&self) -> Schema {
        Schema::new("multiSignatureLegacy")
            .amount(Bounds::exactly(0))
            .fee(Bounds::at_least(1))
            .rule(check_legacy)
    }

    fn serialize_asset(
        &self,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let multi = legacy(data)?;
        cursor.write_u8(multi.min)?;
        cursor.write_u8(count_u8("asset.multisignature.keysgroup", multi.keysgroup.len())?)?;
        cursor.write_u8(multi.lifetime)?;
        for key in &multi.keysgroup {
            let key = key.strip_prefix('+').unwrap_or(key);
            cursor.write_hex("asset.multisignature.keysgroup", key, Some(PUBLIC_KEY_LENGTH))?;
        }
        Ok(())
    }

    /// Keys come back bare; version-1 compatibility adds the `+` prefix.
    fn deserialize_asset(
        &self,
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let min = cursor.read_u8()?;
        let count = cursor.read_u8()? as usize;
        let lifetime = cursor.read_u8()?;
        let keysgroup = (0..count)
            .map(|_| cursor.read_hex(PUBLIC_KEY_LENGTH))
            .collect::<Result<Vec<_>, _>>()?;
        data.asset_mut().multi_signature_legacy = Some(MultiSignatureLegacyAsset {
            min,
            lifetime,
            keysgroup,
        });
        Ok(())
    }

    fn legacy_asset_bytes(&self, data: &TransactionData) -> Result<Vec<u8>, TransactionError> {
        let multi = legacy(data)?;
        let mut bytes = vec![multi.min, multi.lifetime];
        bytes.extend_from_slice(multi.keysgroup.concat().as_bytes());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::transaction::variants::testing::{base, roundtrip, validate};


    fn signed_registration(min: u8, public_keys: Vec<String>) -> TransactionData {
        let mut data = base(2, 4);
        data.fee = 2_000_000_000;
        data.signatures = Some(
            (0..public_keys.len())
                .map(|i| format!("{:02x}{}", i, "ab".repeat(64)))
                .collect(),
        );
        data.asset_mut().multi_signature = Some(MultiSignatureAsset { min, public_keys });
        data
    }

    fn legacy_registration(min: u8, lifetime: u8) -> TransactionData {
        let mut data = base(1, 4);
        data.fee = 2_000_000_000;
        data.asset_mut().multi_signature_legacy = Some(MultiSignatureLegacyAsset {
            min,
            lifetime,
            keysgroup: keys(3).into_iter().map(|k| format!("+{}", k)).collect(),
        });
        data
    }

    fn keys(count: usize) -> Vec<String> {
        (0..count)
            .map(|i| {
                KeyPair::from_passphrase(&format!("participant {}", i))
                    .unwrap()
                    .public_key()
                    .to_hex()
            })
            .collect()
    }

    #[test]
    fn registration_layout() {
        let mut data = base(2, 4);
        data.asset_mut().multi_signature = Some(MultiSignatureAsset {
            min: 2,
            public_keys: keys(3),
        });
        let (decoded, bytes) = roundtrip(&MultiSignatureRegistration, &data);
        assert_eq!(bytes.len(), 2 + 3 * 33);
        assert_eq!(&bytes[..2], &[2, 3]);
        assert_eq!(decoded.asset, data.asset);
        assert!(MultiSignatureRegistration.participants(&decoded).is_some());
    }

    #[test]
    fn fee_scales_with_participants() {
        let mut milestone = Milestone::default();
        milestone
            .fees
            .static_fees
            .insert("multiSignature".into(), 500);
        let mut data = base(2, 4);
        data.asset_mut().multi_signature = Some(MultiSignatureAsset {
            min: 2,
            public_keys: keys(3),
        });
        assert_eq!(MultiSignatureRegistration.fee(&data, &milestone), 2_000);
        assert_eq!(MultiSignatureRegistration.static_fee(&milestone), 500);
    }

    #[test]
    fn legacy_layout_strips_prefix() {
        let keysgroup: Vec<String> = keys(2).into_iter().map(|k| format!("+{}", k)).collect();
        let mut data = base(1, 4);
        data.asset_mut().multi_signature_legacy = Some(MultiSignatureLegacyAsset {
            min: 2,
            lifetime: 24,
            keysgroup: keysgroup.clone(),
        });
        let (decoded, bytes) = roundtrip(&MultiSignatureLegacy, &data);
        assert_eq!(&bytes[..3], &[2, 2, 24]);
        let decoded_keys = &decoded
            .asset
            .unwrap()
            .multi_signature_legacy
            .unwrap()
            .keysgroup;
        assert_eq!(decoded_keys[0], keysgroup[0][1..]);

        let legacy_bytes = MultiSignatureLegacy.legacy_asset_bytes(&data).unwrap();
        assert_eq!(&legacy_bytes[..2], &[2, 24]);
        assert_eq!(legacy_bytes.len(), 2 + 2 * 67);
    }

    #[test]
    fn registration_schema_accepts_well_formed() {
        assert!(validate(&MultiSignatureRegistration, &signed_registration(2, keys(3))).is_none());
    }

    #[test]
    fn registration_rejects_duplicate_keys() {
        let mut public_keys = keys(2);
        public_keys.push(public_keys[0].clone());
        let error = validate(&MultiSignatureRegistration, &signed_registration(2, public_keys))
            .unwrap();
        assert!(error.has_path("asset.multiSignature.publicKeys"));
    }

    #[test]
    fn registration_min_must_fit_the_keys() {
        let error = validate(&MultiSignatureRegistration, &signed_registration(0, keys(3)))
            .unwrap();
        assert!(error.has_path("asset.multiSignature.min"));

        let error = validate(&MultiSignatureRegistration, &signed_registration(4, keys(3)))
            .unwrap();
        assert!(error.has_path("asset.multiSignature.min"));
    }

    #[test]
    fn registration_rejects_amount_and_missing_signatures() {
        let mut data = signed_registration(2, keys(3));
        data.amount = 1;
        data.signatures = None;
        let error = validate(&MultiSignatureRegistration, &data).unwrap();
        assert!(error.has_path("amount"));
        assert!(error.has_path("signatures"));
    }

    #[test]
    fn registration_requires_asset() {
        let mut data = base(2, 4);
        data.fee = 1;
        let error = validate(&MultiSignatureRegistration, &data).unwrap();
        assert!(error.has_path("asset.multiSignature"));
    }

    #[test]
    fn legacy_lifetime_bounds() {
        assert!(validate(&MultiSignatureLegacy, &legacy_registration(2, 1)).is_none());
        assert!(validate(&MultiSignatureLegacy, &legacy_registration(2, 72)).is_none());
        for lifetime in [0, 73] {
            let error = validate(&MultiSignatureLegacy, &legacy_registration(2, lifetime)).unwrap();
            assert!(error.has_path("asset.multisignature.lifetime"), "lifetime {}", lifetime);
        }
    }

    #[test]
    fn legacy_min_and_amount() {
        let mut data = legacy_registration(4, 24);
        data.amount = 5;
        let error = validate(&MultiSignatureLegacy, &data).unwrap();
        assert!(error.has_path("asset.multisignature.min"));
        assert!(error.has_path("amount"));
    }
}
