use super::{asset, count_u8};
use crate::config::PUBLIC_KEY_LENGTH;
use crate::transaction::cursor::BinaryCursor;
use crate::transaction::data::TransactionData;
use crate::transaction::error::TransactionError;
use crate::transaction::schema::{is_public_key, Bounds, Schema, SchemaContext, Violations};
use crate::transaction::types::CoreTransactionType;
use crate::transaction::variant::TransactionVariant;

const VOTE: u8 = 0x01;
const UNVOTE: u8 = 0x00;

/// Votes for (`+key`) or against (`-key`) a delegate.
/// Payload: u8 count, then per vote a direction byte and the 33-byte key.
#[derive(Debug, Clone, Copy)]
pub struct Vote {
    version: u8,
}

impl Vote {
    pub fn new(version: u8) -> Self {
        Self { version }
    }
}

fn votes(data: &TransactionData) -> Result<&[String], TransactionError> {
    asset(data)?
        .votes
        .as_deref()
        .ok_or(TransactionError::MissingAsset("votes"))
}

/// Splits `+02ab..` into its direction byte and key.
fn parse_vote(vote: &str) -> Result<(u8, &str), TransactionError> {
    if let Some(key) = vote.strip_prefix('+') {
        Ok((VOTE, key))
    } else if let Some(key) = vote.strip_prefix('-') {
        Ok((UNVOTE, key))
    } else {
        Err(TransactionError::encoding(
            "asset.votes",
            format!("vote {:?} must start with + or -", vote),
        ))
    }
}

fn check_votes(data: &TransactionData, _: &SchemaContext<'_>, out: &mut Violations) {
    let Some(votes) = data.asset.as_ref().and_then(|asset| asset.votes.as_ref()) else {
        out.push("asset.votes", "is required");
        return;
    };
    if votes.len() != 1 {
        out.push("asset.votes", "must contain exactly one vote");
    }
    let malformed = votes.iter().any(|vote| match parse_vote(vote) {
        Ok((_, key)) => !is_public_key(key) || key.bytes().any(|b| b.is_ascii_uppercase()),
        Err(_) => true,
    });
    if malformed {
        out.push("asset.votes", "entries must match [+-] followed by a lowercase public key");
    }
}

impl TransactionVariant for Vote {
    fn name(&self) -> &'static str {
        "vote"
    }

    fn transaction_type(&self) -> u16 {
        CoreTransactionType::Vote.code()
    }

    fn version(&self) -> u8 {
        self.version
    }

    fn schema(&self) -> Schema {
        Schema::new("vote")
            .amount(Bounds::exactly(0))
            .fee(Bounds::at_least(1))
            .rule(check_votes)
    }

    fn serialize_asset(
        &self,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let votes = votes(data)?;
        cursor.write_u8(count_u8("asset.votes", votes.len())?)?;
        for vote in votes {
            let (direction, key) = parse_vote(vote)?;
            cursor.write_u8(direction)?;
            cursor.write_hex("asset.votes", key, Some(PUBLIC_KEY_LENGTH))?;
        }
        Ok(())
    }

    fn deserialize_asset(
        &self,
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let count = cursor.read_u8()? as usize;
        let mut votes = Vec::with_capacity(count);
        for _ in 0..count {
            let sign = match cursor.read_u8()? {
                VOTE => '+',
                UNVOTE => '-',
                other => {
                    return Err(TransactionError::MalformedPayload(format!(
                        "vote direction byte {:#04x}",
                        other
                    )))
                }
            };
            votes.push(format!("{}{}", sign, cursor.read_hex(PUBLIC_KEY_LENGTH)?));
        }
        data.asset_mut().votes = Some(votes);
        Ok(())
    }

    fn legacy_asset_bytes(&self, data: &TransactionData) -> Result<Vec<u8>, TransactionError> {
        Ok(votes(data)?.concat().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::transaction::variants::testing::{base, recipient, roundtrip, validate};

    fn delegate_key() -> String {
        KeyPair::from_passphrase("delegate").unwrap().public_key().to_hex()
    }

    #[test]
    fn vote_and_unvote_roundtrip() {
        let mut data = base(2, 3);
        data.asset_mut().votes = Some(vec![
            format!("-{}", delegate_key()),
            format!("+{}", delegate_key()),
        ]);
        let (decoded, bytes) = roundtrip(&Vote::new(2), &data);
        assert_eq!(bytes.len(), 1 + 2 * 34);
        assert_eq!(bytes[0], 2);
        assert_eq!(bytes[1], UNVOTE);
        assert_eq!(bytes[35], VOTE);
        assert_eq!(decoded.asset, data.asset);
    }

    #[test]
    fn unsigned_vote_rejected() {
        let mut data = base(2, 3);
        data.asset_mut().votes = Some(vec![delegate_key()]);
        let mut cursor = BinaryCursor::with_capacity(64);
        assert!(Vote::new(2).serialize_asset(&data, &mut cursor).is_err());
    }

    #[test]
    fn bad_direction_byte_rejected() {
        let mut bytes = vec![1u8, 0x07];
        bytes.extend_from_slice(&[0x02; 33]);
        let mut data = base(2, 3);
        match Vote::new(2).deserialize_asset(&mut data, &mut BinaryCursor::from_bytes(&bytes)) {
            Err(TransactionError::MalformedPayload(_)) => {}
            other => panic!("expected MalformedPayload, got {:?}", other),
        }
    }

    fn single_vote() -> TransactionData {
        let mut data = base(2, 3);
        data.fee = 100_000_000;
        data.asset_mut().votes = Some(vec![format!("+{}", delegate_key())]);
        data
    }

    #[test]
    fn schema_accepts_single_vote() {
        assert!(validate(&Vote::new(2), &single_vote()).is_none());
    }

    #[test]
    fn schema_rejects_amount_and_recipient() {
        let mut data = single_vote();
        data.amount = 1;
        data.recipient_id = Some(recipient());
        let error = validate(&Vote::new(2), &data).unwrap();
        assert!(error.has_path("amount"));
        assert!(error.has_path("recipientId"));
    }

    #[test]
    fn schema_rejects_vote_shape() {
        let mut data = single_vote();
        data.asset_mut().votes = Some(vec![
            format!("+{}", delegate_key()),
            format!("-{}", delegate_key()),
        ]);
        assert!(validate(&Vote::new(2), &data).unwrap().has_path("asset.votes"));

        data.asset_mut().votes = Some(vec![format!("+{}", delegate_key().to_uppercase())]);
        assert!(validate(&Vote::new(2), &data).unwrap().has_path("asset.votes"));

        data.asset_mut().votes = Some(vec![delegate_key()]);
        assert!(validate(&Vote::new(2), &data).unwrap().has_path("asset.votes"));
    }
}
