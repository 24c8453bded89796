//! # Structural Validation
//!
//! Every variant describes the shape its data must have with a [`Schema`]:
//! bounds on amount and fee, whether a recipient or vendor field is allowed,
//! and a list of asset rules. The [`Validator`] applies the rules shared by
//! all kinds (header fields, key and signature formats) and then the
//! variant's own.
//!
//! Validation never short-circuits: every violation is collected so the
//! caller sees the full list at once.
//!
//! ## Strict mode
//!
//! Strict validation additionally demands an `id` and at least one of
//! `signature` / `signatures`. The factory uses it for anything that came
//! off the wire.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use super::data::TransactionData;
use crate::config::{
    Milestone, CORE_TYPE_GROUP, MAX_MULTI_SIGNATURE_PARTICIPANTS, TRANSACTION_VERSION_AIP11,
    TRANSACTION_VERSION_LEGACY,
};
use crate::crypto::address;

/// Extra rule a variant runs over the data (usually its asset).
pub type AssetRule = fn(&TransactionData, &SchemaContext<'_>, &mut Violations);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Required,
    Optional,
    Forbidden,
}

/// Inclusive bounds on a monetary field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: u64,
    pub max: u64,
}

impl Bounds {
    pub const ANY: Bounds = Bounds {
        min: 0,
        max: u64::MAX,
    };

    pub const fn exactly(value: u64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub const fn at_least(min: u64) -> Self {
        Self { min, max: u64::MAX }
    }

    pub fn contains(&self, value: u64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (min, max) if min == max => write!(f, "exactly {}", min),
            (min, u64::MAX) => write!(f, "at least {}", min),
            (min, max) => write!(f, "between {} and {}", min, max),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    /// Kind name, also the key into the static fee table.
    pub id: &'static str,
    pub amount: Bounds,
    pub fee: Bounds,
    pub recipient: FieldRule,
    pub vendor_field: bool,
    /// Requires the `htlcEnabled` milestone flag.
    pub requires_htlc: bool,
    pub rules: Vec<AssetRule>,
}

impl Schema {
    /// Base shape: positive amount, any fee, no recipient, no vendor field.
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            amount: Bounds::at_least(1),
            fee: Bounds::ANY,
            recipient: FieldRule::Forbidden,
            vendor_field: false,
            requires_htlc: false,
            rules: Vec::new(),
        }
    }

    pub fn amount(mut self, bounds: Bounds) -> Self {
        self.amount = bounds;
        self
    }

    pub fn fee(mut self, bounds: Bounds) -> Self {
        self.fee = bounds;
        self
    }

    pub fn recipient(mut self, rule: FieldRule) -> Self {
        self.recipient = rule;
        self
    }

    pub fn with_vendor_field(mut self) -> Self {
        self.vendor_field = true;
        self
    }

    pub fn requires_htlc(mut self) -> Self {
        self.requires_htlc = true;
        self
    }

    pub fn rule(mut self, rule: AssetRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Network facts the rules need.
#[derive(Debug, Clone, Copy)]
pub struct SchemaContext<'a> {
    pub network_byte: u8,
    pub milestone: &'a Milestone,
    pub strict: bool,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path into the data, e.g. `asset.delegate.username`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Default)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(Violation {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Data failed its schema. Carries every violation found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema `{schema}` violated: {}", render(.violations))]
pub struct SchemaError {
    pub schema: String,
    pub violations: Vec<Violation>,
}

impl SchemaError {
    pub fn has_path(&self, path: &str) -> bool {
        self.violations.iter().any(|violation| violation.path == path)
    }
}

fn render(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Normalized data plus the validation outcome.
#[derive(Debug, Clone)]
pub struct SchemaValidation {
    pub value: TransactionData,
    pub error: Option<SchemaError>,
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

pub struct Validator;

impl Validator {
    pub fn validate(
        schema: &Schema,
        data: &TransactionData,
        context: &SchemaContext<'_>,
    ) -> SchemaValidation {
        let mut value = data.clone();
        if value.type_group.is_none() || value.version == TRANSACTION_VERSION_LEGACY {
            value.type_group = Some(CORE_TYPE_GROUP);
        }
        let legacy = value
            .asset
            .as_mut()
            .and_then(|asset| asset.multi_signature_legacy.as_mut());
        if let Some(legacy) = legacy {
            legacy
                .keysgroup
                .iter_mut()
                .for_each(|key| key.make_ascii_lowercase());
        }

        let mut violations = Violations::default();
        Self::check_header(&value, context, &mut violations);
        Self::check_signatures(&value, context, &mut violations);
        Self::check_common_fields(schema, &value, context, &mut violations);
        for rule in &schema.rules {
            rule(&value, context, &mut violations);
        }

        let error = if violations.is_empty() {
            None
        } else {
            Some(SchemaError {
                schema: schema.id.to_string(),
                violations: violations.0,
            })
        };
        SchemaValidation { value, error }
    }

    fn check_header(data: &TransactionData, context: &SchemaContext<'_>, out: &mut Violations) {
        match data.version {
            TRANSACTION_VERSION_LEGACY => {
                if data.timestamp.is_none() {
                    out.push("timestamp", "is required for version 1");
                }
                if data.nonce.is_some() {
                    out.push("nonce", "is not allowed for version 1");
                }
            }
            TRANSACTION_VERSION_AIP11 => {
                if data.nonce.is_none() {
                    out.push("nonce", "is required for version 2");
                }
                if data.timestamp.is_some() {
                    out.push("timestamp", "is not allowed for version 2");
                }
            }
            other => out.push("version", format!("must be 1 or 2, got {}", other)),
        }

        if let Some(network) = data.network {
            if network != context.network_byte {
                out.push(
                    "network",
                    format!("expected {}, got {}", context.network_byte, network),
                );
            }
        }

        if !is_public_key(&data.sender_public_key) {
            out.push("senderPublicKey", "must be a 66-char hex public key");
        }

        match &data.id {
            Some(id) if !is_hex(id, Some(64)) => out.push("id", "must be 64-char hex"),
            None if context.strict => out.push("id", "is required"),
            _ => {}
        }
    }

    fn check_signatures(data: &TransactionData, context: &SchemaContext<'_>, out: &mut Violations) {
        for (path, value) in [
            ("signature", &data.signature),
            ("secondSignature", &data.second_signature),
            ("signSignature", &data.sign_signature),
        ] {
            if let Some(signature) = value {
                if !is_hex(signature, None) {
                    out.push(path, "must be hex");
                }
            }
        }

        if let Some(signatures) = &data.signatures {
            if signatures.is_empty() || signatures.len() > MAX_MULTI_SIGNATURE_PARTICIPANTS {
                out.push("signatures", "must hold between 1 and 16 entries");
            }
            let unique: HashSet<&String> = signatures.iter().collect();
            if unique.len() != signatures.len() {
                out.push("signatures", "must not contain duplicates");
            }
            let entry_len = (data.version != TRANSACTION_VERSION_LEGACY).then_some(130);
            if signatures.iter().any(|s| !is_hex(s, entry_len)) {
                out.push("signatures", "entries must be hex index-plus-signature tuples");
            }
        }

        if context.strict && data.signature.is_none() && data.signatures.is_none() {
            out.push("signature", "signature or signatures is required");
        }
    }

    fn check_common_fields(
        schema: &Schema,
        data: &TransactionData,
        context: &SchemaContext<'_>,
        out: &mut Violations,
    ) {
        if !schema.amount.contains(data.amount) {
            out.push("amount", format!("must be {}", schema.amount));
        }
        if !schema.fee.contains(data.fee) {
            out.push("fee", format!("must be {}", schema.fee));
        }

        match (schema.recipient, &data.recipient_id) {
            (FieldRule::Required, None) => out.push("recipientId", "is required"),
            (FieldRule::Forbidden, Some(_)) => out.push("recipientId", "is not allowed"),
            (_, Some(recipient)) if !address::validate(recipient, context.network_byte) => {
                out.push("recipientId", "must be an address on this network")
            }
            _ => {}
        }

        if let Some(vendor_field) = &data.vendor_field {
            if !schema.vendor_field {
                out.push("vendorField", "is not allowed for this type");
            } else if vendor_field.len() > context.milestone.vendor_field_length {
                out.push(
                    "vendorField",
                    format!(
                        "must be at most {} bytes",
                        context.milestone.vendor_field_length
                    ),
                );
            }
        }

        if schema.requires_htlc && !context.milestone.htlc_enabled {
            out.push("type", "HTLC transactions are not enabled");
        }
    }
}

// ---------------------------------------------------------------------------
// Format helpers
// ---------------------------------------------------------------------------

/// Lowercase-or-uppercase hex, optionally of an exact char length.
pub fn is_hex(value: &str, length: Option<usize>) -> bool {
    if let Some(length) = length {
        if value.len() != length {
            return false;
        }
    }
    value.len() % 2 == 0 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

pub fn is_public_key(value: &str) -> bool {
    is_hex(value, Some(66))
}

/// Delegate usernames: 1-20 chars of `a-z 0-9 ! @ $ & _ .`.
pub fn is_username(value: &str) -> bool {
    (1..=20).contains(&value.len())
        && value
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b"!@$&_.".contains(&b))
}

/// Public key list shared by both multi-signature layouts.
pub fn check_participants(
    path: &str,
    keys: &[String],
    strip_prefix: bool,
    out: &mut Violations,
) {
    if keys.is_empty() || keys.len() > MAX_MULTI_SIGNATURE_PARTICIPANTS {
        out.push(path, "must hold between 1 and 16 keys");
    }
    let unique: HashSet<&String> = keys.iter().collect();
    if unique.len() != keys.len() {
        out.push(path, "must not contain duplicates");
    }
    let malformed = keys.iter().any(|key| {
        let key = if strip_prefix {
            key.strip_prefix('+').unwrap_or(key)
        } else {
            key
        };
        !is_public_key(key)
    });
    if malformed {
        out.push(path, "entries must be 66-char hex public keys");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    fn context(milestone: &Milestone, strict: bool) -> SchemaContext<'_> {
        SchemaContext {
            network_byte: 30,
            milestone,
            strict,
        }
    }

    fn sample() -> TransactionData {
        let keys = KeyPair::from_passphrase("schema").unwrap();
        TransactionData {
            nonce: Some(1),
            sender_public_key: keys.public_key().to_hex(),
            fee: 10,
            amount: 5,
            recipient_id: Some(address::from_public_key(&keys.public_key(), 30)),
            ..TransactionData::default()
        }
    }

    fn transfer_like() -> Schema {
        Schema::new("transfer")
            .fee(Bounds::at_least(1))
            .recipient(FieldRule::Required)
            .with_vendor_field()
    }

    #[test]
    fn valid_data_passes() {
        let milestone = Milestone::default();
        let result = Validator::validate(&transfer_like(), &sample(), &context(&milestone, false));
        assert!(result.error.is_none(), "{:?}", result.error);
        assert_eq!(result.value.type_group, Some(CORE_TYPE_GROUP));
    }

    #[test]
    fn collects_every_violation() {
        let milestone = Milestone::default();
        let data = TransactionData {
            fee: 0,
            amount: 0,
            recipient_id: None,
            network: Some(23),
            ..sample()
        };
        let error = Validator::validate(&transfer_like(), &data, &context(&milestone, false))
            .error
            .unwrap();
        assert!(error.has_path("fee"));
        assert!(error.has_path("amount"));
        assert!(error.has_path("recipientId"));
        assert!(error.has_path("network"));
        assert_eq!(error.schema, "transfer");
    }

    #[test]
    fn strict_requires_id_and_signature() {
        let milestone = Milestone::default();
        let error = Validator::validate(&transfer_like(), &sample(), &context(&milestone, true))
            .error
            .unwrap();
        assert!(error.has_path("id"));
        assert!(error.has_path("signature"));
    }

    #[test]
    fn vendor_field_respects_milestone_cap() {
        let milestone = Milestone::default();
        let mut data = sample();
        data.vendor_field = Some("x".repeat(64));
        assert!(Validator::validate(&transfer_like(), &data, &context(&milestone, false))
            .error
            .is_none());

        data.vendor_field = Some("x".repeat(65));
        let error = Validator::validate(&transfer_like(), &data, &context(&milestone, false))
            .error
            .unwrap();
        assert!(error.has_path("vendorField"));
    }

    #[test]
    fn vendor_field_rejected_where_unsupported() {
        let milestone = Milestone::default();
        let mut data = sample();
        data.recipient_id = None;
        data.vendor_field = Some("memo".into());
        let schema = Schema::new("plain");
        let error = Validator::validate(&schema, &data, &context(&milestone, false))
            .error
            .unwrap();
        assert!(error.has_path("vendorField"));
    }

    #[test]
    fn version_three_is_a_violation() {
        let milestone = Milestone::default();
        let data = TransactionData {
            version: 3,
            ..sample()
        };
        let error = Validator::validate(&transfer_like(), &data, &context(&milestone, false))
            .error
            .unwrap();
        assert!(error.has_path("version"));
    }

    #[test]
    fn username_charset() {
        assert!(is_username("genesis_1"));
        assert!(is_username("a.b@c$d&e!"));
        assert!(!is_username("Upper"));
        assert!(!is_username(""));
        assert!(!is_username(&"a".repeat(21)));
    }

    #[test]
    fn hex_helper() {
        assert!(is_hex("00ff", Some(4)));
        assert!(!is_hex("0ff", None));
        assert!(!is_hex("zz", None));
        assert!(!is_hex("00", Some(4)));
    }

    #[test]
    fn bounds_display() {
        assert_eq!(Bounds::exactly(0).to_string(), "exactly 0");
        assert_eq!(Bounds::at_least(1).to_string(), "at least 1");
        assert_eq!(Bounds { min: 2, max: 5 }.to_string(), "between 2 and 5");
    }
}
