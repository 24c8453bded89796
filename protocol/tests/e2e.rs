//! End-to-end tests for the transaction pipeline.
//!
//! Each test builds its own context from a bundled preset, produces
//! transactions with real keys and pushes them through the factory the way
//! a node would: structured input or raw bytes in, verified transaction out.

use std::sync::Arc;

use proptest::prelude::*;

use ledger_transactions::config::{Exceptions, NetworkPreset, StaticNetworkConfig};
use ledger_transactions::crypto::signatures::ecdsa_sign;
use ledger_transactions::crypto::{address, KeyPair};
use ledger_transactions::transaction::asset::MultiSignatureLegacyAsset;
use ledger_transactions::transaction::schema::Schema;
use ledger_transactions::transaction::{
    apply_v1_compatibility, BinaryCursor, DeserializeOptions, Deserializer, MultiSignatureAsset,
    ProtocolContext, SerializeOptions, Serializer, Signer, TransactionData, TransactionError,
    TransactionFactory, TransactionHasher, TransactionVariant, Verifier,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn devnet() -> (ProtocolContext, Arc<StaticNetworkConfig>) {
    init_tracing();
    ProtocolContext::from_preset(&NetworkPreset::devnet().unwrap()).unwrap()
}

fn devnet_with(exceptions: Exceptions) -> ProtocolContext {
    let network = StaticNetworkConfig::from_preset(&NetworkPreset::devnet().unwrap()).unwrap();
    ProtocolContext::with_core_types(Arc::new(network), Arc::new(exceptions)).unwrap()
}

fn sender() -> KeyPair {
    KeyPair::from_passphrase("this is a top secret passphrase").unwrap()
}

fn recipient() -> String {
    address::from_public_key(&KeyPair::from_passphrase("recipient").unwrap().public_key(), 30)
}

fn transfer(keys: &KeyPair) -> TransactionData {
    TransactionData {
        network: Some(30),
        nonce: Some(1),
        sender_public_key: keys.public_key().to_hex(),
        recipient_id: Some(recipient()),
        amount: 1_000_000_000,
        fee: 10_000_000,
        expiration: Some(0),
        ..TransactionData::default()
    }
}

fn participants(count: usize) -> Vec<KeyPair> {
    (0..count)
        .map(|i| KeyPair::from_passphrase(&format!("participant {}", i)).unwrap())
        .collect()
}

fn multi_signature_registration(keys: &[KeyPair], min: u8) -> TransactionData {
    let mut data = TransactionData {
        transaction_type: 4,
        network: Some(30),
        nonce: Some(1),
        sender_public_key: sender().public_key().to_hex(),
        fee: 500_000_000 * (keys.len() as u64 + 1),
        ..TransactionData::default()
    };
    data.asset_mut().multi_signature = Some(MultiSignatureAsset {
        min,
        public_keys: keys.iter().map(|k| k.public_key().to_hex()).collect(),
    });
    data
}

// ---------------------------------------------------------------------------
// Transfers
// ---------------------------------------------------------------------------

#[test]
fn transfer_round_trip() {
    let (context, _) = devnet();
    let factory = TransactionFactory::new(context.clone());
    let keys = sender();

    let mut data = transfer(&keys);
    Signer::new(context).sign(&mut data, &keys, None).unwrap();

    let transaction = factory.from_data(&data, false).unwrap();
    assert!(transaction.is_verified);

    let decoded = factory.from_bytes(&transaction.serialized, true).unwrap();
    assert!(decoded.is_verified);
    assert_eq!(decoded.data.amount, 1_000_000_000);
    assert_eq!(decoded.data.fee, 10_000_000);
    assert_eq!(decoded.data.recipient_id, data.recipient_id);
    assert_eq!(decoded.id(), transaction.id());
    assert_eq!(decoded.data.signature, data.signature);
}

#[test]
fn zero_fee_rejected() {
    let (context, _) = devnet();
    let keys = sender();
    let mut data = transfer(&keys);
    data.fee = 0;
    Signer::new(context.clone())
        .sign(&mut data, &keys, None)
        .unwrap();

    match TransactionFactory::new(context).from_data(&data, false) {
        Err(TransactionError::Schema(error)) => {
            assert!(!error.violations.is_empty());
            assert!(error.has_path("fee"));
        }
        other => panic!("expected Schema, got {:?}", other),
    }
}

#[test]
fn second_signature_verification() {
    let (context, _) = devnet();
    let keys = sender();
    let second = KeyPair::from_passphrase("second passphrase").unwrap();
    let signer = Signer::new(context.clone());

    let mut data = transfer(&keys);
    signer.sign(&mut data, &keys, None).unwrap();
    signer.second_sign(&mut data, &second).unwrap();

    let transaction = TransactionFactory::new(context.clone())
        .from_data(&data, false)
        .unwrap();
    assert!(transaction.is_verified);

    let verifier = Verifier::new(context);
    assert!(verifier
        .verify_second_signature(&transaction.data, &second.public_key().to_hex())
        .unwrap());
    assert!(!verifier
        .verify_second_signature(&transaction.data, &keys.public_key().to_hex())
        .unwrap());
}

// ---------------------------------------------------------------------------
// Legacy
// ---------------------------------------------------------------------------

#[test]
fn legacy_multi_signature_exception_verifies() {
    let keys = sender();
    let group = participants(2);

    let mut data = TransactionData {
        version: 1,
        network: Some(30),
        timestamp: Some(1_000),
        transaction_type: 4,
        sender_public_key: keys.public_key().to_hex(),
        fee: 1_500_000_000,
        ..TransactionData::default()
    };
    // pre-normalization keysgroup: no `+` prefix
    data.asset_mut().multi_signature_legacy = Some(MultiSignatureLegacyAsset {
        min: 2,
        lifetime: 24,
        keysgroup: group.iter().map(|k| k.public_key().to_hex()).collect(),
    });
    let legacy_signatures: String = group
        .iter()
        .map(|k| hex::encode(ecdsa_sign(&[7u8; 32], k).unwrap()))
        .collect();
    data.signatures = Some(vec![legacy_signatures]);

    let plain = devnet_with(Exceptions::new());
    Signer::new(plain.clone())
        .sign(&mut data, &keys, None)
        .unwrap();

    let mut normalized = data.clone();
    apply_v1_compatibility(&mut normalized);
    let id = TransactionHasher::new(plain.clone()).id(&normalized).unwrap();
    data.id = Some(id.clone());

    let rejected = TransactionFactory::new(plain).from_data(&data, false).unwrap();
    assert!(!rejected.is_verified);

    let lenient = devnet_with(Exceptions::new().with_transaction(id.clone()));
    let accepted = TransactionFactory::new(lenient)
        .from_data(&data, false)
        .unwrap();
    assert!(accepted.is_verified);
    assert_eq!(accepted.id(), Some(id.as_str()));
    let keysgroup = &accepted
        .data
        .asset
        .as_ref()
        .unwrap()
        .multi_signature_legacy
        .as_ref()
        .unwrap()
        .keysgroup;
    assert!(keysgroup.iter().all(|key| key.starts_with('+')));
}

#[test]
fn v1_transfer_verifies_with_ecdsa() {
    let (context, _) = devnet();
    let keys = sender();
    let mut data = TransactionData {
        version: 1,
        timestamp: Some(42),
        nonce: None,
        ..transfer(&keys)
    };
    Signer::new(context.clone())
        .sign(&mut data, &keys, None)
        .unwrap();

    let transaction = TransactionFactory::new(context).from_data(&data, true);
    // strict without an id on structured input
    assert!(matches!(transaction, Err(TransactionError::Schema(_))));

    let (context, _) = devnet();
    let transaction = TransactionFactory::new(context).from_data(&data, false).unwrap();
    assert!(transaction.is_verified);
    assert_eq!(transaction.data.version, 1);
}

// ---------------------------------------------------------------------------
// Registry and version gate
// ---------------------------------------------------------------------------

#[test]
fn unknown_type_rejected() {
    let (context, _) = devnet();
    match context.registry.lookup(250, Some(1), None) {
        Err(TransactionError::UnknownType {
            transaction_type: 250,
            type_group: Some(1),
        }) => {}
        other => panic!("expected UnknownType, got {:?}", other),
    }
}

#[test]
fn unsupported_version_is_gated() {
    let (context, _) = devnet();
    let keys = sender();
    let mut data = transfer(&keys);
    Signer::new(context.clone())
        .sign(&mut data, &keys, None)
        .unwrap();
    let mut bytes = Serializer::new(context.clone())
        .serialize(&data, &SerializeOptions::default())
        .unwrap();
    bytes[1] = 3;

    match TransactionFactory::new(context.clone()).from_bytes(&bytes, false) {
        Err(TransactionError::UnsupportedVersion { version: 3 }) => {}
        other => panic!("expected UnsupportedVersion, got {:?}", other),
    }

    let options = DeserializeOptions {
        disable_version_check: true,
        ..DeserializeOptions::default()
    };
    let decoded = Deserializer::new(context).deserialize(&bytes, &options).unwrap();
    assert_eq!(decoded.version, 3);
    assert_eq!(decoded.recipient_id, data.recipient_id);
}

#[derive(Debug)]
struct Donation;

impl TransactionVariant for Donation {
    fn name(&self) -> &'static str {
        "donation"
    }

    fn transaction_type(&self) -> u16 {
        150
    }

    fn type_group(&self) -> u32 {
        1001
    }

    fn schema(&self) -> Schema {
        Schema::new("donation")
    }

    fn serialize_asset(
        &self,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        cursor.write_u64_le(data.amount)
    }

    fn deserialize_asset(
        &self,
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        data.amount = cursor.read_u64_le()?;
        Ok(())
    }
}

#[test]
fn custom_type_lifecycle() {
    let (context, _) = devnet();
    context.registry.register(Arc::new(Donation), true).unwrap();

    let keys = sender();
    let mut data = TransactionData {
        type_group: Some(1001),
        transaction_type: 150,
        network: Some(30),
        nonce: Some(4),
        sender_public_key: keys.public_key().to_hex(),
        amount: 77,
        fee: 1,
        ..TransactionData::default()
    };
    Signer::new(context.clone())
        .sign(&mut data, &keys, None)
        .unwrap();

    let factory = TransactionFactory::new(context.clone());
    let transaction = factory.from_data(&data, false).unwrap();
    assert!(transaction.is_verified);
    assert_eq!(transaction.variant().name(), "donation");
    assert_eq!(transaction.data.amount, 77);

    context.registry.deregister(150, Some(1001)).unwrap();
    match factory.from_bytes(&transaction.serialized, false) {
        Err(TransactionError::InvalidTransactionBytes(inner)) => {
            assert!(matches!(*inner, TransactionError::UnknownType { .. }))
        }
        other => panic!("expected InvalidTransactionBytes, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Vendor field
// ---------------------------------------------------------------------------

#[test]
fn vendor_field_cap_follows_milestone() {
    let (context, network) = devnet();
    let factory = TransactionFactory::new(context.clone());
    let signer = Signer::new(context);
    let keys = sender();

    let build = |vendor_field: String| {
        let mut data = transfer(&keys);
        data.vendor_field = Some(vendor_field);
        signer.sign(&mut data, &keys, None).unwrap();
        factory.from_data(&data, false)
    };

    assert!(build("a".repeat(64)).unwrap().is_verified);
    match build("a".repeat(65)) {
        Err(TransactionError::Schema(error)) => assert!(error.has_path("vendorField")),
        other => panic!("expected Schema, got {:?}", other),
    }

    network.set_height(100_000);
    let extended = build("a".repeat(255)).unwrap();
    assert_eq!(extended.data.vendor_field.as_deref().map(str::len), Some(255));
    match build("a".repeat(256)) {
        Err(TransactionError::Schema(error)) => assert!(error.has_path("vendorField")),
        other => panic!("expected Schema, got {:?}", other),
    }

    // The codec holds the same line when schema checks are skipped.
    let mut oversized = transfer(&keys);
    oversized.vendor_field = Some("a".repeat(256));
    match Serializer::new(factory.context().clone())
        .serialize(&oversized, &SerializeOptions::default())
    {
        Err(TransactionError::VendorFieldTooLarge {
            length: 256,
            max: 255,
        }) => {}
        other => panic!("expected VendorFieldTooLarge, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Multi-signature
// ---------------------------------------------------------------------------

#[test]
fn multi_signature_threshold() {
    let (context, _) = devnet();
    let signer = Signer::new(context.clone());
    let verifier = Verifier::new(context.clone());
    let group = participants(3);
    let asset = MultiSignatureAsset {
        min: 2,
        public_keys: group.iter().map(|k| k.public_key().to_hex()).collect(),
    };

    let mut data = multi_signature_registration(&group, 2);
    signer.multi_sign(&mut data, &group[0], None).unwrap();
    assert!(!verifier.verify_signatures(&data, &asset).unwrap());

    signer.multi_sign(&mut data, &group[2], Some(2)).unwrap();
    assert!(verifier.verify_signatures(&data, &asset).unwrap());

    signer.sign(&mut data, &sender(), None).unwrap();
    let transaction = TransactionFactory::new(context)
        .from_data(&data, false)
        .unwrap();
    assert!(transaction.is_verified);
    assert_eq!(transaction.data.signatures.as_ref().map(Vec::len), Some(2));
}

#[test]
fn duplicate_participant_rejected_by_factory() {
    let (context, _) = devnet();
    let signer = Signer::new(context.clone());
    let group = participants(3);

    let mut data = multi_signature_registration(&group, 2);
    signer.multi_sign(&mut data, &group[0], Some(0)).unwrap();
    signer.multi_sign(&mut data, &group[1], Some(0)).unwrap();
    signer.sign(&mut data, &sender(), None).unwrap();

    let bytes = Serializer::new(context.clone())
        .serialize(&data, &SerializeOptions::default())
        .unwrap();
    match TransactionFactory::new(context).from_bytes(&bytes, false) {
        Err(TransactionError::DuplicateParticipant { index: 0 }) => {}
        other => panic!("expected DuplicateParticipant, got {:?}", other),
    }
}

#[test]
fn truncated_bytes_rejected() {
    let (context, _) = devnet();
    let keys = sender();
    let mut data = transfer(&keys);
    Signer::new(context.clone())
        .sign(&mut data, &keys, None)
        .unwrap();
    let factory = TransactionFactory::new(context);
    let transaction = factory.from_data(&data, false).unwrap();

    for cut in [65, 80, 120] {
        let truncated = &transaction.serialized[..transaction.serialized.len() - cut];
        match factory.from_bytes(truncated, false) {
            Err(TransactionError::InvalidTransactionBytes(_)) => {}
            other => panic!("expected InvalidTransactionBytes at cut {}, got {:?}", cut, other),
        }
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn id_is_stable_across_reserialization(
        amount in 1u64..=u64::MAX / 2,
        fee in 1u64..=1_000_000_000,
        nonce in 1u64..=u64::MAX,
        vendor_field in proptest::option::of("[a-z0-9 ]{1,64}"),
    ) {
        let (context, _) = devnet();
        let keys = sender();
        let mut data = TransactionData {
            amount,
            fee,
            nonce: Some(nonce),
            vendor_field,
            ..transfer(&keys)
        };
        Signer::new(context.clone()).sign(&mut data, &keys, None).unwrap();

        let factory = TransactionFactory::new(context.clone());
        let transaction = factory.from_data(&data, false).unwrap();
        prop_assert!(transaction.is_verified);

        let decoded = factory.from_bytes(&transaction.serialized, true).unwrap();
        prop_assert_eq!(decoded.id(), transaction.id());

        let reserialized = Serializer::new(context)
            .serialize(&decoded.data, &SerializeOptions::default())
            .unwrap();
        prop_assert_eq!(reserialized, transaction.serialized);
    }
}
