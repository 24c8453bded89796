// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ledger Transactions: Core Library
//!
//! Transaction handling for a delegated proof-of-stake ledger: the binary
//! wire codec, the registry of transaction kinds, signing, verification,
//! and the factory that turns untrusted bytes into trusted transactions.
//!
//! Two wire formats coexist. Version 1 is the legacy layout, signed with
//! DER-encoded ECDSA over a fixed-width hashing layout. Version 2 (AIP11)
//! adds type groups and nonces and is signed with 64-byte Schnorr
//! signatures over the wire form itself. Which versions a node accepts is
//! decided per milestone.
//!
//! ## Architecture
//!
//! - **config**: Network presets, height-indexed milestones, exception lists.
//! - **crypto**: secp256k1 keys, ECDSA and Schnorr, hashing, addresses.
//! - **transaction**: Cursor, data model, registry, codec, schema, signer,
//!   verifier and factory.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ledger_transactions::config::NetworkPreset;
//! use ledger_transactions::crypto::{address, KeyPair};
//! use ledger_transactions::transaction::{
//!     ProtocolContext, Signer, TransactionData, TransactionFactory,
//! };
//!
//! let (context, _network) = ProtocolContext::from_preset(&NetworkPreset::devnet()?)?;
//! let keys = KeyPair::from_passphrase("this is a top secret passphrase")?;
//!
//! let mut data = TransactionData {
//!     nonce: Some(1),
//!     sender_public_key: keys.public_key().to_hex(),
//!     recipient_id: Some(address::from_public_key(&keys.public_key(), 30)),
//!     amount: 1_000_000_000,
//!     fee: 10_000_000,
//!     ..TransactionData::default()
//! };
//! Signer::new(context.clone()).sign(&mut data, &keys, None)?;
//!
//! let transaction = TransactionFactory::new(context).from_data(&data, false)?;
//! assert!(transaction.is_verified);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod crypto;
pub mod transaction;
