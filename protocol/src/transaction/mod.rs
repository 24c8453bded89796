//! # Transaction Module
//!
//! Wire codec, type registry, signing and verification for ledger
//! transactions. Two wire formats are supported: the legacy version 1
//! layout and the AIP11 version 2 layout with type groups and nonces.
//!
//! ## Architecture
//!
//! ```text
//! cursor.rs        BinaryCursor: bounds-checked little-endian reads and writes
//! data.rs          TransactionData, the JSON-shaped record
//! asset.rs         Per-kind asset payloads
//! types.rs         Type keys and the built-in type numbers
//! variant.rs       TransactionVariant, the per-kind extension trait
//! variants/        The built-in kinds (core and magistrate groups)
//! registry.rs      TypeRegistry: (type group, type, version) -> variant
//! schema.rs        Structural validation
//! serializer.rs    data -> bytes
//! deserializer.rs  bytes -> data, signature-scheme detection
//! legacy.rs        Version-1 hashing layout
//! hashing.rs       Signing hashes and ids
//! signing.rs       Signer: sender, second and multi-signatures
//! verification.rs  Verifier: schema and signature checks
//! factory.rs       TransactionFactory: the entry point for untrusted input
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build** a [`TransactionData`] (or receive bytes from a peer).
//! 2. **Sign** it with a [`Signer`].
//! 3. **Admit** it through [`TransactionFactory::from_data`] or
//!    [`TransactionFactory::from_bytes`], which decode, assign the id,
//!    validate the schema and verify signatures.
//!
//! All components share one [`ProtocolContext`]: registry, network
//! configuration and exception list.

pub mod asset;
pub mod context;
pub mod cursor;
pub mod data;
pub mod deserializer;
pub mod error;
pub mod factory;
pub mod hashing;
mod legacy;
pub mod registry;
pub mod schema;
pub mod serializer;
pub mod signing;
pub mod types;
pub mod variant;
pub mod variants;
pub mod verification;

pub use asset::{MultiSignatureAsset, TransactionAsset};
pub use context::{ContextError, ProtocolContext};
pub use cursor::BinaryCursor;
pub use data::TransactionData;
pub use deserializer::{apply_v1_compatibility, DeserializeOptions, Deserializer};
pub use error::TransactionError;
pub use factory::{Transaction, TransactionFactory};
pub use hashing::TransactionHasher;
pub use registry::TypeRegistry;
pub use schema::{Schema, SchemaError, SchemaValidation};
pub use serializer::{SerializeOptions, Serializer};
pub use signing::Signer;
pub use types::{CoreTransactionType, MagistrateTransactionType, TransactionTypeKey};
pub use variant::TransactionVariant;
pub use verification::Verifier;
