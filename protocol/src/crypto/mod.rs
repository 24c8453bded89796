//! # Cryptographic Primitives
//!
//! Everything key- or hash-shaped the transaction codec touches:
//!
//! - **secp256k1** keys derived from a passphrase (`sha256(passphrase)`),
//!   always handled in compressed 33-byte form.
//! - **ECDSA** (DER-encoded) for legacy v1 transactions.
//! - **Schnorr** (64-byte, BIP340-style over the x-only key) for v2.
//! - **SHA-256** for transaction hashes and ids, **RIPEMD-160** for addresses.
//!
//! Thin wrappers over `k256`, `sha2`, `ripemd` and `bs58`. No curve
//! arithmetic happens in this crate.

pub mod address;
pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{ripemd160, sha256};
pub use keys::{KeyError, KeyPair, PublicKey};
pub use signatures::{SignatureError, SignatureScheme};
