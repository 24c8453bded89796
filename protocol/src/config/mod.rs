//! # Protocol Configuration & Constants
//!
//! Every wire-level magic number lives here, next to the two services the
//! codec consults at runtime:
//!
//! - [`NetworkConfig`]: the network byte plus the milestone active at the
//!   current height (vendor field cap, AIP11 switch, fee table, ...).
//! - [`ExceptionList`]: the allow-list of historical transaction ids that
//!   bypass schema and signature checks, plus the id fix-up table.
//!
//! Both are traits so a node can plug in its own live configuration. The
//! bundled [`StaticNetworkConfig`] and [`Exceptions`] are built from the JSON
//! presets in `presets/`.

mod exceptions;
mod network;

pub use exceptions::{ExceptionList, Exceptions};
pub use network::{
    BlockLimits, ConfigError, FeeSchedule, Milestone, NetworkConfig, NetworkPreset, NetworkParams,
    StaticNetworkConfig,
};

// ---------------------------------------------------------------------------
// Wire Format
// ---------------------------------------------------------------------------

/// First byte of every serialized transaction.
pub const TRANSACTION_MARKER: u8 = 0xFF;

/// Separator that introduces the legacy (v1) multi-signature block.
pub const LEGACY_MULTI_SIGNATURE_MARKER: u8 = 0xFF;

/// Legacy transaction layout: u8 type, u32 timestamp, ECDSA signatures.
pub const TRANSACTION_VERSION_LEGACY: u8 = 1;

/// AIP11 layout: u32 type group, u16 type, u64 nonce, Schnorr signatures.
pub const TRANSACTION_VERSION_AIP11: u8 = 2;

/// Compressed secp256k1 public key.
pub const PUBLIC_KEY_LENGTH: usize = 33;

/// Raw address payload: one network byte plus a RIPEMD-160 digest.
pub const ADDRESS_LENGTH: usize = 21;

/// SHA-256 output; also the width of transaction ids and HTLC hashes.
pub const HASH_LENGTH: usize = 32;

/// BIP340-style Schnorr signature.
pub const SCHNORR_SIGNATURE_LENGTH: usize = 64;

/// One participant entry in a v2 multi-signature block: index byte + Schnorr signature.
pub const MULTI_SIGNATURE_ENTRY_LENGTH: usize = 1 + SCHNORR_SIGNATURE_LENGTH;

/// Upper bound on participants in a multi-signature wallet.
pub const MAX_MULTI_SIGNATURE_PARTICIPANTS: usize = 16;

/// Legacy v1 hashing always reserves this many bytes for the vendor field.
pub const LEGACY_VENDOR_FIELD_PADDING: usize = 64;

// ---------------------------------------------------------------------------
// Type Groups
// ---------------------------------------------------------------------------

/// Test group, reserved for fixtures.
pub const TEST_TYPE_GROUP: u32 = 0;

/// Built-in ledger transactions (transfer, vote, HTLC, ...).
pub const CORE_TYPE_GROUP: u32 = 1;

/// Business and bridgechain registrations.
pub const MAGISTRATE_TYPE_GROUP: u32 = 2;

/// Custom (plugin) transaction types must use a type number at or above this.
pub const CUSTOM_TYPE_FLOOR: u16 = 100;

/// Legacy v1 transactions with a type in this range are no longer accepted.
pub const DEPRECATED_LEGACY_TYPES: std::ops::RangeInclusive<u16> = 4..=99;

// ---------------------------------------------------------------------------
// Milestone Defaults
// ---------------------------------------------------------------------------

/// Vendor field cap before the extended-memo milestone.
pub const DEFAULT_VENDOR_FIELD_LENGTH: usize = 64;

/// Maximum number of recipients in one multi-payment.
pub const DEFAULT_MULTI_PAYMENT_LIMIT: usize = 256;

/// Maximum serialized block payload; also caps the encode buffer.
pub const DEFAULT_MAX_PAYLOAD: usize = 2 * 1024 * 1024;
