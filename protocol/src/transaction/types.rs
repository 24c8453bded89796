//! Transaction type identifiers.
//!
//! A transaction kind is addressed by `(type_group, type)`. Group 1 holds
//! the core ledger kinds, group 2 the magistrate kinds, and anything at or
//! above [`CUSTOM_TYPE_FLOOR`](crate::config::CUSTOM_TYPE_FLOOR) in any group
//! belongs to plugins.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{CORE_TYPE_GROUP, MAGISTRATE_TYPE_GROUP};

// ---------------------------------------------------------------------------
// TransactionTypeKey
// ---------------------------------------------------------------------------

/// Registry key for a transaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionTypeKey {
    pub type_group: u32,
    #[serde(rename = "type")]
    pub transaction_type: u16,
}

impl TransactionTypeKey {
    pub const fn new(type_group: u32, transaction_type: u16) -> Self {
        Self {
            type_group,
            transaction_type,
        }
    }

    pub const fn core(transaction_type: u16) -> Self {
        Self::new(CORE_TYPE_GROUP, transaction_type)
    }
}

impl fmt::Display for TransactionTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_group, self.transaction_type)
    }
}

// ---------------------------------------------------------------------------
// CoreTransactionType
// ---------------------------------------------------------------------------

/// The built-in kinds of type group 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CoreTransactionType {
    Transfer = 0,
    SecondSignature = 1,
    DelegateRegistration = 2,
    Vote = 3,
    MultiSignature = 4,
    Ipfs = 5,
    MultiPayment = 6,
    DelegateResignation = 7,
    HtlcLock = 8,
    HtlcClaim = 9,
    HtlcRefund = 10,
}

impl CoreTransactionType {
    pub const ALL: [CoreTransactionType; 11] = [
        Self::Transfer,
        Self::SecondSignature,
        Self::DelegateRegistration,
        Self::Vote,
        Self::MultiSignature,
        Self::Ipfs,
        Self::MultiPayment,
        Self::DelegateResignation,
        Self::HtlcLock,
        Self::HtlcClaim,
        Self::HtlcRefund,
    ];

    pub const fn code(self) -> u16 {
        self as u16
    }

    pub const fn key(self) -> TransactionTypeKey {
        TransactionTypeKey::core(self as u16)
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }
}

impl fmt::Display for CoreTransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transfer => "Transfer",
            Self::SecondSignature => "SecondSignature",
            Self::DelegateRegistration => "DelegateRegistration",
            Self::Vote => "Vote",
            Self::MultiSignature => "MultiSignature",
            Self::Ipfs => "Ipfs",
            Self::MultiPayment => "MultiPayment",
            Self::DelegateResignation => "DelegateResignation",
            Self::HtlcLock => "HtlcLock",
            Self::HtlcClaim => "HtlcClaim",
            Self::HtlcRefund => "HtlcRefund",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// MagistrateTransactionType
// ---------------------------------------------------------------------------

/// Kinds of type group 2. Type 2 (business update) is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum MagistrateTransactionType {
    BusinessRegistration = 0,
    BusinessResignation = 1,
    BridgechainRegistration = 3,
    BridgechainResignation = 4,
}

impl MagistrateTransactionType {
    pub const fn code(self) -> u16 {
        self as u16
    }

    pub const fn key(self) -> TransactionTypeKey {
        TransactionTypeKey::new(MAGISTRATE_TYPE_GROUP, self as u16)
    }
}

impl fmt::Display for MagistrateTransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BusinessRegistration => "BusinessRegistration",
            Self::BusinessResignation => "BusinessResignation",
            Self::BridgechainRegistration => "BridgechainRegistration",
            Self::BridgechainResignation => "BridgechainResignation",
        };
        f.write_str(name)
    }
}
