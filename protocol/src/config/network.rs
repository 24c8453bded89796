//! Network parameters and the milestone schedule.
//!
//! Milestones are declared as a list of partial JSON objects, each taking
//! effect at its `height`. Later entries only mention what changes; the
//! preset loader deep-merges every entry onto the one before it, so the
//! resolved [`Milestone`] at any height carries the full parameter set.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::exceptions::Exceptions;
use super::{DEFAULT_MAX_PAYLOAD, DEFAULT_MULTI_PAYMENT_LIMIT, DEFAULT_VENDOR_FIELD_LENGTH};

const DEVNET_PRESET: &str = include_str!("../../presets/devnet.json");
const MAINNET_PRESET: &str = include_str!("../../presets/mainnet.json");
const TESTNET_PRESET: &str = include_str!("../../presets/testnet.json");

/// Errors raised while loading a network preset.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The preset is not valid JSON or does not match the expected shape.
    #[error("invalid network preset: {0}")]
    Parse(#[from] serde_json::Error),

    /// A preset must declare at least the genesis milestone.
    #[error("network preset declares no milestones")]
    NoMilestones,

    /// Each milestone entry needs a `height`.
    #[error("milestone #{index} has no height")]
    MissingHeight { index: usize },
}

// ---------------------------------------------------------------------------
// Milestone
// ---------------------------------------------------------------------------

/// Static fee table keyed by transaction kind (`transfer`, `vote`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSchedule {
    #[serde(default)]
    pub static_fees: BTreeMap<String, u64>,
}

impl FeeSchedule {
    pub fn static_fee(&self, key: &str) -> Option<u64> {
        self.static_fees.get(key).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockLimits {
    #[serde(default = "default_max_payload")]
    pub max_payload: usize,
}

impl Default for BlockLimits {
    fn default() -> Self {
        Self {
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// The resolved protocol parameters in force from `height` onwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub height: u64,

    /// Enables the v2 wire format (type groups, nonces, Schnorr).
    #[serde(default)]
    pub aip11: bool,

    #[serde(default = "default_vendor_field_length")]
    pub vendor_field_length: usize,

    #[serde(default = "default_multi_payment_limit")]
    pub multi_payment_limit: usize,

    #[serde(default)]
    pub htlc_enabled: bool,

    #[serde(default)]
    pub fees: FeeSchedule,

    #[serde(default)]
    pub block: BlockLimits,
}

impl Milestone {
    /// Wire versions this milestone accepts. Version 1 never goes away.
    pub fn supports_version(&self, version: u8) -> bool {
        match version {
            1 => true,
            2 => self.aip11,
            _ => false,
        }
    }
}

impl Default for Milestone {
    fn default() -> Self {
        Self {
            height: 1,
            aip11: false,
            vendor_field_length: DEFAULT_VENDOR_FIELD_LENGTH,
            multi_payment_limit: DEFAULT_MULTI_PAYMENT_LIMIT,
            htlc_enabled: false,
            fees: FeeSchedule::default(),
            block: BlockLimits::default(),
        }
    }
}

fn default_vendor_field_length() -> usize {
    DEFAULT_VENDOR_FIELD_LENGTH
}

fn default_multi_payment_limit() -> usize {
    DEFAULT_MULTI_PAYMENT_LIMIT
}

fn default_max_payload() -> usize {
    DEFAULT_MAX_PAYLOAD
}

// ---------------------------------------------------------------------------
// Config Service
// ---------------------------------------------------------------------------

/// Read-only view of network parameters as seen by the codec.
pub trait NetworkConfig: Send + Sync {
    /// The byte stamped into the transaction header and address prefix.
    fn network_byte(&self) -> u8;

    /// Current chain height.
    fn height(&self) -> u64;

    /// The milestone in force at `height`.
    fn milestone_at(&self, height: u64) -> &Milestone;

    /// The milestone in force at the current height.
    fn milestone(&self) -> &Milestone {
        self.milestone_at(self.height())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkParams {
    pub name: String,
    /// Address version byte, doubling as the transaction network byte.
    pub pub_key_hash: u8,
    #[serde(default)]
    pub wif: u8,
}

/// A network preset as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkPreset {
    pub network: NetworkParams,
    pub milestones: Vec<Value>,
    #[serde(default)]
    pub exceptions: Exceptions,
}

impl NetworkPreset {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn devnet() -> Result<Self, ConfigError> {
        Self::from_json(DEVNET_PRESET)
    }

    pub fn mainnet() -> Result<Self, ConfigError> {
        Self::from_json(MAINNET_PRESET)
    }

    /// Single-milestone network with every feature enabled from genesis.
    pub fn testnet() -> Result<Self, ConfigError> {
        Self::from_json(TESTNET_PRESET)
    }

    /// Resolves the partial milestone entries into full, cumulative milestones
    /// sorted by height.
    pub fn resolve_milestones(&self) -> Result<Vec<Milestone>, ConfigError> {
        if self.milestones.is_empty() {
            return Err(ConfigError::NoMilestones);
        }

        let mut entries = Vec::with_capacity(self.milestones.len());
        for (index, entry) in self.milestones.iter().enumerate() {
            let height = entry
                .get("height")
                .and_then(Value::as_u64)
                .ok_or(ConfigError::MissingHeight { index })?;
            entries.push((height, entry));
        }
        entries.sort_by_key(|(height, _)| *height);

        let mut merged = Value::Object(serde_json::Map::new());
        let mut resolved = Vec::with_capacity(entries.len());
        for (_, entry) in entries {
            merge_json(&mut merged, entry);
            resolved.push(serde_json::from_value::<Milestone>(merged.clone())?);
        }
        Ok(resolved)
    }
}

/// Overlays `overlay` onto `base`: objects merge key by key, anything else replaces.
fn merge_json(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                merge_json(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

/// A fixed milestone schedule with a movable current height.
#[derive(Debug)]
pub struct StaticNetworkConfig {
    params: NetworkParams,
    milestones: Vec<Milestone>,
    height: AtomicU64,
}

impl StaticNetworkConfig {
    pub fn from_preset(preset: &NetworkPreset) -> Result<Self, ConfigError> {
        let milestones = preset.resolve_milestones()?;
        debug!(
            network = %preset.network.name,
            milestones = milestones.len(),
            "loaded network preset"
        );
        Ok(Self {
            params: preset.network.clone(),
            milestones,
            height: AtomicU64::new(1),
        })
    }

    /// A single-milestone network, handy for fixtures.
    pub fn single(network_byte: u8, milestone: Milestone) -> Self {
        Self {
            params: NetworkParams {
                name: "custom".to_string(),
                pub_key_hash: network_byte,
                wif: 0,
            },
            milestones: vec![milestone],
            height: AtomicU64::new(1),
        }
    }

    pub fn devnet() -> Result<Self, ConfigError> {
        Self::from_preset(&NetworkPreset::devnet()?)
    }

    pub fn mainnet() -> Result<Self, ConfigError> {
        Self::from_preset(&NetworkPreset::mainnet()?)
    }

    pub fn testnet() -> Result<Self, ConfigError> {
        Self::from_preset(&NetworkPreset::testnet()?)
    }

    pub fn name(&self) -> &str {
        &self.params.name
    }

    pub fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::Relaxed);
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }
}

impl NetworkConfig for StaticNetworkConfig {
    fn network_byte(&self) -> u8 {
        self.params.pub_key_hash
    }

    fn height(&self) -> u64 {
        self.height.load(Ordering::Relaxed)
    }

    fn milestone_at(&self, height: u64) -> &Milestone {
        // Milestones are sorted and non-empty; heights before the first
        // entry resolve to genesis.
        let position = self
            .milestones
            .partition_point(|milestone| milestone.height <= height);
        &self.milestones[position.saturating_sub(1)]
    }
}
