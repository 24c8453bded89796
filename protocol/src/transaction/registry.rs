//! # Transaction Type Registry
//!
//! Maps `(type_group, type)` to the variants that implement it, one per
//! wire version. The built-in kinds are installed at construction; plugin
//! kinds come and go at runtime via [`TypeRegistry::register`] and
//! [`TypeRegistry::deregister`].
//!
//! ## Lookup
//!
//! A lookup names a type, optionally a group (core when omitted) and
//! optionally a version. The exact version wins; otherwise the variant
//! registered first for that key answers. This is what lets a v1 transfer
//! and a v2 transfer share type 0 in group 1.
//!
//! The registry is shared behind an `Arc` and guarded by a `RwLock`:
//! lookups are hot, mutations rare.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::error::TransactionError;
use super::schema::Schema;
use super::types::TransactionTypeKey;
use super::variant::TransactionVariant;
use super::variants;
use crate::config::{CORE_TYPE_GROUP, CUSTOM_TYPE_FLOOR};

#[derive(Default)]
struct RegistryState {
    /// Variants per key, in registration order.
    variants: HashMap<TransactionTypeKey, Vec<Arc<dyn TransactionVariant>>>,
    custom: HashSet<TransactionTypeKey>,
}

#[derive(Default)]
pub struct TypeRegistry {
    state: RwLock<RegistryState>,
}

impl TypeRegistry {
    /// An empty registry. Most callers want [`with_core_types`](Self::with_core_types).
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in core and magistrate kind.
    pub fn with_core_types() -> Result<Self, TransactionError> {
        let registry = Self::new();
        for variant in variants::builtin() {
            registry.register(variant, false)?;
        }
        debug!(kinds = registry.len(), "registered built-in transaction types");
        Ok(registry)
    }

    /// Adds a variant. Custom variants must use a type number at or above
    /// [`CUSTOM_TYPE_FLOOR`] and may not shadow a built-in key.
    pub fn register(
        &self,
        variant: Arc<dyn TransactionVariant>,
        is_custom: bool,
    ) -> Result<(), TransactionError> {
        let key = variant.key();
        let version = variant.version();

        if is_custom && key.transaction_type < CUSTOM_TYPE_FLOOR {
            return Err(TransactionError::InvalidCustomTypeRange {
                transaction_type: key.transaction_type,
            });
        }

        let mut state = self.state.write();
        let builtin_key = state.variants.contains_key(&key) && !state.custom.contains(&key);
        let existing = state.variants.get(&key).map(Vec::as_slice).unwrap_or(&[]);
        if existing.iter().any(|v| v.version() == version) || (is_custom && builtin_key) {
            return Err(TransactionError::DuplicateType { key, version });
        }

        state.variants.entry(key).or_default().push(variant);
        if is_custom {
            state.custom.insert(key);
            info!(%key, version, "registered custom transaction type");
        }
        Ok(())
    }

    /// Removes every version of a custom kind. `type_group` defaults to core.
    pub fn deregister(
        &self,
        transaction_type: u16,
        type_group: Option<u32>,
    ) -> Result<(), TransactionError> {
        let key = TransactionTypeKey::new(type_group.unwrap_or(CORE_TYPE_GROUP), transaction_type);
        let mut state = self.state.write();

        if !state.variants.contains_key(&key) {
            return Err(TransactionError::UnknownType {
                transaction_type,
                type_group,
            });
        }
        if !state.custom.remove(&key) {
            return Err(TransactionError::CoreTypeNotRemovable { key });
        }
        state.variants.remove(&key);
        info!(%key, "deregistered custom transaction type");
        Ok(())
    }

    /// Finds the variant for a type, preferring an exact version match.
    pub fn lookup(
        &self,
        transaction_type: u16,
        type_group: Option<u32>,
        version: Option<u8>,
    ) -> Result<Arc<dyn TransactionVariant>, TransactionError> {
        let key = TransactionTypeKey::new(type_group.unwrap_or(CORE_TYPE_GROUP), transaction_type);
        let state = self.state.read();
        let candidates = state
            .variants
            .get(&key)
            .filter(|candidates| !candidates.is_empty())
            .ok_or(TransactionError::UnknownType {
                transaction_type,
                type_group,
            })?;

        let exact = version.and_then(|version| candidates.iter().find(|v| v.version() == version));
        Ok(Arc::clone(exact.unwrap_or(&candidates[0])))
    }

    pub fn contains(&self, key: TransactionTypeKey) -> bool {
        self.state.read().variants.contains_key(&key)
    }

    pub fn is_custom(&self, key: TransactionTypeKey) -> bool {
        self.state.read().custom.contains(&key)
    }

    /// Registered keys in ascending order.
    pub fn keys(&self) -> Vec<TransactionTypeKey> {
        let mut keys: Vec<_> = self.state.read().variants.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Schemas of every registered variant (all versions).
    pub fn schemas(&self) -> Vec<Schema> {
        let state = self.state.read();
        let mut keys: Vec<_> = state.variants.keys().copied().collect();
        keys.sort();
        keys.iter()
            .flat_map(|key| state.variants[key].iter().map(|variant| variant.schema()))
            .collect()
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.state.read().variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
