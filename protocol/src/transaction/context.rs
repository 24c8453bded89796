use std::fmt;
use std::sync::Arc;

use super::data::TransactionData;
use super::error::TransactionError;
use super::registry::TypeRegistry;
use crate::config::{
    ConfigError, ExceptionList, Exceptions, Milestone, NetworkConfig, NetworkPreset,
    StaticNetworkConfig,
};

/// The services every codec component reads: type registry, network
/// configuration and exception list. Cheap to clone.
#[derive(Clone)]
pub struct ProtocolContext {
    pub registry: Arc<TypeRegistry>,
    pub network: Arc<dyn NetworkConfig>,
    pub exceptions: Arc<dyn ExceptionList>,
}

impl ProtocolContext {
    pub fn new(
        registry: Arc<TypeRegistry>,
        network: Arc<dyn NetworkConfig>,
        exceptions: Arc<dyn ExceptionList>,
    ) -> Self {
        Self {
            registry,
            network,
            exceptions,
        }
    }

    /// Built-in types on top of the given network and exceptions.
    pub fn with_core_types(
        network: Arc<dyn NetworkConfig>,
        exceptions: Arc<dyn ExceptionList>,
    ) -> Result<Self, TransactionError> {
        Ok(Self::new(
            Arc::new(TypeRegistry::with_core_types()?),
            network,
            exceptions,
        ))
    }

    /// Context for a bundled preset; returns the config handle so callers
    /// can move the height.
    pub fn from_preset(
        preset: &NetworkPreset,
    ) -> Result<(Self, Arc<StaticNetworkConfig>), ContextError> {
        let network = Arc::new(StaticNetworkConfig::from_preset(preset)?);
        let exceptions: Arc<Exceptions> = Arc::new(preset.exceptions.clone());
        let context = Self::with_core_types(network.clone(), exceptions)?;
        Ok((context, network))
    }

    pub fn milestone(&self) -> &Milestone {
        self.network.milestone()
    }

    /// Whether `data` carries an id on the exception list.
    pub fn is_exception(&self, data: &TransactionData) -> bool {
        data.id
            .as_deref()
            .is_some_and(|id| self.exceptions.is_exception(id))
    }

    /// Fails unless `version` is enabled at the current milestone or a
    /// bypass flag is set.
    pub fn ensure_supported_version(
        &self,
        version: u8,
        accept_legacy_version: bool,
        disable_version_check: bool,
    ) -> Result<(), TransactionError> {
        if accept_legacy_version || disable_version_check || self.milestone().supports_version(version)
        {
            Ok(())
        } else {
            Err(TransactionError::UnsupportedVersion { version })
        }
    }
}

impl fmt::Debug for ProtocolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolContext")
            .field("registry", &self.registry)
            .field("network_byte", &self.network.network_byte())
            .field("height", &self.network.height())
            .finish_non_exhaustive()
    }
}

/// Failure to assemble a context from a preset.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] TransactionError),
}
