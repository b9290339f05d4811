//! Interfaces the host aggregator offers to provider instances.
//!
//! Providers persist their own settings (credentials included) through a
//! [`ConfigStore`] using keys scoped to the provider instance, and hand newly
//! created items to the host library through [`HostDatabase`].

use crate::models::Playlist;
use crate::provider::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to store config value {key}: {message}")]
    ConfigWrite { key: String, message: String },
    #[error("host database error: {message}")]
    Database { message: String },
}

impl From<HostError> for ProviderError {
    fn from(err: HostError) -> Self {
        ProviderError::Other {
            message: err.to_string(),
        }
    }
}

pub type HostResult<T> = Result<T, HostError>;

/// Key/value configuration storage owned by the host.
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> HostResult<()>;
}

/// Builds the storage key for a value belonging to one provider instance.
pub fn provider_value_key(instance_id: &str, field: &str) -> String {
    format!("providers/{instance_id}/values/{field}")
}

/// Host-managed media library.
#[async_trait]
pub trait HostDatabase: Send + Sync {
    /// Persists a playlist and returns the stored representation.
    async fn add_playlist(&self, playlist: Playlist) -> HostResult<Playlist>;
}

/// In-process [`ConfigStore`] backed by a sorted map.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RwLock::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> HostResult<()> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One string-valued field of a provider's configuration schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub label: String,
    pub required: bool,
    /// Hidden entries are managed by the provider and never shown for editing.
    pub hidden: bool,
}

impl ConfigEntry {
    pub fn hidden_string(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            required: false,
            hidden: true,
        }
    }
}
