use crate::config::{Config, ProviderSettings};
use crate::host::{ConfigStore, HostDatabase};
use crate::paths::{AppDirs, DirsError};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything the host hands a provider instance when it is set up.
#[derive(Clone)]
pub struct ProviderContext {
    pub instance_id: String,
    pub settings: ProviderSettings,
    pub dirs: AppDirs,
    pub config: Arc<dyn ConfigStore>,
    pub database: Arc<dyn HostDatabase>,
}

impl ProviderContext {
    pub fn new(
        instance_id: impl Into<String>,
        host_config: &Config,
        dirs: AppDirs,
        config: Arc<dyn ConfigStore>,
        database: Arc<dyn HostDatabase>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            settings: host_config.provider,
            dirs,
            config,
            database,
        }
    }

    /// Cache directory of this instance, created on first use.
    pub fn cache_dir(&self) -> Result<PathBuf, DirsError> {
        self.dirs.provider_cache_dir(&self.instance_id)
    }
}
