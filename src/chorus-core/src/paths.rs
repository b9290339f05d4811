use crate::provider::ProviderError;
use crate::{APP_AUTHOR, APP_NAME, APP_QUALIFIER};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE: &str = "config.toml";

/// Filesystem locations owned by the host process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    config_dir: PathBuf,
    cache_dir: PathBuf,
    log_dir: PathBuf,
}

impl AppDirs {
    /// Platform directories for Chorus (XDG on Linux).
    pub fn discover() -> Result<Self, DirsError> {
        let dirs = ProjectDirs::from(APP_QUALIFIER, APP_AUTHOR, APP_NAME)
            .ok_or(DirsError::MissingProjectDirs)?;
        Ok(Self {
            config_dir: dirs.config_dir().to_path_buf(),
            cache_dir: dirs.cache_dir().to_path_buf(),
            log_dir: dirs.data_local_dir().join("logs"),
        })
    }

    /// Lays every directory out under a single root.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            config_dir: root.join("config"),
            cache_dir: root.join("cache"),
            log_dir: root.join("logs"),
        }
    }

    pub fn ensure_exists(&self) -> Result<(), DirsError> {
        [&self.config_dir, &self.cache_dir, &self.log_dir]
            .into_iter()
            .try_for_each(|dir| create_dir(dir))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Creates and returns the cache directory of one provider instance.
    ///
    /// The instance id becomes a single path component, so ids containing
    /// separators or dot segments are rejected.
    pub fn provider_cache_dir(&self, instance_id: &str) -> Result<PathBuf, DirsError> {
        let single_component = !matches!(instance_id, "" | "." | "..")
            && !instance_id.chars().any(std::path::is_separator);
        if !single_component {
            return Err(DirsError::InvalidInstanceId {
                instance_id: instance_id.to_string(),
            });
        }
        let dir = self.cache_dir.join(instance_id);
        create_dir(&dir)?;
        Ok(dir)
    }
}

fn create_dir(dir: &Path) -> Result<(), DirsError> {
    std::fs::create_dir_all(dir).map_err(|source| DirsError::CreateDirectory {
        path: dir.to_path_buf(),
        source,
    })
}

#[derive(Debug, Error)]
pub enum DirsError {
    #[error("unable to determine project directories for Chorus")]
    MissingProjectDirs,
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("provider instance id {instance_id:?} cannot name a directory")]
    InvalidInstanceId { instance_id: String },
}

impl From<DirsError> for ProviderError {
    fn from(err: DirsError) -> Self {
        ProviderError::Other {
            message: err.to_string(),
        }
    }
}
