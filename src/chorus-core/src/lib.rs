pub mod config;
pub mod context;
pub mod host;
pub mod logging;
pub mod models;
pub mod paths;
pub mod provider;
pub mod provider_contract;

pub use config::{Config, ConfigError, LoggingConfig, ProviderSettings, ValidationError};
pub use context::ProviderContext;
pub use host::{ConfigEntry, ConfigStore, HostDatabase, HostError, MemoryConfigStore};
pub use logging::{init_logging, LoggingError, LoggingGuard};
pub use paths::{AppDirs, DirsError};
pub use provider::{Lookup, MusicProvider, ProviderError, ProviderFeature, ProviderResult};

pub const APP_NAME: &str = "chorus";
pub const APP_AUTHOR: &str = "Chorus";
pub const APP_QUALIFIER: &str = "io";
