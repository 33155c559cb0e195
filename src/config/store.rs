use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::loader::ConfigError;
use crate::config::types::Config;

/// Shared, reloadable view of the config file.
///
/// Clones share one value; a failed reload leaves it unchanged.
#[derive(Clone)]
pub struct ConfigStore {
    current: Arc<RwLock<Config>>,
    source: PathBuf,
}

impl ConfigStore {
    pub fn new(config: Config, source: PathBuf) -> Self {
        Self {
            current: Arc::new(RwLock::new(config)),
            source,
        }
    }

    /// Read `source` (defaults if it does not exist) and keep it.
    pub fn open(source: PathBuf) -> Result<Self, ConfigError> {
        let config = Config::load_from(&source)?;
        Ok(Self::new(config, source))
    }

    pub fn get(&self) -> Config {
        self.current.read().clone()
    }

    pub fn reload(&self) -> Result<(), ConfigError> {
        let fresh = Config::load_from(&self.source).inspect_err(|e| {
            tracing::warn!(path = %self.source.display(), error = %e, "Keeping previous config")
        })?;
        *self.current.write() = fresh;
        tracing::info!(path = %self.source.display(), "Config reloaded");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.source
    }
}
