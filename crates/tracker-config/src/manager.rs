use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use crate::{Config, ConfigError};

const CONFIG_FILE: &str = "config.json";
const APP_DIR: &str = "budget_tracker";

/// Reads and writes the preferences file.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Manager for `<base>/config/config.json`, creating the directory.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let dir = base.join("config");
        fs::create_dir_all(&dir)?;
        Ok(Self::new(dir.join(CONFIG_FILE)))
    }

    /// Manager rooted at the platform config directory.
    pub fn default_location() -> Result<Self, ConfigError> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::with_base_dir(base.join(APP_DIR))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// A missing file yields the defaults. A malformed one is an error.
    pub fn load(&self) -> Result<Config, ConfigError> {
        match fs::read(&self.config_path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let body = serde_json::to_vec_pretty(config)?;
        write_replacing(&self.config_path, &body)?;
        tracing::debug!(path = %self.config_path.display(), "preferences saved");
        Ok(())
    }

    /// Loads, applies `change`, and saves in one step. Nothing is written
    /// when `change` fails.
    pub fn update<F>(&self, change: F) -> Result<Config, ConfigError>
    where
        F: FnOnce(&mut Config) -> Result<(), ConfigError>,
    {
        let mut config = self.load()?;
        change(&mut config)?;
        self.save(&config)?;
        Ok(config)
    }
}

/// Writes `body` next to `target` and renames it into place, so readers
/// never observe a half-written file.
fn write_replacing(target: &Path, body: &[u8]) -> std::io::Result<()> {
    if let Some(dir) = target.parent() {
        fs::create_dir_all(dir)?;
    }
    let mut staged = target.as_os_str().to_owned();
    staged.push(".partial");
    let staged = PathBuf::from(staged);

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&staged)?;
    file.write_all(body)?;
    file.sync_all()?;
    fs::rename(&staged, target)
}
