//! Shared runtime state for CLI interactions and command execution.

use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};

use dialoguer::theme::ColorfulTheme;
use tracker_config::{Config, ConfigManager};
use tracker_core::{BackendClient, LiveDashboard, SystemClock};
use tracker_storage_json::JsonBackend;

use super::{commands, output, registry::CommandRegistry};
use crate::errors::CliError;

/// Environment variable that switches the shell into script mode.
pub const SCRIPT_ENV: &str = "BUDGET_TRACKER_CLI_SCRIPT";
/// Environment variable overriding where config and data live.
pub const HOME_ENV: &str = "BUDGET_TRACKER_HOME";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub backend: Arc<JsonBackend>,
    pub client: BackendClient,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub data_root: PathBuf,
    /// Dashboard kept warm between `dashboard` calls, keyed by account id.
    pub live_dashboard: Option<(String, LiveDashboard)>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    /// Builds the context from `BUDGET_TRACKER_HOME`, falling back to the
    /// platform config directory and the configured data root.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        match env::var_os(HOME_ENV) {
            Some(home) if !home.is_empty() => Self::with_home(mode, PathBuf::from(home)),
            _ => {
                let config_manager = ConfigManager::default_location()?;
                let config = config_manager.load()?;
                let data_root = expand_home(config.resolve_data_root());
                Self::assemble(mode, config_manager, config, data_root)
            }
        }
    }

    /// Keeps both the config and the data store under `home`.
    pub fn with_home(mode: CliMode, home: PathBuf) -> Result<Self, CliError> {
        let config_manager = ConfigManager::with_base_dir(home.clone())?;
        let config = config_manager.load()?;
        let data_root = config.data_root.clone().map(expand_home).unwrap_or(home);
        Self::assemble(mode, config_manager, config, data_root)
    }

    fn assemble(
        mode: CliMode,
        config_manager: ConfigManager,
        config: Config,
        data_root: PathBuf,
    ) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let backend = Arc::new(JsonBackend::open(&data_root)?);
        let client = BackendClient::new(backend.clone(), backend.clone(), Arc::new(SystemClock));
        output::apply_config(&config);
        tracing::debug!(data_root = %data_root.display(), ?mode, "shell context ready");

        Ok(ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            backend,
            client,
            config_manager,
            config,
            data_root,
            live_dashboard: None,
            last_command: None,
            running: true,
        })
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Drops the cached dashboard so the next `dashboard` starts afresh.
    pub fn reset_live_dashboard(&mut self) {
        self.live_dashboard = None;
    }

    pub fn status(&self) -> String {
        format!(
            "ShellContext {{ running: {}, last_command: {:?}, signed_in: {} }}",
            self.running,
            self.last_command,
            self.client.auth.current_user().is_some()
        )
    }
}

/// Replaces a leading `~` with the user's home directory.
fn expand_home(path: PathBuf) -> PathBuf {
    let rest = path.strip_prefix("~").ok().map(Path::to_path_buf);
    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_expands_to_home() {
        let expanded = expand_home(PathBuf::from("~/ledgers"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("ledgers"));
        }
        assert_eq!(
            expand_home(PathBuf::from("/srv/ledgers")),
            PathBuf::from("/srv/ledgers")
        );
    }
}
