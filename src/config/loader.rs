//! Configuration file loading.

use std::path::Path;

use super::{
    ConfigError,
    I18nSettings,
};

/// Default configuration file name, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = ".i18n.json";

/// Loads settings from the project root.
///
/// # Returns
/// - `Ok(Some(settings))`: the configuration file exists and parsed
/// - `Ok(None)`: no configuration file
/// - `Err(ConfigError)`: read or parse failure
pub(super) fn load_from_project(project_root: &Path) -> Result<Option<I18nSettings>, ConfigError> {
    load_from_file(&project_root.join(CONFIG_FILE_NAME))
}

/// Loads settings from an explicit configuration file path.
pub(super) fn load_from_file(config_path: &Path) -> Result<Option<I18nSettings>, ConfigError> {
    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(config_path)?;
    let settings: I18nSettings = serde_json::from_str(&content)?;

    Ok(Some(settings))
}
