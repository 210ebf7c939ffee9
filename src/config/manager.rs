//! Project settings.

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    I18nSettings,
    loader,
};

/// Holds the settings of one project.
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// Settings in effect; replaced only by valid settings.
    current_settings: I18nSettings,
    /// Directory relative paths in the settings resolve against.
    project_root: PathBuf,
}

impl ConfigManager {
    /// Manager with default settings.
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self { current_settings: I18nSettings::default(), project_root: project_root.into() }
    }

    /// Loads settings from `config_path`, or from `.i18n.json` in the
    /// project root. Defaults apply when the file does not exist.
    ///
    /// Invalid settings leave the current ones untouched.
    ///
    /// # Errors
    /// - the file cannot be read
    /// - the file is not valid JSON
    /// - validation fails
    pub fn load_settings(&mut self, config_path: Option<&Path>) -> Result<(), ConfigError> {
        tracing::debug!(project_root = %self.project_root.display(), "Loading settings");

        let loaded = match config_path {
            Some(path) => loader::load_from_file(path)?,
            None => loader::load_from_project(&self.project_root)?,
        };
        let settings = loaded.unwrap_or_default();

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    #[must_use]
    pub const fn get_settings(&self) -> &I18nSettings {
        &self.current_settings
    }

    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Absolute path of the locale directory.
    #[must_use]
    pub fn locale_directory(&self) -> PathBuf {
        self.project_root.join(&self.current_settings.locale_directory)
    }

    /// Absolute paths of the directories to scan.
    #[must_use]
    pub fn directories_to_scan(&self) -> Vec<PathBuf> {
        self.current_settings
            .directories_to_scan
            .iter()
            .map(|directory| self.project_root.join(directory))
            .collect()
    }
}
