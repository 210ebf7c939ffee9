//! Helpers shared by the file-system tests.
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use crate::config::ConfigManager;

/// Writes `files` (relative path, content) under `root`, creating parent
/// directories.
pub(crate) fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (relative_path, content) in files {
        let path = root.join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

/// Config manager for `root` with its `.i18n.json` (or the defaults) loaded.
pub(crate) fn load_config(root: &Path) -> ConfigManager {
    let mut config_manager = ConfigManager::new(root);
    config_manager.load_settings(None).unwrap();
    config_manager
}
