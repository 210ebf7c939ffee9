//! Where template and language files live.

use std::path::{
    Path,
    PathBuf,
};

use crate::culture::normalize_culture;

/// File name of the template inside the locale directory.
pub const TEMPLATE_FILE_NAME: &str = "messages.pot";

/// File name of a language file inside `<locale>/<culture>/`.
pub const LANGUAGE_FILE_NAME: &str = "messages.po";

/// Maps a culture to the translation files a dictionary is built from.
pub trait LocationProvider: Send + Sync {
    /// Candidate files for `culture`, in read order. Files that do not exist
    /// are skipped by the reader.
    fn culture_files(&self, culture: &str) -> Vec<PathBuf>;
}

/// Locale directory layout: `<directory>/messages.pot` and
/// `<directory>/<culture>/messages.po`.
///
/// The default culture is the language nuggets are written in, so it resolves
/// to the template.
#[derive(Debug, Clone)]
pub struct DirectoryLocationProvider {
    /// Locale directory.
    directory: PathBuf,
    /// Culture served from the template.
    default_culture: Option<String>,
}

impl DirectoryLocationProvider {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into(), default_culture: None }
    }

    #[must_use]
    pub fn with_default_culture(mut self, culture: impl Into<String>) -> Self {
        self.default_culture = Some(culture.into());
        self
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    #[must_use]
    pub fn default_culture(&self) -> Option<&str> {
        self.default_culture.as_deref()
    }

    #[must_use]
    pub fn template_path(&self) -> PathBuf {
        self.directory.join(TEMPLATE_FILE_NAME)
    }

    #[must_use]
    pub fn language_path(&self, culture: &str) -> PathBuf {
        self.directory.join(culture).join(LANGUAGE_FILE_NAME)
    }

    /// Compares cultures ignoring case and separator style.
    fn is_default_culture(&self, culture: &str) -> bool {
        self.default_culture
            .as_deref()
            .is_some_and(|default| normalize_culture(default) == normalize_culture(culture))
    }
}

impl LocationProvider for DirectoryLocationProvider {
    fn culture_files(&self, culture: &str) -> Vec<PathBuf> {
        if self.is_default_culture(culture) {
            vec![self.template_path()]
        } else {
            vec![self.language_path(culture)]
        }
    }
}
