//! PO file backed translation repository.

use std::fs;
use std::io::ErrorKind;
use std::path::{
    Path,
    PathBuf,
};

use super::location::{
    DirectoryLocationProvider,
    LANGUAGE_FILE_NAME,
};
use super::po;
use super::types::{
    PoFile,
    PoHeader,
    StoreError,
    TranslationItems,
};

/// Reads and writes the template and language files of one locale directory.
///
/// Files are only written when their rendered content differs from what is on
/// disk.
#[derive(Debug, Clone)]
pub struct PoTranslationRepository {
    /// Paths of the template and language files.
    locations: DirectoryLocationProvider,
}

impl PoTranslationRepository {
    #[must_use]
    pub fn new(locale_directory: impl Into<PathBuf>) -> Self {
        Self { locations: DirectoryLocationProvider::new(locale_directory) }
    }

    #[must_use]
    pub const fn locations(&self) -> &DirectoryLocationProvider {
        &self.locations
    }

    /// Template items; any translated text in the file is dropped.
    pub fn load_template(&self) -> Result<TranslationItems, StoreError> {
        let file = read_po_file(&self.locations.template_path())?.unwrap_or_default();
        Ok(file
            .items
            .values()
            .map(|item| (item.message_id.clone(), item.to_template_item()))
            .collect())
    }

    /// Writes the template. Returns `true` when the file changed.
    pub fn save_template(&self, items: &TranslationItems) -> Result<bool, StoreError> {
        let path = self.locations.template_path();
        let existing = read_po_file(&path)?;
        let file = PoFile {
            header: PoHeader::standard(None, existing.as_ref().map(|file| &file.header)),
            items: items
                .values()
                .filter(|item| !item.is_obsolete)
                .map(|item| (item.message_id.clone(), item.to_template_item()))
                .collect(),
        };
        write_if_changed(&path, &po::render(&file))
    }

    /// Items of one language; a missing file yields an empty set.
    pub fn load_language(&self, culture: &str) -> Result<TranslationItems, StoreError> {
        let file = read_po_file(&self.locations.language_path(culture))?.unwrap_or_default();
        Ok(file.items)
    }

    /// Writes one language file. Returns `true` when the file changed.
    pub fn save_language(
        &self,
        culture: &str,
        items: &TranslationItems,
    ) -> Result<bool, StoreError> {
        let path = self.locations.language_path(culture);
        let existing = read_po_file(&path)?;
        let file = PoFile {
            header: PoHeader::standard(Some(culture), existing.as_ref().map(|file| &file.header)),
            items: items.clone(),
        };
        write_if_changed(&path, &po::render(&file))
    }

    /// Sorted names of cultures that have a language file.
    pub fn list_available_languages(&self) -> Result<Vec<String>, StoreError> {
        let directory = self.locations.directory();
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: directory.to_path_buf(), source }),
        };

        let mut languages = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|source| StoreError::Io { path: directory.to_path_buf(), source })?;
            let path = entry.path();
            if !path.join(LANGUAGE_FILE_NAME).is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                languages.push(name.to_string());
            } else {
                tracing::warn!(path = %path.display(), "Skipping non UTF-8 culture directory");
            }
        }

        languages.sort();
        Ok(languages)
    }
}

/// Reads and parses a PO file. `Ok(None)` when it does not exist.
pub(crate) fn read_po_file(path: &Path) -> Result<Option<PoFile>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(StoreError::Io { path: path.to_path_buf(), source }),
    };

    po::parse(&content).map(Some).map_err(|error| StoreError::Parse {
        path: path.to_path_buf(),
        line: error.line,
        message: error.message,
    })
}

/// Writes `content` unless the file already holds it; true when written.
fn write_if_changed(path: &Path, content: &str) -> Result<bool, StoreError> {
    match fs::read_to_string(path) {
        Ok(current) if current == content => {
            tracing::debug!(path = %path.display(), "Unchanged, not writing");
            return Ok(false);
        }
        Ok(_) => {}
        Err(error) if error.kind() == ErrorKind::NotFound => {}
        Err(source) => return Err(StoreError::Io { path: path.to_path_buf(), source }),
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
    }
    fs::write(path, content).map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
    tracing::info!(path = %path.display(), "Wrote translation file");
    Ok(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;
    use tempfile::TempDir;

    use super::*;
    use crate::store::TranslationItem;
    use crate::types::Reference;

    #[fixture]
    fn locale_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    fn items(entries: &[(&str, Option<&str>)]) -> TranslationItems {
        entries
            .iter()
            .map(|(id, translation)| {
                let mut item = TranslationItem::new(*id).with_reference(Reference::new("a.html", 1));
                item.translation = translation.map(String::from);
                (id.to_string(), item)
            })
            .collect()
    }

    #[rstest]
    fn test_missing_files_load_empty(locale_dir: TempDir) {
        let repository = PoTranslationRepository::new(locale_dir.path().join("locale"));

        assert!(repository.load_template().unwrap().is_empty());
        assert!(repository.load_language("fr").unwrap().is_empty());
        assert!(repository.list_available_languages().unwrap().is_empty());
    }

    #[rstest]
    fn test_save_template_reports_change(locale_dir: TempDir) {
        let repository = PoTranslationRepository::new(locale_dir.path());
        let template = items(&[("Hello", None), ("World", None)]);

        assert!(repository.save_template(&template).unwrap());
        assert!(!repository.save_template(&template).unwrap());

        let loaded = repository.load_template().unwrap();
        assert_eq!(loaded.keys().collect::<Vec<_>>(), vec!["Hello", "World"]);
    }

    #[rstest]
    fn test_template_never_holds_translations(locale_dir: TempDir) {
        let repository = PoTranslationRepository::new(locale_dir.path());

        repository.save_template(&items(&[("Hello", Some("Bonjour"))])).unwrap();

        let content = fs::read_to_string(locale_dir.path().join("messages.pot")).unwrap();
        assert!(!content.contains("Bonjour"));
        let loaded = repository.load_template().unwrap();
        assert!(loaded["Hello"].translation.is_none());
    }

    #[rstest]
    fn test_save_language_round_trip_is_stable(locale_dir: TempDir) {
        let repository = PoTranslationRepository::new(locale_dir.path());
        let language = items(&[("Hello", Some("Hallo")), ("World", None)]);

        assert!(repository.save_language("de", &language).unwrap());
        let loaded = repository.load_language("de").unwrap();

        assert_eq!(loaded, language);
        assert!(!repository.save_language("de", &loaded).unwrap());
    }

    #[rstest]
    fn test_save_language_writes_language_header(locale_dir: TempDir) {
        let repository = PoTranslationRepository::new(locale_dir.path());

        repository.save_language("pt-BR", &items(&[("Hello", None)])).unwrap();

        let content =
            fs::read_to_string(locale_dir.path().join("pt-BR").join("messages.po")).unwrap();
        assert!(content.contains("\"Language: pt-BR\\n\"\n"));
    }

    #[rstest]
    fn test_save_language_keeps_extra_header_fields(locale_dir: TempDir) {
        let repository = PoTranslationRepository::new(locale_dir.path());
        let path = locale_dir.path().join("fr").join("messages.po");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "msgid \"\"\nmsgstr \"\"\n\"Plural-Forms: nplurals=2; plural=(n > 1);\\n\"\n",
        )
        .unwrap();

        repository.save_language("fr", &items(&[("Hello", None)])).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Plural-Forms: nplurals=2; plural=(n > 1);"));
        assert!(content.contains("Language: fr"));
    }

    #[rstest]
    fn test_list_available_languages(locale_dir: TempDir) {
        let repository = PoTranslationRepository::new(locale_dir.path());
        repository.save_language("fr", &TranslationItems::new()).unwrap();
        repository.save_language("de", &TranslationItems::new()).unwrap();
        fs::create_dir_all(locale_dir.path().join("empty")).unwrap();
        repository.save_template(&TranslationItems::new()).unwrap();

        assert_that!(
            repository.list_available_languages().unwrap(),
            elements_are![eq("de"), eq("fr")]
        );
    }

    #[rstest]
    fn test_parse_error_carries_path(locale_dir: TempDir) {
        let repository = PoTranslationRepository::new(locale_dir.path());
        fs::write(locale_dir.path().join("messages.pot"), "msgid \"broken\n").unwrap();

        let error = repository.load_template().unwrap_err();

        assert!(matches!(error, StoreError::Parse { line: 1, .. }));
        assert!(error.to_string().contains("messages.pot"));
    }
}
