//! Per-culture lookup tables built from translation files.

use std::collections::HashMap;
use std::sync::Arc;

use crate::plural::PluralRules;
use crate::store::{
    LocationProvider,
    StoreError,
    TranslationItems,
    read_po_file,
};

/// Immutable translations of one culture.
#[derive(Debug, Clone)]
pub struct CultureDictionary {
    /// Culture identifier the dictionary was built for.
    culture: String,
    /// Message id to singular translation.
    entries: HashMap<String, String>,
    /// Message id to `msgstr[n]` forms.
    plural_entries: HashMap<String, Vec<String>>,
    /// Selects the plural form for a count.
    rules: PluralRules,
}

impl CultureDictionary {
    /// Dictionary without translations; every lookup misses.
    #[must_use]
    pub fn empty(culture: impl Into<String>) -> Self {
        Self {
            culture: culture.into(),
            entries: HashMap::new(),
            plural_entries: HashMap::new(),
            rules: PluralRules::default(),
        }
    }

    /// Builds a dictionary from translation items.
    ///
    /// Obsolete and fuzzy items and empty translations are left out.
    #[must_use]
    pub fn from_items(
        culture: impl Into<String>,
        items: &TranslationItems,
        rules: PluralRules,
    ) -> Self {
        let mut dictionary = Self { rules, ..Self::empty(culture) };
        dictionary.add_items(items);
        dictionary
    }

    /// Adds items not yet present.
    fn add_items(&mut self, items: &TranslationItems) {
        for item in items.values().filter(|item| !item.is_obsolete && !item.is_fuzzy) {
            let singular = item.translated_text().or_else(|| {
                item.plural_translations.first().map(String::as_str).filter(|t| !t.is_empty())
            });
            if let Some(text) = singular {
                self.entries.entry(item.message_id.clone()).or_insert_with(|| text.to_string());
            }
            if item.plural_translations.iter().any(|form| !form.is_empty()) {
                self.plural_entries
                    .entry(item.message_id.clone())
                    .or_insert_with(|| item.plural_translations.clone());
            }
        }
    }

    #[must_use]
    pub fn culture(&self) -> &str {
        &self.culture
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.plural_entries.is_empty()
    }

    /// Translation of `message_id`.
    #[must_use]
    pub fn lookup(&self, message_id: &str) -> Option<&str> {
        self.entries.get(message_id).map(String::as_str)
    }

    /// Plural form of `message_id` for `count`, falling back to the singular
    /// translation when no plural forms exist.
    #[must_use]
    pub fn lookup_plural(&self, message_id: &str, count: i64) -> Option<&str> {
        let Some(forms) = self.plural_entries.get(message_id) else {
            return self.lookup(message_id);
        };
        let index = self.rules.select_form(&self.culture, count);
        forms.get(index).map(String::as_str).filter(|form| !form.is_empty())
    }
}

/// Source of culture dictionaries.
pub trait TranslationsProvider: Send + Sync {
    fn load(&self, culture: &str) -> Result<CultureDictionary, StoreError>;
}

/// Builds dictionaries from the PO files a [`LocationProvider`] names.
#[derive(Clone)]
pub struct PoFilesTranslationsProvider {
    /// Files read for each culture.
    locations: Arc<dyn LocationProvider>,
    /// Rules handed to every built dictionary.
    rules: PluralRules,
}

impl PoFilesTranslationsProvider {
    #[must_use]
    pub fn new(locations: Arc<dyn LocationProvider>) -> Self {
        Self { locations, rules: PluralRules::default() }
    }

    #[must_use]
    pub fn with_rules(mut self, rules: PluralRules) -> Self {
        self.rules = rules;
        self
    }
}

impl std::fmt::Debug for PoFilesTranslationsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoFilesTranslationsProvider")
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl TranslationsProvider for PoFilesTranslationsProvider {
    /// Reads every candidate file in order; earlier files win on duplicates.
    fn load(&self, culture: &str) -> Result<CultureDictionary, StoreError> {
        let mut dictionary =
            CultureDictionary { rules: self.rules.clone(), ..CultureDictionary::empty(culture) };

        for path in self.locations.culture_files(culture) {
            match read_po_file(&path)? {
                Some(file) => {
                    tracing::debug!(culture = %culture, path = %path.display(), "Loading translations");
                    dictionary.add_items(&file.items);
                }
                None => {
                    tracing::debug!(culture = %culture, path = %path.display(), "No translation file");
                }
            }
        }

        Ok(dictionary)
    }
}
