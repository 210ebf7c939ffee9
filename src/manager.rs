//! Culture-aware translation entry point.

use std::sync::Arc;

use crate::cache::{
    DictionaryCache,
    MemoryDictionaryCache,
};
use crate::dictionary::{
    CultureDictionary,
    TranslationsProvider,
};
use crate::replacer::{
    DefaultNuggetReplacer,
    NuggetReplacer,
};

/// Translates text for a culture, building and caching its dictionary on
/// first use.
#[derive(Clone)]
pub struct LocalizationManager {
    /// Builds dictionaries on a cache miss.
    provider: Arc<dyn TranslationsProvider>,
    /// Dictionaries already built.
    cache: Arc<dyn DictionaryCache>,
    /// Substitutes nuggets in text.
    replacer: Arc<dyn NuggetReplacer>,
}

impl LocalizationManager {
    /// Manager with an in-memory cache and the default replacer.
    #[must_use]
    pub fn new(provider: Arc<dyn TranslationsProvider>) -> Self {
        Self {
            provider,
            cache: Arc::new(MemoryDictionaryCache::default()),
            replacer: Arc::new(DefaultNuggetReplacer::new()),
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn DictionaryCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_replacer(mut self, replacer: Arc<dyn NuggetReplacer>) -> Self {
        self.replacer = replacer;
        self
    }

    /// Dictionary of `culture`.
    ///
    /// When it cannot be built the error is logged and an empty dictionary is
    /// returned without caching it, so every message falls back to its id.
    #[must_use]
    pub fn get_dictionary(&self, culture: &str) -> Arc<CultureDictionary> {
        let build = || self.provider.load(culture);
        match self.cache.get_or_build(culture, &build) {
            Ok(dictionary) => dictionary,
            Err(error) => {
                tracing::error!(culture = %culture, %error, "Failed to load translations");
                Arc::new(CultureDictionary::empty(culture))
            }
        }
    }

    /// Replaces every nugget in `text` with its translation for `culture`.
    #[must_use]
    pub fn translate(&self, culture: &str, text: &str) -> String {
        let dictionary = self.get_dictionary(culture);
        self.replacer.replace(&dictionary, text)
    }

    /// Forgets the cached dictionary of `culture`.
    pub fn invalidate(&self, culture: &str) {
        self.cache.invalidate(culture);
    }
}

impl std::fmt::Debug for LocalizationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizationManager").finish_non_exhaustive()
    }
}
