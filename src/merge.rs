//! Reconciles language files with the template.

use std::collections::BTreeSet;

use crate::store::{
    PoTranslationRepository,
    StoreError,
    TranslationItem,
    TranslationItems,
};

/// Items of one language after merging, with what changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedLanguage {
    pub items: TranslationItems,
    /// Message ids added from the template.
    pub added: Vec<String>,
    /// Message ids that became obsolete in this merge.
    pub obsoleted: Vec<String>,
}

/// Merges one language's items with the template.
///
/// Translations, plural translations, translator comments and the fuzzy flag
/// are never modified, and no item is ever removed.
#[must_use]
pub fn merge_language(existing: &TranslationItems, template: &TranslationItems) -> MergedLanguage {
    let mut merged = MergedLanguage::default();

    for (message_id, template_item) in template {
        let item = match existing.get(message_id) {
            Some(current) => TranslationItem {
                references: template_item.references.clone(),
                extracted_comments: template_item.extracted_comments.clone(),
                message_id_plural: current
                    .message_id_plural
                    .clone()
                    .or_else(|| template_item.message_id_plural.clone()),
                is_obsolete: false,
                ..current.clone()
            },
            None => {
                merged.added.push(message_id.clone());
                template_item.to_template_item()
            }
        };
        merged.items.insert(message_id.clone(), item);
    }

    for (message_id, current) in existing {
        if template.contains_key(message_id) {
            continue;
        }
        if !current.is_obsolete {
            merged.obsoleted.push(message_id.clone());
        }
        merged.items.insert(
            message_id.clone(),
            TranslationItem { references: BTreeSet::new(), is_obsolete: true, ..current.clone() },
        );
    }

    merged
}

/// Result of merging one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageMergeSummary {
    pub culture: String,
    pub added: usize,
    pub obsoleted: usize,
    /// Whether the language file was rewritten.
    pub written: bool,
}

/// Outcome of [`TranslationMerger::merge_all_translation`].
#[derive(Debug, Default)]
pub struct MergeReport {
    pub languages: Vec<LanguageMergeSummary>,
    pub failures: Vec<(String, StoreError)>,
}

impl MergeReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Merges the template into every language of a repository.
#[derive(Debug, Clone)]
pub struct TranslationMerger {
    /// Files being merged.
    repository: PoTranslationRepository,
    /// Languages created when missing.
    configured_languages: Vec<String>,
}

impl TranslationMerger {
    #[must_use]
    pub const fn new(repository: PoTranslationRepository) -> Self {
        Self { repository, configured_languages: Vec::new() }
    }

    /// Languages whose files are created on the first merge if missing.
    #[must_use]
    pub fn with_languages(mut self, languages: impl IntoIterator<Item = String>) -> Self {
        self.configured_languages = languages.into_iter().collect();
        self
    }

    /// Languages on disk plus configured ones, sorted and deduplicated.
    pub fn languages(&self) -> Result<Vec<String>, StoreError> {
        let mut languages: BTreeSet<String> =
            self.repository.list_available_languages()?.into_iter().collect();
        languages.extend(self.configured_languages.iter().cloned());
        Ok(languages.into_iter().collect())
    }

    /// Merges `template` into every language. A failing language is recorded
    /// and the others continue.
    pub fn merge_all_translation(&self, template: &TranslationItems) -> MergeReport {
        let mut report = MergeReport::default();

        let languages = match self.languages() {
            Ok(languages) => languages,
            Err(error) => {
                tracing::error!(%error, "Failed to list languages");
                report.failures.push((String::new(), error));
                return report;
            }
        };

        for culture in languages {
            match self.merge_one(&culture, template) {
                Ok(summary) => {
                    tracing::info!(
                        culture = %culture,
                        added = summary.added,
                        obsoleted = summary.obsoleted,
                        written = summary.written,
                        "Merged translations"
                    );
                    report.languages.push(summary);
                }
                Err(error) => {
                    tracing::error!(culture = %culture, %error, "Failed to merge translations");
                    report.failures.push((culture, error));
                }
            }
        }

        report
    }

    /// Merges the template into one language and saves it.
    fn merge_one(
        &self,
        culture: &str,
        template: &TranslationItems,
    ) -> Result<LanguageMergeSummary, StoreError> {
        let existing = self.repository.load_language(culture)?;
        let merged = merge_language(&existing, template);
        let written = self.repository.save_language(culture, &merged.items)?;

        Ok(LanguageMergeSummary {
            culture: culture.to_string(),
            added: merged.added.len(),
            obsoleted: merged.obsoleted.len(),
            written,
        })
    }
}
