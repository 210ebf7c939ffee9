//! Translation store types.

use std::collections::{
    BTreeMap,
    BTreeSet,
};
use std::path::PathBuf;

use crate::types::Reference;

/// Translation items keyed by message id.
pub type TranslationItems = BTreeMap<String, TranslationItem>;

/// One entry of a template or language file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationItem {
    pub message_id: String,
    pub message_id_plural: Option<String>,
    pub references: BTreeSet<Reference>,
    /// Translated text; always `None` in the template.
    pub translation: Option<String>,
    /// `msgstr[n]` forms, indexed by plural form.
    pub plural_translations: Vec<String>,
    /// Comments collected from nuggets (`#.`).
    pub extracted_comments: Vec<String>,
    /// Comments written by translators (`# `).
    pub translator_comments: Vec<String>,
    /// Flags other than `fuzzy`, in file order.
    pub flags: Vec<String>,
    pub is_fuzzy: bool,
    pub is_obsolete: bool,
}

impl TranslationItem {
    #[must_use]
    pub fn new(message_id: impl Into<String>) -> Self {
        Self { message_id: message_id.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.references.insert(reference);
        self
    }

    #[must_use]
    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = Some(translation.into());
        self
    }

    /// The translated text, if one is present and not empty.
    #[must_use]
    pub fn translated_text(&self) -> Option<&str> {
        self.translation.as_deref().filter(|text| !text.is_empty())
    }

    /// Copy of this item without any translated text, as stored in the template.
    #[must_use]
    pub fn to_template_item(&self) -> Self {
        Self {
            message_id: self.message_id.clone(),
            message_id_plural: self.message_id_plural.clone(),
            references: self.references.clone(),
            extracted_comments: self.extracted_comments.clone(),
            ..Self::default()
        }
    }
}

/// Header of a PO/POT file as ordered `Name: value` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoHeader {
    /// Translator comments above the header entry.
    pub comments: Vec<String>,
    pub fields: Vec<(String, String)>,
}

impl PoHeader {
    /// Field names written by this crate, in output order.
    const STANDARD_FIELDS: [&'static str; 5] = [
        "Project-Id-Version",
        "MIME-Version",
        "Content-Type",
        "Content-Transfer-Encoding",
        "Language",
    ];

    /// Builds the header for a template (`language == None`) or language file.
    ///
    /// Comments and non-standard fields of `existing` are kept in their order.
    #[must_use]
    pub fn standard(language: Option<&str>, existing: Option<&Self>) -> Self {
        let mut fields = vec![
            ("Project-Id-Version".to_string(), format!("pot {}", env!("CARGO_PKG_VERSION"))),
            ("MIME-Version".to_string(), "1.0".to_string()),
            ("Content-Type".to_string(), "text/plain; charset=UTF-8".to_string()),
            ("Content-Transfer-Encoding".to_string(), "8bit".to_string()),
        ];
        if let Some(language) = language {
            fields.push(("Language".to_string(), language.to_string()));
        }

        let mut comments = Vec::new();
        if let Some(existing) = existing {
            comments.clone_from(&existing.comments);
            fields.extend(
                existing
                    .fields
                    .iter()
                    .filter(|(name, _)| {
                        !Self::STANDARD_FIELDS
                            .iter()
                            .any(|standard| standard.eq_ignore_ascii_case(name))
                    })
                    .cloned(),
            );
        }

        Self { comments, fields }
    }

    /// Value of a header field, compared case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Parsed content of one PO/POT file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoFile {
    pub header: PoHeader,
    pub items: TranslationItems,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}:{line}: {message}", path.display())]
    Parse { path: PathBuf, line: usize, message: String },
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[googletest::test]
    fn test_to_template_item_drops_translations() {
        let mut item = TranslationItem::new("Hello")
            .with_reference(Reference::new("index.html", 3))
            .with_translation("Bonjour");
        item.plural_translations = vec!["a".to_string(), "b".to_string()];
        item.translator_comments = vec!["checked".to_string()];
        item.is_fuzzy = true;

        let template = item.to_template_item();

        expect_that!(template.message_id, eq("Hello"));
        expect_that!(template.translation, none());
        expect_that!(template.plural_translations, len(eq(0)));
        expect_that!(template.translator_comments, len(eq(0)));
        expect_that!(template.is_fuzzy, eq(false));
        expect_that!(template.references.len(), eq(1));
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("Bonjour"), Some("Bonjour"))]
    fn test_translated_text(#[case] translation: Option<&str>, #[case] expected: Option<&str>) {
        let item = TranslationItem {
            translation: translation.map(String::from),
            ..TranslationItem::new("Hello")
        };
        assert_eq!(item.translated_text(), expected);
    }

    #[googletest::test]
    fn test_standard_header_keeps_extra_fields() {
        let existing = PoHeader {
            comments: vec!["French translations".to_string()],
            fields: vec![
                ("Language".to_string(), "fr-FR".to_string()),
                ("Plural-Forms".to_string(), "nplurals=2; plural=(n > 1);".to_string()),
            ],
        };

        let header = PoHeader::standard(Some("fr"), Some(&existing));

        expect_that!(header.get("language"), some(eq("fr")));
        expect_that!(header.get("Plural-Forms"), some(eq("nplurals=2; plural=(n > 1);")));
        expect_that!(header.comments, elements_are![eq("French translations")]);
        expect_that!(header.fields.len(), eq(6));
    }

    #[googletest::test]
    fn test_template_header_has_no_language() {
        let header = PoHeader::standard(None, None);

        expect_that!(header.get("Language"), none());
        expect_that!(header.get("Content-Type"), some(eq("text/plain; charset=UTF-8")));
    }
}
