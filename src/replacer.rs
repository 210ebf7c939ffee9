//! Substitutes nuggets in text with their translations.

use crate::dictionary::CultureDictionary;
use crate::format::format_ordinal;
use crate::nugget::{
    DEFAULT_RESPONSE_PARSER,
    Nugget,
    NuggetError,
    NuggetParser,
    NuggetTokens,
    ParseContext,
    normalize_identifiers,
};

/// Appended to a message whose parameters could not be substituted.
pub const FORMAT_EXCEPTION_MARKER: &str = "[FORMAT EXCEPTION]";

/// Replaces every nugget of a text with its localized message.
pub trait NuggetReplacer: Send + Sync {
    /// `text` with every nugget replaced by its message for the
    /// dictionary's culture.
    fn replace(&self, dictionary: &CultureDictionary, text: &str) -> String;
}

/// Replacer resolving messages through a [`CultureDictionary`].
///
/// Untranslated messages fall back to the message id. When the first
/// parameter is an integer and the entry has plural forms, the form for that
/// count is used. Parameters are inserted as given and are never translated
/// themselves.
#[derive(Debug, Clone, Default)]
pub struct DefaultNuggetReplacer {
    /// Parser for custom tokens; `None` uses the shared default.
    parser: Option<NuggetParser>,
}

impl DefaultNuggetReplacer {
    /// Replacer using the default tokens.
    #[must_use]
    pub const fn new() -> Self {
        Self { parser: None }
    }

    /// Replacer using custom tokens.
    pub fn with_tokens(tokens: NuggetTokens) -> Result<Self, NuggetError> {
        if tokens == NuggetTokens::default() {
            return Ok(Self::new());
        }
        let parser = NuggetParser::new(tokens, ParseContext::ResponseProcessing)?;
        Ok(Self { parser: Some(parser) })
    }

    /// Custom parser, or the shared default one.
    fn parser(&self) -> &NuggetParser {
        self.parser.as_ref().unwrap_or(&DEFAULT_RESPONSE_PARSER)
    }

    /// Localized and formatted text of one nugget.
    fn resolve(dictionary: &CultureDictionary, nugget: &Nugget) -> String {
        let translation = match plural_count(nugget) {
            Some(count) => dictionary.lookup_plural(&nugget.message_id, count),
            None => dictionary.lookup(&nugget.message_id),
        };
        let message = translation.unwrap_or(&nugget.message_id);
        if !nugget.is_formatted() {
            return message.to_string();
        }

        let message = normalize_identifiers(message);
        match format_ordinal(&message, &nugget.format_items) {
            Ok(formatted) => formatted,
            Err(error) => {
                tracing::warn!(
                    culture = %dictionary.culture(),
                    message_id = %nugget.message_id,
                    %error,
                    "Failed to format nugget"
                );
                format!("{message}{FORMAT_EXCEPTION_MARKER}")
            }
        }
    }
}

/// First parameter read as an integer count.
fn plural_count(nugget: &Nugget) -> Option<i64> {
    nugget.format_items.first().and_then(|item| item.trim().parse().ok())
}

impl NuggetReplacer for DefaultNuggetReplacer {
    fn replace(&self, dictionary: &CultureDictionary, text: &str) -> String {
        let mut output = String::with_capacity(text.len());
        let mut copied = 0;

        for found in self.parser().parse(text) {
            let found = match found {
                Ok(found) => found,
                Err(error) => {
                    tracing::debug!(%error, "Leaving malformed nugget untouched");
                    continue;
                }
            };
            output.push_str(text.get(copied..found.span.start).unwrap_or_default());
            output.push_str(&Self::resolve(dictionary, &found.nugget));
            copied = found.span.end;
        }

        output.push_str(text.get(copied..).unwrap_or_default());
        output
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rstest::*;

    use super::*;
    use crate::plural::PluralRules;
    use crate::store::{
        TranslationItem,
        TranslationItems,
    };

    #[fixture]
    fn french() -> CultureDictionary {
        let mut files = TranslationItem::new("%0 files");
        files.message_id_plural = Some("%0 files".to_string());
        files.plural_translations = vec!["%0 fichier".to_string(), "%0 fichiers".to_string()];

        let items: TranslationItems = [
            files,
            TranslationItem::new("Hello").with_translation("Bonjour"),
            TranslationItem::new("Enter between %1 and %0 characters")
                .with_translation("Entrez entre %1 et %0 caractères"),
            TranslationItem::new("Broken %0").with_translation("Cassé {5}"),
        ]
        .into_iter()
        .map(|item| (item.message_id.clone(), item))
        .collect();
        CultureDictionary::from_items("fr", &items, PluralRules::default())
    }

    #[rstest]
    fn test_replace_with_empty_dictionary_uses_message_id() {
        let replacer = DefaultNuggetReplacer::new();

        assert_eq!(replacer.replace(&CultureDictionary::empty("en"), "[[[Hi]]]"), "Hi");
    }

    #[rstest]
    #[case::plain("<h1>[[[Hello]]]</h1>", "<h1>Bonjour</h1>")]
    #[case::untranslated("[[[Goodbye]]]!", "Goodbye!")]
    #[case::with_comment("[[[Hello///greeting]]]", "Bonjour")]
    #[case::no_nuggets("plain text", "plain text")]
    #[case::unterminated("[[[Hello", "[[[Hello")]
    #[case::several("[[[Hello]]], [[[Hello]]]", "Bonjour, Bonjour")]
    #[case::empty_message("a[[[]]]b", "ab")]
    fn test_replace(french: CultureDictionary, #[case] text: &str, #[case] expected: &str) {
        assert_eq!(DefaultNuggetReplacer::new().replace(&french, text), expected);
    }

    #[rstest]
    fn test_replace_formats_parameters(french: CultureDictionary) {
        let replacer = DefaultNuggetReplacer::new();

        let result =
            replacer.replace(&french, "[[[Enter between %1 and %0 characters|||3|||10]]]");

        assert_eq!(result, "Entrez entre 10 et 3 caractères");
    }

    #[rstest]
    #[case::zero("[[[%0 files|||0]]]", "0 fichier")]
    #[case::one("[[[%0 files|||1]]]", "1 fichier")]
    #[case::many("[[[%0 files|||12]]]", "12 fichiers")]
    #[case::not_a_count("[[[%0 files|||some]]]", "some fichier")]
    fn test_replace_selects_plural_form(
        french: CultureDictionary,
        #[case] text: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(DefaultNuggetReplacer::new().replace(&french, text), expected);
    }

    #[rstest]
    fn test_replace_uses_culture_plural_rules() {
        let mut files = TranslationItem::new("%0 files");
        files.plural_translations =
            vec!["%0 файл".to_string(), "%0 файла".to_string(), "%0 файлов".to_string()];
        let items: TranslationItems = [(files.message_id.clone(), files)].into_iter().collect();
        let russian = CultureDictionary::from_items("ru", &items, PluralRules::default());
        let replacer = DefaultNuggetReplacer::new();

        assert_eq!(replacer.replace(&russian, "[[[%0 files|||21]]]"), "21 файл");
        assert_eq!(replacer.replace(&russian, "[[[%0 files|||3]]]"), "3 файла");
        assert_eq!(replacer.replace(&russian, "[[[%0 files|||5]]]"), "5 файлов");
    }

    #[rstest]
    fn test_replace_formats_untranslated_message() {
        let replacer = DefaultNuggetReplacer::new();

        let result = replacer.replace(&CultureDictionary::empty("en"), "[[[Hello %0|||World]]]");

        assert_eq!(result, "Hello World");
    }

    #[rstest]
    fn test_replace_marks_format_errors(french: CultureDictionary) {
        let replacer = DefaultNuggetReplacer::new();

        let result = replacer.replace(&french, "<p>[[[Broken %0|||x]]]</p>");

        assert_eq!(result, "<p>Cassé {5}[FORMAT EXCEPTION]</p>");
    }

    #[rstest]
    fn test_parameters_are_not_translated(french: CultureDictionary) {
        let replacer = DefaultNuggetReplacer::new();

        let result = replacer.replace(&french, "[[[Say %0|||Hello]]]");

        assert_eq!(result, "Say Hello");
    }

    #[rstest]
    fn test_custom_tokens() {
        let tokens = NuggetTokens::new("{{", "}}", "|", "#").unwrap();
        let replacer = DefaultNuggetReplacer::with_tokens(tokens).unwrap();

        let result = replacer.replace(&CultureDictionary::empty("en"), "a {{Hi %0|you}} b");

        assert_eq!(result, "a Hi you b");
    }
}
