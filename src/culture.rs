//! Culture name handling.
//!
//! A culture name is a language subtag optionally followed by script or
//! region subtags (`fr`, `pt-BR`, `sr-Cyrl-BA`). `_` is accepted as a
//! separator as well.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Primary language subtags of RFC 5646 tags.
/// Based on <http://tools.ietf.org/html/rfc5646>
static LANGUAGE_SUBTAGS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "af", "am", "ar", "az", "be", "bg", "bn", "bs", "ca", "cs", "cy", "da", "de", "dv", "el",
        "en", "eo", "es", "et", "eu", "fa", "fi", "fil", "fo", "fr", "ga", "gl", "gu", "he", "hi",
        "hr", "hu", "hy", "id", "is", "it", "ja", "ka", "kk", "km", "kn", "ko", "kok", "ky", "lo",
        "lt", "lv", "mi", "mk", "mn", "mr", "ms", "mt", "my", "nb", "nl", "nn", "no", "ns", "pa",
        "pl", "ps", "pt", "qu", "ro", "ru", "sa", "se", "sk", "sl", "sq", "sr", "sv", "sw", "syr",
        "ta", "te", "th", "tl", "tn", "tr", "ts", "tt", "uk", "ur", "uz", "vi", "xh", "zh", "zu",
    ]
    .into_iter()
    .collect()
});

/// Normalize a culture name for comparisons (lowercase, `_` replaced by `-`).
#[must_use]
pub fn normalize_culture(name: &str) -> String {
    name.to_lowercase().replace('_', "-")
}

/// Returns the lowercase primary language subtag (`pt-BR` → `pt`).
#[must_use]
pub fn language_subtag(name: &str) -> String {
    name.split(['-', '_']).next().unwrap_or_default().to_lowercase()
}

/// True when the culture's language subtag is known and every other subtag
/// is a short alphanumeric code.
#[must_use]
pub fn is_known_culture(name: &str) -> bool {
    let mut subtags = name.split(['-', '_']);
    let Some(language) = subtags.next() else {
        return false;
    };

    LANGUAGE_SUBTAGS.contains(language.to_lowercase().as_str())
        && subtags.all(|subtag| {
            (2..=8).contains(&subtag.len()) && subtag.chars().all(|c| c.is_ascii_alphanumeric())
        })
}
