//! Plural form selection.
//!
//! Form indexes follow the gettext `Plural-Forms` conventions for each
//! language family, so `msgstr[n]` entries can be picked directly.

use std::fmt;
use std::sync::Arc;

use crate::culture::{
    language_subtag,
    normalize_culture,
};

/// Selects the plural form index for a quantity.
pub trait PluralRuleProvider: Send + Sync {
    /// `None` when the provider does not know `culture`.
    fn select_form(&self, culture: &str, quantity: i64) -> Option<usize>;
}

/// Plural rule families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    /// No plural distinction.
    Single,
    /// `n != 1`
    Germanic,
    /// `n > 1`
    French,
    /// Russian, Ukrainian, Serbian, Croatian and relatives.
    EastSlavic,
    /// `one`, `few` and `many`, with the few forms ending in 2 to 4.
    Polish,
    /// Czech and Slovak.
    WestSlavic,
    /// Five forms: 1, 2, 3 to 6, 7 to 10 and the rest.
    Irish,
    /// Six forms: 0, 1, 2, few, many and other.
    Arabic,
    /// Three forms keyed on the last digit, teens excluded.
    Lithuanian,
    /// Ending in 1 except 11, other non-zero counts, and zero.
    Latvian,
    /// 1, then 0 or `n % 100` in 1 to 19, then the rest.
    Romanian,
    /// Four forms keyed on `n % 100`.
    Slovenian,
}

impl Family {
    /// Family of the culture's language subtag.
    fn for_culture(culture: &str) -> Option<Self> {
        if normalize_culture(culture) == "pt-br" {
            return Some(Self::French);
        }

        let family = match language_subtag(culture).as_str() {
            "ja" | "ko" | "zh" | "vi" | "th" | "id" | "ms" | "km" | "lo" | "my" | "ka" | "kk"
            | "ky" | "tr" | "fa" => Self::Single,
            "en" | "de" | "nl" | "sv" | "da" | "no" | "nb" | "nn" | "fi" | "et" | "el" | "he"
            | "hu" | "it" | "es" | "pt" | "ca" | "bg" | "eo" | "eu" | "fo" | "gl" | "af" | "sq"
            | "sw" | "ur" | "hi" | "bn" | "gu" | "kn" | "mr" | "ta" | "te" | "pa" | "ne" | "az"
            | "uz" | "mn" | "tn" | "xh" | "zu" | "ts" | "se" | "is" | "mk" | "fil" | "tl" => {
                Self::Germanic
            }
            "fr" | "am" | "hy" | "ln" | "mi" => Self::French,
            "ru" | "uk" | "be" | "sr" | "hr" | "bs" => Self::EastSlavic,
            "pl" => Self::Polish,
            "cs" | "sk" => Self::WestSlavic,
            "ga" => Self::Irish,
            "ar" => Self::Arabic,
            "lt" => Self::Lithuanian,
            "lv" => Self::Latvian,
            "ro" => Self::Romanian,
            "sl" => Self::Slovenian,
            _ => return None,
        };
        Some(family)
    }

    /// Form index for the absolute count `n`.
    fn select(self, n: u64) -> usize {
        let n10 = n % 10;
        let n100 = n % 100;
        let few = n10 >= 2 && n10 <= 4 && (n100 < 12 || n100 > 14);

        match self {
            Self::Single => 0,
            Self::Germanic => usize::from(n != 1),
            Self::French => usize::from(n > 1),
            Self::EastSlavic => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if few {
                    1
                } else {
                    2
                }
            }
            Self::Polish => {
                if n == 1 {
                    0
                } else if few {
                    1
                } else {
                    2
                }
            }
            Self::WestSlavic => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            Self::Irish => match n {
                1 => 0,
                2 => 1,
                3..=6 => 2,
                7..=10 => 3,
                _ => 4,
            },
            Self::Arabic => match n {
                0 => 0,
                1 => 1,
                2 => 2,
                _ if n100 >= 3 && n100 <= 10 => 3,
                _ if n100 >= 11 => 4,
                _ => 5,
            },
            Self::Lithuanian => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if n10 >= 2 && (n100 < 10 || n100 >= 20) {
                    1
                } else {
                    2
                }
            }
            Self::Latvian => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if n != 0 {
                    1
                } else {
                    2
                }
            }
            Self::Romanian => {
                if n == 1 {
                    0
                } else if n == 0 || (n100 > 0 && n100 < 20) {
                    1
                } else {
                    2
                }
            }
            Self::Slovenian => match n100 {
                1 => 0,
                2 => 1,
                3 | 4 => 2,
                _ => 3,
            },
        }
    }
}

/// Built-in rules for the common gettext language families.
#[derive(Debug, Clone, Copy, Default)]
pub struct CldrPluralRuleProvider;

impl PluralRuleProvider for CldrPluralRuleProvider {
    fn select_form(&self, culture: &str, quantity: i64) -> Option<usize> {
        Family::for_culture(culture).map(|family| family.select(quantity.unsigned_abs()))
    }
}

/// Ordered list of providers with a two-form fallback (`n == 1` → 0, else 1).
#[derive(Clone)]
pub struct PluralRules {
    /// Tried in order before the fallback.
    providers: Vec<Arc<dyn PluralRuleProvider>>,
}

impl PluralRules {
    /// Rules with no providers; every culture uses the fallback.
    #[must_use]
    pub const fn fallback_only() -> Self {
        Self { providers: Vec::new() }
    }

    /// Appends a provider, consulted after the ones already registered.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn PluralRuleProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Plural form index of `quantity` in `culture`.
    #[must_use]
    pub fn select_form(&self, culture: &str, quantity: i64) -> usize {
        self.providers
            .iter()
            .find_map(|provider| provider.select_form(culture, quantity))
            .unwrap_or_else(|| usize::from(quantity != 1))
    }
}

impl Default for PluralRules {
    fn default() -> Self {
        Self::fallback_only().with_provider(Arc::new(CldrPluralRuleProvider))
    }
}

impl fmt::Debug for PluralRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluralRules").field("providers", &self.providers.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::english_one("en", 1, 0)]
    #[case::english_zero("en-US", 0, 1)]
    #[case::english_many("en", 5, 1)]
    #[case::french_zero("fr", 0, 0)]
    #[case::french_two("fr-CA", 2, 1)]
    #[case::brazilian("pt-BR", 1, 0)]
    #[case::portuguese("pt", 0, 1)]
    #[case::japanese("ja", 7, 0)]
    #[case::russian_one("ru", 21, 0)]
    #[case::russian_few("ru", 3, 1)]
    #[case::russian_teen("ru", 12, 2)]
    #[case::russian_many("ru", 5, 2)]
    #[case::polish_one("pl", 1, 0)]
    #[case::polish_few("pl", 22, 1)]
    #[case::polish_many("pl", 21, 2)]
    #[case::czech_few("cs", 4, 1)]
    #[case::czech_many("cs", 5, 2)]
    #[case::irish("ga", 8, 3)]
    #[case::arabic_zero("ar", 0, 0)]
    #[case::arabic_few("ar", 103, 3)]
    #[case::arabic_many("ar", 11, 4)]
    #[case::arabic_other("ar", 100, 5)]
    #[case::lithuanian("lt", 11, 2)]
    #[case::latvian_zero("lv", 0, 2)]
    #[case::romanian("ro", 19, 1)]
    #[case::slovenian("sl", 102, 1)]
    #[case::negative("en", -1, 0)]
    fn test_cldr_select_form(#[case] culture: &str, #[case] quantity: i64, #[case] expected: usize) {
        assert_eq!(CldrPluralRuleProvider.select_form(culture, quantity), Some(expected));
    }

    #[rstest]
    fn test_cldr_unknown_culture() {
        assert_eq!(CldrPluralRuleProvider.select_form("tlh", 3), None);
    }

    #[derive(Debug)]
    struct AlwaysTwo;

    impl PluralRuleProvider for AlwaysTwo {
        fn select_form(&self, culture: &str, _quantity: i64) -> Option<usize> {
            (culture == "x-test").then_some(2)
        }
    }

    #[rstest]
    fn test_rules_try_providers_in_order() {
        let rules = PluralRules::fallback_only()
            .with_provider(Arc::new(AlwaysTwo))
            .with_provider(Arc::new(CldrPluralRuleProvider));

        assert_eq!(rules.select_form("x-test", 1), 2);
        assert_eq!(rules.select_form("ru", 5), 2);
        assert_eq!(rules.select_form("fr", 0), 0);
    }

    #[rstest]
    #[case(1, 0)]
    #[case(0, 1)]
    #[case(2, 1)]
    fn test_rules_fallback(#[case] quantity: i64, #[case] expected: usize) {
        assert_eq!(PluralRules::default().select_form("tlh", quantity), expected);
    }
}
