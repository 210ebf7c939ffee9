//! Delimiter tokens that frame a nugget.

use serde::{
    Deserialize,
    Serialize,
};

use super::types::NuggetError;

/// The four literal delimiters of the nugget markup.
///
/// `[[[Hello %0|||World///greeting]]]` uses the defaults: begin `[[[`,
/// end `]]]`, parameter delimiter `|||` and comment delimiter `///`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NuggetTokens {
    pub begin: String,
    pub end: String,
    pub delimiter: String,
    pub comment: String,
}

impl Default for NuggetTokens {
    fn default() -> Self {
        Self {
            begin: "[[[".to_string(),
            end: "]]]".to_string(),
            delimiter: "|||".to_string(),
            comment: "///".to_string(),
        }
    }
}

impl NuggetTokens {
    /// Creates a token set, rejecting empty or duplicated tokens.
    pub fn new(
        begin: impl Into<String>,
        end: impl Into<String>,
        delimiter: impl Into<String>,
        comment: impl Into<String>,
    ) -> Result<Self, NuggetError> {
        let tokens = Self {
            begin: begin.into(),
            end: end.into(),
            delimiter: delimiter.into(),
            comment: comment.into(),
        };
        tokens.check()?;
        Ok(tokens)
    }

    /// Verifies that every token is non-empty and that no two tokens are equal.
    pub fn check(&self) -> Result<(), NuggetError> {
        let named = self.named();

        if let Some((name, _)) = named.iter().find(|(_, token)| token.is_empty()) {
            return Err(NuggetError::EmptyToken { name: *name });
        }

        for (index, (first_name, first)) in named.iter().enumerate() {
            for (second_name, second) in named.iter().skip(index + 1) {
                if first == second {
                    return Err(NuggetError::DuplicateToken {
                        first: *first_name,
                        second: *second_name,
                        token: (*first).to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Tokens paired with their configuration names, in scan priority order.
    const fn named(&self) -> [(&'static str, &str); 4] {
        [
            ("begin", self.begin.as_str()),
            ("end", self.end.as_str()),
            ("delimiter", self.delimiter.as_str()),
            ("comment", self.comment.as_str()),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn default_tokens_are_valid() {
        assert_that!(NuggetTokens::default().check(), ok(anything()));
    }

    #[rstest]
    #[case::begin("", "]]]", "|||", "///", "begin")]
    #[case::end("[[[", "", "|||", "///", "end")]
    #[case::delimiter("[[[", "]]]", "", "///", "delimiter")]
    #[case::comment("[[[", "]]]", "|||", "", "comment")]
    fn empty_token_is_rejected(
        #[case] begin: &str,
        #[case] end: &str,
        #[case] delimiter: &str,
        #[case] comment: &str,
        #[case] expected: &str,
    ) {
        let error = NuggetTokens::new(begin, end, delimiter, comment).unwrap_err();

        assert!(matches!(error, NuggetError::EmptyToken { name } if name == expected));
    }

    #[rstest]
    fn duplicate_tokens_are_rejected() {
        let result = NuggetTokens::new("%%", "]]]", "%%", "///");

        let error = result.unwrap_err();
        assert_that!(error.to_string(), contains_substring("'begin' and 'delimiter'"));
    }
}
