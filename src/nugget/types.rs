//! Nugget value types and parse errors.

use std::ops::Range;

use thiserror::Error;

/// A parsed nugget occurrence.
///
/// Equality is structural over all three fields. Translation files key on
/// `message_id` alone; the comment is metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Nugget {
    pub message_id: String,
    /// Positional parameters, in the order they appear in the markup.
    pub format_items: Vec<String>,
    pub comment: Option<String>,
}

impl Nugget {
    #[must_use]
    pub fn new(message_id: impl Into<String>) -> Self {
        Self { message_id: message_id.into(), format_items: Vec::new(), comment: None }
    }

    #[must_use]
    pub fn with_format_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.format_items = items.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// True when the nugget carries at least one format parameter.
    #[must_use]
    pub const fn is_formatted(&self) -> bool {
        !self.format_items.is_empty()
    }
}

impl std::fmt::Display for Nugget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message_id)
    }
}

/// A nugget together with the byte span it occupies in the parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuggetMatch {
    pub nugget: Nugget,
    pub span: Range<usize>,
}

/// Which pipeline is parsing.
///
/// Source processing is strict so malformed markup gets reported during
/// extraction; response processing is lenient so rendering never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParseContext {
    SourceProcessing,
    #[default]
    ResponseProcessing,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NuggetError {
    #[error("Nugget token '{name}' cannot be empty")]
    EmptyToken { name: &'static str },

    #[error("Nugget tokens '{first}' and '{second}' must differ (both are '{token}')")]
    DuplicateToken { first: &'static str, second: &'static str, token: String },

    #[error("Nugget at bytes {}..{} has an empty message id", span.start, span.end)]
    EmptyMessageId { span: Range<usize> },

    #[error(
        "Nugget '{message_id}' at bytes {}..{} has an empty parameter at position {index}",
        span.start,
        span.end
    )]
    EmptyFormatItem { message_id: String, index: usize, span: Range<usize> },
}

impl NuggetError {
    /// Byte span of the offending markup, when the error refers to one.
    #[must_use]
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            Self::EmptyMessageId { span } | Self::EmptyFormatItem { span, .. } => {
                Some(span.clone())
            }
            Self::EmptyToken { .. } | Self::DuplicateToken { .. } => None,
        }
    }
}
