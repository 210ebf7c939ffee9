//! Scanner for nugget markup.
//!
//! The grammar is
//! `BEGIN message_id ( DELIMITER item )* ( COMMENT comment )? END`
//! with every capture taking as few characters as possible. Tokens are
//! compared literally, so characters such as `[` or `|` carry no special
//! meaning. Captures may span lines.

use std::sync::LazyLock;

use super::tokens::NuggetTokens;
use super::types::{
    Nugget,
    NuggetError,
    NuggetMatch,
    ParseContext,
};

/// Parser for response processing with the default tokens, shared process-wide.
pub static DEFAULT_RESPONSE_PARSER: LazyLock<NuggetParser> =
    LazyLock::new(|| NuggetParser::with_default_tokens(ParseContext::ResponseProcessing));

/// Token found while scanning the inside of a nugget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// Starts a format item.
    Delimiter,
    /// Starts the comment, which runs to the end token.
    Comment,
    /// Closes the nugget.
    End,
}

/// Raw captures of one nugget, borrowed from the parsed text.
#[derive(Debug)]
struct Body<'t> {
    /// Text between the begin token and the first other token.
    message_id: &'t str,
    /// One entry per delimiter.
    format_items: Vec<&'t str>,
    /// Non-empty text after the comment token.
    comment: Option<&'t str>,
    /// Byte offset just past the end token.
    end: usize,
}

/// Recognizes nuggets inside arbitrary text.
#[derive(Debug, Clone)]
pub struct NuggetParser {
    /// Delimiters matched literally.
    tokens: NuggetTokens,
    /// Decides whether empty captures are errors.
    context: ParseContext,
}

impl NuggetParser {
    /// Parser for `tokens`, which must pass [`NuggetTokens::check`].
    pub fn new(tokens: NuggetTokens, context: ParseContext) -> Result<Self, NuggetError> {
        tokens.check()?;
        Ok(Self { tokens, context })
    }

    #[must_use]
    pub fn with_default_tokens(context: ParseContext) -> Self {
        Self { tokens: NuggetTokens::default(), context }
    }

    #[must_use]
    pub const fn tokens(&self) -> &NuggetTokens {
        &self.tokens
    }

    #[must_use]
    pub const fn context(&self) -> ParseContext {
        self.context
    }

    /// Returns a lazy iterator over the nuggets of `text`.
    ///
    /// The iterator is `Clone`, so a scan can be restarted from any point.
    #[must_use]
    pub const fn parse<'p, 't>(&'p self, text: &'t str) -> NuggetMatches<'p, 't> {
        NuggetMatches { parser: self, text, cursor: 0, exhausted: false }
    }

    /// Finds the earliest token at or after `from`.
    ///
    /// When several tokens start at the same offset the delimiter wins over
    /// the comment token, which wins over the end token. With `end_only` set
    /// only the end token is considered.
    fn next_token(&self, text: &str, from: usize, end_only: bool) -> Option<(usize, Token)> {
        let rest = text.get(from..)?;
        for (offset, _) in rest.char_indices() {
            let Some(candidate) = rest.get(offset..) else {
                continue;
            };
            if !end_only {
                if candidate.starts_with(&self.tokens.delimiter) {
                    return Some((from + offset, Token::Delimiter));
                }
                if candidate.starts_with(&self.tokens.comment) {
                    return Some((from + offset, Token::Comment));
                }
            }
            if candidate.starts_with(&self.tokens.end) {
                return Some((from + offset, Token::End));
            }
        }
        None
    }

    /// Scans the inside of a nugget starting right after its begin token.
    ///
    /// Returns `None` when no end token follows, in which case no further
    /// nugget can be closed either.
    fn scan_body<'t>(&self, text: &'t str, from: usize) -> Option<Body<'t>> {
        let (message_end, mut token) = self.next_token(text, from, false)?;
        let message_id = text.get(from..message_end)?;
        let mut format_items = Vec::new();
        let mut comment = None;
        let mut position = message_end;

        loop {
            match token {
                Token::End => {
                    return Some(Body {
                        message_id,
                        format_items,
                        comment,
                        end: position + self.tokens.end.len(),
                    });
                }
                Token::Delimiter => {
                    let item_start = position + self.tokens.delimiter.len();
                    let (item_end, next) = self.next_token(text, item_start, false)?;
                    format_items.push(text.get(item_start..item_end)?);
                    position = item_end;
                    token = next;
                }
                Token::Comment => {
                    // An empty comment is dropped: `[[[Save///]]]` is the id `Save`
                    // with no comment.
                    let comment_start = position + self.tokens.comment.len();
                    let (comment_end, next) = self.next_token(text, comment_start, true)?;
                    comment = text.get(comment_start..comment_end).filter(|c| !c.is_empty());
                    position = comment_end;
                    token = next;
                }
            }
        }
    }

    /// Turns raw captures into a match, applying the source-mode checks.
    fn build(&self, start: usize, body: Body<'_>) -> Result<NuggetMatch, NuggetError> {
        let span = start..body.end;

        if self.context == ParseContext::SourceProcessing {
            if body.message_id.is_empty() {
                return Err(NuggetError::EmptyMessageId { span });
            }
            if let Some(index) = body.format_items.iter().position(|item| item.is_empty()) {
                return Err(NuggetError::EmptyFormatItem {
                    message_id: body.message_id.to_string(),
                    index,
                    span,
                });
            }
        }

        let nugget = Nugget {
            message_id: body.message_id.to_string(),
            format_items: body.format_items.into_iter().map(str::to_string).collect(),
            comment: body.comment.map(str::to_string),
        };

        Ok(NuggetMatch { nugget, span })
    }
}

/// Lazy sequence of nugget matches produced by [`NuggetParser::parse`].
#[derive(Debug, Clone)]
pub struct NuggetMatches<'p, 't> {
    /// Parser whose tokens are matched.
    parser: &'p NuggetParser,
    /// Text being scanned.
    text: &'t str,
    /// Byte offset the next search starts at.
    cursor: usize,
    /// Set once no begin token or end token remains.
    exhausted: bool,
}

impl Iterator for NuggetMatches<'_, '_> {
    type Item = Result<NuggetMatch, NuggetError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let begin = &self.parser.tokens.begin;
        let found = self.text.get(self.cursor..).and_then(|rest| rest.find(begin.as_str()));
        let Some(offset) = found else {
            self.exhausted = true;
            return None;
        };

        let start = self.cursor + offset;
        let Some(body) = self.parser.scan_body(self.text, start + begin.len()) else {
            self.exhausted = true;
            return None;
        };

        self.cursor = body.end;
        Some(self.parser.build(start, body))
    }
}
