//! Nugget markup: tokens, parser and identifier normalization.
mod normalize;
mod parser;
mod tokens;
mod types;

pub use normalize::{
    normalize_identifiers,
    parse_decimal,
};
pub use parser::{
    DEFAULT_RESPONSE_PARSER,
    NuggetMatches,
    NuggetParser,
};
pub use tokens::NuggetTokens;
pub use types::{
    Nugget,
    NuggetError,
    NuggetMatch,
    ParseContext,
};
