//! Indexer type definitions.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::MatcherError;
use crate::nugget::NuggetError;
use crate::store::TranslationItems;
use crate::types::Reference;

#[derive(Error, Debug)]
pub enum IndexerError {
    /// Include or exclude patterns failed to compile
    #[error(transparent)]
    Matcher(#[from] MatcherError),
    /// Nugget tokens are unusable
    #[error("Invalid nugget tokens: {0}")]
    Tokens(#[from] NuggetError),
}

/// Problem found while scanning; the affected file or nugget is skipped.
#[derive(Error, Debug)]
pub enum ScanWarning {
    #[error("Failed to read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed nugget at {reference}: {error}")]
    MalformedNugget { reference: Reference, error: NuggetError },
}

/// Outcome of a full scan.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Extracted items keyed by message id, without translations.
    pub items: TranslationItems,
    pub warnings: Vec<ScanWarning>,
    pub files_scanned: usize,
}

/// One nugget found in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NuggetOccurrence {
    /// Message id of the nugget.
    pub(crate) message_id: String,
    /// Where the nugget starts.
    pub(crate) reference: Reference,
    /// Translator comment written after the comment token.
    pub(crate) comment: Option<String>,
    /// `<reference>: <source line>` when source context is enabled.
    pub(crate) context: Option<String>,
}
