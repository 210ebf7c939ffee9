//! nugget-i18n
//!
//! Extracts `[[[message|||param///comment]]]` nuggets from source files into a
//! gettext template, merges it into per-language PO files and replaces
//! nuggets with their translations at runtime or when projecting a static
//! site.

pub mod build;
pub mod cache;
pub mod config;
pub mod culture;
pub mod dictionary;
pub mod format;
pub mod indexer;
pub mod manager;
pub mod merge;
pub mod nugget;
pub mod plural;
pub mod project;
pub mod replacer;
pub mod store;
mod test_utils;
pub mod types;
pub mod watch;

pub use manager::LocalizationManager;
pub use replacer::{
    DefaultNuggetReplacer,
    NuggetReplacer,
};
