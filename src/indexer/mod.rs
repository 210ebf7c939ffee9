//! Source scanning: finds nuggets in project files.
pub mod finder;
pub mod types;

pub use finder::FileNuggetFinder;
pub use types::{
    IndexerError,
    ScanResult,
    ScanWarning,
};
