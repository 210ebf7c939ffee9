//! Translation store: PO/POT files under the locale directory.
mod location;
pub mod po;
mod repository;
mod types;

pub use location::{
    DirectoryLocationProvider,
    LANGUAGE_FILE_NAME,
    LocationProvider,
    TEMPLATE_FILE_NAME,
};
pub(crate) use repository::read_po_file;
pub use repository::PoTranslationRepository;
pub use types::{
    PoFile,
    PoHeader,
    StoreError,
    TranslationItem,
    TranslationItems,
};
