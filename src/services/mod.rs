//! Collaborators of the launcher screen: the game library and the bitmap
//! and font services.

pub mod library;
pub mod media;

pub use library::{CatalogLibrary, Entry, Library, SortKey};
pub use media::{BlockFont, FileImageLoader, FontService, ImageLoader};
