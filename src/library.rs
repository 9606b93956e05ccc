//! Sound records and the local clip library.
//!
//! `model` holds the record types shared with the catalog and session,
//! `store` manages the flat download directory and `metadata` reads tags.

mod metadata;
mod model;
mod store;

pub use metadata::{MetadataReader, MetadataSource};
pub use model::*;
pub use store::LibraryStore;

#[cfg(test)]
mod tests;
