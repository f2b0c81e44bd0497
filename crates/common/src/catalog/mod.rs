//! Catalog domain: storage seam, hydrated records, forms and workflows

pub mod forms;
mod memory;
pub mod records;
mod service;
mod store;
pub mod views;

pub use memory::MemoryStore;
pub use records::{ArticleRecord, BookRecord, IssueRef, JournalRef, Lookup};
pub use service::Catalog;
pub use store::{ArticleLinks, ArticleScope, BookLinks, CatalogStore};
