//! Fuglelitt search
//!
//! Pure search logic over hydrated catalog records:
//! - Keyword managers per entity
//! - Facet selection and narrowing
//! - Facet vocabulary
//! - Page-number pagination
//! - The faceted search aggregator

pub mod aggregator;
pub mod facets;
pub mod managers;
pub mod pagination;
pub mod vocabulary;

#[cfg(test)]
mod fixtures;

pub use aggregator::{FacetedSearch, SearchCounts, SearchResults};
pub use facets::{FacetSelection, SearchRequest};
pub use managers::{ArticleManager, BookManager, IssueManager, JournalManager, SearchManager};
pub use pagination::{Page, Paginator};
pub use vocabulary::Vocabulary;
