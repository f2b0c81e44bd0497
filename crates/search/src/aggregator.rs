//! Faceted search over articles and books
//!
//! Keyword narrowing, then facet narrowing, then the vocabulary of the
//! narrowed sets, then independent pagination of each relation.

use crate::facets::{FacetSelection, SearchRequest};
use crate::managers::{ArticleManager, BookManager, SearchManager};
use crate::pagination::{Page, Paginator};
use crate::vocabulary::{vocabulary, Vocabulary};
use fuglelitt_common::catalog::{ArticleRecord, BookRecord, Catalog};
use fuglelitt_common::errors::Result;
use fuglelitt_common::metrics;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Result counts before pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchCounts {
    pub articles: usize,
    pub books: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    /// Query echoed back as submitted
    pub query: Option<String>,
    pub articles: Page<ArticleRecord>,
    pub books: Page<BookRecord>,
    pub vocabulary: Vocabulary,
    pub counts: SearchCounts,
    /// Facets that were applied
    pub selection: FacetSelection,
}

/// Faceted search aggregator
#[derive(Debug, Clone, Copy)]
pub struct FacetedSearch {
    paginator: Paginator,
}

impl FacetedSearch {
    pub fn new(per_page: usize) -> Self {
        Self {
            paginator: Paginator::new(per_page),
        }
    }

    /// Run the search over already loaded records
    pub fn run(
        &self,
        articles: Vec<ArticleRecord>,
        books: Vec<BookRecord>,
        request: &SearchRequest,
    ) -> SearchResults {
        let facets = &request.facets;

        // Managers also collapse duplicate keys
        let articles: Vec<ArticleRecord> = ArticleManager
            .search(articles, request.keyword())
            .into_iter()
            .filter(|record| facets.matches_article(record))
            .collect();
        let books: Vec<BookRecord> = BookManager
            .search(books, request.keyword())
            .into_iter()
            .filter(|record| facets.matches_book(record))
            .collect();

        let vocabulary = vocabulary(&articles, &books);
        let counts = SearchCounts {
            articles: articles.len(),
            books: books.len(),
        };

        debug!(
            active_facets = ?facets.active(),
            articles = counts.articles,
            books = counts.books,
            "Facets applied"
        );

        SearchResults {
            query: request.query.clone(),
            articles: self
                .paginator
                .page(articles, request.article_page.as_deref()),
            books: self.paginator.page(books, request.book_page.as_deref()),
            vocabulary,
            counts,
            selection: facets.clone(),
        }
    }

    /// Load the catalog and run the search
    #[instrument(skip(self, catalog), fields(query = ?request.query))]
    pub async fn search(&self, catalog: &Catalog, request: &SearchRequest) -> Result<SearchResults> {
        let start = Instant::now();

        let articles = catalog.article_records().await?;
        let books = catalog.book_records().await?;
        let results = self.run(articles, books, request);

        let elapsed = start.elapsed();
        metrics::record_search(elapsed.as_secs_f64(), "articles", results.counts.articles);
        metrics::record_search(elapsed.as_secs_f64(), "books", results.counts.books);

        info!(
            articles = results.counts.articles,
            books = results.counts.books,
            latency_ms = elapsed.as_millis() as u64,
            "Faceted search completed"
        );

        Ok(results)
    }
}
