//! Faceted search handler

use axum::{
    extract::{OriginalUri, Query, State},
    Json,
};
use fuglelitt_common::errors::Result;
use fuglelitt_search::{
    facets::{
        ARTICLE_PAGE_PARAM, AUTHORS_PARAM, BOOK_PAGE_PARAM, JOURNALS_PARAM, QUERY_PARAM,
        TAGS_PARAM, YEARS_PARAM,
    },
    Page, SearchRequest, SearchResults,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::instrument;

use crate::query_string::QueryPairs;
use crate::AppState;

/// Search results plus ready-made links for the next interaction
#[derive(Serialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub results: SearchResults,
    pub links: SearchLinks,
}

#[derive(Debug, Default, Serialize)]
pub struct SearchLinks {
    pub articles: PageLinks,
    pub books: PageLinks,
    /// Per active facet (and `q`), the URL without it
    pub remove: BTreeMap<&'static str, String>,
    /// Per facet, the URL selecting each not-yet-selected vocabulary value
    pub add: BTreeMap<&'static str, BTreeMap<String, String>>,
}

#[derive(Debug, Default, Serialize)]
pub struct PageLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

impl PageLinks {
    fn for_page<T>(page: &Page<T>, cursor: &str, query: &QueryPairs, path: &str) -> Self {
        let link = |number: usize| query.with_replaced(cursor, &number.to_string()).to_url(path);
        Self {
            next: page.next_page_number().map(link),
            previous: page.previous_page_number().map(link),
        }
    }
}

fn build_links(results: &SearchResults, query: &QueryPairs, path: &str) -> SearchLinks {
    let mut links = SearchLinks {
        articles: PageLinks::for_page(&results.articles, ARTICLE_PAGE_PARAM, query, path),
        books: PageLinks::for_page(&results.books, BOOK_PAGE_PARAM, query, path),
        ..Default::default()
    };

    let mut removable = results.selection.active();
    if query.contains(QUERY_PARAM) {
        removable.push(QUERY_PARAM);
    }
    for key in removable {
        links.remove.insert(key, query.without(key).to_url(path));
    }

    let selection = &results.selection;
    let vocabulary = &results.vocabulary;
    let mut add = |key: &'static str, values: Vec<String>| {
        let urls: BTreeMap<String, String> = values
            .into_iter()
            .map(|value| {
                let url = query.with_added(key, &value).to_url(path);
                (value, url)
            })
            .collect();
        if !urls.is_empty() {
            links.add.insert(key, urls);
        }
    };

    add(
        TAGS_PARAM,
        vocabulary.tags.difference(&selection.tags).cloned().collect(),
    );
    add(
        JOURNALS_PARAM,
        vocabulary.journals.difference(&selection.journals).cloned().collect(),
    );
    add(
        AUTHORS_PARAM,
        vocabulary.authors.difference(&selection.authors).cloned().collect(),
    );
    add(
        YEARS_PARAM,
        vocabulary
            .years
            .iter()
            .filter(|year| !selection.years.as_ref().is_some_and(|s| s.contains(year)))
            .map(|year| year.to_string())
            .collect(),
    );

    links
}

/// GET /search
#[instrument(skip(state, params))]
pub async fn search(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<SearchResponse>> {
    let query = QueryPairs::new(params);
    let request = SearchRequest::from_pairs(query.iter());

    let results = state.search.search(&state.catalog, &request).await?;
    let links = build_links(&results, &query, uri.path());

    Ok(Json(SearchResponse { results, links }))
}
