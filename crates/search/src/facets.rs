//! Facet selection for the faceted search page
//!
//! Parsed from the raw query pairs so repeated keys (`tags=a&tags=b`) keep
//! every value. Values inside one facet are OR-ed; facets are AND-ed.

use fuglelitt_common::catalog::{ArticleRecord, BookRecord};
use serde::Serialize;
use std::collections::BTreeSet;

pub const QUERY_PARAM: &str = "q";
pub const FILE_PARAM: &str = "file";
pub const TAGS_PARAM: &str = "tags";
pub const JOURNALS_PARAM: &str = "journals";
pub const AUTHORS_PARAM: &str = "authors";
pub const YEARS_PARAM: &str = "years";
pub const ARTICLE_PAGE_PARAM: &str = "a-page";
pub const BOOK_PAGE_PARAM: &str = "b-page";

/// Selected facet values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetSelection {
    /// Only records with a file attachment
    pub has_file: bool,

    /// Tag names
    pub tags: BTreeSet<String>,

    /// Journal names; narrows articles only
    pub journals: BTreeSet<String>,

    /// Author display names
    pub authors: BTreeSet<String>,

    /// Publication years. `Some` with an empty set means every submitted
    /// year was malformed, which matches nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years: Option<BTreeSet<i32>>,
}

impl FacetSelection {
    pub fn is_empty(&self) -> bool {
        !self.has_file
            && self.tags.is_empty()
            && self.journals.is_empty()
            && self.authors.is_empty()
            && self.years.is_none()
    }

    /// Names of the facets currently narrowing results
    pub fn active(&self) -> Vec<&'static str> {
        let mut active = Vec::new();
        if self.has_file {
            active.push(FILE_PARAM);
        }
        if !self.tags.is_empty() {
            active.push(TAGS_PARAM);
        }
        if !self.journals.is_empty() {
            active.push(JOURNALS_PARAM);
        }
        if !self.authors.is_empty() {
            active.push(AUTHORS_PARAM);
        }
        if self.years.is_some() {
            active.push(YEARS_PARAM);
        }
        active
    }

    pub fn matches_article(&self, record: &ArticleRecord) -> bool {
        if self.has_file && !record.has_file() {
            return false;
        }
        if !self.tags.is_empty() && !record.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        if !self.journals.is_empty()
            && !record
                .journal()
                .is_some_and(|journal| self.journals.contains(&journal.name))
        {
            return false;
        }
        if !self.authors.is_empty() && !record.authors.iter().any(|a| self.authors.contains(&a.name)) {
            return false;
        }
        self.year_matches(record.year())
    }

    pub fn matches_book(&self, record: &BookRecord) -> bool {
        if self.has_file && !record.has_file() {
            return false;
        }
        if !self.tags.is_empty() && !record.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        if !self.authors.is_empty() && !record.authors.iter().any(|a| self.authors.contains(&a.name)) {
            return false;
        }
        self.year_matches(record.year())
    }

    fn year_matches(&self, year: Option<i32>) -> bool {
        match &self.years {
            None => true,
            Some(years) => year.is_some_and(|y| years.contains(&y)),
        }
    }
}

/// A parsed faceted search request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    /// Free-text query, as submitted
    pub query: Option<String>,

    pub facets: FacetSelection,

    /// Article page cursor (`a-page`)
    pub article_page: Option<String>,

    /// Book page cursor (`b-page`)
    pub book_page: Option<String>,
}

impl SearchRequest {
    /// Build from query-string pairs
    ///
    /// Single-valued keys keep their last occurrence. `file` is a presence
    /// flag. Blank facet values are ignored; year values that are not
    /// integers still activate the years facet.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut request = SearchRequest::default();

        for (key, value) in pairs {
            let trimmed = value.trim();
            match key {
                QUERY_PARAM => request.query = Some(value.to_string()),
                FILE_PARAM => request.facets.has_file = true,
                ARTICLE_PAGE_PARAM => request.article_page = Some(value.to_string()),
                BOOK_PAGE_PARAM => request.book_page = Some(value.to_string()),
                _ if trimmed.is_empty() => {}
                TAGS_PARAM => {
                    request.facets.tags.insert(trimmed.to_string());
                }
                JOURNALS_PARAM => {
                    request.facets.journals.insert(trimmed.to_string());
                }
                AUTHORS_PARAM => {
                    request.facets.authors.insert(trimmed.to_string());
                }
                YEARS_PARAM => {
                    let years = request.facets.years.get_or_insert_with(BTreeSet::new);
                    if let Ok(year) = trimmed.parse::<i32>() {
                        years.insert(year);
                    }
                }
                _ => {}
            }
        }

        request
    }

    /// The keyword, if one was given
    pub fn keyword(&self) -> Option<&str> {
        self.query.as_deref()
    }
}
