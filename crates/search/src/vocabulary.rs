//! Facet vocabulary
//!
//! The values a user can pick next, recomputed from the narrowed result sets
//! on every request.

use fuglelitt_common::catalog::{ArticleRecord, BookRecord};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Vocabulary {
    pub tags: BTreeSet<String>,
    /// Taken from articles only
    pub journals: BTreeSet<String>,
    pub authors: BTreeSet<String>,
    pub years: BTreeSet<i32>,
}

pub fn vocabulary(articles: &[ArticleRecord], books: &[BookRecord]) -> Vocabulary {
    let mut vocabulary = Vocabulary::default();

    for record in articles {
        vocabulary.tags.extend(record.tags.iter().cloned());
        vocabulary
            .authors
            .extend(record.authors.iter().map(|a| a.name.clone()));
        if let Some(journal) = record.journal() {
            vocabulary.journals.insert(journal.name.clone());
        }
        vocabulary.years.extend(record.year());
    }

    for record in books {
        vocabulary.tags.extend(record.tags.iter().cloned());
        vocabulary
            .authors
            .extend(record.authors.iter().map(|a| a.name.clone()));
        vocabulary.years.extend(record.year());
    }

    vocabulary
}
