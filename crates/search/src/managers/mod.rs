//! Keyword search managers
//!
//! One manager per searchable entity:
//! - Articles (name, abstract, author names, tags, issue year)
//! - Books (name, description, author names, tags, year)
//! - Issues (name, description, year)
//! - Journals (name, description)
//!
//! Matching is a case-insensitive substring test OR-ed across the entity's
//! text fields. A digit-only query also matches records dated that year.

mod article;
mod book;
mod issue;
mod journal;

pub use article::ArticleManager;
pub use book::BookManager;
pub use issue::IssueManager;
pub use journal::JournalManager;

use std::collections::HashSet;
use uuid::Uuid;

/// A record the keyword managers can match against
pub trait Searchable {
    /// Primary key used for deduplication
    fn key(&self) -> Uuid;

    /// Text fields tested with the keyword
    fn text_fields(&self) -> Vec<&str>;

    /// Year tested against digit-only queries
    fn year(&self) -> Option<i32> {
        None
    }
}

/// Parsed keyword query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordQuery {
    needle: String,
    year: Option<i32>,
}

impl KeywordQuery {
    /// `None` for an absent or blank query, which selects everything
    pub fn parse(query: Option<&str>) -> Option<Self> {
        let raw = query.map(str::trim).filter(|q| !q.is_empty())?;

        let year = if raw.chars().all(|c| c.is_ascii_digit()) {
            raw.parse::<i32>().ok()
        } else {
            None
        };

        Some(Self {
            needle: raw.to_lowercase(),
            year,
        })
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn matches<R: Searchable + ?Sized>(&self, record: &R) -> bool {
        let text_hit = record
            .text_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&self.needle));

        text_hit || (self.year.is_some() && self.year == record.year())
    }
}

/// Common trait for the per-entity managers
pub trait SearchManager: Send + Sync {
    type Record: Searchable;

    /// Entity name, used in logs
    fn name(&self) -> &'static str;

    /// Narrow `records` by keyword, keeping their order and each key once
    fn search(&self, records: Vec<Self::Record>, query: Option<&str>) -> Vec<Self::Record> {
        search_records(records, query)
    }
}

/// Keyword filter shared by every manager
pub fn search_records<R: Searchable>(records: Vec<R>, query: Option<&str>) -> Vec<R> {
    let keyword = KeywordQuery::parse(query);
    let mut seen = HashSet::new();

    records
        .into_iter()
        .filter(|record| seen.insert(record.key()))
        .filter(|record| keyword.as_ref().map_or(true, |k| k.matches(record)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Note {
        id: Uuid,
        title: String,
        year: Option<i32>,
    }

    impl Searchable for Note {
        fn key(&self) -> Uuid {
            self.id
        }

        fn text_fields(&self) -> Vec<&str> {
            vec![self.title.as_str()]
        }

        fn year(&self) -> Option<i32> {
            self.year
        }
    }

    fn note(title: &str, year: Option<i32>) -> Note {
        Note {
            id: Uuid::new_v4(),
            title: title.to_string(),
            year,
        }
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    fn test_blank_query_selects_everything(#[case] query: Option<&str>) {
        assert!(KeywordQuery::parse(query).is_none());

        let notes = vec![note("Hønsehauk", None), note("Vandrefalk", None)];
        assert_eq!(search_records(notes, query).len(), 2);
    }

    #[rstest]
    #[case("1998", Some(1998))]
    #[case("0042", Some(42))]
    #[case("falk", None)]
    #[case("19 98", None)]
    #[case("99999999999", None)]
    fn test_digit_queries_carry_a_year(#[case] query: &str, #[case] year: Option<i32>) {
        let parsed = KeywordQuery::parse(Some(query)).unwrap();
        assert_eq!(parsed.year(), year);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let notes = vec![note("Falco peregrinus", None), note("Accipiter", None)];
        let hits = search_records(notes, Some("FALCO"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Falco peregrinus");
    }

    #[test]
    fn test_year_broadens_text_match() {
        let notes = vec![
            note("Rapport 1998", None),
            note("Trekkfugler", Some(1998)),
            note("Trekkfugler", Some(2001)),
        ];
        let hits = search_records(notes, Some("1998"));
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_duplicate_keys_collapse() {
        let first = note("Storlom", None);
        let twin = Note {
            id: first.id,
            title: "Storlom".to_string(),
            year: None,
        };
        let hits = search_records(vec![first, twin], Some("storlom"));
        assert_eq!(hits.len(), 1);
    }
}
