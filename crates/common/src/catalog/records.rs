//! Hydrated read models
//!
//! Search and detail views work over records that already carry their
//! authors, tag names and issue/journal summary, so the matching logic never
//! goes back to the store.

use crate::db::models::{Article, ArticleImage, Author, Book, Issue, Journal, Post};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// Identifier from a `{key}` path segment: primary key or slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Id(Uuid),
    Slug(String),
}

impl Lookup {
    pub fn parse(key: &str) -> Self {
        match Uuid::parse_str(key) {
            Ok(id) => Lookup::Id(id),
            Err(_) => Lookup::Slug(key.to_string()),
        }
    }

    /// True when the lookup designates a record with this id and slug
    pub fn matches(&self, id: Uuid, slug: &str) -> bool {
        match self {
            Lookup::Id(wanted) => *wanted == id,
            Lookup::Slug(wanted) => wanted == slug,
        }
    }
}

impl From<Uuid> for Lookup {
    fn from(id: Uuid) -> Self {
        Lookup::Id(id)
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Id(id) => write!(f, "{}", id),
            Lookup::Slug(slug) => f.write_str(slug),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<&Journal> for JournalRef {
    fn from(journal: &Journal) -> Self {
        Self {
            id: journal.id,
            name: journal.name.clone(),
            slug: journal.slug.clone(),
        }
    }
}

/// Issue summary embedded in article records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub date: Option<NaiveDate>,
    pub journal: Option<JournalRef>,
}

impl IssueRef {
    pub fn new(issue: &Issue, journal: Option<&Journal>) -> Self {
        Self {
            id: issue.id,
            name: issue.name.clone(),
            slug: issue.slug.clone(),
            date: issue.date,
            journal: journal.map(JournalRef::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleRecord {
    #[serde(flatten)]
    pub article: Article,
    pub issue: Option<IssueRef>,
    pub authors: Vec<Author>,
    pub tags: Vec<String>,
    pub images: Vec<ArticleImage>,
}

impl ArticleRecord {
    pub fn id(&self) -> Uuid {
        self.article.id
    }

    /// Publication date, taken from the owning issue
    pub fn date(&self) -> Option<NaiveDate> {
        self.issue.as_ref().and_then(|issue| issue.date)
    }

    pub fn year(&self) -> Option<i32> {
        self.date().map(|date| date.year())
    }

    pub fn has_file(&self) -> bool {
        !self.article.file.is_empty()
    }

    pub fn journal(&self) -> Option<&JournalRef> {
        self.issue.as_ref().and_then(|issue| issue.journal.as_ref())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookRecord {
    #[serde(flatten)]
    pub book: Book,
    pub authors: Vec<Author>,
    pub tags: Vec<String>,
}

impl BookRecord {
    pub fn id(&self) -> Uuid {
        self.book.id
    }

    pub fn year(&self) -> Option<i32> {
        self.book.date.map(|date| date.year())
    }

    pub fn has_file(&self) -> bool {
        !self.book.file.is_empty()
    }
}

// ============================================================================
// Canonical ordering
// ============================================================================

/// Newest first, undated rows last
fn by_date_desc(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn sort_journals(journals: &mut [Journal]) {
    journals.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
}

pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        by_date_desc(a.date, b.date)
            .then_with(|| a.name.cmp(&b.name))
            .then(a.id.cmp(&b.id))
    });
}

pub fn sort_articles(articles: &mut [ArticleRecord]) {
    articles.sort_by(|a, b| {
        by_date_desc(a.date(), b.date())
            .then_with(|| a.article.name.cmp(&b.article.name))
            .then(a.id().cmp(&b.id()))
    });
}

pub fn sort_books(books: &mut [BookRecord]) {
    books.sort_by(|a, b| {
        by_date_desc(a.book.date, b.book.date)
            .then_with(|| a.book.name.cmp(&b.book.name))
            .then(a.id().cmp(&b.id()))
    });
}

pub fn sort_authors(authors: &mut [Author]) {
    authors.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
}

pub fn sort_posts(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}

/// Authors of the given articles, each once, by display name
pub fn distinct_authors<'a, I>(articles: I) -> Vec<Author>
where
    I: IntoIterator<Item = &'a ArticleRecord>,
{
    let mut seen = std::collections::HashSet::new();
    let mut authors: Vec<Author> = articles
        .into_iter()
        .flat_map(|record| record.authors.iter())
        .filter(|author| seen.insert(author.id))
        .cloned()
        .collect();
    sort_authors(&mut authors);
    authors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(name: &str, date: Option<NaiveDate>) -> Issue {
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
        Issue {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: format!("{}-00000000", name),
            volume: None,
            date,
            issn: String::new(),
            file: String::new(),
            desc: String::new(),
            link: String::new(),
            front_cover: String::new(),
            back_cover: String::new(),
            custom_txt: String::new(),
            custom_num: None,
            custom_bool: false,
            redactor_id: None,
            journal_id: Uuid::new_v4(),
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_lookup_parse() {
        let id = Uuid::new_v4();
        assert_eq!(Lookup::parse(&id.to_string()), Lookup::Id(id));
        assert_eq!(
            Lookup::parse("vipa-12345678"),
            Lookup::Slug("vipa-12345678".into())
        );
    }

    #[test]
    fn test_issues_newest_first_undated_last() {
        let mut issues = vec![
            issue("b", None),
            issue("a", NaiveDate::from_ymd_opt(1998, 5, 1)),
            issue("c", NaiveDate::from_ymd_opt(2004, 1, 1)),
        ];
        sort_issues(&mut issues);
        let names: Vec<&str> = issues.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
