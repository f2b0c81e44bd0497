//! Read-side shapes for the browse pages

use super::records::{ArticleRecord, JournalRef};
use crate::db::models::{Author, Issue, Journal, Post, Profile};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub articles: Vec<ArticleRecord>,
    pub posts: Vec<Post>,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JournalDetail {
    #[serde(flatten)]
    pub journal: Journal,
    pub editors: Vec<Uuid>,
    pub issues: Vec<Issue>,
    pub articles: Vec<ArticleRecord>,
    pub authors: Vec<Author>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueDetail {
    #[serde(flatten)]
    pub issue: Issue,
    pub journal: Option<JournalRef>,
    pub redactor: Option<Author>,
    pub articles: Vec<ArticleRecord>,
    pub authors: Vec<Author>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorDetail {
    #[serde(flatten)]
    pub author: Author,
    pub articles: Vec<ArticleRecord>,
}

/// Result of a profile edit
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub profile: Profile,
    /// First or last name differs from the stored value
    pub names_changed: bool,
}

/// Filter for the article list page
///
/// `name` is a case-sensitive substring match. Repeated `authors` and `tags`
/// values match records carrying any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub name: Option<String>,
    pub authors: Vec<Uuid>,
    pub tags: Vec<String>,
    pub journal: Option<Uuid>,
    pub issue: Option<Uuid>,
    /// A supplied id could not be parsed; nothing can match
    pub unmatchable: bool,
}

impl ArticleFilter {
    /// Build from raw query pairs, ignoring unrelated keys and blank values
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = ArticleFilter::default();
        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key {
                "name" => filter.name = Some(value.to_string()),
                "tags" => filter.tags.push(value.to_string()),
                "authors" => match Uuid::parse_str(value) {
                    Ok(id) => filter.authors.push(id),
                    Err(_) => filter.unmatchable = true,
                },
                "journal" => match Uuid::parse_str(value) {
                    Ok(id) => filter.journal = Some(id),
                    Err(_) => filter.unmatchable = true,
                },
                "issue" => match Uuid::parse_str(value) {
                    Ok(id) => filter.issue = Some(id),
                    Err(_) => filter.unmatchable = true,
                },
                _ => {}
            }
        }
        filter
    }

    pub fn matches(&self, record: &ArticleRecord) -> bool {
        if self.unmatchable {
            return false;
        }
        if let Some(name) = &self.name {
            if !record.article.name.contains(name.as_str()) {
                return false;
            }
        }
        if !self.authors.is_empty()
            && !record
                .authors
                .iter()
                .any(|author| self.authors.contains(&author.id))
        {
            return false;
        }
        if !self.tags.is_empty() && !record.tags.iter().any(|tag| self.tags.contains(tag)) {
            return false;
        }
        if let Some(journal) = self.journal {
            if record.journal().map(|j| j.id) != Some(journal) {
                return false;
            }
        }
        if let Some(issue) = self.issue {
            if record.article.issue_id != Some(issue) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_pairs() {
        let author = Uuid::new_v4();
        let author_param = author.to_string();
        let filter = ArticleFilter::from_pairs(vec![
            ("name", "Vipe"),
            ("tags", "vadefugl"),
            ("tags", "jæren"),
            ("authors", author_param.as_str()),
            ("page", "2"),
            ("issue", ""),
        ]);

        assert_eq!(filter.name.as_deref(), Some("Vipe"));
        assert_eq!(filter.tags, vec!["vadefugl", "jæren"]);
        assert_eq!(filter.authors, vec![author]);
        assert!(filter.issue.is_none());
        assert!(!filter.unmatchable);
    }

    #[test]
    fn test_bad_id_matches_nothing() {
        let filter = ArticleFilter::from_pairs(vec![("journal", "not-a-uuid")]);
        assert!(filter.unmatchable);
    }
}
