use super::{SearchManager, Searchable};
use chrono::Datelike;
use fuglelitt_common::db::models::Issue;
use uuid::Uuid;

impl Searchable for Issue {
    fn key(&self) -> Uuid {
        self.id
    }

    fn text_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.desc.as_str()]
    }

    fn year(&self) -> Option<i32> {
        self.date.map(|date| date.year())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IssueManager;

impl SearchManager for IssueManager {
    type Record = Issue;

    fn name(&self) -> &'static str {
        "issue"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::dated_issue;

    #[test]
    fn test_issue_year_and_name() {
        let mut spring = dated_issue(2004);
        spring.name = "Vår 2004".to_string();
        let autumn = dated_issue(2004);
        let older = dated_issue(1987);

        let hits = IssueManager.search(vec![spring, autumn, older], Some("2004"));
        assert_eq!(hits.len(), 2);

        let hits = IssueManager.search(hits, Some("vår"));
        assert_eq!(hits.len(), 1);
    }
}
