//! Article keyword search

use super::{SearchManager, Searchable};
use fuglelitt_common::catalog::ArticleRecord;
use uuid::Uuid;

impl Searchable for ArticleRecord {
    fn key(&self) -> Uuid {
        self.id()
    }

    fn text_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.article.name.as_str(),
            self.article.abstract_text.as_str(),
        ];
        for author in &self.authors {
            fields.push(&author.first_name);
            fields.push(&author.last_name);
            fields.push(&author.name);
        }
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    /// Articles are dated by their issue
    fn year(&self) -> Option<i32> {
        ArticleRecord::year(self)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleManager;

impl SearchManager for ArticleManager {
    type Record = ArticleRecord;

    fn name(&self) -> &'static str {
        "article"
    }
}
