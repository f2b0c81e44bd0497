use super::{SearchManager, Searchable};
use fuglelitt_common::catalog::BookRecord;
use uuid::Uuid;

impl Searchable for BookRecord {
    fn key(&self) -> Uuid {
        self.id()
    }

    fn text_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.book.name.as_str(), self.book.desc.as_str()];
        for author in &self.authors {
            fields.push(&author.first_name);
            fields.push(&author.last_name);
            fields.push(&author.name);
        }
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn year(&self) -> Option<i32> {
        BookRecord::year(self)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BookManager;

impl SearchManager for BookManager {
    type Record = BookRecord;

    fn name(&self) -> &'static str {
        "book"
    }
}
