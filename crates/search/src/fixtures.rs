//! Record builders shared by the unit tests

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use fuglelitt_common::catalog::{ArticleRecord, BookRecord, IssueRef};
use fuglelitt_common::db::models::{Article, Author, Book, Issue, Journal};
use uuid::Uuid;

fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

fn slug_of(name: &str) -> String {
    format!("{}-{}", name.to_lowercase().replace(' ', "-"), Uuid::new_v4().simple())
}

pub fn author(first: &str, last: &str) -> Author {
    let name = format!("{} {}", first, last);
    Author {
        id: Uuid::new_v4(),
        slug: slug_of(&name),
        name,
        first_name: first.to_string(),
        last_name: last.to_string(),
        org_id: None,
        user_id: None,
    }
}

pub fn journal(name: &str) -> Journal {
    Journal {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: slug_of(name),
        desc: String::new(),
        link: String::new(),
        front_cover: String::new(),
        back_cover: None,
        custom_txt: String::new(),
        custom_num: None,
        custom_bool: false,
        publisher_id: None,
        county_id: None,
        city_id: None,
        created_at: now(),
        updated_at: now(),
    }
}

pub fn dated_issue(year: i32) -> Issue {
    let name = format!("Hefte {}", Uuid::new_v4().simple());
    Issue {
        id: Uuid::new_v4(),
        slug: slug_of(&name),
        name,
        volume: None,
        date: NaiveDate::from_ymd_opt(year, 6, 1),
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
        created_at: now(),
        updated_at: now(),
    }
}

pub struct ArticleBuilder {
    record: ArticleRecord,
}

pub fn article(name: &str) -> ArticleBuilder {
    ArticleBuilder {
        record: ArticleRecord {
            article: Article {
                id: Uuid::new_v4(),
                name: name.to_string(),
                slug: slug_of(name),
                sub: String::new(),
                abstract_text: String::new(),
                text: String::new(),
                file: String::new(),
                link: String::new(),
                custom_txt: String::new(),
                custom_num: None,
                custom_bool: false,
                issue_id: None,
                created_by: None,
                created_at: now(),
                updated_at: now(),
            },
            issue: None,
            authors: Vec::new(),
            tags: Vec::new(),
            images: Vec::new(),
        },
    }
}

impl ArticleBuilder {
    pub fn abstract_text(mut self, text: &str) -> Self {
        self.record.article.abstract_text = text.to_string();
        self
    }

    pub fn file(mut self, path: &str) -> Self {
        self.record.article.file = path.to_string();
        self
    }

    pub fn author(mut self, author: Author) -> Self {
        self.record.authors.push(author);
        self
    }

    pub fn tag(mut self, name: &str) -> Self {
        self.record.tags.push(name.to_string());
        self
    }

    pub fn issue(self, issue: Issue) -> Self {
        self.placed(issue, None)
    }

    pub fn issue_in(self, issue: Issue, journal: &Journal) -> Self {
        self.placed(issue, Some(journal))
    }

    fn placed(mut self, mut issue: Issue, journal: Option<&Journal>) -> Self {
        if let Some(journal) = journal {
            issue.journal_id = journal.id;
        }
        self.record.article.issue_id = Some(issue.id);
        self.record.issue = Some(IssueRef::new(&issue, journal));
        self
    }

    pub fn build(self) -> ArticleRecord {
        self.record
    }
}

pub struct BookBuilder {
    record: BookRecord,
}

pub fn book(name: &str) -> BookBuilder {
    BookBuilder {
        record: BookRecord {
            book: Book {
                id: Uuid::new_v4(),
                name: name.to_string(),
                slug: slug_of(name),
                desc: String::new(),
                link: String::new(),
                front_cover: None,
                back_cover: None,
                volume: None,
                date: None,
                issn: String::new(),
                file: String::new(),
                custom_txt: String::new(),
                custom_num: None,
                custom_bool: false,
                created_by: None,
                created_at: now(),
                updated_at: now(),
            },
            authors: Vec::new(),
            tags: Vec::new(),
        },
    }
}

impl BookBuilder {
    pub fn desc(mut self, text: &str) -> Self {
        self.record.book.desc = text.to_string();
        self
    }

    pub fn file(mut self, path: &str) -> Self {
        self.record.book.file = path.to_string();
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.record.book.date = NaiveDate::from_ymd_opt(year, 1, 1);
        self
    }

    pub fn author(mut self, author: Author) -> Self {
        self.record.authors.push(author);
        self
    }

    pub fn tag(mut self, name: &str) -> Self {
        self.record.tags.push(name.to_string());
        self
    }

    pub fn build(self) -> BookRecord {
        self.record
    }
}
