//! Storage seam for the catalog
//!
//! Implementations persist rows and enforce the relational rules
//! (unique slugs, cascade and set-null on delete). They do not validate,
//! assign slugs or order results; [`super::Catalog`] does that.

use super::records::{ArticleRecord, BookRecord, Lookup};
use crate::db::models::*;
use crate::errors::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Many-to-many links and owned rows written together with an article
#[derive(Debug, Clone, Default)]
pub struct ArticleLinks {
    pub authors: Vec<Uuid>,
    /// Tag names; unknown names become new tags
    pub tags: Vec<String>,
    /// `None` keeps the stored images on update
    pub images: Option<Vec<ArticleImage>>,
}

#[derive(Debug, Clone, Default)]
pub struct BookLinks {
    pub authors: Vec<Uuid>,
    pub tags: Vec<String>,
}

/// Which articles a hydrated read covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleScope {
    All,
    Issue(Uuid),
    /// Articles filed under any issue of the journal
    Journal(Uuid),
    Author(Uuid),
    /// The `n` most recently created
    Latest(u64),
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Connectivity check behind `/ready`
    async fn ping(&self) -> Result<()>;

    // Places
    async fn insert_county(&self, county: County) -> Result<County>;
    async fn find_county(&self, id: Uuid) -> Result<Option<County>>;
    async fn list_counties(&self) -> Result<Vec<County>>;
    async fn delete_county(&self, id: Uuid) -> Result<bool>;

    async fn insert_city(&self, city: City) -> Result<City>;
    async fn find_city(&self, id: Uuid) -> Result<Option<City>>;
    async fn list_cities(&self) -> Result<Vec<City>>;
    async fn delete_city(&self, id: Uuid) -> Result<bool>;

    async fn insert_organization(&self, organization: Organization) -> Result<Organization>;
    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>>;
    async fn list_organizations(&self) -> Result<Vec<Organization>>;
    async fn delete_organization(&self, id: Uuid) -> Result<bool>;

    // Accounts
    async fn insert_user(&self, user: User) -> Result<User>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn insert_profile(&self, profile: Profile) -> Result<Profile>;
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>>;
    async fn update_profile(&self, profile: Profile) -> Result<Profile>;

    // Authors
    async fn insert_author(&self, author: Author) -> Result<Author>;
    async fn update_author(&self, author: Author) -> Result<Author>;
    async fn find_author(&self, lookup: &Lookup) -> Result<Option<Author>>;
    async fn list_authors(&self) -> Result<Vec<Author>>;
    async fn delete_author(&self, id: Uuid) -> Result<bool>;

    // Journals
    async fn insert_journal(&self, journal: Journal, editors: &[Uuid]) -> Result<Journal>;
    async fn update_journal(&self, journal: Journal, editors: &[Uuid]) -> Result<Journal>;
    async fn find_journal(&self, lookup: &Lookup) -> Result<Option<Journal>>;
    async fn list_journals(&self) -> Result<Vec<Journal>>;
    async fn journal_editors(&self, journal_id: Uuid) -> Result<Vec<Uuid>>;
    async fn delete_journal(&self, id: Uuid) -> Result<bool>;

    // Issues
    async fn insert_issue(&self, issue: Issue) -> Result<Issue>;
    async fn update_issue(&self, issue: Issue) -> Result<Issue>;
    async fn find_issue(&self, lookup: &Lookup) -> Result<Option<Issue>>;
    async fn list_issues(&self) -> Result<Vec<Issue>>;
    async fn journal_issues(&self, journal_id: Uuid) -> Result<Vec<Issue>>;
    /// Newest first by creation time
    async fn latest_issues(&self, limit: u64) -> Result<Vec<Issue>>;
    async fn delete_issue(&self, id: Uuid) -> Result<bool>;

    // Articles
    //
    // Writes return the record as committed, read back on the write side.
    async fn insert_article(&self, article: Article, links: ArticleLinks) -> Result<ArticleRecord>;
    async fn update_article(&self, article: Article, links: ArticleLinks) -> Result<ArticleRecord>;
    async fn find_article(&self, lookup: &Lookup) -> Result<Option<ArticleRecord>>;
    /// Articles in scope with their authors, tags, images and issue summary
    async fn article_records(&self, scope: ArticleScope) -> Result<Vec<ArticleRecord>>;
    async fn delete_article(&self, id: Uuid) -> Result<bool>;

    // Books
    async fn insert_book(&self, book: Book, links: BookLinks) -> Result<BookRecord>;
    async fn update_book(&self, book: Book, links: BookLinks) -> Result<BookRecord>;
    async fn find_book(&self, lookup: &Lookup) -> Result<Option<BookRecord>>;
    async fn book_records(&self) -> Result<Vec<BookRecord>>;
    async fn delete_book(&self, id: Uuid) -> Result<bool>;

    // Posts
    async fn insert_post(&self, post: Post) -> Result<Post>;
    async fn update_post(&self, post: Post) -> Result<Post>;
    async fn find_post(&self, id: Uuid) -> Result<Option<Post>>;
    async fn list_posts(&self) -> Result<Vec<Post>>;
    /// Newest first by creation time
    async fn latest_posts(&self, limit: u64) -> Result<Vec<Post>>;
    async fn delete_post(&self, id: Uuid) -> Result<bool>;
}
