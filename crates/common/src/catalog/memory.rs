//! In-process catalog store
//!
//! Selected with `database.url = "memory://"`. Holds every table behind one
//! `RwLock` and reproduces the relational rules the Postgres schema enforces:
//! unique slugs, usernames and tag names, cascading deletes for owned rows and
//! set-null for optional references.

use super::records::{ArticleRecord, BookRecord, IssueRef, Lookup};
use super::store::{ArticleLinks, ArticleScope, BookLinks, CatalogStore};
use crate::db::models::*;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use std::collections::{BTreeSet, HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    counties: HashMap<Uuid, County>,
    cities: HashMap<Uuid, City>,
    organizations: HashMap<Uuid, Organization>,
    users: HashMap<Uuid, User>,
    /// Keyed by user id
    profiles: HashMap<Uuid, Profile>,
    authors: HashMap<Uuid, Author>,
    journals: HashMap<Uuid, Journal>,
    journal_editors: HashSet<(Uuid, Uuid)>,
    issues: HashMap<Uuid, Issue>,
    articles: HashMap<Uuid, Article>,
    article_images: HashMap<Uuid, ArticleImage>,
    books: HashMap<Uuid, Book>,
    posts: HashMap<Uuid, Post>,
    tags: HashMap<Uuid, Tag>,
    article_authors: HashSet<(Uuid, Uuid)>,
    book_authors: HashSet<(Uuid, Uuid)>,
    article_tags: HashSet<(Uuid, Uuid)>,
    book_tags: HashSet<(Uuid, Uuid)>,
}

fn duplicate(constraint: &str) -> AppError {
    AppError::Duplicate {
        message: format!("duplicate key value violates unique constraint \"{}\"", constraint),
    }
}

/// Reject `slug` when another row (not `id`) already holds it
fn check_slug<'a, I>(rows: I, id: Uuid, slug: &str, constraint: &str) -> Result<()>
where
    I: IntoIterator<Item = (&'a Uuid, &'a str)>,
{
    if rows
        .into_iter()
        .any(|(other, taken)| *other != id && taken == slug)
    {
        return Err(duplicate(constraint));
    }
    Ok(())
}

impl Tables {
    // ========================================================================
    // Tags
    // ========================================================================

    /// Resolve tag names to ids, creating tags on first use
    fn ensure_tags(&mut self, names: &[String]) -> Vec<Uuid> {
        let wanted: BTreeSet<&str> = names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .collect();

        wanted
            .into_iter()
            .map(|name| {
                if let Some(tag) = self.tags.values().find(|tag| tag.name == name) {
                    return tag.id;
                }
                let tag = Tag {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    slug: crate::slugs::tag_slug(name),
                };
                debug!(tag = %tag.name, "Created tag");
                let id = tag.id;
                self.tags.insert(id, tag);
                id
            })
            .collect()
    }

    fn tag_names<'a, I>(&self, ids: I) -> Vec<String>
    where
        I: Iterator<Item = &'a Uuid>,
    {
        let mut names: Vec<String> = ids
            .filter_map(|id| self.tags.get(id))
            .map(|tag| tag.name.clone())
            .collect();
        names.sort();
        names
    }

    fn authors_of<'a, I>(&self, ids: I) -> Vec<Author>
    where
        I: Iterator<Item = &'a Uuid>,
    {
        let mut authors: Vec<Author> = ids
            .filter_map(|id| self.authors.get(id))
            .cloned()
            .collect();
        super::records::sort_authors(&mut authors);
        authors
    }

    // ========================================================================
    // Hydration
    // ========================================================================

    fn article_record(&self, article: &Article) -> ArticleRecord {
        let author_ids = self
            .article_authors
            .iter()
            .filter(|(article_id, _)| *article_id == article.id)
            .map(|(_, author_id)| author_id);
        let tag_ids = self
            .article_tags
            .iter()
            .filter(|(article_id, _)| *article_id == article.id)
            .map(|(_, tag_id)| tag_id);

        let mut images: Vec<ArticleImage> = self
            .article_images
            .values()
            .filter(|image| image.article_id == article.id)
            .cloned()
            .collect();
        images.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let issue = article
            .issue_id
            .and_then(|id| self.issues.get(&id))
            .map(|issue| IssueRef::new(issue, self.journals.get(&issue.journal_id)));

        ArticleRecord {
            article: article.clone(),
            issue,
            authors: self.authors_of(author_ids),
            tags: self.tag_names(tag_ids),
            images,
        }
    }

    fn book_record(&self, book: &Book) -> BookRecord {
        let author_ids = self
            .book_authors
            .iter()
            .filter(|(book_id, _)| *book_id == book.id)
            .map(|(_, author_id)| author_id);
        let tag_ids = self
            .book_tags
            .iter()
            .filter(|(book_id, _)| *book_id == book.id)
            .map(|(_, tag_id)| tag_id);

        BookRecord {
            book: book.clone(),
            authors: self.authors_of(author_ids),
            tags: self.tag_names(tag_ids),
        }
    }

    fn scoped_articles(&self, scope: ArticleScope) -> Vec<&Article> {
        let mut articles: Vec<&Article> = self
            .articles
            .values()
            .filter(|article| match scope {
                ArticleScope::All | ArticleScope::Latest(_) => true,
                ArticleScope::Issue(id) => article.issue_id == Some(id),
                ArticleScope::Journal(id) => article
                    .issue_id
                    .and_then(|issue| self.issues.get(&issue))
                    .is_some_and(|issue| issue.journal_id == id),
                ArticleScope::Author(id) => self.article_authors.contains(&(article.id, id)),
            })
            .collect();
        if let ArticleScope::Latest(limit) = scope {
            articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            articles.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        articles
    }

    // ========================================================================
    // Link tables
    // ========================================================================

    fn write_article_links(&mut self, article_id: Uuid, links: ArticleLinks) {
        let tag_ids = self.ensure_tags(&links.tags);

        self.article_authors.retain(|(id, _)| *id != article_id);
        self.article_authors
            .extend(links.authors.into_iter().map(|author| (article_id, author)));

        self.article_tags.retain(|(id, _)| *id != article_id);
        self.article_tags
            .extend(tag_ids.into_iter().map(|tag| (article_id, tag)));

        if let Some(images) = links.images {
            self.article_images
                .retain(|_, image| image.article_id != article_id);
            for mut image in images {
                image.article_id = article_id;
                self.article_images.insert(image.id, image);
            }
        }
    }

    fn write_book_links(&mut self, book_id: Uuid, links: BookLinks) {
        let tag_ids = self.ensure_tags(&links.tags);

        self.book_authors.retain(|(id, _)| *id != book_id);
        self.book_authors
            .extend(links.authors.into_iter().map(|author| (book_id, author)));

        self.book_tags.retain(|(id, _)| *id != book_id);
        self.book_tags
            .extend(tag_ids.into_iter().map(|tag| (book_id, tag)));
    }

    // ========================================================================
    // Cascades
    // ========================================================================

    fn remove_article(&mut self, id: Uuid) -> bool {
        let removed = self.articles.remove(&id).is_some();
        self.article_images.retain(|_, image| image.article_id != id);
        self.article_authors.retain(|(article, _)| *article != id);
        self.article_tags.retain(|(article, _)| *article != id);
        removed
    }

    fn remove_issue(&mut self, id: Uuid) -> bool {
        let removed = self.issues.remove(&id).is_some();
        let owned: Vec<Uuid> = self
            .articles
            .values()
            .filter(|article| article.issue_id == Some(id))
            .map(|article| article.id)
            .collect();
        for article in owned {
            self.remove_article(article);
        }
        removed
    }

    fn remove_journal(&mut self, id: Uuid) -> bool {
        let removed = self.journals.remove(&id).is_some();
        self.journal_editors.retain(|(journal, _)| *journal != id);
        let owned: Vec<Uuid> = self
            .issues
            .values()
            .filter(|issue| issue.journal_id == id)
            .map(|issue| issue.id)
            .collect();
        for issue in owned {
            self.remove_issue(issue);
        }
        removed
    }
}

/// Catalog store kept entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest `limit` rows by `created_at`
fn latest<T, F>(rows: &HashMap<Uuid, T>, limit: u64, created_at: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> DateTimeWithTimeZone,
{
    let mut rows: Vec<T> = rows.values().cloned().collect();
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    rows
}

fn update_row<T>(table: &mut HashMap<Uuid, T>, id: Uuid, row: T, resource: &str) -> Result<T>
where
    T: Clone,
{
    match table.get_mut(&id) {
        Some(existing) => {
            *existing = row.clone();
            Ok(row)
        }
        None => Err(AppError::not_found(resource, id)),
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    // ========================================================================
    // Places
    // ========================================================================

    async fn insert_county(&self, county: County) -> Result<County> {
        let mut tables = self.tables.write().await;
        tables.counties.insert(county.id, county.clone());
        Ok(county)
    }

    async fn find_county(&self, id: Uuid) -> Result<Option<County>> {
        Ok(self.tables.read().await.counties.get(&id).cloned())
    }

    async fn list_counties(&self) -> Result<Vec<County>> {
        Ok(self.tables.read().await.counties.values().cloned().collect())
    }

    async fn delete_county(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        for organization in tables.organizations.values_mut() {
            if organization.county_id == Some(id) {
                organization.county_id = None;
            }
        }
        for journal in tables.journals.values_mut() {
            if journal.county_id == Some(id) {
                journal.county_id = None;
            }
        }
        Ok(tables.counties.remove(&id).is_some())
    }

    async fn insert_city(&self, city: City) -> Result<City> {
        let mut tables = self.tables.write().await;
        tables.cities.insert(city.id, city.clone());
        Ok(city)
    }

    async fn find_city(&self, id: Uuid) -> Result<Option<City>> {
        Ok(self.tables.read().await.cities.get(&id).cloned())
    }

    async fn list_cities(&self) -> Result<Vec<City>> {
        Ok(self.tables.read().await.cities.values().cloned().collect())
    }

    async fn delete_city(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        for organization in tables.organizations.values_mut() {
            if organization.city_id == Some(id) {
                organization.city_id = None;
            }
        }
        for journal in tables.journals.values_mut() {
            if journal.city_id == Some(id) {
                journal.city_id = None;
            }
        }
        Ok(tables.cities.remove(&id).is_some())
    }

    async fn insert_organization(&self, organization: Organization) -> Result<Organization> {
        let mut tables = self.tables.write().await;
        tables
            .organizations
            .insert(organization.id, organization.clone());
        Ok(organization)
    }

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>> {
        Ok(self.tables.read().await.organizations.get(&id).cloned())
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>> {
        Ok(self
            .tables
            .read()
            .await
            .organizations
            .values()
            .cloned()
            .collect())
    }

    async fn delete_organization(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        for author in tables.authors.values_mut() {
            if author.org_id == Some(id) {
                author.org_id = None;
            }
        }
        for journal in tables.journals.values_mut() {
            if journal.publisher_id == Some(id) {
                journal.publisher_id = None;
            }
        }
        Ok(tables.organizations.remove(&id).is_some())
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    async fn insert_user(&self, user: User) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(duplicate("users_username_key"));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert_profile(&self, profile: Profile) -> Result<Profile> {
        let mut tables = self.tables.write().await;
        if tables.profiles.contains_key(&profile.user_id) {
            return Err(duplicate("profiles_user_id_key"));
        }
        tables.profiles.insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn update_profile(&self, profile: Profile) -> Result<Profile> {
        let mut tables = self.tables.write().await;
        let user_id = profile.user_id;
        update_row(&mut tables.profiles, user_id, profile, "profile")
    }

    // ========================================================================
    // Authors
    // ========================================================================

    async fn insert_author(&self, author: Author) -> Result<Author> {
        let mut tables = self.tables.write().await;
        check_slug(
            tables.authors.iter().map(|(id, a)| (id, a.slug.as_str())),
            author.id,
            &author.slug,
            "authors_slug_key",
        )?;
        tables.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn update_author(&self, author: Author) -> Result<Author> {
        let mut tables = self.tables.write().await;
        let id = author.id;
        update_row(&mut tables.authors, id, author, "author")
    }

    async fn find_author(&self, lookup: &Lookup) -> Result<Option<Author>> {
        let tables = self.tables.read().await;
        Ok(tables
            .authors
            .values()
            .find(|author| lookup.matches(author.id, &author.slug))
            .cloned())
    }

    async fn list_authors(&self) -> Result<Vec<Author>> {
        Ok(self.tables.read().await.authors.values().cloned().collect())
    }

    async fn delete_author(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        for issue in tables.issues.values_mut() {
            if issue.redactor_id == Some(id) {
                issue.redactor_id = None;
            }
        }
        tables.article_authors.retain(|(_, author)| *author != id);
        tables.book_authors.retain(|(_, author)| *author != id);
        Ok(tables.authors.remove(&id).is_some())
    }

    // ========================================================================
    // Journals
    // ========================================================================

    async fn insert_journal(&self, journal: Journal, editors: &[Uuid]) -> Result<Journal> {
        let mut tables = self.tables.write().await;
        check_slug(
            tables.journals.iter().map(|(id, j)| (id, j.slug.as_str())),
            journal.id,
            &journal.slug,
            "journals_slug_key",
        )?;
        tables
            .journal_editors
            .extend(editors.iter().map(|user| (journal.id, *user)));
        tables.journals.insert(journal.id, journal.clone());
        Ok(journal)
    }

    async fn update_journal(&self, journal: Journal, editors: &[Uuid]) -> Result<Journal> {
        let mut tables = self.tables.write().await;
        let id = journal.id;
        let journal = update_row(&mut tables.journals, id, journal, "journal")?;
        tables.journal_editors.retain(|(journal, _)| *journal != id);
        tables
            .journal_editors
            .extend(editors.iter().map(|user| (id, *user)));
        Ok(journal)
    }

    async fn find_journal(&self, lookup: &Lookup) -> Result<Option<Journal>> {
        let tables = self.tables.read().await;
        Ok(tables
            .journals
            .values()
            .find(|journal| lookup.matches(journal.id, &journal.slug))
            .cloned())
    }

    async fn list_journals(&self) -> Result<Vec<Journal>> {
        Ok(self.tables.read().await.journals.values().cloned().collect())
    }

    async fn journal_editors(&self, journal_id: Uuid) -> Result<Vec<Uuid>> {
        let tables = self.tables.read().await;
        let mut editors: Vec<Uuid> = tables
            .journal_editors
            .iter()
            .filter(|(journal, _)| *journal == journal_id)
            .map(|(_, user)| *user)
            .collect();
        editors.sort();
        Ok(editors)
    }

    async fn delete_journal(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.write().await.remove_journal(id))
    }

    // ========================================================================
    // Issues
    // ========================================================================

    async fn insert_issue(&self, issue: Issue) -> Result<Issue> {
        let mut tables = self.tables.write().await;
        check_slug(
            tables.issues.iter().map(|(id, i)| (id, i.slug.as_str())),
            issue.id,
            &issue.slug,
            "issues_slug_key",
        )?;
        tables.issues.insert(issue.id, issue.clone());
        Ok(issue)
    }

    async fn update_issue(&self, issue: Issue) -> Result<Issue> {
        let mut tables = self.tables.write().await;
        let id = issue.id;
        update_row(&mut tables.issues, id, issue, "issue")
    }

    async fn find_issue(&self, lookup: &Lookup) -> Result<Option<Issue>> {
        let tables = self.tables.read().await;
        Ok(tables
            .issues
            .values()
            .find(|issue| lookup.matches(issue.id, &issue.slug))
            .cloned())
    }

    async fn list_issues(&self) -> Result<Vec<Issue>> {
        Ok(self.tables.read().await.issues.values().cloned().collect())
    }

    async fn journal_issues(&self, journal_id: Uuid) -> Result<Vec<Issue>> {
        let tables = self.tables.read().await;
        Ok(tables
            .issues
            .values()
            .filter(|issue| issue.journal_id == journal_id)
            .cloned()
            .collect())
    }

    async fn latest_issues(&self, limit: u64) -> Result<Vec<Issue>> {
        let tables = self.tables.read().await;
        Ok(latest(&tables.issues, limit, |issue| issue.created_at))
    }

    async fn delete_issue(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.write().await.remove_issue(id))
    }

    // ========================================================================
    // Articles
    // ========================================================================

    async fn insert_article(&self, article: Article, links: ArticleLinks) -> Result<ArticleRecord> {
        let mut tables = self.tables.write().await;
        check_slug(
            tables.articles.iter().map(|(id, a)| (id, a.slug.as_str())),
            article.id,
            &article.slug,
            "articles_slug_key",
        )?;
        tables.articles.insert(article.id, article.clone());
        tables.write_article_links(article.id, links);
        Ok(tables.article_record(&article))
    }

    async fn update_article(&self, article: Article, links: ArticleLinks) -> Result<ArticleRecord> {
        let mut tables = self.tables.write().await;
        let id = article.id;
        let article = update_row(&mut tables.articles, id, article, "article")?;
        tables.write_article_links(id, links);
        Ok(tables.article_record(&article))
    }

    async fn find_article(&self, lookup: &Lookup) -> Result<Option<ArticleRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .articles
            .values()
            .find(|article| lookup.matches(article.id, &article.slug))
            .map(|article| tables.article_record(article)))
    }

    async fn article_records(&self, scope: ArticleScope) -> Result<Vec<ArticleRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .scoped_articles(scope)
            .into_iter()
            .map(|article| tables.article_record(article))
            .collect())
    }

    async fn delete_article(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.write().await.remove_article(id))
    }

    // ========================================================================
    // Books
    // ========================================================================

    async fn insert_book(&self, book: Book, links: BookLinks) -> Result<BookRecord> {
        let mut tables = self.tables.write().await;
        check_slug(
            tables.books.iter().map(|(id, b)| (id, b.slug.as_str())),
            book.id,
            &book.slug,
            "books_slug_key",
        )?;
        tables.books.insert(book.id, book.clone());
        tables.write_book_links(book.id, links);
        Ok(tables.book_record(&book))
    }

    async fn update_book(&self, book: Book, links: BookLinks) -> Result<BookRecord> {
        let mut tables = self.tables.write().await;
        let id = book.id;
        let book = update_row(&mut tables.books, id, book, "book")?;
        tables.write_book_links(id, links);
        Ok(tables.book_record(&book))
    }

    async fn find_book(&self, lookup: &Lookup) -> Result<Option<BookRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .find(|book| lookup.matches(book.id, &book.slug))
            .map(|book| tables.book_record(book)))
    }

    async fn book_records(&self) -> Result<Vec<BookRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .map(|book| tables.book_record(book))
            .collect())
    }

    async fn delete_book(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        tables.book_authors.retain(|(book, _)| *book != id);
        tables.book_tags.retain(|(book, _)| *book != id);
        Ok(tables.books.remove(&id).is_some())
    }

    // ========================================================================
    // Posts
    // ========================================================================

    async fn insert_post(&self, post: Post) -> Result<Post> {
        let mut tables = self.tables.write().await;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update_post(&self, post: Post) -> Result<Post> {
        let mut tables = self.tables.write().await;
        let id = post.id;
        update_row(&mut tables.posts, id, post, "post")
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.tables.read().await.posts.values().cloned().collect())
    }

    async fn latest_posts(&self, limit: u64) -> Result<Vec<Post>> {
        let tables = self.tables.read().await;
        Ok(latest(&tables.posts, limit, |post| post.created_at))
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.write().await.posts.remove(&id).is_some())
    }
}
