//! Postgres-backed catalog store
//!
//! Rows are written through SeaORM active models on the primary connection
//! and read from the replica when one is configured. Records returned by a
//! write are hydrated inside the writing transaction. Cascades and set-null
//! on delete are left to the foreign keys declared in the migrations.

use crate::catalog::{
    ArticleLinks, ArticleRecord, ArticleScope, BookLinks, BookRecord, CatalogStore, IssueRef, Lookup,
};
use crate::catalog::records::sort_authors;
use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use sea_orm::sea_query::{OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

/// Map a failed update to NotFound when no row carried the id
fn update_error(resource: &'static str, id: Uuid) -> impl FnOnce(DbErr) -> AppError {
    move |err| match err {
        DbErr::RecordNotUpdated => AppError::not_found(resource, id),
        other => other.into(),
    }
}

/// Filter a sluggable table by primary key or slug
fn lookup_condition<C: ColumnTrait>(lookup: &Lookup, id: C, slug: C) -> Condition {
    match lookup {
        Lookup::Id(value) => Condition::all().add(id.eq(*value)),
        Lookup::Slug(value) => Condition::all().add(slug.eq(value.as_str())),
    }
}

/// Resolve tag names to ids, inserting unknown names
///
/// A concurrent writer may create the same tag first; the insert then does
/// nothing and the existing row is read back.
async fn ensure_tags<C: ConnectionTrait>(conn: &C, names: &[String]) -> Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        if let Some(tag) = find_tag(conn, name).await? {
            ids.push(tag.id);
            continue;
        }
        TagEntity::insert(TagActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.clone()),
            slug: Set(crate::slugs::tag_slug(name)),
        })
        .on_conflict(OnConflict::column(TagColumn::Name).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await?;

        let tag = find_tag(conn, name).await?.ok_or_else(|| AppError::Internal {
            message: format!("tag {:?} missing after insert", name),
        })?;
        ids.push(tag.id);
    }
    Ok(ids)
}

async fn find_tag<C: ConnectionTrait>(conn: &C, name: &str) -> Result<Option<Tag>> {
    TagEntity::find()
        .filter(TagColumn::Name.eq(name))
        .one(conn)
        .await
        .map_err(Into::into)
}

/// The one record hydrated from a single row
fn single<T>(mut records: Vec<T>, resource: &str, id: Uuid) -> Result<T> {
    records.pop().ok_or_else(|| AppError::not_found(resource, id))
}

async fn write_article_links<C: ConnectionTrait>(conn: &C, article_id: Uuid, links: ArticleLinks) -> Result<()> {
    ArticleAuthorEntity::delete_many()
        .filter(ArticleAuthorColumn::ArticleId.eq(article_id))
        .exec(conn)
        .await?;
    if !links.authors.is_empty() {
        ArticleAuthorEntity::insert_many(links.authors.iter().map(|author| ArticleAuthorActiveModel {
            article_id: Set(article_id),
            author_id: Set(*author),
        }))
        .exec_without_returning(conn)
        .await?;
    }

    let tag_ids = ensure_tags(conn, &links.tags).await?;
    ArticleTagEntity::delete_many()
        .filter(ArticleTagColumn::ArticleId.eq(article_id))
        .exec(conn)
        .await?;
    if !tag_ids.is_empty() {
        ArticleTagEntity::insert_many(tag_ids.iter().map(|tag| ArticleTagActiveModel {
            article_id: Set(article_id),
            tag_id: Set(*tag),
        }))
        .exec_without_returning(conn)
        .await?;
    }

    if let Some(images) = links.images {
        ArticleImageEntity::delete_many()
            .filter(ArticleImageColumn::ArticleId.eq(article_id))
            .exec(conn)
            .await?;
        for image in images {
            ArticleImageActiveModel::from(ArticleImage { article_id, ..image })
                .reset_all()
                .insert(conn)
                .await?;
        }
    }

    Ok(())
}

async fn write_book_links<C: ConnectionTrait>(conn: &C, book_id: Uuid, links: BookLinks) -> Result<()> {
    BookAuthorEntity::delete_many()
        .filter(BookAuthorColumn::BookId.eq(book_id))
        .exec(conn)
        .await?;
    if !links.authors.is_empty() {
        BookAuthorEntity::insert_many(links.authors.iter().map(|author| BookAuthorActiveModel {
            book_id: Set(book_id),
            author_id: Set(*author),
        }))
        .exec_without_returning(conn)
        .await?;
    }

    let tag_ids = ensure_tags(conn, &links.tags).await?;
    BookTagEntity::delete_many()
        .filter(BookTagColumn::BookId.eq(book_id))
        .exec(conn)
        .await?;
    if !tag_ids.is_empty() {
        BookTagEntity::insert_many(tag_ids.iter().map(|tag| BookTagActiveModel {
            book_id: Set(book_id),
            tag_id: Set(*tag),
        }))
        .exec_without_returning(conn)
        .await?;
    }

    Ok(())
}

async fn write_editors<C: ConnectionTrait>(conn: &C, journal_id: Uuid, editors: &[Uuid]) -> Result<()> {
    JournalEditorEntity::delete_many()
        .filter(JournalEditorColumn::JournalId.eq(journal_id))
        .exec(conn)
        .await?;
    if !editors.is_empty() {
        JournalEditorEntity::insert_many(editors.iter().map(|user| JournalEditorActiveModel {
            journal_id: Set(journal_id),
            user_id: Set(*user),
        }))
        .exec_without_returning(conn)
        .await?;
    }
    Ok(())
}

async fn authors_by_id<C: ConnectionTrait>(conn: &C, ids: Vec<Uuid>) -> Result<HashMap<Uuid, Author>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(AuthorEntity::find()
        .filter(AuthorColumn::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|author| (author.id, author))
        .collect())
}

async fn tag_names_by_id<C: ConnectionTrait>(conn: &C, ids: Vec<Uuid>) -> Result<HashMap<Uuid, String>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(TagEntity::find()
        .filter(TagColumn::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|tag| (tag.id, tag.name))
        .collect())
}

// ============================================================================
// Hydration
// ============================================================================

async fn hydrate_articles<C: ConnectionTrait>(conn: &C, articles: Vec<Article>) -> Result<Vec<ArticleRecord>> {
    if articles.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = articles.iter().map(|article| article.id).collect();

    let author_links = ArticleAuthorEntity::find()
        .filter(ArticleAuthorColumn::ArticleId.is_in(ids.clone()))
        .all(conn)
        .await?;
    let tag_links = ArticleTagEntity::find()
        .filter(ArticleTagColumn::ArticleId.is_in(ids.clone()))
        .all(conn)
        .await?;
    let images = ArticleImageEntity::find()
        .filter(ArticleImageColumn::ArticleId.is_in(ids))
        .all(conn)
        .await?;

    let authors = authors_by_id(conn, author_links.iter().map(|link| link.author_id).collect()).await?;
    let tags = tag_names_by_id(conn, tag_links.iter().map(|link| link.tag_id).collect()).await?;

    let issue_ids: Vec<Uuid> = articles.iter().filter_map(|article| article.issue_id).collect();
    let issues: HashMap<Uuid, Issue> = if issue_ids.is_empty() {
        HashMap::new()
    } else {
        IssueEntity::find()
            .filter(IssueColumn::Id.is_in(issue_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|issue| (issue.id, issue))
            .collect()
    };
    let journal_ids: Vec<Uuid> = issues.values().map(|issue| issue.journal_id).collect();
    let journals: HashMap<Uuid, Journal> = if journal_ids.is_empty() {
        HashMap::new()
    } else {
        JournalEntity::find()
            .filter(JournalColumn::Id.is_in(journal_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|journal| (journal.id, journal))
            .collect()
    };

    let mut authors_of: HashMap<Uuid, Vec<Author>> = HashMap::new();
    for link in author_links {
        if let Some(author) = authors.get(&link.author_id) {
            authors_of.entry(link.article_id).or_default().push(author.clone());
        }
    }
    let mut tags_of: HashMap<Uuid, Vec<String>> = HashMap::new();
    for link in tag_links {
        if let Some(name) = tags.get(&link.tag_id) {
            tags_of.entry(link.article_id).or_default().push(name.clone());
        }
    }
    let mut images_of: HashMap<Uuid, Vec<ArticleImage>> = HashMap::new();
    for image in images {
        images_of.entry(image.article_id).or_default().push(image);
    }

    Ok(articles
        .into_iter()
        .map(|article| {
            let mut authors = authors_of.remove(&article.id).unwrap_or_default();
            sort_authors(&mut authors);
            let mut tags = tags_of.remove(&article.id).unwrap_or_default();
            tags.sort();
            let mut images = images_of.remove(&article.id).unwrap_or_default();
            images.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            let issue = article
                .issue_id
                .and_then(|id| issues.get(&id))
                .map(|issue| IssueRef::new(issue, journals.get(&issue.journal_id)));

            ArticleRecord {
                article,
                issue,
                authors,
                tags,
                images,
            }
        })
        .collect())
}

async fn hydrate_books<C: ConnectionTrait>(conn: &C, books: Vec<Book>) -> Result<Vec<BookRecord>> {
    if books.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = books.iter().map(|book| book.id).collect();

    let author_links = BookAuthorEntity::find()
        .filter(BookAuthorColumn::BookId.is_in(ids.clone()))
        .all(conn)
        .await?;
    let tag_links = BookTagEntity::find()
        .filter(BookTagColumn::BookId.is_in(ids))
        .all(conn)
        .await?;

    let authors = authors_by_id(conn, author_links.iter().map(|link| link.author_id).collect()).await?;
    let tags = tag_names_by_id(conn, tag_links.iter().map(|link| link.tag_id).collect()).await?;

    let mut authors_of: HashMap<Uuid, Vec<Author>> = HashMap::new();
    for link in author_links {
        if let Some(author) = authors.get(&link.author_id) {
            authors_of.entry(link.book_id).or_default().push(author.clone());
        }
    }
    let mut tags_of: HashMap<Uuid, Vec<String>> = HashMap::new();
    for link in tag_links {
        if let Some(name) = tags.get(&link.tag_id) {
            tags_of.entry(link.book_id).or_default().push(name.clone());
        }
    }

    Ok(books
        .into_iter()
        .map(|book| {
            let mut authors = authors_of.remove(&book.id).unwrap_or_default();
            sort_authors(&mut authors);
            let mut tags = tags_of.remove(&book.id).unwrap_or_default();
            tags.sort();
            BookRecord { book, authors, tags }
        })
        .collect())
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }
}

#[async_trait]
impl CatalogStore for Repository {
    // ========================================================================
    // Health Check
    // ========================================================================

    async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Places
    // ========================================================================

    async fn insert_county(&self, county: County) -> Result<County> {
        CountyActiveModel::from(county)
            .reset_all()
            .insert(self.write_conn())
            .await
            .map_err(Into::into)
    }

    async fn find_county(&self, id: Uuid) -> Result<Option<County>> {
        CountyEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn list_counties(&self) -> Result<Vec<County>> {
        CountyEntity::find().all(self.read_conn()).await.map_err(Into::into)
    }

    async fn delete_county(&self, id: Uuid) -> Result<bool> {
        let result = CountyEntity::delete_by_id(id).exec(self.write_conn()).await?;
        Ok(result.rows_affected > 0)
    }

    async fn insert_city(&self, city: City) -> Result<City> {
        CityActiveModel::from(city)
            .reset_all()
            .insert(self.write_conn())
            .await
            .map_err(Into::into)
    }

    async fn find_city(&self, id: Uuid) -> Result<Option<City>> {
        CityEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn list_cities(&self) -> Result<Vec<City>> {
        CityEntity::find().all(self.read_conn()).await.map_err(Into::into)
    }

    async fn delete_city(&self, id: Uuid) -> Result<bool> {
        let result = CityEntity::delete_by_id(id).exec(self.write_conn()).await?;
        Ok(result.rows_affected > 0)
    }

    async fn insert_organization(&self, organization: Organization) -> Result<Organization> {
        OrganizationActiveModel::from(organization)
            .reset_all()
            .insert(self.write_conn())
            .await
            .map_err(Into::into)
    }

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>> {
        OrganizationEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>> {
        OrganizationEntity::find()
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn delete_organization(&self, id: Uuid) -> Result<bool> {
        let result = OrganizationEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;
        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    async fn insert_user(&self, user: User) -> Result<User> {
        UserActiveModel::from(user)
            .reset_all()
            .insert(self.write_conn())
            .await
            .map_err(Into::into)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        UserEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn insert_profile(&self, profile: Profile) -> Result<Profile> {
        ProfileActiveModel::from(profile)
            .reset_all()
            .insert(self.write_conn())
            .await
            .map_err(Into::into)
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        ProfileEntity::find()
            .filter(ProfileColumn::UserId.eq(user_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn update_profile(&self, profile: Profile) -> Result<Profile> {
        let user_id = profile.user_id;
        ProfileActiveModel::from(profile)
            .reset_all()
            .update(self.write_conn())
            .await
            .map_err(update_error("profile", user_id))
    }

    // ========================================================================
    // Authors
    // ========================================================================

    async fn insert_author(&self, author: Author) -> Result<Author> {
        AuthorActiveModel::from(author)
            .reset_all()
            .insert(self.write_conn())
            .await
            .map_err(Into::into)
    }

    async fn update_author(&self, author: Author) -> Result<Author> {
        let id = author.id;
        AuthorActiveModel::from(author)
            .reset_all()
            .update(self.write_conn())
            .await
            .map_err(update_error("author", id))
    }

    async fn find_author(&self, lookup: &Lookup) -> Result<Option<Author>> {
        AuthorEntity::find()
            .filter(lookup_condition(lookup, AuthorColumn::Id, AuthorColumn::Slug))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn list_authors(&self) -> Result<Vec<Author>> {
        AuthorEntity::find().all(self.read_conn()).await.map_err(Into::into)
    }

    async fn delete_author(&self, id: Uuid) -> Result<bool> {
        let result = AuthorEntity::delete_by_id(id).exec(self.write_conn()).await?;
        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Journals
    // ========================================================================

    async fn insert_journal(&self, journal: Journal, editors: &[Uuid]) -> Result<Journal> {
        let txn = self.write_conn().begin().await?;
        let journal = JournalActiveModel::from(journal)
            .reset_all()
            .insert(&txn)
            .await?;
        write_editors(&txn, journal.id, editors).await?;
        txn.commit().await?;
        Ok(journal)
    }

    async fn update_journal(&self, journal: Journal, editors: &[Uuid]) -> Result<Journal> {
        let id = journal.id;
        let txn = self.write_conn().begin().await?;
        let journal = JournalActiveModel::from(journal)
            .reset_all()
            .update(&txn)
            .await
            .map_err(update_error("journal", id))?;
        write_editors(&txn, id, editors).await?;
        txn.commit().await?;
        Ok(journal)
    }

    async fn find_journal(&self, lookup: &Lookup) -> Result<Option<Journal>> {
        JournalEntity::find()
            .filter(lookup_condition(lookup, JournalColumn::Id, JournalColumn::Slug))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn list_journals(&self) -> Result<Vec<Journal>> {
        JournalEntity::find().all(self.read_conn()).await.map_err(Into::into)
    }

    async fn journal_editors(&self, journal_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = JournalEditorEntity::find()
            .filter(JournalEditorColumn::JournalId.eq(journal_id))
            .all(self.read_conn())
            .await?;
        let mut editors: Vec<Uuid> = rows.into_iter().map(|row| row.user_id).collect();
        editors.sort();
        Ok(editors)
    }

    async fn delete_journal(&self, id: Uuid) -> Result<bool> {
        let result = JournalEntity::delete_by_id(id).exec(self.write_conn()).await?;
        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Issues
    // ========================================================================

    async fn insert_issue(&self, issue: Issue) -> Result<Issue> {
        IssueActiveModel::from(issue)
            .reset_all()
            .insert(self.write_conn())
            .await
            .map_err(Into::into)
    }

    async fn update_issue(&self, issue: Issue) -> Result<Issue> {
        let id = issue.id;
        IssueActiveModel::from(issue)
            .reset_all()
            .update(self.write_conn())
            .await
            .map_err(update_error("issue", id))
    }

    async fn find_issue(&self, lookup: &Lookup) -> Result<Option<Issue>> {
        IssueEntity::find()
            .filter(lookup_condition(lookup, IssueColumn::Id, IssueColumn::Slug))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn list_issues(&self) -> Result<Vec<Issue>> {
        IssueEntity::find().all(self.read_conn()).await.map_err(Into::into)
    }

    async fn journal_issues(&self, journal_id: Uuid) -> Result<Vec<Issue>> {
        IssueEntity::find()
            .filter(IssueColumn::JournalId.eq(journal_id))
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn latest_issues(&self, limit: u64) -> Result<Vec<Issue>> {
        IssueEntity::find()
            .order_by_desc(IssueColumn::CreatedAt)
            .paginate(self.read_conn(), limit)
            .fetch_page(0)
            .await
            .map_err(Into::into)
    }

    async fn delete_issue(&self, id: Uuid) -> Result<bool> {
        let result = IssueEntity::delete_by_id(id).exec(self.write_conn()).await?;
        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Articles
    // ========================================================================

    async fn insert_article(&self, article: Article, links: ArticleLinks) -> Result<ArticleRecord> {
        let id = article.id;
        let txn = self.write_conn().begin().await?;
        let article = ArticleActiveModel::from(article)
            .reset_all()
            .insert(&txn)
            .await?;
        write_article_links(&txn, id, links).await?;
        let record = single(hydrate_articles(&txn, vec![article]).await?, "article", id)?;
        txn.commit().await?;
        Ok(record)
    }

    async fn update_article(&self, article: Article, links: ArticleLinks) -> Result<ArticleRecord> {
        let id = article.id;
        let txn = self.write_conn().begin().await?;
        let article = ArticleActiveModel::from(article)
            .reset_all()
            .update(&txn)
            .await
            .map_err(update_error("article", id))?;
        write_article_links(&txn, id, links).await?;
        let record = single(hydrate_articles(&txn, vec![article]).await?, "article", id)?;
        txn.commit().await?;
        Ok(record)
    }

    async fn find_article(&self, lookup: &Lookup) -> Result<Option<ArticleRecord>> {
        let conn = self.read_conn();
        let found = ArticleEntity::find()
            .filter(lookup_condition(lookup, ArticleColumn::Id, ArticleColumn::Slug))
            .one(conn)
            .await?;
        match found {
            Some(article) => Ok(hydrate_articles(conn, vec![article]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn article_records(&self, scope: ArticleScope) -> Result<Vec<ArticleRecord>> {
        let conn = self.read_conn();
        let articles = match scope {
            ArticleScope::All => ArticleEntity::find().all(conn).await?,
            ArticleScope::Issue(issue_id) => {
                ArticleEntity::find()
                    .filter(ArticleColumn::IssueId.eq(issue_id))
                    .all(conn)
                    .await?
            }
            ArticleScope::Journal(journal_id) => {
                ArticleEntity::find()
                    .filter(
                        ArticleColumn::IssueId.in_subquery(
                            Query::select()
                                .column(IssueColumn::Id)
                                .from(IssueEntity)
                                .and_where(IssueColumn::JournalId.eq(journal_id))
                                .to_owned(),
                        ),
                    )
                    .all(conn)
                    .await?
            }
            ArticleScope::Author(author_id) => {
                ArticleEntity::find()
                    .filter(
                        ArticleColumn::Id.in_subquery(
                            Query::select()
                                .column(ArticleAuthorColumn::ArticleId)
                                .from(ArticleAuthorEntity)
                                .and_where(ArticleAuthorColumn::AuthorId.eq(author_id))
                                .to_owned(),
                        ),
                    )
                    .all(conn)
                    .await?
            }
            ArticleScope::Latest(limit) => {
                ArticleEntity::find()
                    .order_by_desc(ArticleColumn::CreatedAt)
                    .paginate(conn, limit)
                    .fetch_page(0)
                    .await?
            }
        };
        hydrate_articles(conn, articles).await
    }

    async fn delete_article(&self, id: Uuid) -> Result<bool> {
        let result = ArticleEntity::delete_by_id(id).exec(self.write_conn()).await?;
        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Books
    // ========================================================================

    async fn insert_book(&self, book: Book, links: BookLinks) -> Result<BookRecord> {
        let id = book.id;
        let txn = self.write_conn().begin().await?;
        let book = BookActiveModel::from(book).reset_all().insert(&txn).await?;
        write_book_links(&txn, id, links).await?;
        let record = single(hydrate_books(&txn, vec![book]).await?, "book", id)?;
        txn.commit().await?;
        Ok(record)
    }

    async fn update_book(&self, book: Book, links: BookLinks) -> Result<BookRecord> {
        let id = book.id;
        let txn = self.write_conn().begin().await?;
        let book = BookActiveModel::from(book)
            .reset_all()
            .update(&txn)
            .await
            .map_err(update_error("book", id))?;
        write_book_links(&txn, id, links).await?;
        let record = single(hydrate_books(&txn, vec![book]).await?, "book", id)?;
        txn.commit().await?;
        Ok(record)
    }

    async fn find_book(&self, lookup: &Lookup) -> Result<Option<BookRecord>> {
        let conn = self.read_conn();
        let found = BookEntity::find()
            .filter(lookup_condition(lookup, BookColumn::Id, BookColumn::Slug))
            .one(conn)
            .await?;
        match found {
            Some(book) => Ok(hydrate_books(conn, vec![book]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn book_records(&self) -> Result<Vec<BookRecord>> {
        let conn = self.read_conn();
        let books = BookEntity::find().all(conn).await?;
        hydrate_books(conn, books).await
    }

    async fn delete_book(&self, id: Uuid) -> Result<bool> {
        let result = BookEntity::delete_by_id(id).exec(self.write_conn()).await?;
        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Posts
    // ========================================================================

    async fn insert_post(&self, post: Post) -> Result<Post> {
        PostActiveModel::from(post)
            .reset_all()
            .insert(self.write_conn())
            .await
            .map_err(Into::into)
    }

    async fn update_post(&self, post: Post) -> Result<Post> {
        let id = post.id;
        PostActiveModel::from(post)
            .reset_all()
            .update(self.write_conn())
            .await
            .map_err(update_error("post", id))
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        PostEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        PostEntity::find().all(self.read_conn()).await.map_err(Into::into)
    }

    async fn latest_posts(&self, limit: u64) -> Result<Vec<Post>> {
        PostEntity::find()
            .order_by_desc(PostColumn::CreatedAt)
            .paginate(self.read_conn(), limit)
            .fetch_page(0)
            .await
            .map_err(Into::into)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        let result = PostEntity::delete_by_id(id).exec(self.write_conn()).await?;
        Ok(result.rows_affected > 0)
    }
}
