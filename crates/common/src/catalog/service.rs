//! Catalog workflows
//!
//! Every write goes through [`Catalog`]: form validation, reference checks,
//! slug assignment with bounded retry, author name derivation, tag reuse and
//! the profile hook. Reads come back in canonical order.

use super::forms::*;
use super::records::{self, ArticleRecord, BookRecord, Lookup};
use super::store::{ArticleLinks, ArticleScope, BookLinks, CatalogStore};
use super::views::*;
use crate::config::CatalogConfig;
use crate::db::models::*;
use crate::errors::{AppError, FormErrors, Result};
use crate::metrics;
use crate::slugs::{SlugAssigner, Sluggable};
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";
const REQUIRED: &str = "This field is required.";

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

fn validate<F: Validate>(form: &F) -> Result<()> {
    form.validate().map_err(AppError::from)
}

/// Trimmed, non-empty, first occurrence wins
fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty() && seen.insert(tag.clone()))
        .collect()
}

fn dedupe_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn derived_author_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name.trim(), last_name.trim())
}

fn image_rows(forms: &[ArticleImageForm]) -> Vec<ArticleImage> {
    forms
        .iter()
        .map(|image| ArticleImage {
            id: Uuid::new_v4(),
            article_id: Uuid::nil(),
            name: image.name.clone(),
            desc: image.desc.clone(),
            img: image.img.clone(),
            photo_by: image.photo_by.clone(),
        })
        .collect()
}

/// Write and read workflows over a [`CatalogStore`]
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn CatalogStore>,
    slugs: SlugAssigner,
    config: CatalogConfig,
}

impl Catalog {
    pub fn new(store: Arc<dyn CatalogStore>, config: CatalogConfig) -> Self {
        let slugs = SlugAssigner::new(config.slug_suffix_len);
        Self::with_slugs(store, config, slugs)
    }

    /// Use a specific slug assigner (seeded in tests)
    pub fn with_slugs(store: Arc<dyn CatalogStore>, config: CatalogConfig, slugs: SlugAssigner) -> Self {
        Self {
            store,
            slugs,
            config,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }

    /// Insert a sluggable row, drawing a fresh suffix after each slug uniqueness violation
    async fn insert_with_slug<T, F, Fut>(&self, resource: &'static str, base: String, mut insert: F) -> Result<T>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.config.slug_max_attempts.max(1);
        for attempt in 1..=attempts {
            let slug = self.slugs.generate(&base);
            match insert(slug.clone()).await {
                Ok(row) => return Ok(row),
                Err(e) if e.is_slug_collision() => {
                    metrics::record_slug_collision(resource);
                    warn!(resource, slug = %slug, attempt, error = %e, "Slug already taken");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::SlugConflict {
            resource_type: resource.to_string(),
            attempts,
        })
    }

    // ========================================================================
    // Reference checks
    // ========================================================================

    async fn check_authors(&self, ids: &[Uuid], errors: &mut FormErrors) -> Result<()> {
        for id in ids {
            if self.store.find_author(&Lookup::Id(*id)).await?.is_none() {
                errors.add("authors", format!("Select a valid choice. {} is not one of the available choices.", id));
            }
        }
        Ok(())
    }

    async fn check_users(&self, field: &str, ids: &[Uuid], errors: &mut FormErrors) -> Result<()> {
        for id in ids {
            if self.store.find_user(*id).await?.is_none() {
                errors.add(field, format!("Select a valid choice. {} is not one of the available choices.", id));
            }
        }
        Ok(())
    }

    async fn check_places(
        &self,
        organization: Option<(&str, Uuid)>,
        county: Option<Uuid>,
        city: Option<Uuid>,
        errors: &mut FormErrors,
    ) -> Result<()> {
        if let Some((field, id)) = organization {
            if self.store.find_organization(id).await?.is_none() {
                errors.add(field, INVALID_CHOICE);
            }
        }
        if let Some(id) = county {
            if self.store.find_county(id).await?.is_none() {
                errors.add("county_id", INVALID_CHOICE);
            }
        }
        if let Some(id) = city {
            if self.store.find_city(id).await?.is_none() {
                errors.add("city_id", INVALID_CHOICE);
            }
        }
        Ok(())
    }

    /// Journal must exist and be edited by the acting user
    async fn check_issue_form(&self, acting_user: Uuid, form: &IssueForm) -> Result<Journal> {
        let mut errors = FormErrors::new();

        let journal = match form.journal_id {
            None => {
                errors.add("journal_id", REQUIRED);
                None
            }
            Some(id) => {
                let journal = self.store.find_journal(&Lookup::Id(id)).await?;
                let edits = self.store.journal_editors(id).await?.contains(&acting_user);
                match journal {
                    Some(journal) if edits => Some(journal),
                    _ => {
                        errors.add("journal_id", INVALID_CHOICE);
                        None
                    }
                }
            }
        };

        if let Some(redactor) = form.redactor_id {
            if self.store.find_author(&Lookup::Id(redactor)).await?.is_none() {
                errors.add("redactor_id", INVALID_CHOICE);
            }
        }

        errors.into_result()?;
        journal.ok_or_else(|| AppError::Internal {
            message: "journal check passed without a journal".to_string(),
        })
    }

    // ========================================================================
    // Places
    // ========================================================================

    pub async fn create_county(&self, form: PlaceForm) -> Result<County> {
        validate(&form)?;
        let county = self
            .store
            .insert_county(County {
                id: Uuid::new_v4(),
                name: form.name,
            })
            .await?;
        metrics::record_created("county");
        Ok(county)
    }

    pub async fn counties(&self) -> Result<Vec<County>> {
        let mut counties = self.store.list_counties().await?;
        counties.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(counties)
    }

    pub async fn delete_county(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_county(id).await? {
            return Err(AppError::not_found("county", id));
        }
        metrics::record_deleted("county");
        Ok(())
    }

    pub async fn create_city(&self, form: PlaceForm) -> Result<City> {
        validate(&form)?;
        let city = self
            .store
            .insert_city(City {
                id: Uuid::new_v4(),
                name: form.name,
            })
            .await?;
        metrics::record_created("city");
        Ok(city)
    }

    pub async fn cities(&self) -> Result<Vec<City>> {
        let mut cities = self.store.list_cities().await?;
        cities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cities)
    }

    pub async fn delete_city(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_city(id).await? {
            return Err(AppError::not_found("city", id));
        }
        metrics::record_deleted("city");
        Ok(())
    }

    pub async fn create_organization(&self, form: OrganizationForm) -> Result<Organization> {
        validate(&form)?;
        let mut errors = FormErrors::new();
        self.check_places(None, form.county_id, form.city_id, &mut errors).await?;
        errors.into_result()?;

        let organization = self
            .store
            .insert_organization(Organization {
                id: Uuid::new_v4(),
                name: form.name,
                desc: form.desc,
                county_id: form.county_id,
                city_id: form.city_id,
            })
            .await?;
        metrics::record_created("organization");
        Ok(organization)
    }

    pub async fn organizations(&self) -> Result<Vec<Organization>> {
        let mut organizations = self.store.list_organizations().await?;
        organizations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(organizations)
    }

    pub async fn delete_organization(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_organization(id).await? {
            return Err(AppError::not_found("organization", id));
        }
        metrics::record_deleted("organization");
        Ok(())
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Create the account row, then run the profile hook for it
    pub async fn register_user(&self, form: RegistrationForm) -> Result<(User, Profile)> {
        validate(&form)?;

        let user = User {
            id: Uuid::new_v4(),
            username: form.username.trim().to_string(),
            email: form.email.unwrap_or_default(),
            created_at: now(),
        };
        let user = match self.store.insert_user(user).await {
            Ok(user) => user,
            Err(AppError::Duplicate { .. }) => {
                let mut errors = FormErrors::new();
                errors.add("username", "A user with that username already exists.");
                return Err(AppError::InvalidForm { errors });
            }
            Err(e) => return Err(e),
        };
        metrics::record_created("user");
        info!(user_id = %user.id, username = %user.username, "Registered user");

        let profile = self.ensure_profile(&user, &form.first_name, &form.last_name).await?;
        Ok((user, profile))
    }

    /// Post-registration hook: create the user's profile unless it exists
    pub async fn ensure_profile(&self, user: &User, first_name: &str, last_name: &str) -> Result<Profile> {
        if let Some(profile) = self.store.find_profile(user.id).await? {
            return Ok(profile);
        }

        let timestamp = now();
        let profile = self
            .store
            .insert_profile(Profile {
                id: Uuid::new_v4(),
                user_id: user.id,
                first_name: first_name.trim().to_string(),
                last_name: last_name.trim().to_string(),
                avatar: None,
                created_at: timestamp,
                updated_at: timestamp,
            })
            .await?;
        metrics::record_created("profile");
        info!(user_id = %user.id, profile_id = %profile.id, "Created profile");
        Ok(profile)
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<Profile> {
        self.store
            .find_profile(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("profile", user_id))
    }

    pub async fn update_profile(&self, user_id: Uuid, form: ProfileForm) -> Result<ProfileUpdate> {
        validate(&form)?;
        let previous = self.profile(user_id).await?;

        let names_changed = previous.first_name != form.first_name || previous.last_name != form.last_name;
        if names_changed {
            info!(
                user_id = %user_id,
                previous_first_name = %previous.first_name,
                previous_last_name = %previous.last_name,
                "Profile name changed"
            );
        }

        let profile = self
            .store
            .update_profile(Profile {
                first_name: form.first_name,
                last_name: form.last_name,
                avatar: form.avatar,
                updated_at: now(),
                ..previous
            })
            .await?;

        Ok(ProfileUpdate { profile, names_changed })
    }

    // ========================================================================
    // Authors
    // ========================================================================

    async fn check_author_form(&self, form: &AuthorForm) -> Result<()> {
        validate(form)?;
        let mut errors = FormErrors::new();
        self.check_places(form.org_id.map(|id| ("org_id", id)), None, None, &mut errors)
            .await?;
        if let Some(user) = form.user_id {
            self.check_users("user_id", &[user], &mut errors).await?;
        }
        errors.into_result()
    }

    pub async fn create_author(&self, form: AuthorForm) -> Result<Author> {
        self.check_author_form(&form).await?;

        let name = match form.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => derived_author_name(&form.first_name, &form.last_name),
        };
        let draft = Author {
            id: Uuid::new_v4(),
            name,
            first_name: form.first_name,
            last_name: form.last_name,
            slug: String::new(),
            org_id: form.org_id,
            user_id: form.user_id,
        };

        let store = self.store.clone();
        let author = self
            .insert_with_slug("author", draft.slug_base(), |slug| {
                let store = store.clone();
                let row = Author { slug, ..draft.clone() };
                async move { store.insert_author(row).await }
            })
            .await?;

        metrics::record_created("author");
        info!(author_id = %author.id, slug = %author.slug, "Created author");
        Ok(author)
    }

    /// Display name is only re-derived when it is blank
    pub async fn update_author(&self, lookup: &Lookup, form: AuthorForm) -> Result<Author> {
        let existing = self.author(lookup).await?;
        self.check_author_form(&form).await?;

        let name = match form.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ if !existing.name.trim().is_empty() => existing.name.clone(),
            _ => derived_author_name(&form.first_name, &form.last_name),
        };

        self.store
            .update_author(Author {
                name,
                first_name: form.first_name,
                last_name: form.last_name,
                org_id: form.org_id,
                user_id: form.user_id,
                ..existing
            })
            .await
    }

    pub async fn author(&self, lookup: &Lookup) -> Result<Author> {
        self.store
            .find_author(lookup)
            .await?
            .ok_or_else(|| AppError::not_found("author", lookup))
    }

    /// Authors whose display name contains `query`, case-insensitively
    pub async fn authors(&self, query: Option<&str>) -> Result<Vec<Author>> {
        let mut authors = self.store.list_authors().await?;
        if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
            authors.retain(|author| contains_ignore_case(&author.name, query));
        }
        records::sort_authors(&mut authors);
        Ok(authors)
    }

    pub async fn author_detail(&self, lookup: &Lookup) -> Result<AuthorDetail> {
        let author = self.author(lookup).await?;
        let articles = self.scoped_articles(ArticleScope::Author(author.id)).await?;
        Ok(AuthorDetail { author, articles })
    }

    pub async fn delete_author(&self, lookup: &Lookup) -> Result<()> {
        let author = self.author(lookup).await?;
        self.store.delete_author(author.id).await?;
        metrics::record_deleted("author");
        info!(author_id = %author.id, "Deleted author");
        Ok(())
    }

    // ========================================================================
    // Journals
    // ========================================================================

    async fn check_journal_form(&self, form: &JournalForm) -> Result<Vec<Uuid>> {
        validate(form)?;
        let editors = dedupe_ids(&form.editors);
        let mut errors = FormErrors::new();
        self.check_places(
            form.publisher_id.map(|id| ("publisher_id", id)),
            form.county_id,
            form.city_id,
            &mut errors,
        )
        .await?;
        self.check_users("editors", &editors, &mut errors).await?;
        errors.into_result()?;
        Ok(editors)
    }

    pub async fn create_journal(&self, form: JournalForm) -> Result<Journal> {
        let editors = self.check_journal_form(&form).await?;

        let timestamp = now();
        let draft = Journal {
            id: Uuid::new_v4(),
            name: form.name,
            slug: String::new(),
            desc: form.desc,
            link: form.link,
            front_cover: form.front_cover,
            back_cover: form.back_cover,
            custom_txt: form.custom_txt,
            custom_num: form.custom_num,
            custom_bool: form.custom_bool,
            publisher_id: form.publisher_id,
            county_id: form.county_id,
            city_id: form.city_id,
            created_at: timestamp,
            updated_at: timestamp,
        };

        let store = self.store.clone();
        let journal = self
            .insert_with_slug("journal", draft.slug_base(), |slug| {
                let store = store.clone();
                let row = Journal { slug, ..draft.clone() };
                let editors = editors.clone();
                async move { store.insert_journal(row, &editors).await }
            })
            .await?;

        metrics::record_created("journal");
        info!(journal_id = %journal.id, slug = %journal.slug, "Created journal");
        Ok(journal)
    }

    pub async fn update_journal(&self, lookup: &Lookup, form: JournalForm) -> Result<Journal> {
        let existing = self.journal(lookup).await?;
        let editors = self.check_journal_form(&form).await?;

        let row = Journal {
            name: form.name,
            desc: form.desc,
            link: form.link,
            front_cover: form.front_cover,
            back_cover: form.back_cover,
            custom_txt: form.custom_txt,
            custom_num: form.custom_num,
            custom_bool: form.custom_bool,
            publisher_id: form.publisher_id,
            county_id: form.county_id,
            city_id: form.city_id,
            updated_at: now(),
            ..existing
        };
        self.store.update_journal(row, &editors).await
    }

    pub async fn journal(&self, lookup: &Lookup) -> Result<Journal> {
        self.store
            .find_journal(lookup)
            .await?
            .ok_or_else(|| AppError::not_found("journal", lookup))
    }

    pub async fn journals(&self) -> Result<Vec<Journal>> {
        let mut journals = self.store.list_journals().await?;
        records::sort_journals(&mut journals);
        Ok(journals)
    }

    /// Journal with its issues (optionally name-filtered), articles and their authors
    pub async fn journal_detail(&self, lookup: &Lookup, issue_name: Option<&str>) -> Result<JournalDetail> {
        let journal = self.journal(lookup).await?;
        let editors = self.store.journal_editors(journal.id).await?;

        let mut issues = self.store.journal_issues(journal.id).await?;
        records::sort_issues(&mut issues);
        if let Some(name) = issue_name.map(str::trim).filter(|n| !n.is_empty()) {
            issues.retain(|issue| contains_ignore_case(&issue.name, name));
        }

        let articles = self.scoped_articles(ArticleScope::Journal(journal.id)).await?;
        let authors = records::distinct_authors(&articles);

        Ok(JournalDetail {
            journal,
            editors,
            issues,
            articles,
            authors,
        })
    }

    /// Journals the user may file issues under
    pub async fn journals_edited_by(&self, user_id: Uuid) -> Result<Vec<Journal>> {
        let mut edited = Vec::new();
        for journal in self.journals().await? {
            if self.store.journal_editors(journal.id).await?.contains(&user_id) {
                edited.push(journal);
            }
        }
        Ok(edited)
    }

    /// Removes the journal with its issues and their articles
    pub async fn delete_journal(&self, lookup: &Lookup) -> Result<()> {
        let journal = self.journal(lookup).await?;
        self.store.delete_journal(journal.id).await?;
        metrics::record_deleted("journal");
        info!(journal_id = %journal.id, "Deleted journal");
        Ok(())
    }

    // ========================================================================
    // Issues
    // ========================================================================

    fn require_user(acting_user: Option<Uuid>) -> Result<Uuid> {
        acting_user.ok_or_else(|| AppError::Unauthorized {
            message: "An acting user is required to edit issues".to_string(),
        })
    }

    pub async fn create_issue(&self, acting_user: Option<Uuid>, form: IssueForm) -> Result<Issue> {
        let user = Self::require_user(acting_user)?;
        validate(&form)?;
        let journal = self.check_issue_form(user, &form).await?;

        let timestamp = now();
        let draft = Issue {
            id: Uuid::new_v4(),
            name: form.name,
            slug: String::new(),
            volume: form.volume,
            date: form.date,
            issn: form.issn,
            file: form.file,
            desc: form.desc,
            link: form.link,
            front_cover: form.front_cover,
            back_cover: form.back_cover,
            custom_txt: form.custom_txt,
            custom_num: form.custom_num,
            custom_bool: form.custom_bool,
            redactor_id: form.redactor_id,
            journal_id: journal.id,
            created_by: Some(user),
            created_at: timestamp,
            updated_at: timestamp,
        };

        let store = self.store.clone();
        let issue = self
            .insert_with_slug("issue", draft.slug_base(), |slug| {
                let store = store.clone();
                let row = Issue { slug, ..draft.clone() };
                async move { store.insert_issue(row).await }
            })
            .await?;

        metrics::record_created("issue");
        info!(issue_id = %issue.id, journal_id = %journal.id, slug = %issue.slug, "Created issue");
        Ok(issue)
    }

    pub async fn update_issue(&self, acting_user: Option<Uuid>, lookup: &Lookup, form: IssueForm) -> Result<Issue> {
        let user = Self::require_user(acting_user)?;
        let existing = self.issue(lookup).await?;
        validate(&form)?;
        let journal = self.check_issue_form(user, &form).await?;

        self.store
            .update_issue(Issue {
                name: form.name,
                volume: form.volume,
                date: form.date,
                issn: form.issn,
                file: form.file,
                desc: form.desc,
                link: form.link,
                front_cover: form.front_cover,
                back_cover: form.back_cover,
                custom_txt: form.custom_txt,
                custom_num: form.custom_num,
                custom_bool: form.custom_bool,
                redactor_id: form.redactor_id,
                journal_id: journal.id,
                updated_at: now(),
                ..existing
            })
            .await
    }

    pub async fn issue(&self, lookup: &Lookup) -> Result<Issue> {
        self.store
            .find_issue(lookup)
            .await?
            .ok_or_else(|| AppError::not_found("issue", lookup))
    }

    pub async fn issues(&self) -> Result<Vec<Issue>> {
        let mut issues = self.store.list_issues().await?;
        records::sort_issues(&mut issues);
        Ok(issues)
    }

    pub async fn issue_detail(&self, lookup: &Lookup) -> Result<IssueDetail> {
        let issue = self.issue(lookup).await?;
        let journal = self.store.find_journal(&Lookup::Id(issue.journal_id)).await?;
        let redactor = match issue.redactor_id {
            Some(id) => self.store.find_author(&Lookup::Id(id)).await?,
            None => None,
        };

        let articles = self.scoped_articles(ArticleScope::Issue(issue.id)).await?;
        let authors = records::distinct_authors(&articles);

        Ok(IssueDetail {
            journal: journal.as_ref().map(Into::into),
            redactor,
            articles,
            authors,
            issue,
        })
    }

    /// Removes the issue and its articles
    pub async fn delete_issue(&self, lookup: &Lookup) -> Result<()> {
        let issue = self.issue(lookup).await?;
        self.store.delete_issue(issue.id).await?;
        metrics::record_deleted("issue");
        info!(issue_id = %issue.id, "Deleted issue");
        Ok(())
    }

    // ========================================================================
    // Articles
    // ========================================================================

    async fn check_article_form(&self, form: &ArticleForm) -> Result<ArticleLinks> {
        let mut errors = match form.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => e.into(),
        };
        for (index, image) in form.images.iter().flatten().enumerate() {
            if let Err(e) = image.validate() {
                for (field, messages) in FormErrors::from(e).0 {
                    for message in messages {
                        errors.add(format!("images[{}].{}", index, field), message);
                    }
                }
            }
        }

        let authors = dedupe_ids(&form.authors);
        self.check_authors(&authors, &mut errors).await?;
        errors.into_result()?;

        Ok(ArticleLinks {
            authors,
            tags: normalize_tags(&form.tags),
            images: form.images.as_deref().map(image_rows),
        })
    }

    /// New article filed under an issue, with its inline images
    pub async fn create_article(&self, acting_user: Option<Uuid>, issue: &Lookup, form: ArticleForm) -> Result<ArticleRecord> {
        let issue = self.issue(issue).await?;
        let mut links = self.check_article_form(&form).await?;
        if links.images.is_none() {
            links.images = Some(Vec::new());
        }

        let timestamp = now();
        let draft = Article {
            id: Uuid::new_v4(),
            name: form.name,
            slug: String::new(),
            sub: form.sub,
            abstract_text: form.abstract_text,
            text: form.text,
            file: form.file,
            link: form.link,
            custom_txt: form.custom_txt,
            custom_num: form.custom_num,
            custom_bool: form.custom_bool,
            issue_id: Some(issue.id),
            created_by: acting_user,
            created_at: timestamp,
            updated_at: timestamp,
        };

        let store = self.store.clone();
        let article = self
            .insert_with_slug("article", draft.slug_base(), |slug| {
                let store = store.clone();
                let row = Article { slug, ..draft.clone() };
                let links = links.clone();
                async move { store.insert_article(row, links).await }
            })
            .await?;

        metrics::record_created("article");
        info!(article_id = %article.id(), issue_id = %issue.id, slug = %article.article.slug, "Created article");
        Ok(article)
    }

    /// Submitted images replace the stored set; omitted images are kept
    pub async fn update_article(&self, lookup: &Lookup, form: ArticleForm) -> Result<ArticleRecord> {
        let existing = self.article(lookup).await?.article;
        let links = self.check_article_form(&form).await?;

        self.store
            .update_article(
                Article {
                    name: form.name,
                    sub: form.sub,
                    abstract_text: form.abstract_text,
                    text: form.text,
                    file: form.file,
                    link: form.link,
                    custom_txt: form.custom_txt,
                    custom_num: form.custom_num,
                    custom_bool: form.custom_bool,
                    updated_at: now(),
                    ..existing
                },
                links,
            )
            .await
    }

    pub async fn article(&self, lookup: &Lookup) -> Result<ArticleRecord> {
        self.store
            .find_article(lookup)
            .await?
            .ok_or_else(|| AppError::not_found("article", lookup))
    }

    /// All articles, hydrated, in canonical order
    pub async fn article_records(&self) -> Result<Vec<ArticleRecord>> {
        self.scoped_articles(ArticleScope::All).await
    }

    async fn scoped_articles(&self, scope: ArticleScope) -> Result<Vec<ArticleRecord>> {
        let mut articles = self.store.article_records(scope).await?;
        records::sort_articles(&mut articles);
        Ok(articles)
    }

    /// Issue and journal narrow the query; the rest is matched per record
    pub async fn filter_articles(&self, filter: &ArticleFilter) -> Result<Vec<ArticleRecord>> {
        if filter.unmatchable {
            return Ok(Vec::new());
        }
        let scope = match (filter.issue, filter.journal) {
            (Some(issue), _) => ArticleScope::Issue(issue),
            (None, Some(journal)) => ArticleScope::Journal(journal),
            (None, None) => ArticleScope::All,
        };
        Ok(self
            .scoped_articles(scope)
            .await?
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect())
    }

    pub async fn delete_article(&self, lookup: &Lookup) -> Result<()> {
        let article = self.article(lookup).await?;
        self.store.delete_article(article.id()).await?;
        metrics::record_deleted("article");
        info!(article_id = %article.id(), "Deleted article");
        Ok(())
    }

    // ========================================================================
    // Books
    // ========================================================================

    async fn check_book_form(&self, form: &BookForm) -> Result<BookLinks> {
        validate(form)?;
        let authors = dedupe_ids(&form.authors);
        let mut errors = FormErrors::new();
        self.check_authors(&authors, &mut errors).await?;
        errors.into_result()?;
        Ok(BookLinks {
            authors,
            tags: normalize_tags(&form.tags),
        })
    }

    pub async fn create_book(&self, acting_user: Option<Uuid>, form: BookForm) -> Result<BookRecord> {
        let links = self.check_book_form(&form).await?;

        let timestamp = now();
        let draft = Book {
            id: Uuid::new_v4(),
            name: form.name,
            slug: String::new(),
            desc: form.desc,
            link: form.link,
            front_cover: form.front_cover,
            back_cover: form.back_cover,
            volume: form.volume,
            date: form.date,
            issn: form.issn,
            file: form.file,
            custom_txt: form.custom_txt,
            custom_num: form.custom_num,
            custom_bool: form.custom_bool,
            created_by: acting_user,
            created_at: timestamp,
            updated_at: timestamp,
        };

        let store = self.store.clone();
        let book = self
            .insert_with_slug("book", draft.slug_base(), |slug| {
                let store = store.clone();
                let row = Book { slug, ..draft.clone() };
                let links = links.clone();
                async move { store.insert_book(row, links).await }
            })
            .await?;

        metrics::record_created("book");
        info!(book_id = %book.id(), slug = %book.book.slug, "Created book");
        Ok(book)
    }

    pub async fn update_book(&self, lookup: &Lookup, form: BookForm) -> Result<BookRecord> {
        let existing = self.book(lookup).await?.book;
        let links = self.check_book_form(&form).await?;

        self.store
            .update_book(
                Book {
                    name: form.name,
                    desc: form.desc,
                    link: form.link,
                    front_cover: form.front_cover,
                    back_cover: form.back_cover,
                    volume: form.volume,
                    date: form.date,
                    issn: form.issn,
                    file: form.file,
                    custom_txt: form.custom_txt,
                    custom_num: form.custom_num,
                    custom_bool: form.custom_bool,
                    updated_at: now(),
                    ..existing
                },
                links,
            )
            .await
    }

    pub async fn book(&self, lookup: &Lookup) -> Result<BookRecord> {
        self.store
            .find_book(lookup)
            .await?
            .ok_or_else(|| AppError::not_found("book", lookup))
    }

    pub async fn book_records(&self) -> Result<Vec<BookRecord>> {
        let mut books = self.store.book_records().await?;
        records::sort_books(&mut books);
        Ok(books)
    }

    pub async fn delete_book(&self, lookup: &Lookup) -> Result<()> {
        let book = self.book(lookup).await?;
        self.store.delete_book(book.id()).await?;
        metrics::record_deleted("book");
        info!(book_id = %book.id(), "Deleted book");
        Ok(())
    }

    // ========================================================================
    // Posts
    // ========================================================================

    pub async fn create_post(&self, form: PostForm) -> Result<Post> {
        validate(&form)?;
        let timestamp = now();
        let post = self
            .store
            .insert_post(Post {
                id: Uuid::new_v4(),
                name: form.name,
                text: form.text,
                image: form.image,
                author: form.author,
                created_at: timestamp,
                updated_at: timestamp,
            })
            .await?;
        metrics::record_created("post");
        Ok(post)
    }

    pub async fn update_post(&self, id: Uuid, form: PostForm) -> Result<Post> {
        let existing = self.post(id).await?;
        validate(&form)?;
        self.store
            .update_post(Post {
                name: form.name,
                text: form.text,
                image: form.image,
                author: form.author,
                updated_at: now(),
                ..existing
            })
            .await
    }

    pub async fn post(&self, id: Uuid) -> Result<Post> {
        self.store
            .find_post(id)
            .await?
            .ok_or_else(|| AppError::not_found("post", id))
    }

    pub async fn posts(&self) -> Result<Vec<Post>> {
        let mut posts = self.store.list_posts().await?;
        records::sort_posts(&mut posts);
        Ok(posts)
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_post(id).await? {
            return Err(AppError::not_found("post", id));
        }
        metrics::record_deleted("post");
        Ok(())
    }

    // ========================================================================
    // Home
    // ========================================================================

    /// Most recently created articles, posts and issues
    pub async fn home(&self) -> Result<HomePage> {
        let latest = u64::try_from(self.config.home_latest).unwrap_or(u64::MAX);

        let mut articles = self.store.article_records(ArticleScope::Latest(latest)).await?;
        articles.sort_by(|a, b| b.article.created_at.cmp(&a.article.created_at));

        let mut posts = self.store.latest_posts(latest).await?;
        records::sort_posts(&mut posts);

        let mut issues = self.store.latest_issues(latest).await?;
        issues.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(HomePage { articles, posts, issues })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryStore;
    use chrono::NaiveDate;

    fn catalog_with_seed(store: Arc<dyn CatalogStore>, seed: u64) -> Catalog {
        let config = CatalogConfig::default();
        let slugs = SlugAssigner::seeded(config.slug_suffix_len, seed);
        Catalog::with_slugs(store, config, slugs)
    }

    fn catalog() -> Catalog {
        catalog_with_seed(Arc::new(MemoryStore::new()), 42)
    }

    async fn editor(catalog: &Catalog, username: &str) -> Uuid {
        let (user, _) = catalog
            .register_user(RegistrationForm {
                username: username.into(),
                ..Default::default()
            })
            .await
            .unwrap();
        user.id
    }

    async fn journal_with_issue(catalog: &Catalog, user: Uuid) -> (Journal, Issue) {
        let journal = catalog
            .create_journal(JournalForm {
                name: "Vår Fuglefauna".into(),
                editors: vec![user],
                ..Default::default()
            })
            .await
            .unwrap();
        let issue = catalog
            .create_issue(
                Some(user),
                IssueForm {
                    name: "Nr 3 1998".into(),
                    date: NaiveDate::from_ymd_opt(1998, 9, 1),
                    journal_id: Some(journal.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        (journal, issue)
    }

    #[tokio::test]
    async fn test_slug_kept_on_rename() {
        let catalog = catalog();
        let user = editor(&catalog, "redaktor").await;
        let (journal, _) = journal_with_issue(&catalog, user).await;
        assert!(journal.slug.starts_with("var-fuglefauna-"));

        let renamed = catalog
            .update_journal(
                &Lookup::Slug(journal.slug.clone()),
                JournalForm {
                    name: "Fuglefauna".into(),
                    editors: vec![user],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.slug, journal.slug);
        assert_eq!(renamed.name, "Fuglefauna");
    }

    #[tokio::test]
    async fn test_slug_collision_retries_with_new_suffix() {
        let store: Arc<dyn CatalogStore> = Arc::new(MemoryStore::new());
        let first = catalog_with_seed(store.clone(), 7);
        let second = catalog_with_seed(store.clone(), 7);

        let a = first
            .create_author(AuthorForm {
                first_name: "Ola".into(),
                last_name: "Nordmann".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        // Same seed, so the first suffix collides
        let b = second
            .create_author(AuthorForm {
                first_name: "Ola".into(),
                last_name: "Nordmann".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_ne!(a.slug, b.slug);
        assert_eq!(second.authors(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_slug_conflict_when_attempts_run_out() {
        let store: Arc<dyn CatalogStore> = Arc::new(MemoryStore::new());
        let config = CatalogConfig {
            slug_max_attempts: 1,
            ..Default::default()
        };
        let first = Catalog::with_slugs(store.clone(), config.clone(), SlugAssigner::seeded(8, 3));
        let second = Catalog::with_slugs(store, config, SlugAssigner::seeded(8, 3));

        let form = AuthorForm {
            first_name: "Kari".into(),
            last_name: "Fjell".into(),
            ..Default::default()
        };
        first.create_author(form.clone()).await.unwrap();
        let err = second.create_author(form).await.unwrap_err();
        assert!(matches!(err, AppError::SlugConflict { attempts: 1, .. }));
    }

    #[tokio::test]
    async fn test_author_name_derived() {
        let catalog = catalog();
        let author = catalog
            .create_author(AuthorForm {
                first_name: "Alf Tore".into(),
                last_name: "Mjøs".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(author.name, "Alf Tore Mjøs");
        assert!(author.slug.starts_with("alf-tore-mjos-"));

        let named = catalog
            .create_author(AuthorForm {
                first_name: "Hans".into(),
                last_name: "Olsen".into(),
                name: Some("H. Olsen".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(named.name, "H. Olsen");
    }

    #[tokio::test]
    async fn test_invalid_form_persists_nothing() {
        let catalog = catalog();
        let err = catalog
            .create_journal(JournalForm {
                name: String::new(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        match err {
            AppError::InvalidForm { errors } => assert!(errors.contains("name")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(catalog.journals().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_issue_requires_edited_journal() {
        let catalog = catalog();
        let owner = editor(&catalog, "eier").await;
        let outsider = editor(&catalog, "utenforstaaende").await;
        let (journal, _) = journal_with_issue(&catalog, owner).await;

        let err = catalog
            .create_issue(
                Some(outsider),
                IssueForm {
                    name: "Nr 4".into(),
                    journal_id: Some(journal.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        match err {
            AppError::InvalidForm { errors } => assert!(errors.contains("journal_id")),
            other => panic!("unexpected error: {other}"),
        }

        let err = catalog
            .create_issue(None, IssueForm::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_article_under_issue_with_tags_and_images() {
        let catalog = catalog();
        let user = editor(&catalog, "skribent").await;
        let (journal, issue) = journal_with_issue(&catalog, user).await;
        let author = catalog
            .create_author(AuthorForm {
                first_name: "Ingvar".into(),
                last_name: "Falk".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let record = catalog
            .create_article(
                Some(user),
                &Lookup::Id(issue.id),
                ArticleForm {
                    name: "Vandrefalk i Nord-Norge".into(),
                    authors: vec![author.id, author.id],
                    tags: vec![" rovfugl ".into(), "Falco".into(), "rovfugl".into()],
                    images: Some(vec![ArticleImageForm {
                        img: "img/falk.jpg".into(),
                        ..Default::default()
                    }]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(record.authors.len(), 1);
        assert_eq!(record.tags, vec!["Falco", "rovfugl"]);
        assert_eq!(record.images.len(), 1);
        assert_eq!(record.year(), Some(1998));
        assert_eq!(record.journal().map(|j| j.id), Some(journal.id));
        assert_eq!(record.article.created_by, Some(user));

        // Images omitted on update are kept, submitted images replace
        let kept = catalog
            .update_article(
                &Lookup::Slug(record.article.slug.clone()),
                ArticleForm {
                    name: "Vandrefalk".into(),
                    tags: vec!["Falco".into()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(kept.images.len(), 1);
        assert_eq!(kept.article.slug, record.article.slug);
        assert!(kept.authors.is_empty());

        let replaced = catalog
            .update_article(
                &Lookup::Id(record.id()),
                ArticleForm {
                    name: "Vandrefalk".into(),
                    images: Some(vec![
                        ArticleImageForm {
                            img: "img/a.jpg".into(),
                            ..Default::default()
                        },
                        ArticleImageForm {
                            img: "img/b.jpg".into(),
                            ..Default::default()
                        },
                    ]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(replaced.images.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_author_is_field_error() {
        let catalog = catalog();
        let err = catalog
            .create_book(
                None,
                BookForm {
                    name: "Norges fugler".into(),
                    authors: vec![Uuid::new_v4()],
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        match err {
            AppError::InvalidForm { errors } => assert!(errors.contains("authors")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_journal_delete_cascades() {
        let catalog = catalog();
        let user = editor(&catalog, "sletter").await;
        let (journal, issue) = journal_with_issue(&catalog, user).await;
        catalog
            .create_article(
                Some(user),
                &Lookup::Id(issue.id),
                ArticleForm {
                    name: "Siste telling".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        catalog.delete_journal(&Lookup::Id(journal.id)).await.unwrap();

        assert!(catalog.issues().await.unwrap().is_empty());
        assert!(catalog.article_records().await.unwrap().is_empty());
        assert!(matches!(
            catalog.journal(&Lookup::Id(journal.id)).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_deleting_redactor_nulls_reference() {
        let catalog = catalog();
        let user = editor(&catalog, "redaktor").await;
        let (journal, _) = journal_with_issue(&catalog, user).await;
        let redactor = catalog
            .create_author(AuthorForm {
                first_name: "Per".into(),
                last_name: "Redaktør".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let issue = catalog
            .create_issue(
                Some(user),
                IssueForm {
                    name: "Nr 1 2001".into(),
                    journal_id: Some(journal.id),
                    redactor_id: Some(redactor.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        catalog.delete_author(&Lookup::Id(redactor.id)).await.unwrap();

        let reloaded = catalog.issue(&Lookup::Id(issue.id)).await.unwrap();
        assert_eq!(reloaded.redactor_id, None);
    }

    #[tokio::test]
    async fn test_profile_hook_runs_once() {
        let catalog = catalog();
        let (user, profile) = catalog
            .register_user(RegistrationForm {
                username: "tjeld".into(),
                first_name: "Tone".into(),
                last_name: "Tjeld".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let again = catalog.ensure_profile(&user, "Annen", "Person").await.unwrap();
        assert_eq!(again.id, profile.id);
        assert_eq!(again.first_name, "Tone");

        let err = catalog
            .register_user(RegistrationForm {
                username: "tjeld".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidForm { .. }));
    }

    #[tokio::test]
    async fn test_profile_update_reports_name_change() {
        let catalog = catalog();
        let (user, _) = catalog
            .register_user(RegistrationForm {
                username: "spove".into(),
                first_name: "Siri".into(),
                last_name: "Spove".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let avatar_only = catalog
            .update_profile(
                user.id,
                ProfileForm {
                    first_name: "Siri".into(),
                    last_name: "Spove".into(),
                    avatar: Some("avatars/spove.png".into()),
                },
            )
            .await
            .unwrap();
        assert!(!avatar_only.names_changed);

        let renamed = catalog
            .update_profile(
                user.id,
                ProfileForm {
                    first_name: "Siri".into(),
                    last_name: "Storspove".into(),
                    avatar: None,
                },
            )
            .await
            .unwrap();
        assert!(renamed.names_changed);
        assert_eq!(renamed.profile.last_name, "Storspove");
    }

    #[tokio::test]
    async fn test_author_list_query_is_case_insensitive() {
        let catalog = catalog();
        for (first, last) in [("Ingvar", "Falk"), ("Geir", "Gaukås")] {
            catalog
                .create_author(AuthorForm {
                    first_name: first.into(),
                    last_name: last.into(),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        let found = catalog.authors(Some("FALK")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].last_name, "Falk");
    }

    async fn article_in(catalog: &Catalog, user: Uuid, issue: &Issue, name: &str, authors: Vec<Uuid>) -> ArticleRecord {
        catalog
            .create_article(
                Some(user),
                &Lookup::Id(issue.id),
                ArticleForm {
                    name: name.into(),
                    authors,
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_detail_pages_only_list_their_articles() {
        let catalog = catalog();
        let user = editor(&catalog, "redaktor").await;
        let (journal, issue) = journal_with_issue(&catalog, user).await;
        let other_journal = catalog
            .create_journal(JournalForm {
                name: "Fauna".into(),
                editors: vec![user],
                ..Default::default()
            })
            .await
            .unwrap();
        let other_issue = catalog
            .create_issue(
                Some(user),
                IssueForm {
                    name: "Nr 1 2001".into(),
                    journal_id: Some(other_journal.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let author = catalog
            .create_author(AuthorForm {
                first_name: "Ingvar".into(),
                last_name: "Falk".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let here = article_in(&catalog, user, &issue, "Lirype", vec![author.id]).await;
        article_in(&catalog, user, &other_issue, "Fjellrype", Vec::new()).await;

        let issue_page = catalog.issue_detail(&Lookup::Id(issue.id)).await.unwrap();
        assert_eq!(issue_page.articles.len(), 1);
        assert_eq!(issue_page.articles[0].id(), here.id());
        assert_eq!(issue_page.authors.len(), 1);

        let journal_page = catalog.journal_detail(&Lookup::Id(journal.id), None).await.unwrap();
        assert_eq!(journal_page.issues.len(), 1);
        assert_eq!(journal_page.issues[0].id, issue.id);
        assert_eq!(journal_page.articles.len(), 1);
        assert_eq!(journal_page.articles[0].id(), here.id());

        let author_page = catalog.author_detail(&Lookup::Id(author.id)).await.unwrap();
        assert_eq!(author_page.articles.len(), 1);
        assert_eq!(author_page.articles[0].id(), here.id());

        let filtered = catalog
            .filter_articles(&ArticleFilter {
                journal: Some(other_journal.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].article.name, "Fjellrype");
    }

    #[tokio::test]
    async fn test_home_caps_each_list() {
        let config = CatalogConfig {
            home_latest: 2,
            ..Default::default()
        };
        let catalog = Catalog::with_slugs(Arc::new(MemoryStore::new()), config, SlugAssigner::seeded(8, 11));
        let user = editor(&catalog, "redaktor").await;
        let (_, issue) = journal_with_issue(&catalog, user).await;
        for name in ["Vipe", "Tjeld", "Storspove"] {
            article_in(&catalog, user, &issue, name, Vec::new()).await;
            catalog
                .create_post(PostForm {
                    name: name.into(),
                    text: "Observert ved Lista.".into(),
                    author: "Redaksjonen".into(),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let home = catalog.home().await.unwrap();
        assert_eq!(home.articles.len(), 2);
        assert_eq!(home.posts.len(), 2);
        assert_eq!(home.issues.len(), 1);
        assert!(home.articles[0].article.created_at >= home.articles[1].article.created_at);
        assert!(home.posts[0].created_at >= home.posts[1].created_at);
    }

    #[tokio::test]
    async fn test_created_book_carries_its_links() {
        let catalog = catalog();
        let author = catalog
            .create_author(AuthorForm {
                first_name: "Geir".into(),
                last_name: "Gaukås".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let book = catalog
            .create_book(
                None,
                BookForm {
                    name: "Norges fugler".into(),
                    authors: vec![author.id],
                    tags: vec!["atlas".into()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(book.authors.len(), 1);
        assert_eq!(book.tags, vec!["atlas"]);

        let updated = catalog
            .update_book(
                &Lookup::Id(book.id()),
                BookForm {
                    name: "Norges fugler".into(),
                    tags: vec!["atlas".into(), "håndbok".into()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.authors.is_empty());
        assert_eq!(updated.tags, vec!["atlas", "håndbok"]);
    }

    #[tokio::test]
    async fn test_overlong_tag_is_field_error() {
        let catalog = catalog();
        let user = editor(&catalog, "skribent").await;
        let (_, issue) = journal_with_issue(&catalog, user).await;

        let err = catalog
            .create_article(
                Some(user),
                &Lookup::Id(issue.id),
                ArticleForm {
                    name: "Lang tagg".into(),
                    tags: vec!["x".repeat(MAX_TAG_LEN + 1)],
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        match err {
            AppError::InvalidForm { errors } => assert!(errors.contains("tags")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(catalog.article_records().await.unwrap().is_empty());
    }
}
