//! Permanent URL slugs for journals, issues, articles, books and authors
//!
//! A slug is `slugify(base) + "-" + <random digits>` and is assigned once,
//! on first insert. The random suffix makes collisions unlikely, not
//! impossible, so inserts go through [`crate::catalog::Catalog`] which retries
//! with a fresh suffix when the store reports a uniqueness violation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

/// Column width of every slug field
pub const MAX_SLUG_LEN: usize = 255;

/// Something that gets a slug on first save
pub trait Sluggable {
    /// Human-readable text the slug is derived from
    fn slug_base(&self) -> String;
}

impl Sluggable for crate::db::models::Journal {
    fn slug_base(&self) -> String {
        self.name.clone()
    }
}

impl Sluggable for crate::db::models::Issue {
    fn slug_base(&self) -> String {
        self.name.clone()
    }
}

impl Sluggable for crate::db::models::Article {
    fn slug_base(&self) -> String {
        self.name.clone()
    }
}

impl Sluggable for crate::db::models::Book {
    fn slug_base(&self) -> String {
        self.name.clone()
    }
}

impl Sluggable for crate::db::models::Author {
    fn slug_base(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Generates slugs with a numeric random suffix
#[derive(Clone)]
pub struct SlugAssigner {
    suffix_len: usize,
    rng: Arc<Mutex<StdRng>>,
}

impl std::fmt::Debug for SlugAssigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlugAssigner")
            .field("suffix_len", &self.suffix_len)
            .finish()
    }
}

impl SlugAssigner {
    /// Create an assigner seeded from OS entropy
    pub fn new(suffix_len: usize) -> Self {
        Self {
            suffix_len: suffix_len.max(1),
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Create an assigner with a fixed seed (reproducible suffix sequence)
    pub fn seeded(suffix_len: usize, seed: u64) -> Self {
        Self {
            suffix_len: suffix_len.max(1),
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    /// Random string of ASCII digits
    pub fn random_suffix(&self) -> String {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        (0..self.suffix_len)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }

    /// Build a fresh slug for the given display text
    pub fn generate(&self, base: &str) -> String {
        compose(base, &self.random_suffix())
    }

    /// Build a fresh slug for a record
    pub fn slug_for<T: Sluggable>(&self, record: &T) -> String {
        self.generate(&record.slug_base())
    }
}

/// Join the slugified base and the suffix, trimming the base to fit the column
pub fn compose(base: &str, suffix: &str) -> String {
    let mut head = ::slug::slugify(base);
    let budget = MAX_SLUG_LEN.saturating_sub(suffix.len() + 1);
    if head.len() > budget {
        // slugify output is ASCII, byte truncation is safe
        head.truncate(budget);
        while head.ends_with('-') {
            head.pop();
        }
    }

    if head.is_empty() {
        suffix.to_string()
    } else {
        format!("{}-{}", head, suffix)
    }
}

/// Tag slug, cut to the tag column width
pub fn tag_slug(name: &str) -> String {
    let mut slug = ::slug::slugify(name);
    // slugify output is ASCII, byte truncation is safe
    slug.truncate(crate::catalog::forms::MAX_TAG_LEN);
    slug
}

/// True when the text only contains characters slugify can emit
pub fn is_url_safe(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_shape() {
        let assigner = SlugAssigner::seeded(8, 7);
        let slug = assigner.generate("Fuglar i Norge");

        assert!(slug.starts_with("fuglar-i-norge-"));
        let suffix = slug.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
        assert!(is_url_safe(&slug));
    }

    #[test]
    fn test_transliterates_to_ascii() {
        let slug = compose("Ærfugl på Røst", "12345678");
        assert_eq!(slug, "aerfugl-pa-rost-12345678");
        assert!(is_url_safe(&slug));
    }

    #[test]
    fn test_empty_base_keeps_suffix_only() {
        assert_eq!(compose("!!!", "00000042"), "00000042");
    }

    #[test]
    fn test_long_base_is_truncated() {
        let base = "lang ".repeat(100);
        let slug = compose(&base, "12345678");
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(slug.ends_with("-12345678"));
        assert!(!slug.contains("--"));
    }

    #[test]
    fn test_tag_slug_fits_tag_column() {
        let name = "æ".repeat(crate::catalog::forms::MAX_TAG_LEN);
        let slug = tag_slug(&name);
        assert_eq!(slug.len(), crate::catalog::forms::MAX_TAG_LEN);
        assert!(is_url_safe(&slug));
        assert_eq!(tag_slug("Vandrefalk"), "vandrefalk");
    }

    #[test]
    fn test_seeded_assigners_repeat() {
        let a = SlugAssigner::seeded(8, 99);
        let b = SlugAssigner::seeded(8, 99);
        assert_eq!(a.random_suffix(), b.random_suffix());
    }

    #[test]
    fn test_author_base_joins_names() {
        let author = crate::db::models::Author {
            id: uuid::Uuid::new_v4(),
            name: String::new(),
            first_name: "Hans".into(),
            last_name: "Munkejord".into(),
            slug: String::new(),
            org_id: None,
            user_id: None,
        };
        let slug = SlugAssigner::seeded(8, 1).slug_for(&author);
        assert!(slug.starts_with("hans-munkejord-"));
    }
}
