//! Query-string editing for facet and pagination links
//!
//! Links are built from the incoming query pairs so that following one of
//! them changes exactly one parameter and keeps everything else.

use tracing::warn;

/// Ordered, multi-valued query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPairs {
    pairs: Vec<(String, String)>,
}

impl QueryPairs {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Append a value, keeping existing values of the same key
    pub fn with_added(&self, key: &str, value: &str) -> Self {
        let mut pairs = self.pairs.clone();
        pairs.push((key.to_string(), value.to_string()));
        Self { pairs }
    }

    /// Drop every value of `key`, then set it to `value`
    pub fn with_replaced(&self, key: &str, value: &str) -> Self {
        self.without(key).with_added(key, value)
    }

    /// Drop every value of `key`
    pub fn without(&self, key: &str) -> Self {
        Self {
            pairs: self.pairs.iter().filter(|(k, _)| k != key).cloned().collect(),
        }
    }

    pub fn encode(&self) -> String {
        match serde_urlencoded::to_string(&self.pairs) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(error = %e, "Failed to encode query string");
                String::new()
            }
        }
    }

    /// `path?query`, or the bare path when no parameters remain
    pub fn to_url(&self, path: &str) -> String {
        let encoded = self.encode();
        if encoded.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, encoded)
        }
    }
}

impl From<Vec<(String, String)>> for QueryPairs {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::new(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> QueryPairs {
        QueryPairs::new(
            raw.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_added_keeps_other_values() {
        let query = pairs(&[("q", "lom"), ("tags", "Sjøfugl")]);
        let url = query.with_added("tags", "Lommer").to_url("/v1/search");
        assert_eq!(url, "/v1/search?q=lom&tags=Sj%C3%B8fugl&tags=Lommer");
    }

    #[test]
    fn test_replaced_touches_one_cursor() {
        let query = pairs(&[("a-page", "2"), ("b-page", "3")]);
        let url = query.with_replaced("a-page", "3").to_url("/v1/search");
        assert_eq!(url, "/v1/search?b-page=3&a-page=3");
    }

    #[test]
    fn test_without_last_param_gives_bare_path() {
        let query = pairs(&[("years", "1998"), ("years", "1999")]);
        assert!(query.contains("years"));
        assert_eq!(query.without("years").to_url("/v1/search"), "/v1/search");
    }

    #[test]
    fn test_spaces_are_form_encoded() {
        let query = pairs(&[("authors", "Ola Nordmann")]);
        assert_eq!(query.encode(), "authors=Ola+Nordmann");
    }
}
