//! Page-number pagination
//!
//! Lenient cursors: a missing or non-numeric page means page 1, a page out
//! of range on either side means the last page. An empty result still has
//! one (empty) page.

use serde::Serialize;

/// A single page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,

    /// Current page number (1-indexed)
    pub number: usize,

    /// Total number of pages, at least 1
    pub num_pages: usize,

    /// Items across all pages
    pub total: usize,

    pub per_page: usize,

    pub has_next: bool,

    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn next_page_number(&self) -> Option<usize> {
        self.has_next.then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<usize> {
        self.has_previous.then(|| self.number - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: usize,
}

impl Paginator {
    /// `per_page` below 1 is raised to 1
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn num_pages(&self, total: usize) -> usize {
        total.div_ceil(self.per_page).max(1)
    }

    /// Resolve a raw cursor to a valid page number
    pub fn page_number(&self, cursor: Option<&str>, total: usize) -> usize {
        let num_pages = self.num_pages(total);
        match cursor.map(str::trim).map(str::parse::<i64>) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n >= 1 && (n as u64) <= num_pages as u64 => n as usize,
            Some(Ok(_)) => num_pages,
        }
    }

    /// Slice `items` to the page named by `cursor`
    pub fn page<T>(&self, items: Vec<T>, cursor: Option<&str>) -> Page<T> {
        let total = items.len();
        let num_pages = self.num_pages(total);
        let number = self.page_number(cursor, total);
        let start = (number - 1) * self.per_page;

        let items: Vec<T> = items.into_iter().skip(start).take(self.per_page).collect();

        Page {
            items,
            number,
            num_pages,
            total,
            per_page: self.per_page,
            has_next: number < num_pages,
            has_previous: number > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, 1)]
    #[case(Some("2"), 2)]
    #[case(Some(" 3 "), 3)]
    #[case(Some("abc"), 1)]
    #[case(Some("2.0"), 1)]
    #[case(Some(""), 1)]
    #[case(Some("99"), 3)]
    #[case(Some("0"), 3)]
    #[case(Some("-1"), 3)]
    fn test_page_number_resolution(#[case] cursor: Option<&str>, #[case] expected: usize) {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.page_number(cursor, 25), expected);
    }

    #[test]
    fn test_last_page_is_partial() {
        let page = Paginator::new(10).page((1..=25).collect::<Vec<_>>(), Some("3"));
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.num_pages, 3);
        assert_eq!(page.total, 25);
        assert!(!page.has_next);
        assert_eq!(page.previous_page_number(), Some(2));
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let page = Paginator::new(10).page(Vec::<u8>::new(), Some("4"));
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_next && !page.has_previous);
    }

    #[test]
    fn test_zero_page_size_is_raised() {
        let paginator = Paginator::new(0);
        assert_eq!(paginator.per_page(), 1);
        assert_eq!(paginator.num_pages(3), 3);
    }
}
