//! Post list filtering.

use serde::Deserialize;

use super::types::PostCategory;

/// Filter criteria for post listings.
///
/// All criteria are optional and combined with AND; the keyword matches
/// against title and body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostSearchFilter {
    /// Restrict to one board section.
    pub category: Option<PostCategory>,
    /// Case-insensitive keyword over title and body.
    pub keyword: Option<String>,
}

impl PostSearchFilter {
    /// True when no criteria are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.normalized_keyword().is_none()
    }

    /// The keyword trimmed, with empty input treated as absent.
    #[must_use]
    pub fn normalized_keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter() {
        assert!(PostSearchFilter::default().is_empty());
        let blank_keyword = PostSearchFilter {
            category: None,
            keyword: Some("   ".to_string()),
        };
        assert!(blank_keyword.is_empty());
    }

    #[test]
    fn test_keyword_normalization() {
        let filter = PostSearchFilter {
            category: None,
            keyword: Some("  rust  ".to_string()),
        };
        assert_eq!(filter.normalized_keyword(), Some("rust"));
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_category_only_filter() {
        let filter = PostSearchFilter {
            category: Some(PostCategory::Photo),
            keyword: None,
        };
        assert!(!filter.is_empty());
    }
}
