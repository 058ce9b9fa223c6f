use crate::utils::split_phrase;
use serde::{Deserialize, Serialize};

/// Search criteria as received from a caller.
///
/// Every field is optional. Present filters are combined with logical AND.
/// `createdAfter`/`createdBefore` are accepted in the payload but cannot be
/// evaluated; see [`SearchCriteria::unsupported_filter`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCriteria {
    /// Exact file name, extension included
    pub file_name: Option<String>,
    /// Inclusive lower size bound in bytes. Negative bounds admit every size.
    pub min_size: Option<i64>,
    /// Inclusive upper size bound in bytes. Negative bounds admit no size.
    pub max_size: Option<i64>,
    /// Space-separated words that must all occur in the content
    pub content_search_term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_after: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_before: Option<serde_json::Value>,
    /// File extension, compared case-insensitively
    pub file_type: Option<String>,
}

/// One active filter, normalized for evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter<'a> {
    Name(&'a str),
    /// Bounds as supplied, possibly negative
    Size { min: Option<i64>, max: Option<i64> },
    /// Lowercased words, all required
    Content(Vec<String>),
    FileType(&'a str),
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_min_size(mut self, min: i64) -> Self {
        self.min_size = Some(min);
        self
    }

    pub fn with_max_size(mut self, max: i64) -> Self {
        self.max_size = Some(max);
        self
    }

    pub fn with_content(mut self, phrase: impl Into<String>) -> Self {
        self.content_search_term = Some(phrase.into());
        self
    }

    pub fn with_file_type(mut self, ext: impl Into<String>) -> Self {
        self.file_type = Some(ext.into());
        self
    }

    /// Name of the first supplied field that has no evaluation semantics
    pub fn unsupported_filter(&self) -> Option<&'static str> {
        if self.created_after.is_some() {
            Some("createdAfter")
        } else if self.created_before.is_some() {
            Some("createdBefore")
        } else {
            None
        }
    }

    /// Active filters. Empty strings and phrases without words count as absent.
    pub fn filters(&self) -> Vec<Filter<'_>> {
        let mut filters = Vec::new();

        if let Some(name) = non_empty(&self.file_name) {
            filters.push(Filter::Name(name));
        }
        if self.min_size.is_some() || self.max_size.is_some() {
            filters.push(Filter::Size {
                min: self.min_size,
                max: self.max_size,
            });
        }
        if let Some(phrase) = non_empty(&self.content_search_term) {
            let words = split_phrase(phrase);
            if !words.is_empty() {
                filters.push(Filter::Content(words));
            }
        }
        if let Some(ext) = non_empty(&self.file_type) {
            filters.push(Filter::FileType(ext));
        }

        filters
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
