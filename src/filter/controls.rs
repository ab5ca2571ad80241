//! Cross-cutting search controls: paging, sort, projection, exclusion
//! and the free-text keyword.
//!
//! The same struct appears twice in a request: flattened into the
//! [`FilterEnvelope`](super::FilterEnvelope) and, optionally, as a nested
//! sub-filter field inside the filter itself. [`SearchControls::merged`]
//! folds the two together.

use serde::{Deserialize, Serialize};

use super::value::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchControls {
    /// 1-based page index
    #[serde(default, alias = "page", skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u64>,

    /// Items per page; `0` returns everything
    #[serde(default, alias = "limit", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,

    /// Distinct quota for the first page
    #[serde(default, alias = "firstLimit", skip_serializing_if = "Option::is_none")]
    pub first_page_size: Option<u64>,

    /// Sort spec, e.g. `-createdAt,+name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,

    /// Requested output fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,

    /// Primary-key values to leave out of the result
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluding: Vec<Value>,

    /// Quick-search keyword
    #[serde(default, alias = "q", skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,

    /// Continuation token for cursor-paged stores
    #[serde(
        default,
        alias = "next",
        alias = "refId",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_page_token: Option<String>,
}

impl SearchControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page_index: u64, page_size: u64) -> Self {
        self.page_index = Some(page_index);
        self.page_size = Some(page_size);
        self
    }

    pub fn with_first_page_size(mut self, size: u64) -> Self {
        self.first_page_size = Some(size);
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_excluding<I, V>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.excluding = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn with_next_page_token(mut self, token: impl Into<String>) -> Self {
        self.next_page_token = Some(token.into());
        self
    }

    /// Non-empty keyword, if any.
    pub fn keyword(&self) -> Option<&str> {
        non_empty(&self.keyword)
    }

    /// Non-empty sort spec, if any.
    pub fn sort(&self) -> Option<&str> {
        non_empty(&self.sort)
    }

    /// Fill every unset control in `self` from `fallback`.
    pub fn merged(&self, fallback: &SearchControls) -> SearchControls {
        SearchControls {
            page_index: self.page_index.or(fallback.page_index),
            page_size: self.page_size.or(fallback.page_size),
            first_page_size: self.first_page_size.or(fallback.first_page_size),
            sort: pick(&self.sort, &fallback.sort),
            fields: if self.fields.is_empty() {
                fallback.fields.clone()
            } else {
                self.fields.clone()
            },
            excluding: if self.excluding.is_empty() {
                fallback.excluding.clone()
            } else {
                self.excluding.clone()
            },
            keyword: pick(&self.keyword, &fallback.keyword),
            next_page_token: pick(&self.next_page_token, &fallback.next_page_token),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

fn pick(primary: &Option<String>, fallback: &Option<String>) -> Option<String> {
    non_empty(primary)
        .or_else(|| non_empty(fallback))
        .map(str::to_string)
}
