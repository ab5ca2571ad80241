//! Request envelope: a typed filter plus its search controls.

use serde::{Deserialize, Serialize};

use super::controls::SearchControls;

/// A decoded search request.
///
/// Both parts are flattened, so a request body such as
/// `{"title": "rust", "pageIndex": 2, "pageSize": 10}` decodes directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterEnvelope<F> {
    #[serde(flatten)]
    pub filter: F,

    #[serde(flatten)]
    pub controls: SearchControls,
}

impl<F> FilterEnvelope<F> {
    /// Wrap `filter` with default controls.
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            controls: SearchControls::default(),
        }
    }

    pub fn with_controls(mut self, controls: SearchControls) -> Self {
        self.controls = controls;
        self
    }

    pub fn with_page(mut self, page_index: u64, page_size: u64) -> Self {
        self.controls = self.controls.with_page(page_index, page_size);
        self
    }

    pub fn with_first_page_size(mut self, size: u64) -> Self {
        self.controls = self.controls.with_first_page_size(size);
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.controls = self.controls.with_sort(sort);
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.controls = self.controls.with_keyword(keyword);
        self
    }
}
