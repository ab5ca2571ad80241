//! Page position and last-page arithmetic.

use serde::Serialize;

use crate::filter::SearchControls;

/// How the total for a page is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountStrategy {
    /// A second query derived from the main one
    Separate,
    /// A `count(*) over()` column on the main query
    Windowed,
    /// The store reports the total alongside the page
    Inline,
    /// No total; paging follows an opaque continuation token
    Cursor,
}

/// The slice of results a rendered query asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PageWindow {
    All,
    Offset { offset: u64, limit: u64 },
    Cursor { limit: Option<u64>, token: Option<String> },
}

/// A normalized page request.
///
/// `page_index` is 1-based. `page_size == 0` means "return everything";
/// any other size has been clamped to `[1, max_page_size]`.
/// `first_page_size == 0` means page 1 uses the regular size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page_index: u64,
    pub page_size: u64,
    pub first_page_size: u64,
}

impl PageRequest {
    /// Page `page_index` (1-based) of `page_size` items. Size 0 means
    /// everything.
    pub fn new(page_index: u64, page_size: u64) -> Self {
        Self {
            page_index: page_index.max(1),
            page_size,
            first_page_size: 0,
        }
    }

    /// Serve `first_page_size` items on page 1 instead of `page_size`.
    pub fn with_first_page_size(mut self, first_page_size: u64) -> Self {
        self.first_page_size = first_page_size;
        self
    }

    /// Read paging controls, filling gaps with `default_page_size` and
    /// clamping to `max_page_size`.
    pub fn from_controls(controls: &SearchControls, default_page_size: u64, max_page_size: u64) -> Self {
        Self::new(
            controls.page_index.unwrap_or(1),
            controls.page_size.unwrap_or(default_page_size),
        )
        .with_first_page_size(controls.first_page_size.unwrap_or(0))
        .clamped(max_page_size)
    }

    /// Clamp non-zero sizes into `[1, max_page_size]`.
    pub fn clamped(self, max_page_size: u64) -> Self {
        let max = max_page_size.max(1);
        let clamp = |size: u64| if size == 0 { 0 } else { size.min(max) };
        Self {
            page_index: self.page_index.max(1),
            page_size: clamp(self.page_size),
            first_page_size: clamp(self.first_page_size),
        }
    }

    /// No paging applies.
    pub fn is_unbounded(&self) -> bool {
        self.page_size == 0
    }

    fn uses_first_page(&self) -> bool {
        self.first_page_size > 0
    }

    /// Rows to fetch for this page.
    pub fn limit(&self) -> u64 {
        if self.uses_first_page() && self.page_index == 1 {
            self.first_page_size
        } else {
            self.page_size
        }
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> u64 {
        if self.uses_first_page() {
            if self.page_index == 1 {
                0
            } else {
                self.page_size
                    .saturating_mul(self.page_index - 2)
                    .saturating_add(self.first_page_size)
            }
        } else {
            self.page_size.saturating_mul(self.page_index - 1)
        }
    }

    /// Items delivered up to and including this page.
    pub fn received_items(&self, items_in_page: u64) -> u64 {
        if self.uses_first_page() {
            if self.page_index == 1 {
                self.first_page_size
            } else {
                self.first_page_size
                    .saturating_add(self.page_size.saturating_mul(self.page_index - 2))
                    .saturating_add(items_in_page)
            }
        } else {
            self.page_size
                .saturating_mul(self.page_index - 1)
                .saturating_add(items_in_page)
        }
    }

    /// Whether no items remain after this page.
    pub fn is_last_page(&self, total: u64, items_in_page: u64) -> bool {
        if self.is_unbounded() {
            return true;
        }
        self.received_items(items_in_page) >= total
    }

    /// The window a renderer should ask for.
    pub fn window(&self, strategy: CountStrategy, token: Option<String>) -> PageWindow {
        match strategy {
            CountStrategy::Cursor => PageWindow::Cursor {
                limit: (!self.is_unbounded()).then(|| self.limit()),
                token,
            },
            _ if self.is_unbounded() => PageWindow::All,
            _ => PageWindow::Offset {
                offset: self.offset(),
                limit: self.limit(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_offsets() {
        let page = PageRequest::new(3, 20);
        assert_eq!(page.limit(), 20);
        assert_eq!(page.offset(), 40);
        assert_eq!(PageRequest::new(1, 20).offset(), 0);
    }

    #[test]
    fn test_first_page_quota() {
        let first = PageRequest::new(1, 10).with_first_page_size(5);
        assert_eq!((first.offset(), first.limit()), (0, 5));

        let second = PageRequest::new(2, 10).with_first_page_size(5);
        assert_eq!((second.offset(), second.limit()), (5, 10));

        let third = PageRequest::new(3, 10).with_first_page_size(5);
        assert_eq!((third.offset(), third.limit()), (15, 10));
    }

    #[test]
    fn test_is_last_page() {
        assert!(PageRequest::new(2, 10).is_last_page(15, 5));
        assert!(!PageRequest::new(1, 10).is_last_page(15, 10));
        assert!(PageRequest::new(1, 10).is_last_page(0, 0));

        let first = PageRequest::new(1, 10).with_first_page_size(5);
        assert!(!first.is_last_page(12, 5));
        assert!(first.is_last_page(4, 4));

        let second = PageRequest::new(2, 10).with_first_page_size(5);
        assert_eq!(second.received_items(7), 12);
        assert!(second.is_last_page(12, 7));
    }

    #[test]
    fn test_unbounded_is_always_last() {
        let page = PageRequest::new(1, 0);
        assert!(page.is_unbounded());
        assert!(page.is_last_page(1_000, 3));
        assert_eq!(page.window(CountStrategy::Separate, None), PageWindow::All);
    }

    #[test]
    fn test_clamping() {
        let page = PageRequest::new(0, 5_000).with_first_page_size(2_000).clamped(100);
        assert_eq!(page.page_index, 1);
        assert_eq!(page.page_size, 100);
        assert_eq!(page.first_page_size, 100);
        assert_eq!(PageRequest::new(1, 0).clamped(100).page_size, 0);
    }

    #[test]
    fn test_from_controls_defaults() {
        let controls = SearchControls::default();
        let page = PageRequest::from_controls(&controls, 20, 1000);
        assert_eq!(page, PageRequest::new(1, 20));

        let controls = SearchControls::new().with_page(4, 0);
        assert!(PageRequest::from_controls(&controls, 20, 1000).is_unbounded());
    }

    #[test]
    fn test_windows() {
        let page = PageRequest::new(2, 10);
        assert_eq!(
            page.window(CountStrategy::Windowed, None),
            PageWindow::Offset { offset: 10, limit: 10 }
        );
        assert_eq!(
            page.window(CountStrategy::Cursor, Some("ab".into())),
            PageWindow::Cursor {
                limit: Some(10),
                token: Some("ab".into())
            }
        );
    }
}
