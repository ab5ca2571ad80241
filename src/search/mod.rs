//! # Search Service
//!
//! [`Searcher`] runs the whole pipeline for one filter/result type pair:
//! descriptors from the cache, compilation, rendering for the configured
//! dialect, execution through an [`Executor`], materialization and paging.
//!
//! With separate counting, the page query and the count query are issued
//! concurrently. A failed count never fails the search; the page comes back
//! with a total of 0.

mod errors;
mod executor;
mod searcher;

pub use errors::{CountError, SearchError, SearchResult};
pub use executor::{Executor, ExecutorError, RowSet};
pub use searcher::{PageResult, Searcher};
