//! sift - filter-to-query compilation with paging and counting
//!
//! A caller describes a search as a typed filter. sift resolves each
//! field's meaning once per type, compiles the filter into dialect-neutral
//! predicates, renders them for a relational, document, key/value or
//! search-index backend, and turns raw results back into typed pages.

pub mod cli;
pub mod compiler;
pub mod config;
pub mod descriptor;
pub mod dialect;
pub mod filter;
pub mod materialize;
pub mod paging;
pub mod search;

pub use compiler::{CompiledQuery, Compiler};
pub use config::SearchConfig;
pub use descriptor::{Describe, DescriptorCache, FieldDef};
pub use dialect::{Dialect, NativeQuery};
pub use filter::{FieldValue, FilterEnvelope, SearchControls, SearchFilter, Value};
pub use materialize::{Row, SearchRecord};
pub use search::{Executor, PageResult, RowSet, Searcher};
