//! # Predicate Compiler
//!
//! Turns a filter's field values into an ordered, dialect-neutral
//! [`CompiledQuery`]: predicates, index-aligned parameters, resolved sort
//! keys and projection.
//!
//! Any upstream engine that already produces predicates (for example a
//! query template renderer) can build a [`CompiledQuery`] directly with
//! [`CompiledQuery::with_predicate`] and hand it to a renderer.

mod compiler;
mod errors;
mod predicate;
mod projection;
mod query;
mod sort;

pub use compiler::Compiler;
pub use errors::{CompileError, CompileResult};
pub use predicate::{Comparison, Operator, Predicate};
pub use projection::{resolve_projection, Projection};
pub use query::CompiledQuery;
pub use sort::{resolve_sort, SortDirection, SortKey};
