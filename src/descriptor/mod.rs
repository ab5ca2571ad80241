//! # Field Descriptors
//!
//! Resolves, once per type, what each declared field means: its storage
//! name, its [`SemanticKind`], and its default [`MatchMode`].
//!
//! Types declare fields through [`Describe::field_defs`]; the declarations
//! are validated into a [`DescriptorSet`], and a [`DescriptorCache`] keeps
//! one set per type for the life of the cache. Contradictory metadata is a
//! [`DescriptorError`], never a panic.

mod cache;
mod descriptor;
mod errors;
mod field;
mod kind;

pub use cache::DescriptorCache;
pub use descriptor::{Describe, DescriptorSet, FieldDescriptor};
pub use errors::{DescriptorError, DescriptorResult};
pub use field::{parse_tags, FieldAttr, FieldDef, FieldType};
pub use kind::{MatchMode, SemanticKind};
