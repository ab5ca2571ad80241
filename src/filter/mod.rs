//! # Filter Model
//!
//! The data a caller hands in: scalar [`Value`]s, [`RangeValue`] bounds,
//! the per-field [`FieldValue`] a filter reports, the cross-cutting
//! [`SearchControls`], and the [`FilterEnvelope`] that carries a typed
//! filter together with its controls.

mod controls;
mod envelope;
mod field;
mod range;
mod value;

pub use controls::SearchControls;
pub use envelope::FilterEnvelope;
pub use field::{FieldValue, SearchFilter};
pub use range::{Bound, DateRange, IntRange, NumberRange, RangeValue, TimeRange};
pub use value::{FromValue, Value, ValueTypeError};
