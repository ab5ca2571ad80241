//! # Result Materialization
//!
//! Turns raw [`Row`]s into result records. Columns are matched to fields by
//! storage name or external name; columns with no field are ignored. When
//! the query carried a windowed count, the `total` column is consumed here
//! and never reaches the record.

mod errors;
mod row;

use std::collections::HashMap;

use tracing::trace;

use crate::descriptor::{Describe, DescriptorSet};
use crate::filter::{FromValue, Value, ValueTypeError};
use crate::paging::TOTAL_COLUMN;

pub use errors::{MaterializeError, MaterializeResult};
pub use row::Row;

/// A result type that can be filled field by field.
///
/// `index` is the position of the field in `field_defs()`.
pub trait SearchRecord: Describe + Default {
    fn set_field(&mut self, index: usize, value: Value) -> Result<(), ValueTypeError>;
}

/// Column name → field position for one result type.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    type_name: String,
    names: Vec<String>,
    positions: HashMap<String, usize>,
    case_insensitive: bool,
}

impl ColumnIndex {
    /// `case_insensitive` is for stores that fold column names (Oracle
    /// returns them upper-cased).
    pub fn build(descriptors: &DescriptorSet, case_insensitive: bool) -> Self {
        let key = |name: &str| {
            if case_insensitive {
                name.to_ascii_lowercase()
            } else {
                name.to_string()
            }
        };

        let mut positions = HashMap::new();
        for (i, field) in descriptors.fields().iter().enumerate() {
            positions.entry(key(&field.storage_name)).or_insert(i);
            positions.entry(key(&field.external_name)).or_insert(i);
        }

        Self {
            type_name: descriptors.type_name().to_string(),
            names: descriptors
                .fields()
                .iter()
                .map(|f| f.logical_name.clone())
                .collect(),
            positions,
            case_insensitive,
        }
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        if self.case_insensitive {
            self.positions.get(&column.to_ascii_lowercase()).copied()
        } else {
            self.positions.get(column).copied()
        }
    }
}

fn decode_total(value: Value) -> MaterializeResult<u64> {
    let count = i64::from_value(value).map_err(MaterializeError::Total)?;
    u64::try_from(count).map_err(|_| {
        MaterializeError::Total(ValueTypeError {
            expected: "count",
            found: "negative int",
        })
    })
}

/// Records of one page plus the total found in a windowed count column.
#[derive(Debug, Clone, PartialEq)]
pub struct Materialized<T> {
    pub items: Vec<T>,
    pub total: Option<u64>,
}

/// Build records from `rows`. With `windowed`, the `total` column of the
/// first row becomes the total.
pub fn materialize<T: SearchRecord>(
    rows: Vec<Row>,
    index: &ColumnIndex,
    windowed: bool,
) -> MaterializeResult<Materialized<T>> {
    let mut items = Vec::with_capacity(rows.len());
    let mut total = None;

    for mut row in rows {
        if windowed {
            if let Some(value) = row.take(TOTAL_COLUMN) {
                if total.is_none() {
                    total = Some(decode_total(value)?);
                }
            }
        }

        let mut item = T::default();
        for (column, value) in row.iter() {
            let Some(position) = index.position(column) else {
                trace!(type_name = %index.type_name, column, "ignoring unmapped column");
                continue;
            };
            item.set_field(position, value.clone())
                .map_err(|source| MaterializeError::Field {
                    type_name: index.type_name.clone(),
                    field: index.names[position].clone(),
                    column: column.to_string(),
                    source,
                })?;
        }
        items.push(item);
    }

    Ok(Materialized { items, total })
}
