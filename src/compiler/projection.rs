//! Projection resolution.

use serde::Serialize;
use tracing::warn;

use crate::descriptor::DescriptorSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    All,
    Columns(Vec<String>),
}

impl Projection {
    pub fn is_all(&self) -> bool {
        matches!(self, Projection::All)
    }

    pub fn columns(&self) -> &[String] {
        match self {
            Projection::All => &[],
            Projection::Columns(columns) => columns,
        }
    }
}

/// Translate requested output fields into storage names.
///
/// Unknown names are dropped. No request, or nothing that resolves, means
/// all columns.
pub fn resolve_projection(fields: &[String], descriptors: &DescriptorSet) -> Projection {
    let mut columns: Vec<String> = Vec::new();
    for field in fields.iter().map(|f| f.trim()).filter(|f| !f.is_empty()) {
        match descriptors.storage_name(field) {
            Some(column) if !columns.iter().any(|c| c == column) => columns.push(column.to_string()),
            Some(_) => {}
            None => warn!(
                type_name = descriptors.type_name(),
                field, "dropping unknown projection field"
            ),
        }
    }

    if columns.is_empty() {
        Projection::All
    } else {
        Projection::Columns(columns)
    }
}
