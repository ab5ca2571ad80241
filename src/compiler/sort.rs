//! Sort spec resolution (`-a,+b` syntax).

use serde::Serialize;
use tracing::warn;

use crate::descriptor::DescriptorSet;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// `1` / `-1`, as document stores spell it.
    pub fn signum(&self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

/// One resolved sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortKey {
    /// Storage name
    pub column: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Parse a comma-separated sort spec against `descriptors`.
///
/// A leading `-` sorts descending, `+` or nothing ascending. Tokens that do
/// not resolve to a field are dropped.
pub fn resolve_sort(spec: &str, descriptors: &DescriptorSet) -> Vec<SortKey> {
    let mut keys = Vec::new();
    for token in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let (direction, name) = match token.as_bytes()[0] {
            b'-' => (SortDirection::Desc, token[1..].trim()),
            b'+' => (SortDirection::Asc, token[1..].trim()),
            _ => (SortDirection::Asc, token),
        };

        match descriptors.storage_name(name) {
            Some(column) => keys.push(SortKey {
                column: column.to_string(),
                direction,
            }),
            None => warn!(
                type_name = descriptors.type_name(),
                token, "dropping unknown sort field"
            ),
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldDef;

    fn descriptors() -> DescriptorSet {
        DescriptorSet::build(
            "User",
            vec![
                FieldDef::text("name").column("user_name"),
                FieldDef::time("created_at").json("createdAt"),
                FieldDef::int("age"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_directions_and_names() {
        let keys = resolve_sort("-createdAt, +name,age", &descriptors());
        assert_eq!(
            keys,
            vec![
                SortKey::desc("createdAt"),
                SortKey::asc("user_name"),
                SortKey::asc("age"),
            ]
        );
    }

    #[test]
    fn test_unknown_tokens_dropped() {
        let keys = resolve_sort("-nope,name,,+", &descriptors());
        assert_eq!(keys, vec![SortKey::asc("user_name")]);
    }

    #[test]
    fn test_empty_spec() {
        assert!(resolve_sort("", &descriptors()).is_empty());
    }
}
