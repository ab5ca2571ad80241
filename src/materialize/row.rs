//! Raw result rows.

use chrono::{DateTime, Utc};
use serde_json::Value as Json;

use crate::filter::Value;

/// One result row: `(column, value)` pairs in the order the store returned
/// them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((column.into(), value.into()));
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    /// Look up a column by its exact name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Remove a column, case-insensitively.
    pub fn take(&mut self, column: &str) -> Option<Value> {
        let index = self
            .columns
            .iter()
            .position(|(name, _)| name.eq_ignore_ascii_case(column))?;
        Some(self.columns.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// A row from a JSON document. Returns `None` for non-objects.
    pub fn from_document(document: &Json) -> Option<Row> {
        let object = document.as_object()?;
        let mut row = Row::new();
        for (key, value) in object {
            row.push(key.clone(), document_value(value));
        }
        Some(row)
    }

    /// A row from a search hit's `_source`, with the hit id stored under
    /// `id_column` unless the source already carries it.
    pub fn from_search_hit(hit: &Json, id_column: &str) -> Option<Row> {
        let mut row = Row::from_document(hit.get("_source")?)?;
        if row.get(id_column).is_none() {
            if let Some(id) = hit.get("_id") {
                row.push(id_column, document_value(id));
            }
        }
        Some(row)
    }
}

/// Scalars convert directly; `{"$date"}` and `{"$oid"}` wrappers unwrap;
/// other nested values are kept as their JSON text.
fn document_value(json: &Json) -> Value {
    if let Some(value) = Value::from_json(json) {
        return value;
    }
    if let Some(date) = json.get("$date").and_then(Json::as_str) {
        if let Ok(t) = DateTime::parse_from_rfc3339(date) {
            return Value::Time(t.with_timezone(&Utc));
        }
    }
    if let Some(oid) = json.get("$oid").and_then(Json::as_str) {
        return Value::from(oid);
    }
    Value::Text(json.to_string())
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_take_is_case_insensitive() {
        let mut row = Row::new().with("TOTAL", 12i64).with("NAME", "ann");
        assert_eq!(row.take("total"), Some(Value::Int(12)));
        assert_eq!(row.len(), 1);
        assert_eq!(row.take("total"), None);
    }

    #[test]
    fn test_from_document() {
        let row = Row::from_document(&json!({
            "_id": {"$oid": "65a1"},
            "name": "ann",
            "age": 31,
            "created": {"$date": "2024-01-02T03:04:05Z"},
            "tags": ["a", "b"]
        }))
        .unwrap();

        assert_eq!(row.get("_id"), Some(&Value::from("65a1")));
        assert_eq!(row.get("age"), Some(&Value::Int(31)));
        assert_eq!(
            row.get("created"),
            Some(&Value::Time(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()))
        );
        assert_eq!(row.get("tags"), Some(&Value::from(r#"["a","b"]"#)));
        assert!(Row::from_document(&json!([1])).is_none());
    }

    #[test]
    fn test_from_search_hit() {
        let hit = json!({"_id": "u1", "_source": {"name": "ann"}});
        let row = Row::from_search_hit(&hit, "id").unwrap();
        assert_eq!(row.get("id"), Some(&Value::from("u1")));
        assert_eq!(row.get("name"), Some(&Value::from("ann")));
    }
}
