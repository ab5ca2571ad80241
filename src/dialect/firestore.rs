//! Structured queries for document collections with typed values.
//!
//! Filters render as `fieldFilter`/`compositeFilter` trees. Paging resumes
//! after a document id carried in the page token.

use chrono::SecondsFormat;
use serde_json::{json, Map, Value as Json};

use super::errors::{DialectError, DialectResult};
use super::native::{NativeQuery, StructuredQuery};
use super::{Dialect, QueryRenderer};
use crate::compiler::{Comparison, CompiledQuery, Operator, Predicate, Projection, SortDirection};
use crate::config::CountMode;
use crate::descriptor::MatchMode;
use crate::filter::Value;
use crate::paging::{decode_token, CountStrategy, PageWindow, PagingError, TOTAL_COLUMN};

/// Upper bound appended to a prefix to close its range.
const PREFIX_END: char = '\u{f8ff}';

#[derive(Debug, Clone, Default)]
pub struct FirestoreRenderer;

fn typed(value: &Value) -> Json {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Int(i) => json!({ "integerValue": i.to_string() }),
        Value::Float(f) => json!({ "doubleValue": f }),
        Value::Text(s) => json!({ "stringValue": s }),
        Value::Time(_) | Value::Date(_) => match value.as_time() {
            Some(t) => json!({ "timestampValue": t.to_rfc3339_opts(SecondsFormat::AutoSi, true) }),
            None => json!({ "nullValue": null }),
        },
    }
}

fn field_filter(field: &str, op: &str, value: Json) -> Json {
    json!({
        "fieldFilter": {
            "field": { "fieldPath": field },
            "op": op,
            "value": value
        }
    })
}

/// A single filter stands alone; several are joined under `op`.
fn composite(op: &str, mut filters: Vec<Json>) -> Option<Json> {
    match filters.len() {
        0 => None,
        1 => filters.pop(),
        _ => Some(json!({ "compositeFilter": { "op": op, "filters": filters } })),
    }
}

/// Decode a page token into the id of the last document served.
fn resume_after(token: Option<&str>) -> DialectResult<Option<String>> {
    let Some(bytes) = decode_token(token)? else {
        return Ok(None);
    };
    String::from_utf8(bytes).map(Some).map_err(|err| {
        DialectError::Paging(PagingError::InvalidCursor {
            token: token.unwrap_or_default().to_string(),
            reason: err.to_string(),
        })
    })
}

impl FirestoreRenderer {
    pub fn new() -> Self {
        Self
    }

    fn comparison(c: &Comparison) -> DialectResult<Vec<Json>> {
        let single = || c.values.first().map(typed).unwrap_or(json!({ "nullValue": null }));
        let array = || json!({ "arrayValue": { "values": c.values.iter().map(typed).collect::<Vec<_>>() } });

        let filter = |op: &str, value: Json| vec![field_filter(&c.field, op, value)];
        let filters = match c.op {
            Operator::Eq => filter("EQUAL", single()),
            Operator::Gt => filter("GREATER_THAN", single()),
            Operator::Gte => filter("GREATER_THAN_OR_EQUAL", single()),
            Operator::Lt => filter("LESS_THAN", single()),
            Operator::Lte => filter("LESS_THAN_OR_EQUAL", single()),
            Operator::In => filter("IN", array()),
            Operator::NotIn => filter("NOT_IN", array()),
            Operator::Like(MatchMode::Prefix) => {
                let term = c.pattern_term().unwrap_or_default();
                vec![
                    field_filter(&c.field, "GREATER_THAN_OR_EQUAL", json!({ "stringValue": term })),
                    field_filter(
                        &c.field,
                        "LESS_THAN",
                        json!({ "stringValue": format!("{}{}", term, PREFIX_END) }),
                    ),
                ]
            }
            Operator::Like(_) => {
                return Err(DialectError::UnsupportedOperator {
                    dialect: Dialect::Firestore.name(),
                    operator: "contains",
                });
            }
        };
        Ok(filters)
    }

    fn any_of(group: &[Comparison]) -> DialectResult<Option<Json>> {
        let mut branches = Vec::with_capacity(group.len());
        for c in group {
            branches.extend(composite("AND", Self::comparison(c)?));
        }
        Ok(composite("OR", branches))
    }

    /// The `where` clause, if the query has predicates.
    pub fn filter(&self, query: &CompiledQuery) -> DialectResult<Option<Json>> {
        let mut filters = Vec::new();
        for predicate in &query.predicates {
            match predicate {
                // Prefix ranges flatten into the top-level conjunction.
                Predicate::Compare(c) => filters.extend(Self::comparison(c)?),
                Predicate::AnyOf(group) => filters.extend(Self::any_of(group)?),
            }
        }
        Ok(composite("AND", filters))
    }

    fn base(&self, query: &CompiledQuery) -> DialectResult<Map<String, Json>> {
        let mut body = Map::new();
        body.insert("from".into(), json!([{ "collectionId": query.source }]));
        if let Some(filter) = self.filter(query)? {
            body.insert("where".into(), filter);
        }
        Ok(body)
    }
}

impl QueryRenderer for FirestoreRenderer {
    fn dialect(&self) -> Dialect {
        Dialect::Firestore
    }

    fn count_strategy(&self, _mode: CountMode) -> CountStrategy {
        CountStrategy::Cursor
    }

    fn render(
        &self,
        query: &CompiledQuery,
        window: &PageWindow,
        _strategy: CountStrategy,
    ) -> DialectResult<NativeQuery> {
        let mut body = self.base(query)?;

        if !query.sort.is_empty() {
            let order: Vec<Json> = query
                .sort
                .iter()
                .map(|k| {
                    let direction = match k.direction {
                        SortDirection::Asc => "ASCENDING",
                        SortDirection::Desc => "DESCENDING",
                    };
                    json!({ "field": { "fieldPath": k.column }, "direction": direction })
                })
                .collect();
            body.insert("orderBy".into(), Json::Array(order));
        }
        if let Projection::Columns(columns) = &query.projection {
            let fields: Vec<Json> = columns.iter().map(|c| json!({ "fieldPath": c })).collect();
            body.insert("select".into(), json!({ "fields": fields }));
        }

        let mut start_after = None;
        match window {
            PageWindow::Cursor { limit, token } => {
                if let Some(limit) = limit {
                    body.insert("limit".into(), Json::from(*limit));
                }
                start_after = resume_after(token.as_deref())?;
            }
            PageWindow::Offset { offset, limit } => {
                body.insert("offset".into(), Json::from(*offset));
                body.insert("limit".into(), Json::from(*limit));
            }
            PageWindow::All => {}
        }

        Ok(NativeQuery::Structured(StructuredQuery {
            collection: query.source.clone(),
            body: json!({ "structuredQuery": Json::Object(body) }),
            start_after,
        }))
    }

    fn render_count(&self, query: &CompiledQuery) -> DialectResult<NativeQuery> {
        let body = self.base(query)?;
        Ok(NativeQuery::Structured(StructuredQuery {
            collection: query.source.clone(),
            body: json!({
                "structuredAggregationQuery": {
                    "structuredQuery": Json::Object(body),
                    "aggregations": [{ "alias": TOTAL_COLUMN, "count": {} }]
                }
            }),
            start_after: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::SortKey;
    use crate::paging::encode_token;
    use chrono::NaiveDate;

    fn render(query: &CompiledQuery, window: PageWindow) -> StructuredQuery {
        let native = FirestoreRenderer::new()
            .render(query, &window, CountStrategy::Cursor)
            .unwrap();
        native.as_structured().unwrap().clone()
    }

    #[test]
    fn test_field_filters() {
        let joined = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let query = CompiledQuery::new("users")
            .with_predicate(Comparison::single("age", Operator::Gte, Value::Int(18)))
            .with_predicate(Comparison::single("joined", Operator::Lt, Value::Date(joined)))
            .with_predicate(Comparison::new("tag", Operator::NotIn, vec![Value::from("spam")]));

        let filter = FirestoreRenderer::new().filter(&query).unwrap();
        assert_eq!(
            filter,
            Some(json!({"compositeFilter": {"op": "AND", "filters": [
                {"fieldFilter": {"field": {"fieldPath": "age"}, "op": "GREATER_THAN_OR_EQUAL",
                    "value": {"integerValue": "18"}}},
                {"fieldFilter": {"field": {"fieldPath": "joined"}, "op": "LESS_THAN",
                    "value": {"timestampValue": "2024-02-01T00:00:00Z"}}},
                {"fieldFilter": {"field": {"fieldPath": "tag"}, "op": "NOT_IN",
                    "value": {"arrayValue": {"values": [{"stringValue": "spam"}]}}}}
            ]}}))
        );
    }

    #[test]
    fn test_single_filter_stands_alone() {
        let query = CompiledQuery::new("users")
            .with_predicate(Comparison::single("status", Operator::Eq, Value::from("active")));
        assert_eq!(
            FirestoreRenderer::new().filter(&query).unwrap(),
            Some(json!({"fieldFilter": {"field": {"fieldPath": "status"}, "op": "EQUAL",
                "value": {"stringValue": "active"}}}))
        );
        assert_eq!(FirestoreRenderer::new().filter(&CompiledQuery::new("users")).unwrap(), None);
    }

    #[test]
    fn test_prefix_is_a_range() {
        let query = CompiledQuery::new("users").with_predicate(Predicate::AnyOf(vec![
            Comparison::matching("name", MatchMode::Prefix, "jo"),
            Comparison::matching("email", MatchMode::Equal, "jo"),
        ]));
        let filter = FirestoreRenderer::new().filter(&query).unwrap().unwrap();
        let branches = &filter["compositeFilter"]["filters"];
        assert_eq!(filter["compositeFilter"]["op"], json!("OR"));
        assert_eq!(branches[0]["compositeFilter"]["op"], json!("AND"));
        assert_eq!(
            branches[0]["compositeFilter"]["filters"][1]["fieldFilter"]["value"],
            json!({"stringValue": "jo\u{f8ff}"})
        );
        assert_eq!(branches[1]["fieldFilter"]["op"], json!("EQUAL"));
    }

    #[test]
    fn test_contains_unsupported() {
        let query = CompiledQuery::new("users")
            .with_predicate(Comparison::matching("name", MatchMode::Contains, "jo"));
        let err = FirestoreRenderer::new()
            .render(&query, &PageWindow::All, CountStrategy::Cursor)
            .unwrap_err();
        assert_eq!(err.code(), "SIFT_DIALECT_UNSUPPORTED");
    }

    #[test]
    fn test_cursor_resumes_after_document() {
        let query = CompiledQuery::new("users")
            .with_sort(vec![SortKey::desc("created")])
            .with_projection(Projection::Columns(vec!["name".into()]));
        let request = render(
            &query,
            PageWindow::Cursor {
                limit: Some(20),
                token: Some(encode_token(b"doc-42")),
            },
        );

        assert_eq!(request.collection, "users");
        assert_eq!(request.start_after.as_deref(), Some("doc-42"));
        let body = &request.body["structuredQuery"];
        assert_eq!(body["from"], json!([{"collectionId": "users"}]));
        assert_eq!(body["limit"], json!(20));
        assert_eq!(
            body["orderBy"],
            json!([{"field": {"fieldPath": "created"}, "direction": "DESCENDING"}])
        );
        assert_eq!(body["select"], json!({"fields": [{"fieldPath": "name"}]}));
    }

    #[test]
    fn test_non_utf8_token() {
        let window = PageWindow::Cursor {
            limit: Some(5),
            token: Some("ff".into()),
        };
        let err = FirestoreRenderer::new()
            .render(&CompiledQuery::new("users"), &window, CountStrategy::Cursor)
            .unwrap_err();
        assert_eq!(err.code(), "SIFT_CURSOR_INVALID");
    }

    #[test]
    fn test_count_aggregation() {
        let native = FirestoreRenderer::new()
            .render_count(&CompiledQuery::new("users"))
            .unwrap();
        let body = &native.as_structured().unwrap().body;
        assert_eq!(
            body["structuredAggregationQuery"]["aggregations"],
            json!([{"alias": "total", "count": {}}])
        );
    }
}
