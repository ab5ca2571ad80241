//! Document-store filter rendering.

use serde_json::{json, Map, Value as Json};

use super::errors::DialectResult;
use super::native::{DocumentOperation, DocumentQuery, NativeQuery};
use super::{Dialect, QueryRenderer, RenderOptions};
use crate::compiler::{Comparison, CompiledQuery, Operator, Predicate, Projection};
use crate::config::CountMode;
use crate::descriptor::MatchMode;
use crate::filter::Value;
use crate::paging::{CountStrategy, PageWindow};

#[derive(Debug, Clone)]
pub struct MongoRenderer {
    options: RenderOptions,
}

fn keyed(key: impl Into<String>, value: Json) -> Json {
    let mut map = Map::new();
    map.insert(key.into(), value);
    Json::Object(map)
}

/// Times and dates bind as BSON dates; dates at midnight UTC.
fn bson(value: &Value) -> Json {
    match value.as_time() {
        Some(t) => json!({ "$date": t.to_rfc3339() }),
        None => value.to_json(),
    }
}

impl MongoRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    fn regex(&self, c: &Comparison, mode: MatchMode) -> Json {
        let term = regex::escape(c.pattern_term().unwrap_or_default());
        let pattern = match mode {
            MatchMode::Prefix => format!("^{}", term),
            _ => term,
        };
        let mut clause = Map::new();
        clause.insert("$regex".into(), Json::String(pattern));
        if self.options.case_insensitive {
            clause.insert("$options".into(), Json::String("i".into()));
        }
        Json::Object(clause)
    }

    fn comparison(&self, c: &Comparison) -> Json {
        let single = || c.values.first().map(bson).unwrap_or(Json::Null);
        let list = || Json::Array(c.values.iter().map(bson).collect());
        let condition = match c.op {
            Operator::Eq => single(),
            Operator::Gt => keyed("$gt", single()),
            Operator::Gte => keyed("$gte", single()),
            Operator::Lt => keyed("$lt", single()),
            Operator::Lte => keyed("$lte", single()),
            Operator::In => keyed("$in", list()),
            Operator::NotIn => keyed("$nin", list()),
            Operator::Like(mode) => self.regex(c, mode),
        };
        keyed(c.field.clone(), condition)
    }

    fn predicate(&self, p: &Predicate) -> Json {
        match p {
            Predicate::Compare(c) => self.comparison(c),
            Predicate::AnyOf(group) => keyed(
                "$or",
                Json::Array(group.iter().map(|c| self.comparison(c)).collect()),
            ),
        }
    }

    /// `{}` with no predicates, the bare clause for one, `$and` otherwise.
    pub fn filter(&self, query: &CompiledQuery) -> Json {
        let mut clauses: Vec<Json> = query.predicates.iter().map(|p| self.predicate(p)).collect();
        match clauses.len() {
            0 => Json::Object(Map::new()),
            1 => clauses.remove(0),
            _ => keyed("$and", Json::Array(clauses)),
        }
    }

    fn projection(query: &CompiledQuery) -> Option<Json> {
        match &query.projection {
            Projection::All => None,
            Projection::Columns(columns) => {
                let map: Map<String, Json> =
                    columns.iter().map(|c| (c.clone(), Json::from(1))).collect();
                Some(Json::Object(map))
            }
        }
    }
}

impl QueryRenderer for MongoRenderer {
    fn dialect(&self) -> Dialect {
        Dialect::Mongo
    }

    fn count_strategy(&self, _mode: CountMode) -> CountStrategy {
        CountStrategy::Separate
    }

    fn render(
        &self,
        query: &CompiledQuery,
        window: &PageWindow,
        _strategy: CountStrategy,
    ) -> DialectResult<NativeQuery> {
        let (skip, limit) = match window {
            PageWindow::Offset { offset, limit } => (Some(*offset), Some(*limit)),
            PageWindow::Cursor { limit, .. } => (None, *limit),
            PageWindow::All => (None, None),
        };

        Ok(NativeQuery::Document(DocumentQuery {
            collection: query.source.clone(),
            operation: DocumentOperation::Find,
            filter: self.filter(query),
            projection: Self::projection(query),
            sort: query
                .sort
                .iter()
                .map(|k| (k.column.clone(), k.direction.signum()))
                .collect(),
            skip,
            limit,
        }))
    }

    fn render_count(&self, query: &CompiledQuery) -> DialectResult<NativeQuery> {
        Ok(NativeQuery::Document(DocumentQuery {
            collection: query.source.clone(),
            operation: DocumentOperation::Count,
            filter: self.filter(query),
            projection: None,
            sort: Vec::new(),
            skip: None,
            limit: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::SortKey;
    use chrono::{TimeZone, Utc};

    fn renderer() -> MongoRenderer {
        MongoRenderer::new(RenderOptions::default())
    }

    #[test]
    fn test_empty_filter() {
        let query = CompiledQuery::new("users");
        assert_eq!(renderer().filter(&query), json!({}));
    }

    #[test]
    fn test_single_clause_stands_alone() {
        let query = CompiledQuery::new("users")
            .with_predicate(Comparison::single("age", Operator::Gte, Value::Int(18)));
        assert_eq!(renderer().filter(&query), json!({"age": {"$gte": 18}}));
    }

    #[test]
    fn test_operators_and_groups() {
        let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let query = CompiledQuery::new("users")
            .with_predicate(Comparison::single("status", Operator::Eq, Value::from("active")))
            .with_predicate(Comparison::single("created", Operator::Lt, Value::Time(since)))
            .with_predicate(Comparison::new("_id", Operator::NotIn, vec![Value::Int(7)]))
            .with_predicate(Predicate::AnyOf(vec![
                Comparison::matching("name", MatchMode::Contains, "a.b"),
                Comparison::matching("email", MatchMode::Prefix, "a.b"),
            ]));

        assert_eq!(
            renderer().filter(&query),
            json!({"$and": [
                {"status": "active"},
                {"created": {"$lt": {"$date": "2024-01-01T00:00:00+00:00"}}},
                {"_id": {"$nin": [7]}},
                {"$or": [
                    {"name": {"$regex": "a\\.b", "$options": "i"}},
                    {"email": {"$regex": "^a\\.b", "$options": "i"}}
                ]}
            ]})
        );
    }

    #[test]
    fn test_date_bounds_bind_as_dates() {
        let from = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let until = chrono::NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let query = CompiledQuery::new("users")
            .with_predicate(Comparison::single("joined", Operator::Gte, Value::Date(from)))
            .with_predicate(Comparison::single("joined", Operator::Lt, Value::Date(until)));

        assert_eq!(
            renderer().filter(&query),
            json!({"$and": [
                {"joined": {"$gte": {"$date": "2024-03-01T00:00:00+00:00"}}},
                {"joined": {"$lt": {"$date": "2024-04-01T00:00:00+00:00"}}}
            ]})
        );
    }

    #[test]
    fn test_case_sensitive_regex() {
        let renderer = MongoRenderer::new(RenderOptions {
            case_insensitive: false,
        });
        let query = CompiledQuery::new("users")
            .with_predicate(Comparison::matching("name", MatchMode::Prefix, "jo"));
        assert_eq!(renderer.filter(&query), json!({"name": {"$regex": "^jo"}}));
    }

    #[test]
    fn test_find_with_paging_sort_and_projection() {
        let query = CompiledQuery::new("users")
            .with_sort(vec![SortKey::desc("created"), SortKey::asc("name")])
            .with_projection(Projection::Columns(vec!["name".into()]));
        let native = renderer()
            .render(
                &query,
                &PageWindow::Offset {
                    offset: 20,
                    limit: 10,
                },
                CountStrategy::Separate,
            )
            .unwrap();
        let doc = native.as_document().unwrap();
        assert_eq!(doc.operation, DocumentOperation::Find);
        assert_eq!(doc.sort, vec![("created".to_string(), -1), ("name".to_string(), 1)]);
        assert_eq!(doc.projection, Some(json!({"name": 1})));
        assert_eq!((doc.skip, doc.limit), (Some(20), Some(10)));
    }

    #[test]
    fn test_count_query() {
        let query = CompiledQuery::new("users")
            .with_predicate(Comparison::single("age", Operator::Gt, Value::Int(1)))
            .with_sort(vec![SortKey::asc("name")]);
        let native = renderer().render_count(&query).unwrap();
        let doc = native.as_document().unwrap();
        assert_eq!(doc.operation, DocumentOperation::Count);
        assert_eq!(doc.filter, json!({"age": {"$gt": 1}}));
        assert!(doc.sort.is_empty());
    }
}
