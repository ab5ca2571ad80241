//! Search-index query bodies.

use serde_json::{json, Map, Value as Json};

use super::errors::DialectResult;
use super::native::{NativeQuery, SearchRequest};
use super::{Dialect, QueryRenderer, RenderOptions};
use crate::compiler::{Comparison, CompiledQuery, Operator, Predicate, Projection};
use crate::config::CountMode;
use crate::descriptor::MatchMode;
use crate::paging::{CountStrategy, PageWindow};

/// Document id field; exclusions on it use an `ids` query.
const ID_FIELD: &str = "_id";

/// Largest `from + size` an index serves by default.
const MAX_RESULT_WINDOW: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct ElasticsearchRenderer {
    options: RenderOptions,
}

fn keyed(key: impl Into<String>, value: Json) -> Json {
    let mut map = Map::new();
    map.insert(key.into(), value);
    Json::Object(map)
}

fn escape_wildcard(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '*' | '?' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

impl ElasticsearchRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    fn pattern(&self, c: &Comparison, mode: MatchMode) -> Json {
        let term = c.pattern_term().unwrap_or_default();
        let (query, value) = match mode {
            MatchMode::Prefix => ("prefix", term.to_string()),
            _ => ("wildcard", format!("*{}*", escape_wildcard(term))),
        };
        keyed(
            query,
            keyed(
                c.field.clone(),
                json!({ "value": value, "case_insensitive": self.options.case_insensitive }),
            ),
        )
    }

    fn range(c: &Comparison, bound: &str) -> Json {
        let value = c.values.first().map(|v| v.to_json()).unwrap_or(Json::Null);
        keyed("range", keyed(c.field.clone(), keyed(bound, value)))
    }

    fn values(c: &Comparison) -> Json {
        Json::Array(c.values.iter().map(|v| v.to_json()).collect())
    }

    /// A positive clause. `NotIn` renders as the set it excludes.
    fn clause(&self, c: &Comparison) -> Json {
        match c.op {
            Operator::Eq => {
                let value = c.values.first().map(|v| v.to_json()).unwrap_or(Json::Null);
                keyed("term", keyed(c.field.clone(), value))
            }
            Operator::Gt => Self::range(c, "gt"),
            Operator::Gte => Self::range(c, "gte"),
            Operator::Lt => Self::range(c, "lt"),
            Operator::Lte => Self::range(c, "lte"),
            Operator::In | Operator::NotIn if c.field == ID_FIELD => {
                json!({ "ids": { "values": Self::values(c) } })
            }
            Operator::In | Operator::NotIn => keyed("terms", keyed(c.field.clone(), Self::values(c))),
            Operator::Like(mode) => self.pattern(c, mode),
        }
    }

    fn should(&self, group: &[Comparison]) -> Json {
        let clauses: Vec<Json> = group
            .iter()
            .map(|c| {
                if c.op == Operator::NotIn {
                    json!({ "bool": { "must_not": [self.clause(c)] } })
                } else {
                    self.clause(c)
                }
            })
            .collect();
        json!({ "bool": { "should": clauses, "minimum_should_match": 1 } })
    }

    pub fn query(&self, query: &CompiledQuery) -> Json {
        let mut must = Vec::new();
        let mut must_not = Vec::new();
        for predicate in &query.predicates {
            match predicate {
                Predicate::Compare(c) if c.op == Operator::NotIn => must_not.push(self.clause(c)),
                Predicate::Compare(c) => must.push(self.clause(c)),
                Predicate::AnyOf(group) => must.push(self.should(group)),
            }
        }

        if must.is_empty() && must_not.is_empty() {
            return json!({ "match_all": {} });
        }
        let mut bool_query = Map::new();
        if !must.is_empty() {
            bool_query.insert("must".into(), Json::Array(must));
        }
        if !must_not.is_empty() {
            bool_query.insert("must_not".into(), Json::Array(must_not));
        }
        keyed("bool", Json::Object(bool_query))
    }
}

impl QueryRenderer for ElasticsearchRenderer {
    fn dialect(&self) -> Dialect {
        Dialect::Elasticsearch
    }

    fn count_strategy(&self, _mode: CountMode) -> CountStrategy {
        CountStrategy::Inline
    }

    fn render(
        &self,
        query: &CompiledQuery,
        window: &PageWindow,
        _strategy: CountStrategy,
    ) -> DialectResult<NativeQuery> {
        let mut body = Map::new();
        body.insert("query".into(), self.query(query));
        body.insert("track_total_hits".into(), Json::Bool(true));

        if !query.sort.is_empty() {
            let sort: Vec<Json> = query
                .sort
                .iter()
                .map(|k| keyed(k.column.clone(), json!({ "order": k.direction.as_str() })))
                .collect();
            body.insert("sort".into(), Json::Array(sort));
        }
        if let Projection::Columns(columns) = &query.projection {
            body.insert("_source".into(), json!(columns));
        }
        match window {
            PageWindow::Offset { offset, limit } => {
                body.insert("from".into(), Json::from(*offset));
                body.insert("size".into(), Json::from(*limit));
            }
            PageWindow::Cursor {
                limit: Some(limit), ..
            } => {
                body.insert("size".into(), Json::from(*limit));
            }
            PageWindow::Cursor { limit: None, .. } | PageWindow::All => {
                body.insert("size".into(), Json::from(MAX_RESULT_WINDOW));
            }
        }

        Ok(NativeQuery::Search(SearchRequest {
            index: query.source.clone(),
            body: Json::Object(body),
        }))
    }

    fn render_count(&self, query: &CompiledQuery) -> DialectResult<NativeQuery> {
        Ok(NativeQuery::Search(SearchRequest {
            index: query.source.clone(),
            body: json!({
                "query": self.query(query),
                "size": 0,
                "track_total_hits": true
            }),
        }))
    }
}
