//! Key/value-store condition expressions.

use std::collections::BTreeMap;

use serde_json::Value as Json;
use tracing::warn;

use super::errors::{DialectError, DialectResult};
use super::native::{ExpressionQuery, NativeQuery};
use super::{Dialect, QueryRenderer};
use crate::compiler::{Comparison, CompiledQuery, Operator, Predicate, Projection};
use crate::config::CountMode;
use crate::descriptor::MatchMode;
use crate::paging::{decode_token, CountStrategy, PageWindow};

#[derive(Debug, Clone, Default)]
pub struct DynamoDbRenderer;

/// Allocates `#nN` name and `:vN` value aliases.
#[derive(Default)]
struct Aliases {
    names: BTreeMap<String, String>,
    values: BTreeMap<String, Json>,
}

impl Aliases {
    fn name(&mut self, attribute: &str) -> String {
        if let Some((alias, _)) = self.names.iter().find(|(_, a)| a.as_str() == attribute) {
            return alias.clone();
        }
        let alias = format!("#n{}", self.names.len());
        self.names.insert(alias.clone(), attribute.to_string());
        alias
    }

    fn value(&mut self, value: Json) -> String {
        let alias = format!(":v{}", self.values.len());
        self.values.insert(alias.clone(), value);
        alias
    }
}

impl DynamoDbRenderer {
    pub fn new() -> Self {
        Self
    }

    fn comparison(c: &Comparison, aliases: &mut Aliases) -> String {
        let name = aliases.name(&c.field);
        let binary = |op: &str, aliases: &mut Aliases| {
            let value = c.values.first().map(|v| v.to_json()).unwrap_or(Json::Null);
            format!("{} {} {}", name, op, aliases.value(value))
        };
        let list = |aliases: &mut Aliases| {
            c.values
                .iter()
                .map(|v| aliases.value(v.to_json()))
                .collect::<Vec<_>>()
                .join(", ")
        };

        match c.op {
            Operator::Eq => binary("=", aliases),
            Operator::Gt => binary(">", aliases),
            Operator::Gte => binary(">=", aliases),
            Operator::Lt => binary("<", aliases),
            Operator::Lte => binary("<=", aliases),
            Operator::In => format!("{} IN ({})", name, list(aliases)),
            Operator::NotIn => format!("NOT ({} IN ({}))", name, list(aliases)),
            Operator::Like(mode) => {
                let term = aliases.value(Json::String(
                    c.pattern_term().unwrap_or_default().to_string(),
                ));
                match mode {
                    MatchMode::Prefix => format!("begins_with({}, {})", name, term),
                    _ => format!("contains({}, {})", name, term),
                }
            }
        }
    }

    fn predicate(p: &Predicate, aliases: &mut Aliases) -> String {
        match p {
            Predicate::Compare(c) => Self::comparison(c, aliases),
            Predicate::AnyOf(group) => {
                let parts: Vec<String> =
                    group.iter().map(|c| Self::comparison(c, aliases)).collect();
                format!("({})", parts.join(" OR "))
            }
        }
    }
}

impl QueryRenderer for DynamoDbRenderer {
    fn dialect(&self) -> Dialect {
        Dialect::DynamoDb
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
        let mut aliases = Aliases::default();
        let conditions: Vec<String> = query
            .predicates
            .iter()
            .map(|p| Self::predicate(p, &mut aliases))
            .collect();
        let filter_expression = (!conditions.is_empty()).then(|| conditions.join(" AND "));

        let projection_expression = match &query.projection {
            Projection::All => None,
            Projection::Columns(columns) => Some(
                columns
                    .iter()
                    .map(|c| aliases.name(c))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        };

        if !query.sort.is_empty() {
            warn!(table = %query.source, "scan results are unordered, ignoring sort");
        }

        let (limit, exclusive_start_key) = match window {
            PageWindow::Cursor { limit, token } => (*limit, decode_token(token.as_deref())?),
            PageWindow::Offset { limit, .. } => (Some(*limit), None),
            PageWindow::All => (None, None),
        };

        Ok(NativeQuery::Expression(ExpressionQuery {
            table: query.source.clone(),
            filter_expression,
            names: aliases.names,
            values: aliases.values,
            projection_expression,
            limit,
            exclusive_start_key,
        }))
    }

    fn render_count(&self, _query: &CompiledQuery) -> DialectResult<NativeQuery> {
        Err(DialectError::UnsupportedOperator {
            dialect: Dialect::DynamoDb.name(),
            operator: "count",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Value;
    use serde_json::json;

    fn render(query: &CompiledQuery, window: PageWindow) -> ExpressionQuery {
        let native = DynamoDbRenderer::new()
            .render(query, &window, CountStrategy::Cursor)
            .unwrap();
        native.as_expression().unwrap().clone()
    }

    #[test]
    fn test_expression_and_aliases() {
        let query = CompiledQuery::new("users")
            .with_predicate(Comparison::single("age", Operator::Gte, Value::Int(18)))
            .with_predicate(Comparison::single("age", Operator::Lt, Value::Int(65)))
            .with_predicate(Comparison::new(
                "id",
                Operator::NotIn,
                vec![Value::from("a"), Value::from("b")],
            ))
            .with_predicate(Predicate::AnyOf(vec![
                Comparison::matching("name", MatchMode::Prefix, "jo"),
                Comparison::matching("bio", MatchMode::Contains, "jo"),
            ]));

        let expr = render(&query, PageWindow::Cursor { limit: Some(10), token: None });
        assert_eq!(
            expr.filter_expression.as_deref(),
            Some(
                "#n0 >= :v0 AND #n0 < :v1 AND NOT (#n1 IN (:v2, :v3)) \
                 AND (begins_with(#n2, :v4) OR contains(#n3, :v5))"
            )
        );
        assert_eq!(expr.names.get("#n0").map(String::as_str), Some("age"));
        assert_eq!(expr.names.len(), 4);
        assert_eq!(expr.values.get(":v4"), Some(&json!("jo")));
        assert_eq!(expr.limit, Some(10));
        assert_eq!(expr.exclusive_start_key, None);
    }

    #[test]
    fn test_projection_and_start_key() {
        let query = CompiledQuery::new("users")
            .with_projection(Projection::Columns(vec!["id".into(), "name".into()]));
        let expr = render(
            &query,
            PageWindow::Cursor {
                limit: Some(5),
                token: Some("01ff".into()),
            },
        );
        assert_eq!(expr.filter_expression, None);
        assert_eq!(expr.projection_expression.as_deref(), Some("#n0, #n1"));
        assert_eq!(expr.exclusive_start_key, Some(vec![0x01, 0xff]));
    }

    #[test]
    fn test_count_unsupported() {
        let err = DynamoDbRenderer::new()
            .render_count(&CompiledQuery::new("users"))
            .unwrap_err();
        assert_eq!(err.code(), "SIFT_DIALECT_UNSUPPORTED");
    }
}
