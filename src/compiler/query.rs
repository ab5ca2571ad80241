//! Compiled query representation.

use super::predicate::Predicate;
use super::projection::Projection;
use super::sort::SortKey;
use crate::filter::Value;

/// Output of compilation, independent of any dialect.
///
/// `parameters` is the flattened list of every predicate's values in
/// emission order. Renderers walk `predicates` and allocate placeholders as
/// they go, so placeholder order always matches `parameters`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Table, collection or index name
    pub source: String,
    /// AND-combined predicates
    pub predicates: Vec<Predicate>,
    pub parameters: Vec<Value>,
    pub sort: Vec<SortKey>,
    pub projection: Projection,
    /// Raw join clauses, SQL dialects only
    pub joins: Vec<String>,
    pub distinct: bool,
}

impl CompiledQuery {
    /// An unfiltered query over `source`.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            predicates: Vec::new(),
            parameters: Vec::new(),
            sort: Vec::new(),
            projection: Projection::All,
            joins: Vec::new(),
            distinct: false,
        }
    }

    /// Append a predicate and its values.
    pub fn with_predicate(mut self, predicate: impl Into<Predicate>) -> Self {
        self.push(predicate.into());
        self
    }

    pub fn with_sort(mut self, sort: Vec<SortKey>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_joins(mut self, joins: Vec<String>) -> Self {
        self.joins = joins;
        self
    }

    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub(crate) fn push(&mut self, predicate: Predicate) {
        self.parameters.extend(predicate.values().cloned());
        self.predicates.push(predicate);
    }

    /// Whether any predicate applies.
    pub fn has_predicates(&self) -> bool {
        !self.predicates.is_empty()
    }

    /// Whether any predicate mentions `column`.
    pub fn references(&self, column: &str) -> bool {
        self.predicates.iter().any(|p| p.references(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Comparison, Operator};

    #[test]
    fn test_parameters_follow_predicates() {
        let query = CompiledQuery::new("users")
            .with_predicate(Comparison::single("age", Operator::Gte, Value::Int(5)))
            .with_predicate(Comparison::new(
                "id",
                Operator::In,
                vec![Value::Int(1), Value::Int(2)],
            ));

        assert_eq!(
            query.parameters,
            vec![Value::Int(5), Value::Int(1), Value::Int(2)]
        );
        assert!(query.references("id"));
        assert!(!query.references("name"));
    }
}
