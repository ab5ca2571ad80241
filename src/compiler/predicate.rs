//! Dialect-neutral predicates.

use crate::descriptor::MatchMode;
use crate::filter::Value;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// field = value
    Eq,
    /// field > value
    Gt,
    /// field >= value
    Gte,
    /// field < value
    Lt,
    /// field <= value
    Lte,
    /// field IN (values)
    In,
    /// field NOT IN (values)
    NotIn,
    /// Pattern match; the bound value carries `%` wildcards
    Like(MatchMode),
}

impl Operator {
    /// Returns the operation name for explain output
    pub fn op_name(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::Like(MatchMode::Prefix) => "prefix",
            Operator::Like(_) => "contains",
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte)
    }

    pub fn is_membership(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

/// One (storage name, operator, values) condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub field: String,
    pub op: Operator,
    pub values: Vec<Value>,
}

impl Comparison {
    pub fn new(field: impl Into<String>, op: Operator, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            values,
        }
    }

    pub fn single(field: impl Into<String>, op: Operator, value: Value) -> Self {
        Self::new(field, op, vec![value])
    }

    /// String match in the given mode. `Equal` is an exact comparison;
    /// the other modes bind a `%` pattern.
    pub fn matching(field: impl Into<String>, mode: MatchMode, term: &str) -> Self {
        match mode {
            MatchMode::Equal => Self::single(field, Operator::Eq, Value::from(term)),
            MatchMode::Prefix => Self::single(field, Operator::Like(mode), Value::Text(format!("{}%", term))),
            MatchMode::Contains => {
                Self::single(field, Operator::Like(mode), Value::Text(format!("%{}%", term)))
            }
        }
    }

    /// The bare search term of a pattern comparison, wildcards removed.
    pub fn pattern_term(&self) -> Option<&str> {
        let Operator::Like(mode) = self.op else {
            return None;
        };
        let pattern = self.values.first()?.as_str()?;
        let trimmed = match mode {
            MatchMode::Prefix => pattern.strip_suffix('%').unwrap_or(pattern),
            MatchMode::Contains => {
                let head = pattern.strip_prefix('%').unwrap_or(pattern);
                head.strip_suffix('%').unwrap_or(head)
            }
            MatchMode::Equal => pattern,
        };
        Some(trimmed)
    }
}

/// A predicate: a single comparison or an OR-group of comparisons.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare(Comparison),
    AnyOf(Vec<Comparison>),
}

impl Predicate {
    pub fn comparisons(&self) -> &[Comparison] {
        match self {
            Predicate::Compare(c) => std::slice::from_ref(c),
            Predicate::AnyOf(group) => group,
        }
    }

    /// Bound values in emission order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.comparisons().iter().flat_map(|c| c.values.iter())
    }

    pub fn references(&self, field: &str) -> bool {
        self.comparisons().iter().any(|c| c.field == field)
    }
}

impl From<Comparison> for Predicate {
    fn from(c: Comparison) -> Self {
        Predicate::Compare(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_patterns() {
        let eq = Comparison::matching("name", MatchMode::Equal, "ann");
        assert_eq!(eq.op, Operator::Eq);
        assert_eq!(eq.values, vec![Value::from("ann")]);

        let prefix = Comparison::matching("name", MatchMode::Prefix, "ann");
        assert_eq!(prefix.values, vec![Value::from("ann%")]);
        assert_eq!(prefix.pattern_term(), Some("ann"));

        let contains = Comparison::matching("name", MatchMode::Contains, "ann");
        assert_eq!(contains.values, vec![Value::from("%ann%")]);
        assert_eq!(contains.pattern_term(), Some("ann"));
        assert_eq!(eq.pattern_term(), None);
    }

    #[test]
    fn test_group_values_in_order() {
        let group = Predicate::AnyOf(vec![
            Comparison::matching("a", MatchMode::Prefix, "x"),
            Comparison::matching("b", MatchMode::Contains, "x"),
        ]);
        let values: Vec<_> = group.values().cloned().collect();
        assert_eq!(values, vec![Value::from("x%"), Value::from("%x%")]);
        assert!(group.references("b"));
        assert!(!group.references("c"));
    }

    #[test]
    fn test_operator_classes() {
        assert!(Operator::Gte.is_range());
        assert!(Operator::NotIn.is_membership());
        assert_eq!(Operator::Like(MatchMode::Prefix).op_name(), "prefix");
    }
}
