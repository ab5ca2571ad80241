//! Predicate compiler
//!
//! Walks filter values in declaration order and emits predicates. The
//! exclusion group and the keyword OR-group are appended after all
//! per-field predicates, in that order.
//!
//! Compilation is a pure function of (values, controls, descriptors): it
//! does no I/O and its output does not depend on the target dialect.

use chrono::Duration;
use tracing::{debug, warn};

use super::errors::{CompileError, CompileResult};
use super::predicate::{Comparison, Operator, Predicate};
use super::projection::resolve_projection;
use super::query::CompiledQuery;
use super::sort::resolve_sort;
use crate::descriptor::{DescriptorSet, FieldDescriptor, SemanticKind};
use crate::filter::{Bound, FieldValue, FilterEnvelope, RangeValue, SearchControls, SearchFilter, Value};

/// Compiles filter values against a filter type's descriptors.
///
/// Sort, projection and the exclusion primary key resolve against the
/// result type's descriptors when one is given, else against the filter's.
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'a> {
    filter: &'a DescriptorSet,
    result: &'a DescriptorSet,
}

impl<'a> Compiler<'a> {
    pub fn new(filter: &'a DescriptorSet) -> Self {
        Self {
            filter,
            result: filter,
        }
    }

    pub fn with_result(mut self, result: &'a DescriptorSet) -> Self {
        self.result = result;
        self
    }

    /// Compile a typed envelope.
    pub fn compile_envelope<F: SearchFilter>(
        &self,
        envelope: &FilterEnvelope<F>,
        source: &str,
    ) -> CompileResult<CompiledQuery> {
        self.compile(&envelope.filter.values(), &envelope.controls, source)
    }

    /// Controls after folding in nested sub-filters, keyword fields and
    /// exclusion fields. Values in `controls` win over ones found in the
    /// filter.
    pub fn effective_controls(&self, values: &[FieldValue], controls: &SearchControls) -> SearchControls {
        let mut nested = SearchControls::default();
        for (desc, value) in self.filter.fields().iter().zip(values) {
            match (desc.kind, value) {
                (SemanticKind::NestedSubFilter, FieldValue::Controls(c)) => {
                    nested = nested.merged(c);
                }
                (SemanticKind::FreeKeyword, FieldValue::Text(s)) if nested.keyword().is_none() => {
                    nested.keyword = Some(s.clone());
                }
                (SemanticKind::ExclusionSet, FieldValue::List(ids)) if nested.excluding.is_empty() => {
                    nested.excluding = ids.clone();
                }
                _ => {}
            }
        }
        controls.merged(&nested)
    }

    /// Compile one request.
    pub fn compile(
        &self,
        values: &[FieldValue],
        controls: &SearchControls,
        source: &str,
    ) -> CompileResult<CompiledQuery> {
        if values.len() != self.filter.len() {
            return Err(CompileError::FieldCountMismatch {
                type_name: self.filter.type_name().to_string(),
                expected: self.filter.len(),
                actual: values.len(),
            });
        }

        let controls = self.effective_controls(values, controls);
        let mut query = CompiledQuery::new(source);
        let mut supplied = Vec::with_capacity(values.len());

        for (desc, value) in self.filter.fields().iter().zip(values) {
            supplied.push(self.compile_field(desc, value, &mut query)?);
        }

        if !controls.excluding.is_empty() {
            match self.result.primary_key().or_else(|| self.filter.primary_key()) {
                Some(pk) => query.push(Predicate::Compare(Comparison::new(
                    pk.storage_name.clone(),
                    Operator::NotIn,
                    controls.excluding.clone(),
                ))),
                None => warn!(
                    type_name = self.result.type_name(),
                    excluded = controls.excluding.len(),
                    "no primary key, dropping exclusion list"
                ),
            }
        }

        if let Some(keyword) = controls.keyword().map(str::trim) {
            let group: Vec<Comparison> = self
                .filter
                .fields()
                .iter()
                .zip(&supplied)
                .filter(|(desc, supplied)| desc.keyword_searchable && !**supplied)
                .map(|(desc, _)| Comparison::matching(desc.storage_name.clone(), desc.match_mode, keyword))
                .collect();
            if !group.is_empty() {
                query.push(Predicate::AnyOf(group));
            }
        }

        query.sort = controls
            .sort()
            .map(|spec| resolve_sort(spec, self.result))
            .unwrap_or_default();
        query.projection = resolve_projection(&controls.fields, self.result);

        let mut joins = self.filter.joins();
        for clause in self.result.joins() {
            if !joins.contains(&clause) {
                joins.push(clause);
            }
        }
        query.joins = joins;

        debug!(
            type_name = self.filter.type_name(),
            source,
            predicates = query.predicates.len(),
            parameters = query.parameters.len(),
            sort = query.sort.len(),
            "compiled filter"
        );
        Ok(query)
    }

    /// Emit predicates for one field. Returns whether a direct value was
    /// supplied and compiled.
    fn compile_field(
        &self,
        desc: &FieldDescriptor,
        value: &FieldValue,
        query: &mut CompiledQuery,
    ) -> CompileResult<bool> {
        let column = desc.storage_name.as_str();
        match (desc.kind, value) {
            (_, FieldValue::Absent) => Ok(false),

            // Consumed by effective_controls.
            (SemanticKind::NestedSubFilter, FieldValue::Controls(_))
            | (SemanticKind::FreeKeyword, FieldValue::Text(_))
            | (SemanticKind::ExclusionSet, FieldValue::List(_)) => Ok(false),

            (SemanticKind::ExactOrPatternString, FieldValue::Text(s))
            | (SemanticKind::ExactOrPatternString, FieldValue::Scalar(Value::Text(s))) => {
                if s.is_empty() {
                    return Ok(false);
                }
                query.push(Comparison::matching(column, desc.match_mode, s).into());
                Ok(true)
            }

            (SemanticKind::NumberRange, FieldValue::Range(range)) => {
                self.compile_range(desc, range, false, query)
            }
            (SemanticKind::TimeRange { calendar }, FieldValue::Range(range)) => {
                self.compile_range(desc, range, calendar, query)
            }

            (SemanticKind::SetMembership, FieldValue::List(items)) => {
                if items.is_empty() {
                    return Ok(false);
                }
                query.push(Comparison::new(column, Operator::In, items.clone()).into());
                Ok(true)
            }

            (SemanticKind::Scalar, FieldValue::Scalar(v)) => {
                if v.is_zero() {
                    return Ok(false);
                }
                query.push(Comparison::single(column, Operator::Eq, v.clone()).into());
                Ok(true)
            }
            (SemanticKind::Scalar, FieldValue::Text(s)) => {
                if s.is_empty() {
                    return Ok(false);
                }
                query.push(Comparison::single(column, Operator::Eq, Value::from(s)).into());
                Ok(true)
            }

            (kind, other) => Err(self.unsupported(desc, kind, other.shape())),
        }
    }

    fn compile_range(
        &self,
        desc: &FieldDescriptor,
        range: &RangeValue<Value>,
        calendar: bool,
        query: &mut CompiledQuery,
    ) -> CompileResult<bool> {
        let column = desc.storage_name.as_str();
        let fits = |v: &Value| match desc.kind {
            SemanticKind::NumberRange => matches!(v, Value::Int(_) | Value::Float(_)),
            _ => matches!(v, Value::Time(_) | Value::Date(_)),
        };

        let mut emitted = false;

        if let Some((bound, v)) = range.lower() {
            if !fits(v) {
                return Err(self.unsupported(desc, desc.kind, v.type_name()));
            }
            let op = match bound {
                Bound::Inclusive => Operator::Gte,
                Bound::Exclusive => Operator::Gt,
            };
            query.push(Comparison::single(column, op, v.clone()).into());
            emitted = true;
        }

        if let Some((bound, v)) = range.upper() {
            if !fits(v) {
                return Err(self.unsupported(desc, desc.kind, v.type_name()));
            }
            let (op, bound_value) = match bound {
                Bound::Inclusive if calendar => (
                    Operator::Lt,
                    next_day(v).ok_or_else(|| self.unsupported(desc, desc.kind, v.type_name()))?,
                ),
                Bound::Inclusive => (Operator::Lte, v.clone()),
                Bound::Exclusive => (Operator::Lt, v.clone()),
            };
            query.push(Comparison::single(column, op, bound_value).into());
            emitted = true;
        }

        Ok(emitted)
    }

    fn unsupported(&self, desc: &FieldDescriptor, kind: SemanticKind, shape: &'static str) -> CompileError {
        CompileError::UnsupportedSemanticKind {
            type_name: self.filter.type_name().to_string(),
            field: desc.logical_name.clone(),
            kind,
            shape,
        }
    }
}

fn next_day(value: &Value) -> Option<Value> {
    match value {
        Value::Date(d) => d.succ_opt().map(Value::Date),
        Value::Time(t) => t.checked_add_signed(Duration::days(1)).map(Value::Time),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Projection, SortKey};
    use crate::descriptor::{FieldDef, MatchMode};
    use crate::filter::{DateRange, IntRange, NumberRange};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cmp(field: &str, op: Operator, value: Value) -> Predicate {
        Predicate::Compare(Comparison::single(field, op, value))
    }

    fn set(defs: Vec<FieldDef>) -> DescriptorSet {
        DescriptorSet::build("TestFilter", defs).unwrap()
    }

    fn compile(set: &DescriptorSet, values: Vec<FieldValue>) -> CompiledQuery {
        Compiler::new(set)
            .compile(&values, &SearchControls::default(), "items")
            .unwrap()
    }

    #[test]
    fn test_empty_string_emits_nothing() {
        let set = set(vec![FieldDef::text("name"), FieldDef::text("code")]);
        let query = compile(&set, vec![FieldValue::text(Some("")), FieldValue::Absent]);

        assert!(!query.references("name"));
        assert!(!query.references("code"));
        assert!(query.parameters.is_empty());
    }

    #[test]
    fn test_string_match_modes() {
        let set = set(vec![
            FieldDef::text("a").matching(MatchMode::Equal),
            FieldDef::text("b").matching(MatchMode::Prefix),
            FieldDef::text("c"),
        ]);
        let query = compile(
            &set,
            vec![
                FieldValue::text(Some("x")),
                FieldValue::text(Some("y")),
                FieldValue::text(Some("z")),
            ],
        );

        assert_eq!(
            query.predicates,
            vec![
                cmp("a", Operator::Eq, Value::from("x")),
                cmp("b", Operator::Like(MatchMode::Prefix), Value::from("y%")),
                cmp("c", Operator::Like(MatchMode::Contains), Value::from("%z%")),
            ]
        );
        assert_eq!(
            query.parameters,
            vec![Value::from("x"), Value::from("y%"), Value::from("%z%")]
        );
    }

    #[test]
    fn test_number_range_inclusive() {
        let set = set(vec![FieldDef::number_range("price")]);
        let range = NumberRange::between(5.0, 10.0);
        let query = compile(&set, vec![FieldValue::range(Some(&range))]);

        assert_eq!(
            query.predicates,
            vec![
                cmp("price", Operator::Gte, Value::Float(5.0)),
                cmp("price", Operator::Lte, Value::Float(10.0)),
            ]
        );
        assert_eq!(query.parameters, vec![Value::Float(5.0), Value::Float(10.0)]);
    }

    #[test]
    fn test_range_exclusive_alternates() {
        let set = set(vec![FieldDef::number_range("age")]);
        let range = IntRange::default().with_bottom(18).with_top(65);
        let query = compile(&set, vec![FieldValue::range(Some(&range))]);

        let ops: Vec<_> = query
            .predicates
            .iter()
            .map(|p| p.comparisons()[0].op)
            .collect();
        assert_eq!(ops, vec![Operator::Gt, Operator::Lt]);
    }

    #[test]
    fn test_one_sided_range() {
        let set = set(vec![FieldDef::number_range("age")]);
        let range = IntRange::default().with_max(30).with_top(40);
        let query = compile(&set, vec![FieldValue::range(Some(&range))]);

        assert_eq!(
            query.predicates,
            vec![cmp("age", Operator::Lte, Value::Int(30))]
        );
    }

    #[test]
    fn test_calendar_range_covers_whole_last_day() {
        let set = set(vec![FieldDef::date_range("day")]);
        let range = DateRange::between(date(2024, 1, 1), date(2024, 1, 5));
        let query = compile(&set, vec![FieldValue::range(Some(&range))]);

        assert_eq!(
            query.predicates,
            vec![
                cmp("day", Operator::Gte, Value::Date(date(2024, 1, 1))),
                cmp("day", Operator::Lt, Value::Date(date(2024, 1, 6))),
            ]
        );
    }

    #[test]
    fn test_set_membership_keeps_order() {
        let set = set(vec![FieldDef::list("status"), FieldDef::list("tags")]);
        let query = compile(
            &set,
            vec![FieldValue::list(&[1_i64, 2, 3]), FieldValue::list::<String>(&[])],
        );

        assert_eq!(query.predicates.len(), 1);
        assert_eq!(
            query.parameters,
            vec![Value::Int(1), Value::Int(2), Value::Int(3)]
        );
        assert!(!query.references("tags"));
    }

    #[test]
    fn test_scalar_zero_is_skipped() {
        let set = set(vec![FieldDef::int("age"), FieldDef::boolean("active")]);
        let query = compile(
            &set,
            vec![FieldValue::scalar(Some(0_i64)), FieldValue::scalar(Some(true))],
        );

        assert_eq!(
            query.predicates,
            vec![cmp("active", Operator::Eq, Value::Bool(true))]
        );
    }

    #[test]
    fn test_keyword_group_spans_unsupplied_fields() {
        let set = set(vec![
            FieldDef::text("title").searchable(),
            FieldDef::text("author").searchable_with(MatchMode::Prefix),
            FieldDef::text("isbn").searchable(),
        ]);
        let controls = SearchControls::new().with_keyword("rust");
        let values = vec![
            FieldValue::Absent,
            FieldValue::Absent,
            FieldValue::text(Some("978")),
        ];
        let query = Compiler::new(&set).compile(&values, &controls, "books").unwrap();

        assert_eq!(query.predicates.len(), 2);
        assert_eq!(
            query.predicates[1],
            Predicate::AnyOf(vec![
                Comparison::matching("title", MatchMode::Contains, "rust"),
                Comparison::matching("author", MatchMode::Prefix, "rust"),
            ])
        );
        assert_eq!(
            query.parameters,
            vec![Value::from("%978%"), Value::from("%rust%"), Value::from("rust%")]
        );
    }

    #[test]
    fn test_keyword_field_and_exclusion_field() {
        let set = set(vec![
            FieldDef::text("id").primary_key(),
            FieldDef::text("name").searchable(),
            FieldDef::text("q").keyword(),
            FieldDef::list("excluding").exclusion(),
        ]);
        let values = vec![
            FieldValue::Absent,
            FieldValue::Absent,
            FieldValue::text(Some("ann")),
            FieldValue::list(&["a1", "a2"]),
        ];
        let query = Compiler::new(&set)
            .compile(&values, &SearchControls::default(), "users")
            .unwrap();

        assert_eq!(
            query.predicates,
            vec![
                Predicate::Compare(Comparison::new(
                    "id",
                    Operator::NotIn,
                    vec![Value::from("a1"), Value::from("a2")]
                )),
                Predicate::AnyOf(vec![Comparison::matching("name", MatchMode::Contains, "ann")]),
            ]
        );
    }

    #[test]
    fn test_exclusion_without_primary_key_is_dropped() {
        let set = set(vec![FieldDef::text("name")]);
        let controls = SearchControls::new().with_excluding(["x"]);
        let query = Compiler::new(&set)
            .compile(&[FieldValue::Absent], &controls, "t")
            .unwrap();
        assert!(query.predicates.is_empty());
    }

    #[test]
    fn test_nested_controls_feed_sort_and_projection() {
        let filter = set(vec![FieldDef::text("name"), FieldDef::controls("options")]);
        let result = DescriptorSet::build(
            "User",
            vec![
                FieldDef::text("id"),
                FieldDef::text("name").column("user_name"),
            ],
        )
        .unwrap();
        let nested = SearchControls::new()
            .with_sort("-name")
            .with_fields(["id", "name"])
            .with_excluding(["u1"]);
        let values = vec![FieldValue::Absent, FieldValue::controls(Some(&nested))];

        let query = Compiler::new(&filter)
            .with_result(&result)
            .compile(&values, &SearchControls::default(), "users")
            .unwrap();

        assert_eq!(query.sort, vec![SortKey::desc("user_name")]);
        assert_eq!(
            query.projection,
            Projection::Columns(vec!["id".into(), "user_name".into()])
        );
        assert_eq!(
            query.predicates,
            vec![Predicate::Compare(Comparison::new(
                "id",
                Operator::NotIn,
                vec![Value::from("u1")]
            ))]
        );
    }

    #[test]
    fn test_envelope_controls_win_over_nested() {
        let filter = set(vec![FieldDef::controls("options")]);
        let nested = SearchControls::new().with_sort("a").with_page(1, 50);
        let outer = SearchControls::new().with_page(3, 10);

        let merged = Compiler::new(&filter)
            .effective_controls(&[FieldValue::controls(Some(&nested))], &outer);
        assert_eq!(merged.page_index, Some(3));
        assert_eq!(merged.page_size, Some(10));
        assert_eq!(merged.sort(), Some("a"));
    }

    #[test]
    fn test_shape_mismatch_is_unsupported_kind() {
        let set = set(vec![FieldDef::number_range("age")]);
        let err = Compiler::new(&set)
            .compile(&[FieldValue::text(Some("x"))], &SearchControls::default(), "t")
            .unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedSemanticKind { .. }));

        let range = RangeValue::<Value>::default().with_min(Value::from("old"));
        let err = Compiler::new(&set)
            .compile(&[FieldValue::Range(range)], &SearchControls::default(), "t")
            .unwrap_err();
        assert_eq!(err.code(), "SIFT_UNSUPPORTED_KIND");
    }

    #[test]
    fn test_value_count_mismatch() {
        let set = set(vec![FieldDef::text("a"), FieldDef::text("b")]);
        let err = Compiler::new(&set)
            .compile(&[FieldValue::Absent], &SearchControls::default(), "t")
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::FieldCountMismatch { expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn test_joins_collected() {
        let set = set(vec![FieldDef::text("dept").join("JOIN d ON d.id = t.d_id")]);
        let query = compile(&set, vec![FieldValue::Absent]);
        assert_eq!(query.joins, vec!["JOIN d ON d.id = t.d_id".to_string()]);
    }
}
