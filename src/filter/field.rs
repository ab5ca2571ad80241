//! Per-field values read from a filter instance.

use crate::descriptor::Describe;

use super::controls::SearchControls;
use super::range::RangeValue;
use super::value::Value;

/// The runtime value of one filter field, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Absent,
    Text(String),
    Scalar(Value),
    Range(RangeValue<Value>),
    List(Vec<Value>),
    Controls(SearchControls),
}

impl FieldValue {
    pub fn text<S: AsRef<str>>(value: Option<S>) -> Self {
        match value {
            Some(s) => FieldValue::Text(s.as_ref().to_string()),
            None => FieldValue::Absent,
        }
    }

    pub fn scalar<T: Into<Value>>(value: Option<T>) -> Self {
        match value {
            Some(v) => FieldValue::Scalar(v.into()),
            None => FieldValue::Absent,
        }
    }

    pub fn range<T: Clone + Into<Value>>(value: Option<&RangeValue<T>>) -> Self {
        match value {
            Some(r) => FieldValue::Range(r.to_values()),
            None => FieldValue::Absent,
        }
    }

    pub fn list<T: Clone + Into<Value>>(values: &[T]) -> Self {
        FieldValue::List(values.iter().cloned().map(Into::into).collect())
    }

    pub fn controls(value: Option<&SearchControls>) -> Self {
        match value {
            Some(c) => FieldValue::Controls(c.clone()),
            None => FieldValue::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    pub fn shape(&self) -> &'static str {
        match self {
            FieldValue::Absent => "absent",
            FieldValue::Text(_) => "text",
            FieldValue::Scalar(_) => "scalar",
            FieldValue::Range(_) => "range",
            FieldValue::List(_) => "list",
            FieldValue::Controls(_) => "controls",
        }
    }
}

/// A filter type: a described struct that can report its field values.
///
/// `values()` must return exactly one entry per `field_defs()` entry, in the
/// same order.
pub trait SearchFilter: Describe {
    fn values(&self) -> Vec<FieldValue>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_map_none_to_absent() {
        assert!(FieldValue::text(None::<&str>).is_absent());
        assert!(FieldValue::scalar(None::<i64>).is_absent());
        assert!(FieldValue::range(None::<&RangeValue<i64>>).is_absent());
        assert_eq!(FieldValue::text(Some("a")), FieldValue::Text("a".into()));
    }

    #[test]
    fn test_list_preserves_order() {
        let value = FieldValue::list(&[3_i64, 1, 2]);
        assert_eq!(
            value,
            FieldValue::List(vec![Value::Int(3), Value::Int(1), Value::Int(2)])
        );
        assert_eq!(value.shape(), "list");
    }
}
