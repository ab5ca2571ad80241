//! Range values with inclusive and exclusive bounds.
//!
//! `min`/`max` are inclusive, `bottom`/`top` exclusive. When both bounds of
//! one side are present the inclusive one wins. Older payloads spell the
//! exclusive pair `floor`/`ceiling` or `lower`/`upper`, and time ranges may
//! use `startTime`/`endTime`; these are accepted as aliases on decode.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::value::Value;

/// Comparison applied by one side of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Inclusive,
    Exclusive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeValue<T> {
    #[serde(
        default,
        alias = "startTime",
        alias = "startDate",
        skip_serializing_if = "Option::is_none"
    )]
    pub min: Option<T>,

    #[serde(
        default,
        alias = "endTime",
        alias = "endDate",
        skip_serializing_if = "Option::is_none"
    )]
    pub max: Option<T>,

    #[serde(
        default,
        alias = "floor",
        alias = "lower",
        skip_serializing_if = "Option::is_none"
    )]
    pub bottom: Option<T>,

    #[serde(
        default,
        alias = "ceiling",
        alias = "upper",
        skip_serializing_if = "Option::is_none"
    )]
    pub top: Option<T>,
}

pub type NumberRange = RangeValue<f64>;
pub type IntRange = RangeValue<i64>;
pub type TimeRange = RangeValue<DateTime<Utc>>;
pub type DateRange = RangeValue<NaiveDate>;

impl<T> Default for RangeValue<T> {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            bottom: None,
            top: None,
        }
    }
}

impl<T> RangeValue<T> {
    /// Inclusive range `[min, max]`.
    pub fn between(min: T, max: T) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Default::default()
        }
    }

    pub fn with_min(mut self, min: T) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: T) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_bottom(mut self, bottom: T) -> Self {
        self.bottom = Some(bottom);
        self
    }

    pub fn with_top(mut self, top: T) -> Self {
        self.top = Some(top);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lower().is_none() && self.upper().is_none()
    }

    /// Effective lower bound: `min` if set, else `bottom`.
    pub fn lower(&self) -> Option<(Bound, &T)> {
        match (&self.min, &self.bottom) {
            (Some(v), _) => Some((Bound::Inclusive, v)),
            (None, Some(v)) => Some((Bound::Exclusive, v)),
            (None, None) => None,
        }
    }

    /// Effective upper bound: `max` if set, else `top`.
    pub fn upper(&self) -> Option<(Bound, &T)> {
        match (&self.max, &self.top) {
            (Some(v), _) => Some((Bound::Inclusive, v)),
            (None, Some(v)) => Some((Bound::Exclusive, v)),
            (None, None) => None,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> RangeValue<U> {
        RangeValue {
            min: self.min.map(&mut f),
            max: self.max.map(&mut f),
            bottom: self.bottom.map(&mut f),
            top: self.top.map(&mut f),
        }
    }
}

impl<T: Clone + Into<Value>> RangeValue<T> {
    /// Erase the bound type.
    pub fn to_values(&self) -> RangeValue<Value> {
        self.clone().map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inclusive_wins_over_exclusive() {
        let range = NumberRange::default()
            .with_min(5.0)
            .with_bottom(4.0)
            .with_top(11.0);

        assert_eq!(range.lower(), Some((Bound::Inclusive, &5.0)));
        assert_eq!(range.upper(), Some((Bound::Exclusive, &11.0)));
    }

    #[test]
    fn test_empty_range() {
        let range: IntRange = RangeValue::default();
        assert!(range.is_empty());
        assert!(!IntRange::default().with_top(3).is_empty());
    }

    #[test]
    fn test_deprecated_aliases_decode() {
        let range: IntRange = serde_json::from_value(json!({"floor": 1, "ceiling": 9})).unwrap();
        assert_eq!(range.bottom, Some(1));
        assert_eq!(range.top, Some(9));

        let range: IntRange = serde_json::from_value(json!({"lower": 2, "upper": 8})).unwrap();
        assert_eq!(range.bottom, Some(2));
        assert_eq!(range.top, Some(8));

        let range: DateRange =
            serde_json::from_value(json!({"startDate": "2024-01-01", "endDate": "2024-01-05"}))
                .unwrap();
        assert_eq!(range.min, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(range.max, NaiveDate::from_ymd_opt(2024, 1, 5));
    }

    #[test]
    fn test_serializes_canonical_names() {
        let range = IntRange::default().with_bottom(1);
        assert_eq!(serde_json::to_value(&range).unwrap(), json!({"bottom": 1}));
    }

    #[test]
    fn test_to_values() {
        let range = IntRange::between(1, 2).to_values();
        assert_eq!(range.min, Some(Value::Int(1)));
        assert_eq!(range.max, Some(Value::Int(2)));
    }
}
