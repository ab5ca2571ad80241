//! Semantic kinds and match modes.

use std::fmt;

use serde::Serialize;

use super::field::FieldType;

/// How a string field is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Equal,
    Prefix,
    Contains,
}

impl MatchMode {
    pub fn parse(s: &str) -> Option<MatchMode> {
        match s.trim() {
            "equal" | "=" | "exact" => Some(MatchMode::Equal),
            "prefix" => Some(MatchMode::Prefix),
            "contains" | "contain" | "like" => Some(MatchMode::Contains),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Equal => "equal",
            MatchMode::Prefix => "prefix",
            MatchMode::Contains => "contains",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of field classifications, resolved once per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SemanticKind {
    ExactOrPatternString,
    NumberRange,
    /// `calendar` ranges treat an inclusive upper bound as the whole day.
    TimeRange {
        calendar: bool,
    },
    SetMembership,
    ExclusionSet,
    FreeKeyword,
    NestedSubFilter,
    Scalar,
}

impl SemanticKind {
    pub fn from_hint(hint: &str) -> Option<SemanticKind> {
        match hint.trim() {
            "string" | "pattern" => Some(SemanticKind::ExactOrPatternString),
            "number_range" => Some(SemanticKind::NumberRange),
            "time_range" => Some(SemanticKind::TimeRange { calendar: false }),
            "date_range" | "calendar" => Some(SemanticKind::TimeRange { calendar: true }),
            "set" | "in" => Some(SemanticKind::SetMembership),
            "exclude" | "excluding" => Some(SemanticKind::ExclusionSet),
            "keyword" | "q" => Some(SemanticKind::FreeKeyword),
            "controls" | "nested" => Some(SemanticKind::NestedSubFilter),
            "scalar" | "exact" => Some(SemanticKind::Scalar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticKind::ExactOrPatternString => "string",
            SemanticKind::NumberRange => "number_range",
            SemanticKind::TimeRange { calendar: false } => "time_range",
            SemanticKind::TimeRange { calendar: true } => "date_range",
            SemanticKind::SetMembership => "set",
            SemanticKind::ExclusionSet => "exclude",
            SemanticKind::FreeKeyword => "keyword",
            SemanticKind::NestedSubFilter => "controls",
            SemanticKind::Scalar => "scalar",
        }
    }

    /// Kind assigned when no hint is given.
    pub fn default_for(field_type: FieldType) -> SemanticKind {
        match field_type {
            FieldType::Text => SemanticKind::ExactOrPatternString,
            FieldType::Int
            | FieldType::Float
            | FieldType::Bool
            | FieldType::Time
            | FieldType::Date => SemanticKind::Scalar,
            FieldType::NumberRange => SemanticKind::NumberRange,
            FieldType::TimeRange => SemanticKind::TimeRange { calendar: false },
            FieldType::DateRange => SemanticKind::TimeRange { calendar: true },
            FieldType::List => SemanticKind::SetMembership,
            FieldType::Controls => SemanticKind::NestedSubFilter,
        }
    }

    /// Whether a hint of this kind can be applied to `field_type`.
    pub fn accepts(&self, field_type: FieldType) -> bool {
        match self {
            SemanticKind::ExactOrPatternString | SemanticKind::FreeKeyword => {
                field_type == FieldType::Text
            }
            SemanticKind::NumberRange => field_type == FieldType::NumberRange,
            SemanticKind::TimeRange { .. } => {
                matches!(field_type, FieldType::TimeRange | FieldType::DateRange)
            }
            SemanticKind::SetMembership | SemanticKind::ExclusionSet => {
                field_type == FieldType::List
            }
            SemanticKind::NestedSubFilter => field_type == FieldType::Controls,
            SemanticKind::Scalar => !matches!(
                field_type,
                FieldType::NumberRange
                    | FieldType::TimeRange
                    | FieldType::DateRange
                    | FieldType::List
                    | FieldType::Controls
            ),
        }
    }
}

impl fmt::Display for SemanticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_mode_parse() {
        assert_eq!(MatchMode::parse("prefix"), Some(MatchMode::Prefix));
        assert_eq!(MatchMode::parse("="), Some(MatchMode::Equal));
        assert_eq!(MatchMode::parse("like"), Some(MatchMode::Contains));
        assert_eq!(MatchMode::parse("fuzzy"), None);
    }

    #[test]
    fn test_hint_round_trips_through_name() {
        for kind in [
            SemanticKind::ExactOrPatternString,
            SemanticKind::NumberRange,
            SemanticKind::TimeRange { calendar: false },
            SemanticKind::TimeRange { calendar: true },
            SemanticKind::SetMembership,
            SemanticKind::ExclusionSet,
            SemanticKind::FreeKeyword,
            SemanticKind::NestedSubFilter,
            SemanticKind::Scalar,
        ] {
            assert_eq!(SemanticKind::from_hint(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_accepts() {
        assert!(SemanticKind::Scalar.accepts(FieldType::Text));
        assert!(SemanticKind::ExclusionSet.accepts(FieldType::List));
        assert!(!SemanticKind::ExclusionSet.accepts(FieldType::Text));
        assert!(SemanticKind::TimeRange { calendar: true }.accepts(FieldType::TimeRange));
        assert!(!SemanticKind::NumberRange.accepts(FieldType::DateRange));
    }
}
