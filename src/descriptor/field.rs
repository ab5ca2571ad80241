//! Field declarations: what a type says about each of its fields.
//!
//! A [`FieldDef`] is the raw, unvalidated declaration. Annotations can be
//! attached through the builder methods or as a tag string in the
//! `key:value;key` form:
//!
//! | key        | value                         | meaning                                   |
//! |------------|-------------------------------|-------------------------------------------|
//! | `column`   | storage name                  | explicit storage name                     |
//! | `json`     | external name                 | externally visible name                   |
//! | `match`    | `equal`, `prefix`, `contains` | string match mode                         |
//! | `q`        | optional match mode           | field takes part in keyword quick search  |
//! | `kind`     | semantic kind hint            | overrides the kind implied by the type    |
//! | `pk`       |                               | primary key                               |
//! | `exclude`  |                               | list of primary keys to exclude           |
//! | `keyword`  |                               | field carries the quick-search keyword    |
//! | `controls` |                               | nested search controls                    |
//! | `join`     | raw join clause               | appended after `FROM` by SQL dialects     |
//! | `required` |                               | field is not optional                     |

use serde::{Deserialize, Serialize};

use super::errors::{DescriptorError, DescriptorResult};
use super::kind::{MatchMode, SemanticKind};

/// Declared value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Int,
    Float,
    Bool,
    Time,
    Date,
    NumberRange,
    TimeRange,
    DateRange,
    List,
    Controls,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Time => "time",
            FieldType::Date => "date",
            FieldType::NumberRange => "number_range",
            FieldType::TimeRange => "time_range",
            FieldType::DateRange => "date_range",
            FieldType::List => "list",
            FieldType::Controls => "controls",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldAttr {
    Column(String),
    Json(String),
    Match(MatchMode),
    /// Keyword-searchable, optionally with its own match mode
    Searchable(Option<MatchMode>),
    Kind(SemanticKind),
    PrimaryKey,
    Join(String),
    Required,
    /// Unparsed tag string, expanded at descriptor build time
    Tags(String),
}

/// One declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub attrs: Vec<FieldAttr>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            attrs: Vec::new(),
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Bool)
    }

    pub fn time(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Time)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Date)
    }

    pub fn number_range(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::NumberRange)
    }

    pub fn time_range(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::TimeRange)
    }

    pub fn date_range(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::DateRange)
    }

    pub fn list(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::List)
    }

    pub fn controls(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Controls)
    }

    fn attr(mut self, attr: FieldAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    pub fn column(self, column: impl Into<String>) -> Self {
        self.attr(FieldAttr::Column(column.into()))
    }

    pub fn json(self, name: impl Into<String>) -> Self {
        self.attr(FieldAttr::Json(name.into()))
    }

    pub fn matching(self, mode: MatchMode) -> Self {
        self.attr(FieldAttr::Match(mode))
    }

    pub fn searchable(self) -> Self {
        self.attr(FieldAttr::Searchable(None))
    }

    pub fn searchable_with(self, mode: MatchMode) -> Self {
        self.attr(FieldAttr::Searchable(Some(mode)))
    }

    pub fn kind(self, kind: SemanticKind) -> Self {
        self.attr(FieldAttr::Kind(kind))
    }

    pub fn primary_key(self) -> Self {
        self.attr(FieldAttr::PrimaryKey)
    }

    pub fn exclusion(self) -> Self {
        self.kind(SemanticKind::ExclusionSet)
    }

    pub fn keyword(self) -> Self {
        self.kind(SemanticKind::FreeKeyword)
    }

    pub fn join(self, clause: impl Into<String>) -> Self {
        self.attr(FieldAttr::Join(clause.into()))
    }

    pub fn required(self) -> Self {
        self.attr(FieldAttr::Required)
    }

    pub fn tags(self, tags: impl Into<String>) -> Self {
        self.attr(FieldAttr::Tags(tags.into()))
    }
}

/// Parse a `key:value;key` tag string into attributes.
pub fn parse_tags(type_name: &str, field: &str, tags: &str) -> DescriptorResult<Vec<FieldAttr>> {
    let malformed = |tag: &str, reason: &str| DescriptorError::MalformedTag {
        type_name: type_name.to_string(),
        field: field.to_string(),
        tag: tag.to_string(),
        reason: reason.to_string(),
    };

    let mut attrs = Vec::new();
    for tag in tags.split(';').map(str::trim).filter(|t| !t.is_empty()) {
        let (key, value) = match tag.split_once(':') {
            Some((k, v)) => (k.trim(), Some(v.trim())),
            None => (tag, None),
        };

        let attr = match (key, value) {
            ("column", Some(v)) | ("json", Some(v)) | ("join", Some(v)) if v.is_empty() => {
                return Err(malformed(tag, "empty value"));
            }
            ("column", Some(v)) => FieldAttr::Column(v.to_string()),
            ("json", Some(v)) => FieldAttr::Json(v.to_string()),
            ("join", Some(v)) => FieldAttr::Join(v.to_string()),
            ("column", None) | ("json", None) | ("join", None) | ("match", None) | ("kind", None) => {
                return Err(malformed(tag, "missing value"));
            }
            ("match", Some(v)) => FieldAttr::Match(
                MatchMode::parse(v).ok_or_else(|| malformed(tag, "unknown match mode"))?,
            ),
            ("q", None) => FieldAttr::Searchable(None),
            ("q", Some("")) => FieldAttr::Searchable(None),
            ("q", Some(v)) => FieldAttr::Searchable(Some(
                MatchMode::parse(v).ok_or_else(|| malformed(tag, "unknown match mode"))?,
            )),
            ("kind", Some(v)) => FieldAttr::Kind(
                SemanticKind::from_hint(v).ok_or_else(|| malformed(tag, "unknown kind"))?,
            ),
            ("pk", None) => FieldAttr::PrimaryKey,
            ("exclude", None) => FieldAttr::Kind(SemanticKind::ExclusionSet),
            ("keyword", None) => FieldAttr::Kind(SemanticKind::FreeKeyword),
            ("controls", None) => FieldAttr::Kind(SemanticKind::NestedSubFilter),
            ("required", None) => FieldAttr::Required,
            ("pk", Some(_))
            | ("exclude", Some(_))
            | ("keyword", Some(_))
            | ("controls", Some(_))
            | ("required", Some(_)) => {
                return Err(malformed(tag, "flag takes no value"));
            }
            (other, _) => {
                return Err(DescriptorError::UnknownTag {
                    type_name: type_name.to_string(),
                    field: field.to_string(),
                    key: other.to_string(),
                });
            }
        };
        attrs.push(attr);
    }
    Ok(attrs)
}
