//! Runtime schema files.
//!
//! The CLI has no compiled filter types, so a schema file declares the
//! fields instead:
//!
//! ```json
//! {
//!   "name": "UserFilter",
//!   "source": "users",
//!   "fields": [
//!     {"name": "name", "type": "text", "tags": "column:user_name;q:prefix"},
//!     {"name": "age", "type": "number_range"}
//!   ],
//!   "result": [
//!     {"name": "id", "type": "int", "tags": "pk"}
//!   ]
//! }
//! ```
//!
//! An envelope read from stdin is decoded against the declared fields.

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value as Json;

use super::errors::{CliError, CliResult};
use crate::descriptor::{DescriptorResult, DescriptorSet, FieldDef, FieldDescriptor, FieldType};
use crate::filter::{FieldValue, RangeValue, SearchControls, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub tags: String,
}

impl SchemaField {
    fn def(&self) -> FieldDef {
        let def = FieldDef::new(self.name.clone(), self.field_type);
        if self.tags.trim().is_empty() {
            def
        } else {
            def.tags(self.tags.clone())
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Schema {
    #[serde(default = "default_name")]
    pub name: String,
    pub source: String,
    pub fields: Vec<SchemaField>,
    /// Result fields, when they differ from the filter's
    #[serde(default)]
    pub result: Option<Vec<SchemaField>>,
}

fn default_name() -> String {
    "Filter".to_string()
}

impl Schema {
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::schema_error(format!("Failed to read schema: {}", e)))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> CliResult<Self> {
        let schema: Schema = serde_json::from_str(content)
            .map_err(|e| CliError::schema_error(format!("Invalid schema JSON: {}", e)))?;
        if schema.source.trim().is_empty() {
            return Err(CliError::schema_error("source must not be empty"));
        }
        Ok(schema)
    }

    pub fn descriptors(&self) -> DescriptorResult<DescriptorSet> {
        DescriptorSet::build(
            self.name.clone(),
            self.fields.iter().map(SchemaField::def).collect(),
        )
    }

    pub fn result_descriptors(&self) -> DescriptorResult<Option<DescriptorSet>> {
        self.result
            .as_ref()
            .map(|fields| {
                DescriptorSet::build(
                    format!("{}Result", self.name),
                    fields.iter().map(SchemaField::def).collect(),
                )
            })
            .transpose()
    }
}

/// Decode an envelope into one value per descriptor plus the top-level
/// controls.
pub fn decode_envelope(
    descriptors: &DescriptorSet,
    envelope: &Json,
) -> CliResult<(Vec<FieldValue>, SearchControls)> {
    let object = envelope
        .as_object()
        .ok_or_else(|| CliError::input_error("Envelope must be a JSON object"))?;
    let controls: SearchControls = serde_json::from_value(envelope.clone())?;

    let mut values = Vec::with_capacity(descriptors.len());
    for desc in descriptors.fields() {
        let raw = object
            .get(&desc.external_name)
            .or_else(|| object.get(&desc.logical_name));
        let value = match raw {
            None | Some(Json::Null) => FieldValue::Absent,
            Some(raw) => decode_field(desc, raw)?,
        };
        values.push(value);
    }
    Ok((values, controls))
}

fn mismatch(desc: &FieldDescriptor, raw: &Json) -> CliError {
    CliError::input_error(format!(
        "field '{}' expects {}, got {}",
        desc.external_name,
        desc.field_type.as_str(),
        raw
    ))
}

fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn decode_field(desc: &FieldDescriptor, raw: &Json) -> CliResult<FieldValue> {
    let bad = || mismatch(desc, raw);
    let value = match desc.field_type {
        FieldType::Text => FieldValue::text(Some(raw.as_str().ok_or_else(bad)?)),
        FieldType::Int => FieldValue::scalar(Some(raw.as_i64().ok_or_else(bad)?)),
        FieldType::Float => FieldValue::scalar(Some(raw.as_f64().ok_or_else(bad)?)),
        FieldType::Bool => FieldValue::scalar(Some(raw.as_bool().ok_or_else(bad)?)),
        FieldType::Time => {
            FieldValue::scalar(Some(raw.as_str().and_then(parse_time).ok_or_else(bad)?))
        }
        FieldType::Date => {
            FieldValue::scalar(Some(raw.as_str().and_then(parse_date).ok_or_else(bad)?))
        }
        FieldType::NumberRange => {
            let range: RangeValue<f64> = serde_json::from_value(raw.clone()).map_err(|_| bad())?;
            FieldValue::range(Some(&range))
        }
        FieldType::TimeRange => {
            let range: RangeValue<DateTime<Utc>> =
                serde_json::from_value(raw.clone()).map_err(|_| bad())?;
            FieldValue::range(Some(&range))
        }
        FieldType::DateRange => {
            let range: RangeValue<NaiveDate> =
                serde_json::from_value(raw.clone()).map_err(|_| bad())?;
            FieldValue::range(Some(&range))
        }
        FieldType::List => {
            let items = raw.as_array().ok_or_else(bad)?;
            let values = items
                .iter()
                .map(|item| Value::from_json(item).ok_or_else(bad))
                .collect::<CliResult<Vec<Value>>>()?;
            FieldValue::List(values)
        }
        FieldType::Controls => {
            let controls: SearchControls =
                serde_json::from_value(raw.clone()).map_err(|_| bad())?;
            FieldValue::Controls(controls)
        }
    };
    Ok(value)
}
