//! Resolved field descriptors.

use std::collections::HashMap;
use std::fmt::Display;

use serde::Serialize;
use tracing::debug;

use super::errors::{DescriptorError, DescriptorResult};
use super::field::{parse_tags, FieldAttr, FieldDef, FieldType};
use super::kind::{MatchMode, SemanticKind};

/// A type that can declare its fields.
pub trait Describe: 'static {
    /// Field declarations in declaration order.
    fn field_defs() -> Vec<FieldDef>;

    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Validated metadata for one field. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Declared (Rust-side) field name
    pub logical_name: String,
    /// Externally visible name, used by sort specs and projections
    pub external_name: String,
    /// Column, attribute or document key in the store
    pub storage_name: String,
    pub field_type: FieldType,
    pub kind: SemanticKind,
    pub match_mode: MatchMode,
    pub keyword_searchable: bool,
    pub is_optional: bool,
    pub is_primary_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join: Option<String>,
}

fn set_once<T: PartialEq + Display>(
    slot: &mut Option<T>,
    value: T,
    attribute: &'static str,
    type_name: &str,
    field: &str,
) -> DescriptorResult<()> {
    match slot {
        Some(existing) if *existing != value => Err(DescriptorError::Conflicting {
            type_name: type_name.to_string(),
            field: field.to_string(),
            attribute,
            first: existing.to_string(),
            second: value.to_string(),
        }),
        _ => {
            *slot = Some(value);
            Ok(())
        }
    }
}

impl FieldDescriptor {
    fn resolve(type_name: &str, def: FieldDef) -> DescriptorResult<FieldDescriptor> {
        let field = def.name.as_str();
        let incompatible = |attribute: &str| DescriptorError::Incompatible {
            type_name: type_name.to_string(),
            field: field.to_string(),
            attribute: attribute.to_string(),
            field_type: def.field_type.as_str(),
        };

        let mut attrs = Vec::with_capacity(def.attrs.len());
        for attr in &def.attrs {
            match attr {
                FieldAttr::Tags(tags) => attrs.extend(parse_tags(type_name, field, tags)?),
                other => attrs.push(other.clone()),
            }
        }

        let mut column = None;
        let mut json = None;
        let mut match_mode = None;
        let mut keyword_mode = None;
        let mut searchable = false;
        let mut hint = None;
        let mut join = None;
        let mut is_primary_key = false;
        let mut required = false;

        for attr in attrs {
            match attr {
                FieldAttr::Column(c) => set_once(&mut column, c, "column", type_name, field)?,
                FieldAttr::Json(j) => set_once(&mut json, j, "json", type_name, field)?,
                FieldAttr::Match(m) => set_once(&mut match_mode, m, "match", type_name, field)?,
                FieldAttr::Searchable(mode) => {
                    searchable = true;
                    if let Some(m) = mode {
                        set_once(&mut keyword_mode, m, "q", type_name, field)?;
                    }
                }
                FieldAttr::Kind(k) => set_once(&mut hint, k, "kind", type_name, field)?,
                FieldAttr::Join(j) => set_once(&mut join, j, "join", type_name, field)?,
                FieldAttr::PrimaryKey => is_primary_key = true,
                FieldAttr::Required => required = true,
                FieldAttr::Tags(_) => {}
            }
        }

        let kind = match hint {
            Some(k) if !k.accepts(def.field_type) => return Err(incompatible(k.as_str())),
            Some(k) => k,
            None => SemanticKind::default_for(def.field_type),
        };

        let textual = matches!(
            kind,
            SemanticKind::ExactOrPatternString | SemanticKind::FreeKeyword
        );
        if match_mode.is_some() && !textual {
            return Err(incompatible("match"));
        }
        if searchable && kind != SemanticKind::ExactOrPatternString {
            return Err(incompatible("q"));
        }

        let external_name = json.unwrap_or_else(|| def.name.clone());
        let storage_name = column.unwrap_or_else(|| external_name.clone());

        Ok(FieldDescriptor {
            logical_name: def.name,
            external_name,
            storage_name,
            field_type: def.field_type,
            kind,
            match_mode: match_mode.or(keyword_mode).unwrap_or(MatchMode::Contains),
            keyword_searchable: searchable,
            is_optional: !required,
            is_primary_key,
            join,
        })
    }
}

/// All descriptors of one type, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorSet {
    type_name: String,
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
    primary_key: Option<usize>,
}

impl DescriptorSet {
    /// Validate declarations and resolve every field.
    pub fn build(type_name: impl Into<String>, defs: Vec<FieldDef>) -> DescriptorResult<Self> {
        let type_name = type_name.into();
        let mut fields = Vec::with_capacity(defs.len());
        let mut by_name = HashMap::new();
        let mut explicit_pk: Option<usize> = None;

        for def in defs {
            let descriptor = FieldDescriptor::resolve(&type_name, def)?;
            let index = fields.len();

            if by_name.contains_key(&descriptor.logical_name) {
                return Err(DescriptorError::DuplicateField {
                    type_name,
                    field: descriptor.logical_name,
                });
            }
            if descriptor.external_name != descriptor.logical_name
                && by_name.contains_key(&descriptor.external_name)
            {
                return Err(DescriptorError::DuplicateField {
                    type_name,
                    field: descriptor.external_name,
                });
            }

            if descriptor.is_primary_key {
                if let Some(first) = explicit_pk {
                    let first: &FieldDescriptor = &fields[first];
                    return Err(DescriptorError::ConflictingPrimaryKey {
                        first: first.logical_name.clone(),
                        second: descriptor.logical_name,
                        type_name,
                    });
                }
                explicit_pk = Some(index);
            }

            by_name.insert(descriptor.logical_name.clone(), index);
            by_name.insert(descriptor.external_name.clone(), index);
            fields.push(descriptor);
        }

        let primary_key = explicit_pk
            .or_else(|| {
                fields
                    .iter()
                    .position(|f| f.storage_name == "_id" || f.external_name == "_id")
            })
            .or_else(|| {
                fields
                    .iter()
                    .position(|f| f.logical_name == "id" || f.external_name == "id")
            });

        debug!(
            type_name = %type_name,
            fields = fields.len(),
            primary_key = primary_key.map(|i| fields[i].storage_name.as_str()),
            "descriptor set built"
        );

        Ok(Self {
            type_name,
            fields,
            by_name,
            primary_key,
        })
    }

    /// Build without caching.
    pub fn of<T: Describe>() -> DescriptorResult<Self> {
        Self::build(T::type_name(), T::field_defs())
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up by external or logical name.
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Resolve a caller-facing name to its storage name.
    ///
    /// Falls back to matching storage names directly so that callers
    /// already speaking in column names are understood.
    pub fn storage_name(&self, name: &str) -> Option<&str> {
        self.get(name)
            .or_else(|| self.fields.iter().find(|f| f.storage_name == name))
            .map(|f| f.storage_name.as_str())
    }

    pub fn primary_key(&self) -> Option<&FieldDescriptor> {
        self.primary_key.map(|i| &self.fields[i])
    }

    /// The primary key, for callers that cannot work without one.
    pub fn require_primary_key(&self) -> DescriptorResult<&FieldDescriptor> {
        self.primary_key()
            .ok_or_else(|| DescriptorError::MissingPrimaryKey {
                type_name: self.type_name.clone(),
            })
    }

    /// Join clauses in declaration order, deduplicated.
    pub fn joins(&self) -> Vec<String> {
        let mut joins: Vec<String> = Vec::new();
        for clause in self.fields.iter().filter_map(|f| f.join.as_ref()) {
            if !joins.contains(clause) {
                joins.push(clause.clone());
            }
        }
        joins
    }

    /// Storage names of every field, in declaration order.
    pub fn columns(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.storage_name.as_str()).collect()
    }
}
