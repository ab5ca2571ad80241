//! Native query representations handed to executors.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::filter::Value;

/// A rendered query in the target backend's own terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NativeQuery {
    Sql(SqlStatement),
    Document(DocumentQuery),
    Expression(ExpressionQuery),
    Search(SearchRequest),
    Structured(StructuredQuery),
}

impl NativeQuery {
    pub fn as_sql(&self) -> Option<&SqlStatement> {
        match self {
            NativeQuery::Sql(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&DocumentQuery> {
        match self {
            NativeQuery::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&ExpressionQuery> {
        match self {
            NativeQuery::Expression(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_search(&self) -> Option<&SearchRequest> {
        match self {
            NativeQuery::Search(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_structured(&self) -> Option<&StructuredQuery> {
        match self {
            NativeQuery::Structured(q) => Some(q),
            _ => None,
        }
    }
}

fn hex_state<S: Serializer>(state: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    match state {
        Some(bytes) => serializer.serialize_some(&hex::encode(bytes)),
        None => serializer.serialize_none(),
    }
}

/// SQL or CQL text with its bind parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlStatement {
    pub text: String,
    pub parameters: Vec<Value>,
    /// Driver-level page size (cursor-paged stores)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
    /// Driver-level paging state to resume from
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "hex_state")]
    pub page_state: Option<Vec<u8>>,
}

impl SqlStatement {
    pub fn new(text: impl Into<String>, parameters: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            parameters,
            page_size: None,
            page_state: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentOperation {
    Find,
    Count,
}

/// A document-store find or count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentQuery {
    pub collection: String,
    pub operation: DocumentOperation,
    pub filter: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<serde_json::Value>,
    /// `(field, 1 | -1)` in priority order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<(String, i32)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

/// A key/value-store scan with a condition expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionQuery {
    pub table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
    /// `#nN` → attribute name
    pub names: BTreeMap<String, String>,
    /// `:vN` → value
    pub values: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "hex_state")]
    pub exclusive_start_key: Option<Vec<u8>>,
}

/// A search-index request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub index: String,
    pub body: serde_json::Value,
}

/// A structured query over one collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub collection: String,
    pub body: serde_json::Value,
    /// Id of the document to resume after
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_after: Option<String>,
}
