//! Wire types exchanged with the record backend
//!
//! The backend is table-oriented: every call names a table and carries
//! backend field names. These types mirror its JSON envelope exactly, so
//! `serde` renames below are part of the protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw backend record (backend field names → values).
pub type Record = serde_json::Map<String, Value>;

/// Name of the identifier column in every table.
pub const ID_FIELD: &str = "Id";

/// Per-record failure code used when the target record does not exist.
pub const NOT_FOUND_CODE: &str = "NOT_FOUND";

/// Field selection entry: `{ "field": { "Name": "title" } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    pub field: FieldName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldName {
    #[serde(rename = "Name")]
    pub name: String,
}

impl FieldRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            field: FieldName { name: name.into() },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortType {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    pub field_name: String,
    pub sorttype: SortType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    EqualTo,
}

/// Filter predicate: `{ "FieldName": "taskId", "Operator": "EqualTo", "Values": [3] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    #[serde(rename = "FieldName")]
    pub field_name: String,
    #[serde(rename = "Operator")]
    pub operator: Operator,
    #[serde(rename = "Values")]
    pub values: Vec<Value>,
}

impl WhereClause {
    pub fn equal_to(field_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field_name: field_name.into(),
            operator: Operator::EqualTo,
            values: vec![value.into()],
        }
    }

    /// Whether a record satisfies this predicate.
    pub fn matches(&self, record: &Record) -> bool {
        match self.operator {
            Operator::EqualTo => {
                let actual = record.get(&self.field_name).unwrap_or(&Value::Null);
                self.values.iter().any(|v| v == actual)
            }
        }
    }
}

/// Parameters for fetch-records and get-record-by-id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchParams {
    pub fields: Vec<FieldRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    #[serde(default, rename = "where", skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<WhereClause>,
}

/// Body of create-record and update-record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteParams {
    pub records: Vec<Record>,
}

/// Body of delete-record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteParams {
    #[serde(rename = "RecordIds")]
    pub record_ids: Vec<i64>,
}

/// A field-level validation error reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_label: String,
    pub message: String,
}

/// Outcome of one record inside a write request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl RecordResult {
    pub fn ok(data: Record) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Default::default()
        }
    }

    pub fn deleted() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn not_found(id: i64) -> Self {
        Self {
            success: false,
            message: Some(format!("Record with Id {id} not found")),
            code: Some(NOT_FOUND_CODE.to_string()),
            ..Default::default()
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code.as_deref() == Some(NOT_FOUND_CODE)
    }
}

/// Response envelope shared by every backend operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<RecordResult>>,
}

impl<T> BackendResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            results: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            success: true,
            message: None,
            data: None,
            results: None,
        }
    }

    pub fn with_results(results: Vec<RecordResult>) -> Self {
        Self {
            success: true,
            message: None,
            data: None,
            results: Some(results),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            results: None,
        }
    }
}

pub type FetchResponse = BackendResponse<Vec<Record>>;
pub type RecordResponse = BackendResponse<Record>;
pub type WriteResponse = BackendResponse<Value>;
