//! Bidirectional field maps between entity (UI) field names and backend
//! columns
//!
//! Every entity declares a static [`Schema`]: one [`FieldSpec`] per field,
//! giving the entity key, the backend column and the default used whenever
//! the value is absent or null. All translation goes through the three
//! routines on `Schema`:
//!
//! - [`Schema::create_payload`]: full record, absent fields defaulted
//! - [`Schema::patch_payload`]: sparse record, only the keys present
//! - [`Schema::normalize`]: backend record → entity object, blanks defaulted

use super::wire::{FetchParams, FieldRef, OrderBy, Record, SortType, ID_FIELD};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

/// Entity-side name of the identifier field.
pub const UI_ID_FIELD: &str = "id";

/// Default applied when a field is absent or null.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Null,
    Bool(bool),
    Int(i64),
    Text(&'static str),
    /// Current timestamp, RFC 3339.
    Now,
    /// Current date, `YYYY-MM-DD`.
    Today,
    /// `"<prefix> YYYY-MM-DD"` for the current date.
    DatedLabel(&'static str),
}

impl FieldDefault {
    pub fn value(&self, now: DateTime<Utc>) -> Value {
        match *self {
            FieldDefault::Null => Value::Null,
            FieldDefault::Bool(b) => Value::Bool(b),
            FieldDefault::Int(i) => Value::from(i),
            FieldDefault::Text(s) => Value::from(s),
            FieldDefault::Now => Value::from(now.to_rfc3339()),
            FieldDefault::Today => Value::from(now.date_naive().to_string()),
            FieldDefault::DatedLabel(prefix) => {
                Value::from(format!("{} {}", prefix, now.date_naive()))
            }
        }
    }
}

/// One row of a field map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub ui: &'static str,
    pub backend: &'static str,
    pub default: FieldDefault,
}

impl FieldSpec {
    pub const fn new(ui: &'static str, backend: &'static str, default: FieldDefault) -> Self {
        Self {
            ui,
            backend,
            default,
        }
    }
}

/// Static description of an entity's backend table.
#[derive(Debug)]
pub struct Schema {
    /// Backend table name
    pub table: &'static str,
    /// Human label used in messages ("task", "category", ...)
    pub label: &'static str,
    /// Plural form of `label`
    pub plural: &'static str,
    /// Every non-identifier field
    pub fields: &'static [FieldSpec],
    /// Backend column and direction used by `getAll`
    pub order_by: (&'static str, SortType),
}

impl Schema {
    /// Look up a field by its entity-side name.
    pub fn by_ui(&self, ui: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.ui == ui)
    }

    /// Look up a field by its backend column.
    fn by_backend(&self, backend: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.backend == backend)
    }

    /// Backend column for an entity-side name (identifier included).
    pub fn backend_name(&self, ui: &str) -> Option<&'static str> {
        if ui == UI_ID_FIELD {
            return Some(ID_FIELD);
        }
        self.by_ui(ui).map(|f| f.backend)
    }

    /// Field selection covering the identifier and every mapped column.
    pub fn field_selection(&self) -> Vec<FieldRef> {
        std::iter::once(ID_FIELD)
            .chain(self.fields.iter().map(|f| f.backend))
            .map(FieldRef::new)
            .collect()
    }

    /// Fetch parameters for a full listing in this schema's order.
    pub fn list_params(&self) -> FetchParams {
        let (field_name, sorttype) = self.order_by;
        FetchParams {
            fields: self.field_selection(),
            order_by: vec![OrderBy {
                field_name: field_name.to_string(),
                sorttype,
            }],
            filters: Vec::new(),
        }
    }

    /// Fetch parameters for a single-record read.
    pub fn record_params(&self) -> FetchParams {
        FetchParams {
            fields: self.field_selection(),
            ..Default::default()
        }
    }

    /// Build a full backend record for a create call.
    ///
    /// Every mapped column is present; absent or null inputs take the
    /// field default. The identifier is never sent.
    pub fn create_payload(&self, input: &Record, now: DateTime<Utc>) -> Record {
        let mut out = Record::new();
        for spec in self.fields {
            let value = match input.get(spec.ui) {
                Some(v) if !v.is_null() => v.clone(),
                _ => spec.default.value(now),
            };
            out.insert(spec.backend.to_string(), value);
        }
        out
    }

    /// Build a sparse backend record for an update call.
    ///
    /// Only keys present in `patch` are sent (an explicit null is sent as
    /// null, it is not defaulted). The identifier is always included.
    pub fn patch_payload(&self, id: i64, patch: &Record) -> Record {
        let mut out = Record::new();
        out.insert(ID_FIELD.to_string(), Value::from(id));
        for (key, value) in patch {
            if key == UI_ID_FIELD {
                continue;
            }
            match self.by_ui(key) {
                Some(spec) => {
                    out.insert(spec.backend.to_string(), value.clone());
                }
                None => {
                    debug!(table = self.table, field = %key, "dropping unmapped patch field");
                }
            }
        }
        out
    }

    /// Translate a backend record into an entity object.
    ///
    /// Absent, null and empty-string columns are replaced by their
    /// defaults, so every known entity key is present in the output.
    /// Unmapped columns are dropped.
    pub fn normalize(&self, record: &Record, now: DateTime<Utc>) -> Record {
        let mut out = Record::new();
        out.insert(
            UI_ID_FIELD.to_string(),
            record.get(ID_FIELD).cloned().unwrap_or(Value::Null),
        );
        for spec in self.fields {
            out.insert(spec.ui.to_string(), spec.default.value(now));
        }
        for (column, value) in record {
            if column == ID_FIELD || is_blank(value) {
                continue;
            }
            match self.by_backend(column) {
                Some(spec) => {
                    out.insert(spec.ui.to_string(), value.clone());
                }
                None => {
                    debug!(table = self.table, column = %column, "ignoring unmapped column");
                }
            }
        }
        out
    }
}

/// Null or an empty string.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
