//! Generic per-entity record store
//!
//! `RecordStore<E>` is the single place where entity objects meet backend
//! records. It applies `E::SCHEMA` in both directions and turns backend
//! responses into the failure policy callers rely on:
//!
//! - reads (`get_all`, `find_where`, `get_by_id`) degrade to empty/absent
//!   and report a notice; `try_*` variants return the error instead
//! - writes (`create`, `update`, `delete`) always return `Err` on failure,
//!   after reporting backend messages and per-field errors

use super::fields::Schema;
use super::traits::RecordBackend;
use super::wire::{Record, RecordResult, WhereClause, WriteResponse, ID_FIELD};
use crate::error::StoreError;
use crate::models::Entity;
use crate::notify::Notifier;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct RecordStore<E: Entity> {
    backend: Arc<dyn RecordBackend>,
    notifier: Option<Arc<dyn Notifier>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for RecordStore<E> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            notifier: self.notifier.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for RecordStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("table", &E::SCHEMA.table)
            .finish()
    }
}

impl<E: Entity> RecordStore<E> {
    pub fn new(backend: Arc<dyn RecordBackend>, notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self {
            backend,
            notifier,
            _entity: PhantomData,
        }
    }

    pub fn schema(&self) -> &'static Schema {
        E::SCHEMA
    }

    pub fn notifier(&self) -> Option<&Arc<dyn Notifier>> {
        self.notifier.as_ref()
    }

    fn report(&self, message: &str) {
        if let Some(ref notifier) = self.notifier {
            notifier.error(message);
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Fetch every record in schema order.
    pub async fn try_get_all(&self) -> Result<Vec<E>, StoreError> {
        self.try_find_where(Vec::new()).await
    }

    /// Fetch records matching every predicate, in schema order.
    pub async fn try_find_where(&self, filters: Vec<WhereClause>) -> Result<Vec<E>, StoreError> {
        let schema = E::SCHEMA;
        let mut params = schema.list_params();
        params.filters = filters;

        let resp = self.backend.fetch_records(schema.table, &params).await?;
        if !resp.success {
            let message = resp
                .message
                .unwrap_or_else(|| format!("failed to fetch {}", schema.plural));
            return Err(StoreError::Rejected(message));
        }

        let now = Utc::now();
        let rows = resp.data.unwrap_or_default();
        let mut items = Vec::with_capacity(rows.len());
        for raw in &rows {
            match decode::<E>(schema, raw, now) {
                Ok(entity) => items.push(entity),
                Err(e) => {
                    let id = raw.get(ID_FIELD).and_then(Value::as_i64);
                    warn!(table = schema.table, ?id, error = %e, "skipping malformed record");
                }
            }
        }
        debug!(table = schema.table, count = items.len(), "fetched records");
        Ok(items)
    }

    /// Like [`try_get_all`](Self::try_get_all), but a failure is reported
    /// and yields an empty list.
    pub async fn get_all(&self) -> Vec<E> {
        self.find_where(Vec::new()).await
    }

    /// Like [`try_find_where`](Self::try_find_where), but degrading.
    pub async fn find_where(&self, filters: Vec<WhereClause>) -> Vec<E> {
        match self.try_find_where(filters).await {
            Ok(items) => items,
            Err(e) => {
                let schema = E::SCHEMA;
                warn!(table = schema.table, error = %e, "fetch failed, returning empty list");
                self.report_read_failure(&e, schema.plural);
                Vec::new()
            }
        }
    }

    /// Fetch one entity. Absent ids, backend failures and malformed
    /// records all yield `None`.
    pub async fn get_by_id(&self, id: i64) -> Option<E> {
        let schema = E::SCHEMA;
        let resp = match self
            .backend
            .get_record_by_id(schema.table, id, &schema.record_params())
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(table = schema.table, id, error = %e, "get by id failed");
                self.report_read_failure(&e, schema.label);
                return None;
            }
        };
        if !resp.success {
            let message = resp
                .message
                .unwrap_or_else(|| format!("Failed to load {}", schema.label));
            self.report(&message);
            return None;
        }

        let raw = resp.data?;
        match decode::<E>(schema, &raw, Utc::now()) {
            Ok(entity) => Some(entity),
            Err(e) => {
                warn!(table = schema.table, id, error = %e, "malformed record");
                self.report(&format!("Failed to load {}", schema.label));
                None
            }
        }
    }

    fn report_read_failure(&self, err: &StoreError, what: &str) {
        match err {
            StoreError::Rejected(message) => self.report(message),
            _ => self.report(&format!("Failed to load {}", what)),
        }
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Create an entity. Fields absent from `input` take their defaults.
    pub async fn create(&self, input: &E::Create) -> Result<E, StoreError> {
        let schema = E::SCHEMA;
        let payload = schema.create_payload(&to_record(input)?, Utc::now());
        let resp = self
            .backend
            .create_records(schema.table, vec![payload])
            .await
            .inspect_err(|e| self.report_write_failure("create", e))?;
        let entity = self.single_result(resp, "create", None)?;
        debug!(table = schema.table, id = entity.id(), "created record");
        Ok(entity)
    }

    /// Apply a sparse patch. Only the fields present in `patch` are sent.
    pub async fn update(&self, id: i64, patch: &E::Patch) -> Result<E, StoreError> {
        let schema = E::SCHEMA;
        let payload = schema.patch_payload(id, &to_record(patch)?);
        let resp = self
            .backend
            .update_records(schema.table, vec![payload])
            .await
            .inspect_err(|e| self.report_write_failure("update", e))?;
        let entity = self.single_result(resp, "update", Some(id))?;
        debug!(table = schema.table, id, "updated record");
        Ok(entity)
    }

    /// Delete one entity.
    ///
    /// `Ok(false)` means the backend answered but did not delete the record
    /// for a reason other than it being missing.
    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let schema = E::SCHEMA;
        let resp = self
            .backend
            .delete_records(schema.table, &[id])
            .await
            .inspect_err(|e| self.report_write_failure("delete", e))?;

        match resp.results.as_deref() {
            Some([first, ..]) if first.success => Ok(true),
            Some([first, ..]) if first.is_not_found() => Err(StoreError::NotFound {
                entity: schema.label,
                id,
            }),
            Some([first, ..]) => {
                self.report_record_failure(first);
                Ok(false)
            }
            _ if resp.success => Ok(true),
            _ => {
                let message = resp
                    .message
                    .unwrap_or_else(|| format!("failed to delete {}", schema.label));
                self.report(&message);
                Err(StoreError::Rejected(message))
            }
        }
    }

    /// Delete several entities in one call. Returns how many were removed.
    pub async fn delete_many(&self, ids: &[i64]) -> Result<usize, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let schema = E::SCHEMA;
        let resp = self
            .backend
            .delete_records(schema.table, ids)
            .await
            .inspect_err(|e| self.report_write_failure("delete", e))?;

        match resp.results {
            Some(results) => {
                let mut removed = 0;
                for result in &results {
                    if result.success {
                        removed += 1;
                    } else {
                        self.report_record_failure(result);
                    }
                }
                Ok(removed)
            }
            None if resp.success => Ok(ids.len()),
            None => {
                let message = resp
                    .message
                    .unwrap_or_else(|| format!("failed to delete {}", schema.plural));
                self.report(&message);
                Err(StoreError::Rejected(message))
            }
        }
    }

    /// Interpret the response of a single-record write.
    fn single_result(
        &self,
        resp: WriteResponse,
        op: &'static str,
        id: Option<i64>,
    ) -> Result<E, StoreError> {
        let schema = E::SCHEMA;
        let first = resp.results.and_then(|r| r.into_iter().next());

        let Some(result) = first else {
            if resp.success {
                return Err(StoreError::NoResult {
                    entity: schema.label,
                    op,
                });
            }
            let message = resp
                .message
                .unwrap_or_else(|| format!("failed to {} {}", op, schema.label));
            self.report(&message);
            return Err(StoreError::Rejected(message));
        };

        if !result.success {
            if let (true, Some(id)) = (result.is_not_found(), id) {
                return Err(StoreError::NotFound {
                    entity: schema.label,
                    id,
                });
            }
            self.report_record_failure(&result);
            if result.errors.is_empty() {
                return Err(StoreError::Rejected(
                    result
                        .message
                        .unwrap_or_else(|| format!("failed to {} {}", op, schema.label)),
                ));
            }
            return Err(StoreError::Validation {
                message: result.message,
                fields: result.errors,
            });
        }

        let raw = result.data.ok_or(StoreError::NoResult {
            entity: schema.label,
            op,
        })?;
        decode::<E>(schema, &raw, Utc::now())
    }

    fn report_record_failure(&self, result: &RecordResult) {
        for error in &result.errors {
            self.report(&format!("{}: {}", error.field_label, error.message));
        }
        if let Some(ref message) = result.message {
            self.report(message);
        }
    }

    fn report_write_failure(&self, op: &str, err: &StoreError) {
        warn!(table = E::SCHEMA.table, op, error = %err, "write failed");
        self.report(&format!("Failed to {} {}", op, E::SCHEMA.label));
    }
}

fn to_record<T: Serialize>(value: &T) -> Result<Record, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Record::new()),
    }
}

fn decode<E: Entity>(
    schema: &Schema,
    raw: &Record,
    now: chrono::DateTime<Utc>,
) -> Result<E, StoreError> {
    let normalized = schema.normalize(raw, now);
    Ok(serde_json::from_value(Value::Object(normalized))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CategoryPatch, NewCategory, DEFAULT_CATEGORY_COLOR};
    use crate::notify::{NoticeBus, NoticeLevel};
    use crate::records::wire::{FetchParams, FetchResponse, FieldError, RecordResponse};
    use crate::records::MockRecordBackend;
    use async_trait::async_trait;

    fn store() -> (RecordStore<Category>, NoticeBus) {
        let backend = Arc::new(MockRecordBackend::new().with_latency(0, 0));
        let bus = NoticeBus::default();
        (RecordStore::new(backend, Some(Arc::new(bus.clone()))), bus)
    }

    /// Backend that rejects every write with a field error.
    struct RejectingBackend;

    #[async_trait]
    impl RecordBackend for RejectingBackend {
        async fn fetch_records(
            &self,
            _table: &str,
            _params: &FetchParams,
        ) -> Result<FetchResponse, StoreError> {
            Ok(FetchResponse::failure("Table is locked"))
        }

        async fn get_record_by_id(
            &self,
            _table: &str,
            _id: i64,
            _params: &FetchParams,
        ) -> Result<RecordResponse, StoreError> {
            Ok(RecordResponse::failure("Table is locked"))
        }

        async fn create_records(
            &self,
            _table: &str,
            _records: Vec<Record>,
        ) -> Result<WriteResponse, StoreError> {
            Ok(WriteResponse::with_results(vec![RecordResult {
                success: false,
                message: Some("Invalid record".into()),
                errors: vec![FieldError {
                    field_label: "Name".into(),
                    message: "is too long".into(),
                }],
                ..Default::default()
            }]))
        }

        async fn update_records(
            &self,
            _table: &str,
            _records: Vec<Record>,
        ) -> Result<WriteResponse, StoreError> {
            Ok(WriteResponse::failure("Update disabled"))
        }

        async fn delete_records(
            &self,
            _table: &str,
            _ids: &[i64],
        ) -> Result<WriteResponse, StoreError> {
            Ok(WriteResponse::with_results(vec![RecordResult {
                success: false,
                message: Some("Record is locked".into()),
                ..Default::default()
            }]))
        }
    }

    #[tokio::test]
    async fn test_create_fills_defaults() {
        let (store, _bus) = store();
        let created = store
            .create(&NewCategory {
                name: "Home".into(),
                color: None,
            })
            .await
            .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.color, DEFAULT_CATEGORY_COLOR);
        assert_eq!(created.task_count, 0);
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let (store, _bus) = store();
        let err = store
            .update(
                42,
                &CategoryPatch {
                    name: Some("x".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 42, .. }));
    }

    #[tokio::test]
    async fn test_validation_failure_reports_each_field() {
        let bus = NoticeBus::default();
        let mut rx = bus.subscribe();
        let store: RecordStore<Category> =
            RecordStore::new(Arc::new(RejectingBackend), Some(Arc::new(bus)));

        let err = store
            .create(&NewCategory {
                name: "x".repeat(300),
                color: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));

        let first = rx.try_recv().unwrap();
        assert_eq!(first.level, NoticeLevel::Error);
        assert_eq!(first.message, "Name: is too long");
        assert_eq!(rx.try_recv().unwrap().message, "Invalid record");
    }

    #[tokio::test]
    async fn test_top_level_failure_is_rejected() {
        let store: RecordStore<Category> = RecordStore::new(Arc::new(RejectingBackend), None);
        let err = store
            .update(1, &CategoryPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(ref m) if m == "Update disabled"));
    }

    #[tokio::test]
    async fn test_reads_degrade_with_notice() {
        let bus = NoticeBus::default();
        let mut rx = bus.subscribe();
        let store: RecordStore<Category> =
            RecordStore::new(Arc::new(RejectingBackend), Some(Arc::new(bus)));

        assert!(store.get_all().await.is_empty());
        assert_eq!(rx.try_recv().unwrap().message, "Table is locked");
        assert!(store.get_by_id(1).await.is_none());
        assert!(store.try_get_all().await.is_err());
    }

    #[tokio::test]
    async fn test_delete_refused_is_false() {
        let store: RecordStore<Category> = RecordStore::new(Arc::new(RejectingBackend), None);
        assert!(!store.delete(3).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_many_counts_removed() {
        let (store, _bus) = store();
        for name in ["a", "b"] {
            store
                .create(&NewCategory {
                    name: name.into(),
                    color: None,
                })
                .await
                .unwrap();
        }
        assert_eq!(store.delete_many(&[1, 2, 3]).await.unwrap(), 2);
        assert_eq!(store.delete_many(&[]).await.unwrap(), 0);
        assert!(store.get_all().await.is_empty());
    }
}
