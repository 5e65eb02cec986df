//! In-memory mock implementation of RecordBackend
//!
//! Tables are plain `Vec<Record>`s keyed by table name, seeded from the JSON
//! fixtures under `fixtures/`. Every call sleeps for a random delay in the
//! configured latency window before touching the data.

use super::traits::RecordBackend;
use super::wire::{
    FetchParams, FetchResponse, Record, RecordResponse, RecordResult, SortType, WriteResponse,
    ID_FIELD,
};
use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Default simulated latency window (milliseconds)
pub const DEFAULT_MIN_LATENCY_MS: u64 = 200;
pub const DEFAULT_MAX_LATENCY_MS: u64 = 400;

const FIXTURES: &[(&str, &str)] = &[
    ("task", include_str!("../../fixtures/tasks.json")),
    ("category", include_str!("../../fixtures/categories.json")),
    ("subtask", include_str!("../../fixtures/subtasks.json")),
    ("statistic", include_str!("../../fixtures/statistics.json")),
];

/// In-memory record backend.
///
/// Identifiers are assigned as `max(existing) + 1` per table (1 when the
/// table is empty). Unknown ids in update/delete come back as per-record
/// failures with code `NOT_FOUND`; a missing id in `get_record_by_id` is an
/// empty `data`.
///
/// # Example
///
/// ```rust
/// use taskboard::records::{MockRecordBackend, RecordBackend};
///
/// # tokio_test::block_on(async {
/// let backend = MockRecordBackend::seeded().unwrap().with_latency(0, 0);
/// let params = Default::default();
/// let resp = backend.fetch_records("category", &params).await.unwrap();
/// assert!(resp.success);
/// assert!(!resp.data.unwrap().is_empty());
/// # });
/// ```
pub struct MockRecordBackend {
    tables: RwLock<HashMap<String, Vec<Record>>>,
    min_latency_ms: u64,
    max_latency_ms: u64,
    offline: AtomicBool,
}

impl MockRecordBackend {
    /// Create a backend with no tables and the default latency window.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            min_latency_ms: DEFAULT_MIN_LATENCY_MS,
            max_latency_ms: DEFAULT_MAX_LATENCY_MS,
            offline: AtomicBool::new(false),
        }
    }

    /// Create a backend seeded from the bundled fixtures.
    pub fn seeded() -> Result<Self, StoreError> {
        let mut tables = HashMap::new();
        for (table, raw) in FIXTURES {
            let records: Vec<Record> = serde_json::from_str(raw)?;
            tables.insert(table.to_string(), records);
        }
        Ok(Self {
            tables: RwLock::new(tables),
            ..Self::new()
        })
    }

    /// Set the simulated latency window. `(0, 0)` disables the delay.
    pub fn with_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.min_latency_ms = min_ms;
        self.max_latency_ms = max_ms.max(min_ms);
        self
    }

    /// Replace (or add) one table.
    pub fn with_table(mut self, table: &str, records: Vec<Record>) -> Self {
        self.tables.get_mut().insert(table.to_string(), records);
        self
    }

    /// Make every subsequent call fail with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    /// Number of records currently held in `table`.
    pub async fn len(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map_or(0, Vec::len)
    }

    async fn simulate_network(&self) -> Result<(), StoreError> {
        if self.max_latency_ms > 0 {
            let ms = if self.min_latency_ms >= self.max_latency_ms {
                self.min_latency_ms
            } else {
                rand::random_range(self.min_latency_ms..=self.max_latency_ms)
            };
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Transport("backend offline".into()));
        }
        Ok(())
    }
}

impl Default for MockRecordBackend {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn record_id(record: &Record) -> Option<i64> {
    record.get(ID_FIELD).and_then(Value::as_i64)
}

fn next_id(records: &[Record]) -> i64 {
    records.iter().filter_map(record_id).max().unwrap_or(0) + 1
}

/// Keep only the selected fields. An empty selection keeps everything.
fn project(record: &Record, params: &FetchParams) -> Record {
    if params.fields.is_empty() {
        return record.clone();
    }
    params
        .fields
        .iter()
        .filter_map(|f| {
            record
                .get(&f.field.name)
                .map(|v| (f.field.name.clone(), v.clone()))
        })
        .collect()
}

/// Total order over JSON scalars: null < bool < number < string.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) | Value::Object(_) => 4,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn sort_records(records: &mut [Record], params: &FetchParams) {
    records.sort_by(|a, b| {
        for order in &params.order_by {
            let left = a.get(&order.field_name).unwrap_or(&Value::Null);
            let right = b.get(&order.field_name).unwrap_or(&Value::Null);
            let ord = match order.sorttype {
                SortType::Asc => compare_values(left, right),
                SortType::Desc => compare_values(right, left),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

// ---------------------------------------------------------------------------
// RecordBackend implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl RecordBackend for MockRecordBackend {
    async fn fetch_records(
        &self,
        table: &str,
        params: &FetchParams,
    ) -> Result<FetchResponse, StoreError> {
        self.simulate_network().await?;
        let tables = self.tables.read().await;
        let mut rows: Vec<Record> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| params.filters.iter().all(|w| w.matches(r)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sort_records(&mut rows, params);
        debug!(table, count = rows.len(), "mock fetch");
        Ok(FetchResponse::ok(
            rows.iter().map(|r| project(r, params)).collect(),
        ))
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        params: &FetchParams,
    ) -> Result<RecordResponse, StoreError> {
        self.simulate_network().await?;
        let tables = self.tables.read().await;
        let found = tables
            .get(table)
            .and_then(|rows| rows.iter().find(|r| record_id(r) == Some(id)));
        Ok(match found {
            Some(record) => RecordResponse::ok(project(record, params)),
            None => RecordResponse::empty(),
        })
    }

    async fn create_records(
        &self,
        table: &str,
        records: Vec<Record>,
    ) -> Result<WriteResponse, StoreError> {
        self.simulate_network().await?;
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        let mut results = Vec::with_capacity(records.len());
        for mut record in records {
            let id = next_id(rows);
            record.insert(ID_FIELD.to_string(), Value::from(id));
            debug!(table, id, "mock create");
            rows.push(record.clone());
            results.push(RecordResult::ok(record));
        }
        Ok(WriteResponse::with_results(results))
    }

    async fn update_records(
        &self,
        table: &str,
        records: Vec<Record>,
    ) -> Result<WriteResponse, StoreError> {
        self.simulate_network().await?;
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        let mut results = Vec::with_capacity(records.len());
        for patch in records {
            let Some(id) = record_id(&patch) else {
                results.push(RecordResult {
                    success: false,
                    message: Some("Record Id is required".to_string()),
                    ..Default::default()
                });
                continue;
            };
            match rows.iter_mut().find(|r| record_id(r) == Some(id)) {
                Some(existing) => {
                    for (key, value) in patch {
                        existing.insert(key, value);
                    }
                    debug!(table, id, "mock update");
                    results.push(RecordResult::ok(existing.clone()));
                }
                None => results.push(RecordResult::not_found(id)),
            }
        }
        Ok(WriteResponse::with_results(results))
    }

    async fn delete_records(
        &self,
        table: &str,
        ids: &[i64],
    ) -> Result<WriteResponse, StoreError> {
        self.simulate_network().await?;
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        let mut results = Vec::with_capacity(ids.len());
        for &id in ids {
            match rows.iter().position(|r| record_id(r) == Some(id)) {
                Some(index) => {
                    rows.remove(index);
                    debug!(table, id, "mock delete");
                    results.push(RecordResult::deleted());
                }
                None => results.push(RecordResult::not_found(id)),
            }
        }
        Ok(WriteResponse::with_results(results))
    }
}
