//! RecordBackend trait definition
//!
//! The backend is an opaque, table-oriented record store. Implementations
//! return `Err` only when the call itself fails (network, HTTP fault,
//! unreadable body); a reachable backend that refuses a request answers
//! `Ok` with `success: false` or per-record failures, and the
//! [`RecordStore`](super::RecordStore) decides what that means.

use super::wire::{FetchParams, FetchResponse, Record, RecordResponse, WriteResponse};
use crate::error::StoreError;
use async_trait::async_trait;

/// Abstract interface over the record backend.
///
/// # Implementations
///
/// - [`HttpRecordBackend`](super::HttpRecordBackend): remote record service
/// - [`MockRecordBackend`](super::MockRecordBackend): in-memory tables with
///   simulated latency
#[async_trait]
pub trait RecordBackend: Send + Sync {
    /// Fetch records with a field selection, ordering and filter predicates.
    async fn fetch_records(
        &self,
        table: &str,
        params: &FetchParams,
    ) -> Result<FetchResponse, StoreError>;

    /// Fetch one record. A missing record is `data: None`, not an error.
    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        params: &FetchParams,
    ) -> Result<RecordResponse, StoreError>;

    /// Create records; the backend assigns identifiers.
    async fn create_records(
        &self,
        table: &str,
        records: Vec<Record>,
    ) -> Result<WriteResponse, StoreError>;

    /// Apply sparse updates. Each record carries its `Id`.
    async fn update_records(
        &self,
        table: &str,
        records: Vec<Record>,
    ) -> Result<WriteResponse, StoreError>;

    /// Delete records by identifier.
    async fn delete_records(&self, table: &str, ids: &[i64])
        -> Result<WriteResponse, StoreError>;
}
