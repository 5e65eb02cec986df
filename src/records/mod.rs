//! Record store adapter
//!
//! Architecture follows the project pattern (trait + impl + mock):
//! - `RecordBackend` trait: the table-oriented backend operations
//! - `HttpRecordBackend`: remote record service over HTTP
//! - `MockRecordBackend`: in-memory tables seeded from fixtures
//! - `RecordStore<E>`: per-entity adapter doing field translation and
//!   failure policy on top of any backend

pub mod fields;
pub mod http;
pub mod mock;
pub mod store;
pub mod traits;
pub mod wire;

pub use fields::{FieldDefault, FieldSpec, Schema};
pub use http::HttpRecordBackend;
pub use mock::MockRecordBackend;
pub use store::RecordStore;
pub use traits::RecordBackend;
pub use wire::{Record, WhereClause};
