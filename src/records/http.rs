//! Remote record backend over HTTP
//!
//! Endpoints, relative to the configured base URL:
//!
//! | operation         | request                                        |
//! |-------------------|------------------------------------------------|
//! | fetch records     | `POST   /tables/{table}/records/query`         |
//! | get record by id  | `POST   /tables/{table}/records/{id}/query`    |
//! | create records    | `POST   /tables/{table}/records`               |
//! | update records    | `PATCH  /tables/{table}/records`               |
//! | delete records    | `DELETE /tables/{table}/records`               |
//!
//! Every request carries `X-Project-Id` and, when a public key is
//! configured, `Authorization: Bearer <key>`.

use super::traits::RecordBackend;
use super::wire::{
    BackendResponse, DeleteParams, FetchParams, FetchResponse, Record, RecordResponse,
    WriteParams, WriteResponse,
};
use crate::error::StoreError;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the remote record service.
///
/// Cheaply cloneable (shares the reqwest client internally).
#[derive(Clone)]
pub struct HttpRecordBackend {
    client: reqwest::Client,
    base_url: String,
    project_id: Option<String>,
    public_key: Option<String>,
}

impl HttpRecordBackend {
    /// Create a backend client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Service root, e.g. `https://records.example.com/api`
    /// * `project_id` - Sent as `X-Project-Id` when present
    /// * `public_key` - Sent as a bearer token when present
    /// * `timeout` - Per-request timeout; `None` waits indefinitely
    pub fn new(
        base_url: impl Into<String>,
        project_id: Option<String>,
        public_key: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, StoreError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.filter(|p| !p.is_empty()),
            public_key: public_key.filter(|k| !k.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn records_url(&self, table: &str) -> String {
        format!("{}/tables/{}/records", self.base_url, table)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let mut req = self.client.request(method, url);
        if let Some(ref project_id) = self.project_id {
            req = req.header("X-Project-Id", project_id);
        }
        if let Some(ref key) = self.public_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }
        req
    }

    /// Send a request and parse the response envelope.
    ///
    /// Non-2xx responses whose body is still a valid envelope are returned
    /// as `Ok` so the store can surface the backend's own messages.
    async fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<BackendResponse<T>, StoreError> {
        let response = req.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "record service response");

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }
        match serde_json::from_str::<BackendResponse<T>>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) => Err(StoreError::Http {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

#[async_trait]
impl RecordBackend for HttpRecordBackend {
    async fn fetch_records(
        &self,
        table: &str,
        params: &FetchParams,
    ) -> Result<FetchResponse, StoreError> {
        let url = format!("{}/query", self.records_url(table));
        self.send(self.request(Method::POST, url).json(params)).await
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        params: &FetchParams,
    ) -> Result<RecordResponse, StoreError> {
        let url = format!("{}/{}/query", self.records_url(table), id);
        self.send(self.request(Method::POST, url).json(params)).await
    }

    async fn create_records(
        &self,
        table: &str,
        records: Vec<Record>,
    ) -> Result<WriteResponse, StoreError> {
        let body = WriteParams { records };
        self.send(self.request(Method::POST, self.records_url(table)).json(&body))
            .await
    }

    async fn update_records(
        &self,
        table: &str,
        records: Vec<Record>,
    ) -> Result<WriteResponse, StoreError> {
        let body = WriteParams { records };
        self.send(self.request(Method::PATCH, self.records_url(table)).json(&body))
            .await
    }

    async fn delete_records(
        &self,
        table: &str,
        ids: &[i64],
    ) -> Result<WriteResponse, StoreError> {
        let body = DeleteParams {
            record_ids: ids.to_vec(),
        };
        self.send(self.request(Method::DELETE, self.records_url(table)).json(&body))
            .await
    }
}
