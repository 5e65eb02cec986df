//! Error types for the record store and the state containers
//!
//! - `StoreError`: everything a service call can fail with
//! - `ErrorKind`: coarse classification (not-found / validation / backend)
//! - `HookError`: what a state container returns: a short, display-friendly
//!   message with the original `StoreError` kept as its source

use crate::records::wire::FieldError;
use std::fmt;
use thiserror::Error;

/// Boxed error used for transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Coarse error classification used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The requested identifier does not exist in the store.
    NotFound,
    /// The backend (or the client-side check) rejected one or more fields.
    Validation,
    /// Network or backend fault.
    Backend,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::Backend => "backend",
        };
        f.write_str(s)
    }
}

/// Errors produced by record backends, the record store and entity services.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("validation failed: {}", describe_validation(.message, .fields))]
    Validation {
        message: Option<String>,
        fields: Vec<FieldError>,
    },

    #[error("backend rejected request: {0}")]
    Rejected(String),

    #[error("backend did not delete {entity} {id}")]
    NotDeleted { entity: &'static str, id: i64 },

    #[error("backend returned no result for {op} on {entity}")]
    NoResult {
        entity: &'static str,
        op: &'static str,
    },

    #[error("transport failure: {0}")]
    Transport(#[source] BoxError),

    #[error("backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed record: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    /// Build a validation error for a single field.
    pub fn invalid_field(label: &str, message: &str) -> Self {
        StoreError::Validation {
            message: None,
            fields: vec![FieldError {
                field_label: label.to_string(),
                message: message.to_string(),
            }],
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::Validation { .. } => ErrorKind::Validation,
            StoreError::Rejected(_)
            | StoreError::NotDeleted { .. }
            | StoreError::NoResult { .. }
            | StoreError::Transport(_)
            | StoreError::Http { .. }
            | StoreError::Decode(_) => ErrorKind::Backend,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(Box::new(err))
    }
}

fn describe_validation(message: &Option<String>, fields: &[FieldError]) -> String {
    let mut parts: Vec<String> = fields
        .iter()
        .map(|f| format!("{}: {}", f.field_label, f.message))
        .collect();
    if let Some(m) = message {
        parts.insert(0, m.clone());
    }
    if parts.is_empty() {
        "rejected by backend".to_string()
    } else {
        parts.join("; ")
    }
}

/// The operation a state container was performing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Load,
    Add,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Load => "load",
            Action::Add => "add",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Error returned by state container mutations.
///
/// `Display` gives the short message shown to users ("failed to add task");
/// the underlying `StoreError` stays reachable through `source()` and
/// `kind()`.
#[derive(Debug, Error)]
#[error("failed to {action} {entity}")]
pub struct HookError {
    pub action: Action,
    pub entity: &'static str,
    #[source]
    pub source: StoreError,
}

impl HookError {
    pub fn new(action: Action, entity: &'static str, source: StoreError) -> Self {
        Self {
            action,
            entity,
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}
