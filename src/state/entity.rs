//! Generic cached-list state container

use crate::error::{Action, HookError, StoreError};
use crate::models::Entity;
use crate::notify::Notifier;
use crate::services::EntityService;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

type EntityOf<S> = <S as EntityService>::Entity;
type CreateOf<S> = <EntityOf<S> as Entity>::Create;
type PatchOf<S> = <EntityOf<S> as Entity>::Patch;

/// Point-in-time view of a state container.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<E> {
    pub items: Vec<E>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<E> Default for Snapshot<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// Cached entity list kept consistent with the last confirmed server state.
///
/// Mutations are pessimistic: the cache changes only after the service call
/// succeeds, and a failed call leaves it untouched. Each load takes a new
/// generation number; a load that finishes after a newer one started is
/// discarded, and so is the list of a load that overlapped a confirmed
/// mutation. Concurrent updates to the same id apply in completion order.
pub struct EntityState<S: EntityService> {
    service: Arc<S>,
    notifier: Option<Arc<dyn Notifier>>,
    inner: RwLock<Snapshot<EntityOf<S>>>,
    generation: AtomicU64,
    /// Bumped under the write lock by every confirmed mutation
    mutations: AtomicU64,
}

impl<S: EntityService> EntityState<S> {
    /// Create an empty, not yet loaded container.
    pub fn new(service: Arc<S>, notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self {
            service,
            notifier,
            inner: RwLock::new(Snapshot::default()),
            generation: AtomicU64::new(0),
            mutations: AtomicU64::new(0),
        }
    }

    /// Create a container and run the initial load.
    pub async fn activate(service: Arc<S>, notifier: Option<Arc<dyn Notifier>>) -> Self {
        let state = Self::new(service, notifier);
        state.reload().await;
        state
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    fn label(&self) -> &'static str {
        self.service.label()
    }

    pub(crate) fn notify_success(&self, message: &str) {
        if let Some(ref n) = self.notifier {
            n.success(message);
        }
    }

    /// Load the full list, replacing the cache.
    ///
    /// On failure the cache is kept and `error` holds the message.
    pub async fn reload(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mutations = self.mutations.load(Ordering::SeqCst);
        {
            let mut inner = self.inner.write().await;
            inner.loading = true;
            inner.error = None;
        }

        let result = self.service.try_get_all().await;

        let mut inner = self.inner.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(entity = self.label(), generation, "discarding stale load");
            return;
        }
        match result {
            Ok(_) if self.mutations.load(Ordering::SeqCst) != mutations => {
                debug!(
                    entity = self.label(),
                    generation,
                    "load overlapped a mutation, keeping cache"
                );
            }
            Ok(items) => {
                debug!(entity = self.label(), count = items.len(), "loaded");
                inner.items = items;
            }
            Err(e) => {
                warn!(entity = self.label(), error = %e, "load failed");
                if let Some(ref n) = self.notifier {
                    match e {
                        StoreError::Rejected(ref message) => n.error(message),
                        _ => n.error(&format!(
                            "Failed to load {}",
                            <EntityOf<S> as Entity>::SCHEMA.plural
                        )),
                    }
                }
                inner.error = Some(e.to_string());
            }
        }
        inner.loading = false;
    }

    pub async fn snapshot(&self) -> Snapshot<EntityOf<S>> {
        self.inner.read().await.clone()
    }

    pub async fn items(&self) -> Vec<EntityOf<S>> {
        self.inner.read().await.items.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.read().await.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.inner.read().await.error.clone()
    }

    /// Cached entity by id.
    pub async fn get(&self, id: i64) -> Option<EntityOf<S>> {
        self.inner
            .read()
            .await
            .items
            .iter()
            .find(|e| e.id() == id)
            .cloned()
    }

    /// Create an entity and append it to the cache.
    pub async fn add(&self, input: &CreateOf<S>) -> Result<EntityOf<S>, HookError> {
        let created = self
            .service
            .create(input)
            .await
            .map_err(|e| HookError::new(Action::Add, self.label(), e))?;
        {
            let mut inner = self.inner.write().await;
            inner.items.push(created.clone());
            self.mutations.fetch_add(1, Ordering::SeqCst);
        }
        self.notify_success(&format!("{} added", capitalize(self.label())));
        Ok(created)
    }

    /// Apply a sparse patch and replace the cached entity.
    pub async fn update(&self, id: i64, patch: &PatchOf<S>) -> Result<EntityOf<S>, HookError> {
        let updated = self.apply_update(id, patch).await?;
        self.notify_success(&format!("{} updated", capitalize(self.label())));
        Ok(updated)
    }

    pub(crate) async fn apply_update(
        &self,
        id: i64,
        patch: &PatchOf<S>,
    ) -> Result<EntityOf<S>, HookError> {
        let updated = self
            .service
            .update(id, patch)
            .await
            .map_err(|e| HookError::new(Action::Update, self.label(), e))?;
        let mut inner = self.inner.write().await;
        if let Some(slot) = inner.items.iter_mut().find(|e| e.id() == id) {
            *slot = updated.clone();
        }
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(updated)
    }

    /// Delete an entity and drop it from the cache.
    pub async fn remove(&self, id: i64) -> Result<(), HookError> {
        let deleted = self
            .service
            .delete(id)
            .await
            .map_err(|e| HookError::new(Action::Delete, self.label(), e))?;
        if !deleted {
            return Err(HookError::new(
                Action::Delete,
                self.label(),
                StoreError::NotDeleted {
                    entity: self.label(),
                    id,
                },
            ));
        }
        {
            let mut inner = self.inner.write().await;
            inner.items.retain(|e| e.id() != id);
            self.mutations.fetch_add(1, Ordering::SeqCst);
        }
        self.notify_success(&format!("{} deleted", capitalize(self.label())));
        Ok(())
    }
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
