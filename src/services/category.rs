//! Category service

use super::traits::EntityService;
use super::require_text;
use crate::error::StoreError;
use crate::models::{Category, CategoryPatch, NewCategory};
use crate::notify::Notifier;
use crate::records::{RecordBackend, RecordStore};
use async_trait::async_trait;
use std::sync::Arc;

const NAME_REQUIRED: &str = "Category name is required";
const COLOR_INVALID: &str = "Color must be a hex value like #5B46F0";

/// Whether `color` is `#RGB` or `#RRGGBB`.
pub fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

#[derive(Clone, Debug)]
pub struct CategoryService {
    store: RecordStore<Category>,
}

impl CategoryService {
    pub fn new(backend: Arc<dyn RecordBackend>, notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self {
            store: RecordStore::new(backend, notifier),
        }
    }

    fn check_color(&self, color: &str) -> Result<(), StoreError> {
        if is_hex_color(color) {
            return Ok(());
        }
        if let Some(n) = self.store.notifier() {
            n.error(COLOR_INVALID);
        }
        Err(StoreError::invalid_field("color", COLOR_INVALID))
    }
}

#[async_trait]
impl EntityService for CategoryService {
    type Entity = Category;

    async fn get_all(&self) -> Vec<Category> {
        self.store.get_all().await
    }

    async fn try_get_all(&self) -> Result<Vec<Category>, StoreError> {
        self.store.try_get_all().await
    }

    async fn get_by_id(&self, id: i64) -> Option<Category> {
        self.store.get_by_id(id).await
    }

    async fn create(&self, input: &NewCategory) -> Result<Category, StoreError> {
        require_text(self.store.notifier(), "name", &input.name, NAME_REQUIRED)?;
        if let Some(ref color) = input.color {
            self.check_color(color)?;
        }
        self.store.create(input).await
    }

    async fn update(&self, id: i64, patch: &CategoryPatch) -> Result<Category, StoreError> {
        if let Some(ref name) = patch.name {
            require_text(self.store.notifier(), "name", name, NAME_REQUIRED)?;
        }
        if let Some(ref color) = patch.color {
            self.check_color(color)?;
        }
        self.store.update(id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        self.store.delete(id).await
    }
}
