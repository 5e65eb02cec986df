//! EntityService trait definition

use crate::error::StoreError;
use crate::models::Entity;
use async_trait::async_trait;

/// Consumer-facing CRUD API for one entity type.
///
/// Reads degrade (`get_all` → empty, `get_by_id` → `None`) and report a
/// notice; `try_get_all` surfaces the error instead. Writes return `Err`
/// whenever the change did not take effect.
#[async_trait]
pub trait EntityService: Send + Sync + 'static {
    type Entity: Entity;

    /// Human label used in messages ("task", "category", ...)
    fn label(&self) -> &'static str {
        <Self::Entity as Entity>::SCHEMA.label
    }

    async fn get_all(&self) -> Vec<Self::Entity>;

    async fn try_get_all(&self) -> Result<Vec<Self::Entity>, StoreError>;

    async fn get_by_id(&self, id: i64) -> Option<Self::Entity>;

    async fn create(
        &self,
        input: &<Self::Entity as Entity>::Create,
    ) -> Result<Self::Entity, StoreError>;

    async fn update(
        &self,
        id: i64,
        patch: &<Self::Entity as Entity>::Patch,
    ) -> Result<Self::Entity, StoreError>;

    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}
