//! Statistic service

use super::traits::EntityService;
use crate::error::StoreError;
use crate::models::{NewStatistic, Statistic, StatisticPatch};
use crate::notify::Notifier;
use crate::records::{RecordBackend, RecordStore};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct StatisticService {
    store: RecordStore<Statistic>,
}

impl StatisticService {
    pub fn new(backend: Arc<dyn RecordBackend>, notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self {
            store: RecordStore::new(backend, notifier),
        }
    }
}

#[async_trait]
impl EntityService for StatisticService {
    type Entity = Statistic;

    async fn get_all(&self) -> Vec<Statistic> {
        self.store.get_all().await
    }

    async fn try_get_all(&self) -> Result<Vec<Statistic>, StoreError> {
        self.store.try_get_all().await
    }

    async fn get_by_id(&self, id: i64) -> Option<Statistic> {
        self.store.get_by_id(id).await
    }

    async fn create(&self, input: &NewStatistic) -> Result<Statistic, StoreError> {
        self.store.create(input).await
    }

    async fn update(&self, id: i64, patch: &StatisticPatch) -> Result<Statistic, StoreError> {
        self.store.update(id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        self.store.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::MockRecordBackend;
    use chrono::Utc;

    #[tokio::test]
    async fn test_create_defaults_name_and_date() {
        let service = StatisticService::new(
            Arc::new(MockRecordBackend::new().with_latency(0, 0)),
            None,
        );
        let stat = service
            .create(&NewStatistic {
                productivity_score: 80,
                tasks_completed: 4,
                time_spent: 120,
                ..Default::default()
            })
            .await
            .unwrap();
        let today = Utc::now().date_naive();
        assert_eq!(stat.date, today);
        assert_eq!(stat.name, format!("Statistics {}", today));
        assert!(stat.user_id.is_none());
    }

    #[tokio::test]
    async fn test_listing_is_newest_date_first() {
        let service = StatisticService::new(
            Arc::new(MockRecordBackend::new().with_latency(0, 0)),
            None,
        );
        for day in ["2024-03-01", "2024-03-03", "2024-03-02"] {
            service
                .create(&NewStatistic {
                    date: Some(day.parse().unwrap()),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        let dates: Vec<String> = service
            .get_all()
            .await
            .iter()
            .map(|s| s.date.to_string())
            .collect();
        assert_eq!(dates, vec!["2024-03-03", "2024-03-02", "2024-03-01"]);
    }
}
