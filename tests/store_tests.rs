//! Record store behavior over the in-memory backend
//!
//! Run with: cargo test --test store_tests

use serde_json::{json, Value};
use std::sync::Arc;
use taskboard::error::ErrorKind;
use taskboard::models::{
    Category, NewCategory, NewStatistic, NewSubtask, NewTask, Priority, Statistic, Subtask,
    SubtaskPatch, Task, TaskPatch,
};
use taskboard::records::{MockRecordBackend, Record, RecordBackend, RecordStore};
use taskboard::services::{EntityService, SubtaskService, TaskService};

fn seeded() -> Arc<MockRecordBackend> {
    Arc::new(MockRecordBackend::seeded().unwrap().with_latency(0, 0))
}

fn store<E: taskboard::models::Entity>(backend: &Arc<MockRecordBackend>) -> RecordStore<E> {
    let backend: Arc<dyn RecordBackend> = backend.clone();
    RecordStore::new(backend, None)
}

#[tokio::test]
async fn test_seeded_lists_follow_schema_order() {
    let backend = seeded();

    let tasks = store::<Task>(&backend).get_all().await;
    assert!(tasks.len() > 1);
    assert!(tasks.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    let categories = store::<Category>(&backend).get_all().await;
    assert!(categories
        .windows(2)
        .all(|w| w[0].created_at <= w[1].created_at));

    let stats = store::<Statistic>(&backend).get_all().await;
    assert!(stats.windows(2).all(|w| w[0].date >= w[1].date));
}

#[tokio::test]
async fn test_create_then_get_all_has_one_new_entity() {
    let backend = seeded();
    let tasks = store::<Task>(&backend);

    let before = tasks.get_all().await;
    let max_before = before.iter().map(|t| t.id).max().unwrap();

    let created = tasks
        .create(&NewTask {
            title: "Renew passport".into(),
            category_id: Some(2),
            priority: Some(Priority::High),
            due_date: Some("2024-06-01".parse().unwrap()),
            notes: Some("Bring photos".into()),
        })
        .await
        .unwrap();
    assert!(created.id > max_before);

    let after = tasks.get_all().await;
    assert_eq!(after.len(), before.len() + 1);
    let matching: Vec<&Task> = after.iter().filter(|t| t.id == created.id).collect();
    assert_eq!(matching.len(), 1);
    let found = matching[0];
    assert_eq!(found, &created);
    assert_eq!(found.title, "Renew passport");
    assert_eq!(found.priority, Priority::High);
    assert!(!found.completed);
    assert!(found.completed_at.is_none());
}

#[tokio::test]
async fn test_create_for_every_entity_assigns_fresh_ids() {
    let backend = seeded();

    let categories = store::<Category>(&backend);
    let max = categories.get_all().await.iter().map(|c| c.id).max().unwrap();
    let category = categories
        .create(&NewCategory {
            name: "Hobbies".into(),
            color: Some("#EC4899".into()),
        })
        .await
        .unwrap();
    assert_eq!(category.id, max + 1);
    assert_eq!(category.task_count, 0);

    let subtasks = store::<Subtask>(&backend);
    let max = subtasks.get_all().await.iter().map(|s| s.id).max().unwrap();
    let subtask = subtasks
        .create(&NewSubtask {
            name: "Buy paint".into(),
            task_id: 1,
        })
        .await
        .unwrap();
    assert_eq!(subtask.id, max + 1);
    assert!(!subtask.completed);

    let stats = store::<Statistic>(&backend);
    let max = stats.get_all().await.iter().map(|s| s.id).max().unwrap();
    let stat = stats
        .create(&NewStatistic {
            name: Some("Weekly".into()),
            productivity_score: 70,
            tasks_completed: 7,
            time_spent: 210,
            date: Some("2024-03-10".parse().unwrap()),
            user_id: Some(1),
        })
        .await
        .unwrap();
    assert_eq!(stat.id, max + 1);
    assert_eq!(stat.user_id, Some(1));
}

#[tokio::test]
async fn test_update_changes_only_the_patched_field() {
    let backend = seeded();
    let tasks = store::<Task>(&backend);

    let before = tasks.get_by_id(1).await.unwrap();
    let updated = tasks
        .update(
            1,
            &TaskPatch {
                priority: Some(Priority::Low),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.priority, Priority::Low);
    let expected = Task {
        priority: Priority::Low,
        ..before.clone()
    };
    assert_eq!(updated, expected);
    assert_eq!(
        serde_json::to_value(tasks.get_by_id(1).await.unwrap()).unwrap(),
        serde_json::to_value(&expected).unwrap()
    );

    // Other records are untouched
    let others_before: Vec<Task> = tasks
        .get_all()
        .await
        .into_iter()
        .filter(|t| t.id != 1)
        .collect();
    tasks
        .update(
            1,
            &TaskPatch {
                notes: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let others_after: Vec<Task> = tasks
        .get_all()
        .await
        .into_iter()
        .filter(|t| t.id != 1)
        .collect();
    assert_eq!(others_before, others_after);
}

#[tokio::test]
async fn test_update_missing_fails_loudly() {
    let backend = seeded();
    let subtasks = store::<Subtask>(&backend);
    let err = subtasks
        .update(
            999,
            &SubtaskPatch {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_then_read_is_absent_every_time() {
    let backend = seeded();
    let categories = store::<Category>(&backend);

    assert!(categories.get_by_id(3).await.is_some());
    assert!(categories.delete(3).await.unwrap());

    for _ in 0..3 {
        assert!(categories.get_by_id(3).await.is_none());
    }
    assert!(categories.get_all().await.iter().all(|c| c.id != 3));

    let err = categories.delete(3).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_get_by_id_unknown_is_none() {
    let backend = seeded();
    assert!(store::<Task>(&backend).get_by_id(12345).await.is_none());
}

#[tokio::test]
async fn test_offline_reads_degrade_writes_fail() {
    let backend = seeded();
    let tasks = store::<Task>(&backend);
    backend.set_offline(true);

    assert!(tasks.get_all().await.is_empty());
    assert!(tasks.get_by_id(1).await.is_none());
    assert_eq!(
        tasks.try_get_all().await.unwrap_err().kind(),
        ErrorKind::Backend
    );
    let err = tasks.create(&NewTask::titled("offline")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Backend);
    assert!(tasks.delete(1).await.is_err());

    backend.set_offline(false);
    assert!(tasks.get_by_id(1).await.is_some());
}

#[tokio::test]
async fn test_task_delete_removes_its_subtasks() {
    let backend = seeded();
    let dyn_backend: Arc<dyn RecordBackend> = backend.clone();
    let tasks = TaskService::new(dyn_backend.clone(), None);
    let subtasks = SubtaskService::new(dyn_backend, None);

    assert!(!subtasks.get_by_task_id(3).await.is_empty());
    let unrelated = subtasks.get_by_task_id(1).await.len();

    assert!(tasks.delete(3).await.unwrap());
    assert!(subtasks.get_by_task_id(3).await.is_empty());
    assert_eq!(subtasks.get_by_task_id(1).await.len(), unrelated);
}

fn rows(values: Vec<Value>) -> Vec<Record> {
    values
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect()
}

#[tokio::test]
async fn test_blank_columns_read_as_defaults() {
    let backend = Arc::new(
        MockRecordBackend::new()
            .with_latency(0, 0)
            .with_table(
                "task",
                rows(vec![
                    json!({"Id": 1, "Name": "Valid", "priority": "high",
                           "dueDate": "2024-03-15", "CreatedOn": "2024-03-02T08:00:00Z"}),
                    json!({"Id": 2, "Name": "Blank", "priority": "", "dueDate": "",
                           "categoryId": "", "completedAt": "", "CreatedOn": "2024-03-01T08:00:00Z"}),
                ]),
            )
            .with_table(
                "statistic",
                rows(vec![
                    json!({"Id": 1, "Name": "Week 9", "productivityScore": 70, "date": "2024-03-01"}),
                    json!({"Id": 2, "Name": "", "productivityScore": 40, "date": ""}),
                ]),
            ),
    );

    let tasks = store::<Task>(&backend).get_all().await;
    assert_eq!(tasks.len(), 2);
    let blank = tasks.iter().find(|t| t.id == 2).unwrap();
    assert_eq!(blank.priority, Priority::Medium);
    assert!(blank.due_date.is_none());
    assert!(blank.category_id.is_none());
    assert!(blank.completed_at.is_none());

    let stats = store::<Statistic>(&backend).get_all().await;
    assert_eq!(stats.len(), 2);
    let blank = stats.iter().find(|s| s.id == 2).unwrap();
    assert!(blank.name.starts_with("Statistics "));
    assert_eq!(blank.productivity_score, 40);
}

#[tokio::test]
async fn test_undecodable_row_is_skipped_not_fatal() {
    let backend = Arc::new(MockRecordBackend::new().with_latency(0, 0).with_table(
        "task",
        rows(vec![
            json!({"Id": 1, "Name": "Fine", "CreatedOn": "2024-03-02T08:00:00Z"}),
            json!({"Id": 2, "Name": "Broken", "priority": "urgent", "CreatedOn": "2024-03-01T08:00:00Z"}),
        ]),
    ));

    let tasks = store::<Task>(&backend).try_get_all().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Fine");
}
