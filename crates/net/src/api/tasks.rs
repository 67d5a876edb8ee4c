//! Task endpoints

use taskdeck_core::{DayStat, StatEntry, Task, TaskRequest, TaskStats};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::paths;
use crate::client::HttpClient;
use crate::error::Result;

/// Task CRUD and statistics for the signed-in user
///
/// Ownership comes from the bearer token; ids are not checked here.
pub struct TaskApi<'a> {
    client: &'a HttpClient,
}

impl<'a> TaskApi<'a> {
    pub fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, cancel))]
    pub async fn list(&self, cancel: &CancellationToken) -> Result<Vec<Task>> {
        self.client.get(paths::TASKS, cancel).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn get(&self, id: i64, cancel: &CancellationToken) -> Result<Task> {
        self.client.get(&paths::task(id), cancel).await
    }

    #[instrument(skip(self, task, cancel), fields(title = %task.title))]
    pub async fn create(&self, task: &TaskRequest, cancel: &CancellationToken) -> Result<Task> {
        self.client.post(paths::TASKS, task, cancel).await
    }

    #[instrument(skip(self, task, cancel))]
    pub async fn update(
        &self,
        id: i64,
        task: &TaskRequest,
        cancel: &CancellationToken,
    ) -> Result<Task> {
        self.client.put(&paths::task(id), task, cancel).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn delete(&self, id: i64, cancel: &CancellationToken) -> Result<()> {
        self.client.delete(&paths::task(id), cancel).await
    }

    pub async fn stats(&self, cancel: &CancellationToken) -> Result<TaskStats> {
        self.client.get(paths::TASK_STATS, cancel).await
    }

    pub async fn status_stats(&self, cancel: &CancellationToken) -> Result<Vec<StatEntry>> {
        self.client.get(paths::TASK_STATUS_STATS, cancel).await
    }

    pub async fn priority_stats(&self, cancel: &CancellationToken) -> Result<Vec<StatEntry>> {
        self.client.get(paths::TASK_PRIORITY_STATS, cancel).await
    }

    pub async fn new_tasks_stats(&self, cancel: &CancellationToken) -> Result<Vec<DayStat>> {
        self.client.get(paths::TASK_NEW_STATS, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use taskdeck_core::{MemoryStore, TaskStatus, TokenStore};

    use crate::client::DEFAULT_TIMEOUT;
    use crate::test_support::spawn_backend;
    use crate::{Api, HttpClient};

    async fn signed_in_api() -> (Api, crate::test_support::StubBackend) {
        let backend = spawn_backend().await;
        backend.allow_token("abc", 1, "alice");
        let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
        tokens.save("abc").await.unwrap();
        let client = HttpClient::new(&backend.url, DEFAULT_TIMEOUT, tokens).unwrap();
        (Api::new(client), backend)
    }

    fn request(title: &str) -> taskdeck_core::TaskRequest {
        taskdeck_core::TaskRequest {
            title: title.to_string(),
            description: Some("desc".to_string()),
            status: TaskStatus::New,
            priority: 2,
            due_date: Some("2024-05-01T10:00:00".to_string()),
        }
    }

    #[tokio::test]
    async fn test_due_date_round_trip() {
        let (api, _backend) = signed_in_api().await;
        let cancel = tokio_util::sync::CancellationToken::new();

        let created = api.tasks().create(&request("report"), &cancel).await.unwrap();
        let fetched = api.tasks().get(created.id, &cancel).await.unwrap();

        assert_eq!(fetched.due_date.as_deref(), Some("2024-05-01T10:00:00"));
        assert_eq!(fetched.user_id, 1);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let (api, backend) = signed_in_api().await;
        let cancel = tokio_util::sync::CancellationToken::new();
        let tasks = api.tasks();

        let a = tasks.create(&request("a"), &cancel).await.unwrap();
        tasks.create(&request("b"), &cancel).await.unwrap();
        assert_eq!(tasks.list(&cancel).await.unwrap().len(), 2);

        let mut edit = taskdeck_core::TaskRequest::from(&a);
        edit.status = TaskStatus::Completed;
        let updated = tasks.update(a.id, &edit, &cancel).await.unwrap();
        assert_eq!(updated.task_status, TaskStatus::Completed);

        tasks.delete(a.id, &cancel).await.unwrap();
        assert_eq!(backend.task_count(), 1);

        let err = tasks.get(a.id, &cancel).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_stat_endpoints() {
        let (api, _backend) = signed_in_api().await;
        let cancel = tokio_util::sync::CancellationToken::new();
        let tasks = api.tasks();

        let stats = tasks.stats(&cancel).await.unwrap();
        assert!((stats.progress() - 0.3).abs() < f64::EPSILON);

        let status = tasks.status_stats(&cancel).await.unwrap();
        assert_eq!(status[1].name, "IN_PROGRESS");

        let priority = tasks.priority_stats(&cancel).await.unwrap();
        assert_eq!(priority[0].name, "1");

        let days = tasks.new_tasks_stats(&cancel).await.unwrap();
        assert_eq!(days[0].day, "Mon");
    }
}
