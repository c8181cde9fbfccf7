//! In-memory task storage implementation
//!
//! Keeps tasks in a process-local map guarded by a single reader/writer
//! lock. Contents are lost when the process exits.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{next_update_stamp, NewTask, Task, TaskStatus, UpdateTask};
use super::repository::{Page, TaskRepository};
use crate::{Error, OpContext, Result};

/// Map-backed task store keyed by random UUIDs
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task<Uuid>>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskStore {
    type Id = Uuid;

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, ctx: &OpContext, task: NewTask) -> Result<Uuid> {
        ctx.check("create_task")?;
        task.validate()?;

        let now = Utc::now();
        let mut tasks = self.tasks.write().await;
        let mut id = Uuid::new_v4();
        while tasks.contains_key(&id) {
            id = Uuid::new_v4();
        }
        tasks.insert(
            id,
            Task {
                id,
                title: task.title,
                description: task.description,
                status: TaskStatus::New,
                created_at: now,
                updated_at: now,
            },
        );

        tracing::debug!(task_id = %id, "Task created");
        Ok(id)
    }

    async fn get(&self, ctx: &OpContext, id: Uuid) -> Result<Task<Uuid>> {
        ctx.check("get_task")?;

        let tasks = self.tasks.read().await;
        tasks.get(&id).cloned().ok_or_else(|| Error::task_not_found(id))
    }

    async fn list(&self, ctx: &OpContext, page: Page) -> Result<Vec<Task<Uuid>>> {
        ctx.check("list_tasks")?;

        let tasks = self.tasks.read().await;
        let mut all: Vec<&Task<Uuid>> = tasks.values().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
        Ok(all.into_iter().skip(offset).take(limit).cloned().collect())
    }

    async fn delete(&self, ctx: &OpContext, id: Uuid) -> Result<()> {
        ctx.check("delete_task")?;

        let removed = self.tasks.write().await.remove(&id).is_some();
        if removed {
            tracing::debug!(task_id = %id, "Task deleted");
        }
        Ok(())
    }

    async fn update(&self, ctx: &OpContext, id: Uuid, update: UpdateTask) -> Result<()> {
        ctx.check("update_task")?;
        update.validate()?;

        let status = update.normalized_status();
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&id).ok_or_else(|| Error::task_not_found(id))?;

        task.title = update.title;
        task.description = update.description;
        task.status = status;
        task.updated_at = next_update_stamp(task.updated_at);

        tracing::debug!(task_id = %id, status = %status, "Task updated");
        Ok(())
    }
}
