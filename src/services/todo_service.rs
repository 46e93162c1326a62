use crate::auth::authorization::can_modify;
use crate::error::{AppError, Result};
use crate::models::{CreateTodoRequest, GroupedTodos, Todo};
use crate::repositories::TodoRepository;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct TodoService {
    repository: Arc<dyn TodoRepository>,
}

impl TodoService {
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_todo(&self, user_id: i64, request: CreateTodoRequest) -> Result<Todo> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        let request = CreateTodoRequest {
            title: title.to_string(),
            ..request
        };

        let todo = self.repository.create(user_id, request).await?;
        debug!("User {} created todo {}", user_id, todo.id);
        Ok(todo)
    }

    /// Fails with `NotFound` when the id is unknown and `Forbidden` when the
    /// todo belongs to someone else.
    pub async fn get_todo(&self, id: i64, requester_id: i64) -> Result<Todo> {
        let todo = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !can_modify(requester_id, &todo) {
            warn!(
                "User {} tried to access todo {} owned by {}",
                requester_id, id, todo.user_id
            );
            return Err(AppError::Forbidden);
        }

        Ok(todo)
    }

    pub async fn list_todos(&self, user_id: i64) -> Result<Vec<Todo>> {
        self.repository.list_by_user(user_id).await
    }

    pub async fn grouped_todos(&self, user_id: i64, today: NaiveDate) -> Result<GroupedTodos> {
        let todos = self.repository.list_by_user(user_id).await?;
        Ok(GroupedTodos::partition(todos, today))
    }

    /// Idempotent: marking an already completed todo returns it unchanged.
    pub async fn mark_as_completed(&self, id: i64, requester_id: i64) -> Result<Todo> {
        self.set_completion_status(id, requester_id, true).await
    }

    pub async fn set_completion_status(
        &self,
        id: i64,
        requester_id: i64,
        completed: bool,
    ) -> Result<Todo> {
        let todo = self.get_todo(id, requester_id).await?;

        self.repository
            .set_completed(todo.id, requester_id, completed)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Returns `false` instead of an error when the todo is missing or owned
    /// by another user; nothing is removed in that case.
    pub async fn delete_todo(&self, id: i64, requester_id: i64) -> Result<bool> {
        let todo = match self.repository.find_by_id(id).await? {
            Some(todo) => todo,
            None => return Ok(false),
        };

        if !can_modify(requester_id, &todo) {
            warn!(
                "User {} tried to delete todo {} owned by {}",
                requester_id, id, todo.user_id
            );
            return Ok(false);
        }

        self.repository.delete(id, requester_id).await
    }
}
