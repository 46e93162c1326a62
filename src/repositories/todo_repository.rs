use crate::error::Result;
use crate::models::{CreateTodoRequest, Todo};
use async_trait::async_trait;
use sqlx::SqlitePool;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait TodoRepository: Send + Sync {
    async fn create(&self, user_id: i64, request: CreateTodoRequest) -> Result<Todo>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>>;
    /// Ordered by due date, then insertion order.
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Todo>>;
    async fn set_completed(&self, id: i64, user_id: i64, completed: bool)
        -> Result<Option<Todo>>;
    async fn delete(&self, id: i64, user_id: i64) -> Result<bool>;
}

pub struct SqliteTodoRepository {
    pool: SqlitePool,
}

impl SqliteTodoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const TODO_COLUMNS: &str = "id, user_id, title, due_date, completed, created_at";

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn create(&self, user_id: i64, request: CreateTodoRequest) -> Result<Todo> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            r#"
            INSERT INTO todos (user_id, title, due_date, completed)
            VALUES (?, ?, ?, ?)
            RETURNING {}
            "#,
            TODO_COLUMNS
        ))
        .bind(user_id)
        .bind(&request.title)
        .bind(request.due_date)
        .bind(request.completed)
        .fetch_one(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>> {
        let todo =
            sqlx::query_as::<_, Todo>(&format!("SELECT {} FROM todos WHERE id = ?", TODO_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(todo)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Todo>> {
        let todos = sqlx::query_as::<_, Todo>(&format!(
            r#"
            SELECT {}
            FROM todos
            WHERE user_id = ?
            ORDER BY due_date ASC, id ASC
            "#,
            TODO_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    async fn set_completed(
        &self,
        id: i64,
        user_id: i64,
        completed: bool,
    ) -> Result<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            r#"
            UPDATE todos
            SET completed = ?
            WHERE id = ? AND user_id = ?
            RETURNING {}
            "#,
            TODO_COLUMNS
        ))
        .bind(completed)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn delete(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
