use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub due_date: NaiveDate,
    pub completed: bool,
    pub created_at: NaiveDateTime,
}

impl Todo {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date < today && !self.completed
    }

    pub fn is_due_today(&self, today: NaiveDate) -> bool {
        self.due_date == today
    }

    pub fn is_due_later(&self, today: NaiveDate) -> bool {
        self.due_date > today
    }
}

/// Body of `POST /todos`, accepted either as JSON or as an urlencoded form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoPayload {
    pub title: Option<String>,
    #[serde(rename = "dueDate")]
    pub due_date: Option<String>,
    pub completed: Option<bool>,
    pub csrf_token: Option<String>,
}

/// Body of `PUT /todos/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodoPayload {
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTodoRequest {
    pub title: String,
    pub due_date: NaiveDate,
    pub completed: bool,
}

impl TryFrom<TodoPayload> for CreateTodoRequest {
    type Error = AppError;

    fn try_from(payload: TodoPayload) -> Result<Self, Self::Error> {
        let title = payload
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Validation("Title is required".to_string()))?;

        let raw_due_date = payload
            .due_date
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Due date is required".to_string()))?;

        let due_date = parse_due_date(&raw_due_date).ok_or_else(|| {
            AppError::Validation(format!("Invalid due date: {}", raw_due_date.trim()))
        })?;

        Ok(CreateTodoRequest {
            title,
            due_date,
            completed: payload.completed.unwrap_or(false),
        })
    }
}

/// Accepts a plain calendar date (`2024-05-01`) or an RFC 3339 timestamp,
/// whose date is taken in UTC.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

/// A user's todos split by due date relative to a given day.
///
/// `overdue` only holds unfinished items, while `due_today` and `due_later`
/// keep completed ones in place. Completed items that are past due land in
/// `completed`, so every todo ends up in exactly one list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedTodos {
    pub overdue: Vec<Todo>,
    pub due_today: Vec<Todo>,
    pub due_later: Vec<Todo>,
    pub completed: Vec<Todo>,
}

impl GroupedTodos {
    pub fn partition(mut todos: Vec<Todo>, today: NaiveDate) -> Self {
        todos.sort_by_key(|t| (t.due_date, t.id));

        let mut grouped = GroupedTodos::default();
        for todo in todos {
            if todo.is_due_today(today) {
                grouped.due_today.push(todo);
            } else if todo.is_due_later(today) {
                grouped.due_later.push(todo);
            } else if todo.is_overdue(today) {
                grouped.overdue.push(todo);
            } else {
                grouped.completed.push(todo);
            }
        }
        grouped
    }

    pub fn len(&self) -> usize {
        self.overdue.len() + self.due_today.len() + self.due_later.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
