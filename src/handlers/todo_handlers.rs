use crate::auth::CurrentUser;
use crate::error::{AppError, Result};
use crate::extract::JsonOrForm;
use crate::middleware::csrf::{get_or_create_csrf_token, validate_csrf_form_field, CsrfError};
use crate::models::{CreateTodoRequest, GroupedTodos, Todo, TodoPayload, UpdateTodoPayload};
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::{header::ACCEPT, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Redirect, Response},
    Extension,
};
use chrono::{Local, NaiveDate};
use tower_sessions::Session;

struct TodoSection {
    id: &'static str,
    heading: &'static str,
    items: Vec<Todo>,
}

impl TodoSection {
    fn from_grouped(grouped: GroupedTodos) -> Vec<TodoSection> {
        vec![
            TodoSection {
                id: "overdue",
                heading: "Overdue",
                items: grouped.overdue,
            },
            TodoSection {
                id: "due-today",
                heading: "Due Today",
                items: grouped.due_today,
            },
            TodoSection {
                id: "due-later",
                heading: "Due Later",
                items: grouped.due_later,
            },
            TodoSection {
                id: "completed",
                heading: "Completed",
                items: grouped.completed,
            },
        ]
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "todos/index.html")]
struct TodosTemplate {
    first_name: String,
    csrf_token: String,
    error: Option<String>,
    today: NaiveDate,
    sections: Vec<TodoSection>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// JSON is only returned to clients that ask for it without also accepting HTML.
fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|accept| accept.contains("application/json") && !accept.contains("text/html"))
        .unwrap_or(false)
}

async fn render_todos_page(
    state: &AppState,
    user: &CurrentUser,
    session: &Session,
    error: Option<String>,
) -> Result<Response> {
    let today = today();
    let todos = state.todo_service.grouped_todos(user.id, today).await?;

    let csrf_token = get_or_create_csrf_token(session)
        .await
        .map_err(|_| AppError::InternalError)?;

    let template = TodosTemplate {
        first_name: user.first_name.clone(),
        csrf_token,
        error,
        today,
        sections: TodoSection::from_grouped(todos),
    };

    Ok(Html(template.render().map_err(|_| AppError::InternalError)?).into_response())
}

/// GET /todos - grouped todos as JSON or as the rendered page
pub async fn list_todos_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    session: Session,
    headers: HeaderMap,
) -> Result<Response> {
    if wants_json(&headers) {
        let grouped = state.todo_service.grouped_todos(user.id, today()).await?;
        return Ok(Json(grouped).into_response());
    }

    render_todos_page(&state, &user, &session, None).await
}

/// POST /todos - JSON clients get the created todo, form posts are redirected
pub async fn create_todo_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    session: Session,
    payload: JsonOrForm<TodoPayload>,
) -> Result<Response> {
    let from_form = payload.is_form();

    if from_form {
        let token = payload.value.csrf_token.as_deref().unwrap_or_default();
        if validate_csrf_form_field(&session, token).await.is_err() {
            return Ok(CsrfError {
                message: "invalid or missing form token".to_string(),
            }
            .into_response());
        }
    }

    let created = match CreateTodoRequest::try_from(payload.value) {
        Ok(request) => state.todo_service.create_todo(user.id, request).await,
        Err(e) => Err(e),
    };

    match created {
        Ok(todo) if from_form => {
            tracing::debug!("Created todo {} from form", todo.id);
            Ok(Redirect::to("/todos").into_response())
        }
        Ok(todo) => Ok(Json(todo).into_response()),
        Err(AppError::Validation(msg)) if from_form => {
            let page = render_todos_page(&state, &user, &session, Some(msg)).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Ids arrive as raw path segments so a malformed one gets the JSON error body.
fn parse_todo_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid todo id: {}", raw)))
}

/// GET /todos/{id}
pub async fn get_todo_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_todo_id(&id)?;
    let todo = state.todo_service.get_todo(id, user.id).await?;
    Ok(Json(todo).into_response())
}

/// Non-owners get a plain `false` instead of an error status.
fn todo_or_false(result: Result<Todo>) -> Response {
    match result {
        Ok(todo) => Json(todo).into_response(),
        Err(AppError::Forbidden) => Json(false).into_response(),
        Err(e) => e.into_response(),
    }
}

/// PUT /todos/{id}/markAsCompleted
pub async fn mark_as_completed_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_todo_id(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    todo_or_false(state.todo_service.mark_as_completed(id, user.id).await)
}

/// PUT /todos/{id} - set the completion flag to the given value
pub async fn update_todo_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    payload: JsonOrForm<UpdateTodoPayload>,
) -> Response {
    let id = match parse_todo_id(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let completed = match payload.value.completed {
        Some(completed) => completed,
        None => {
            return AppError::Validation("completed is required".to_string()).into_response()
        }
    };

    todo_or_false(
        state
            .todo_service
            .set_completion_status(id, user.id, completed)
            .await,
    )
}

/// DELETE /todos/{id} - `true` when removed, `false` otherwise
pub async fn delete_todo_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<bool>> {
    let Ok(id) = parse_todo_id(&id) else {
        return Ok(Json(false));
    };
    tracing::info!("User {} deleting todo {}", user.id, id);
    let deleted = state.todo_service.delete_todo(id, user.id).await?;
    Ok(Json(deleted))
}
