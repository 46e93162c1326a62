use crate::auth::SESSION_USER_ID;
use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
struct IndexTemplate {}

/// GET / - landing page, or straight to the list when signed in
pub async fn index_handler(session: Session) -> Response {
    match session.get::<i64>(SESSION_USER_ID).await {
        Ok(Some(_)) => Redirect::to("/todos").into_response(),
        _ => IndexTemplate {}.into_response(),
    }
}
