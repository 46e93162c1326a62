use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::{SESSION_EMAIL, SESSION_FIRST_NAME, SESSION_USER_ID};

/// The signed-in user, placed in request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub first_name: String,
}

pub async fn require_auth(session: Session, mut request: Request, next: Next) -> Response {
    match session.get::<i64>(SESSION_USER_ID).await {
        Ok(Some(id)) => {
            let email = session
                .get::<String>(SESSION_EMAIL)
                .await
                .ok()
                .flatten()
                .unwrap_or_default();
            let first_name = session
                .get::<String>(SESSION_FIRST_NAME)
                .await
                .ok()
                .flatten()
                .unwrap_or_default();

            request.extensions_mut().insert(CurrentUser {
                id,
                email,
                first_name,
            });
            next.run(request).await
        }
        _ => Redirect::to("/login").into_response(),
    }
}

pub async fn redirect_if_authenticated(session: Session, request: Request, next: Next) -> Response {
    if let Ok(Some(_user_id)) = session.get::<i64>(SESSION_USER_ID).await {
        Redirect::to("/todos").into_response()
    } else {
        next.run(request).await
    }
}
