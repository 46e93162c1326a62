use crate::middleware::csrf::{get_or_create_csrf_token, validate_csrf_form_field};
use crate::models::{LoginForm, SignupForm, User};
use crate::services::{AuthServiceError, CreateUserRequest, LoginRequest, UserServiceError};
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::{SESSION_EMAIL, SESSION_FIRST_NAME, SESSION_USER_ID};

#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
struct SignupTemplate {
    error: Option<String>,
    csrf_token: String,
    first_name: String,
    last_name: String,
    email: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    error: Option<String>,
    csrf_token: String,
}

async fn csrf_token_for(session: &Session) -> String {
    get_or_create_csrf_token(session)
        .await
        .unwrap_or_else(|_| String::from("error"))
}

/// Stores the user in the session under a fresh session id.
async fn establish_session(
    session: &Session,
    user: &User,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_ID, user.id).await?;
    session.insert(SESSION_EMAIL, &user.email).await?;
    session.insert(SESSION_FIRST_NAME, &user.first_name).await?;
    Ok(())
}

/// GET /signup
pub async fn signup_page(session: Session) -> Html<String> {
    let template = SignupTemplate {
        error: None,
        csrf_token: csrf_token_for(&session).await,
        first_name: String::new(),
        last_name: String::new(),
        email: String::new(),
    };
    Html(template.render().unwrap_or_else(|_| {
        "<html><body><h1>Error rendering signup page</h1></body></html>".to_string()
    }))
}

async fn signup_error(msg: &str, form: &SignupForm, session: &Session) -> Response {
    let template = SignupTemplate {
        error: Some(msg.to_string()),
        csrf_token: csrf_token_for(session).await,
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        email: form.email.clone(),
    };
    Html(
        template
            .render()
            .unwrap_or_else(|_| format!("<html><body><h1>Error: {}</h1></body></html>", msg)),
    )
    .into_response()
}

/// POST /users
pub async fn signup_handler(
    State(app_state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    if validate_csrf_form_field(&session, &form.csrf_token)
        .await
        .is_err()
    {
        return signup_error(
            "Invalid security token. Please refresh the page and try again.",
            &form,
            &session,
        )
        .await;
    }

    let request = CreateUserRequest {
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        email: form.email.clone(),
        password: form.password.clone(),
    };

    match app_state.user_service.create_user(request).await {
        Ok(user) => {
            if let Err(e) = establish_session(&session, &user).await {
                tracing::error!("Failed to create session after signup: {}", e);
                return Redirect::to("/login").into_response();
            }
            Redirect::to("/todos").into_response()
        }
        Err(err) => {
            let error_msg = match err {
                UserServiceError::MissingFirstName => "First name can not be empty",
                UserServiceError::InvalidEmail => "Please enter a valid email address",
                UserServiceError::MissingPassword => "Password can not be empty",
                UserServiceError::EmailTaken => "Email already registered",
                other => {
                    tracing::error!("Signup failed: {}", other);
                    "Registration failed. Please try again."
                }
            };
            signup_error(error_msg, &form, &session).await
        }
    }
}

/// GET /login
pub async fn login_page(session: Session) -> Html<String> {
    let template = LoginTemplate {
        error: None,
        csrf_token: csrf_token_for(&session).await,
    };
    Html(template.render().unwrap_or_else(|_| {
        "<html><body><h1>Error rendering login page</h1></body></html>".to_string()
    }))
}

async fn login_error(msg: &str, session: &Session) -> Response {
    let template = LoginTemplate {
        error: Some(msg.to_string()),
        csrf_token: csrf_token_for(session).await,
    };
    Html(
        template
            .render()
            .unwrap_or_else(|_| format!("<html><body><h1>Error: {}</h1></body></html>", msg)),
    )
    .into_response()
}

/// POST /session
pub async fn login_handler(
    State(app_state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    if validate_csrf_form_field(&session, &form.csrf_token)
        .await
        .is_err()
    {
        return login_error(
            "Invalid security token. Please refresh the page and try again.",
            &session,
        )
        .await;
    }

    let request = LoginRequest {
        email: form.email.clone(),
        password: form.password.clone(),
    };

    match app_state.auth_service.authenticate(request).await {
        Ok(user) => {
            if let Err(e) = establish_session(&session, &user).await {
                tracing::error!("Failed to create session: {}", e);
                return login_error("Failed to create session", &session).await;
            }
            tracing::info!("User {} signed in", user.id);
            Redirect::to("/todos").into_response()
        }
        Err(AuthServiceError::InvalidCredentials) => {
            login_error("Invalid email or password", &session).await
        }
        Err(err) => {
            tracing::error!("Login failed: {}", err);
            login_error("An error occurred. Please try again.", &session).await
        }
    }
}

/// GET /signout
pub async fn logout_handler(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    Redirect::to("/")
}
