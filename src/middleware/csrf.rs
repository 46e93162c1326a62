use axum::{
    extract::Request,
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{debug, warn};
use uuid::Uuid;

pub const CSRF_TOKEN_KEY: &str = "csrf_token";
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// CSRF Token structure for session storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrfToken {
    pub value: String,
    pub created_at: i64,
}

impl CsrfToken {
    pub fn new() -> Self {
        Self {
            value: Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Tokens live for 24 hours.
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now - self.created_at > 86400
    }
}

impl Default for CsrfToken {
    fn default() -> Self {
        Self::new()
    }
}

fn token_prefix(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}

/// Generate a new CSRF token and store in session
pub async fn generate_csrf_token(
    session: &Session,
) -> Result<String, tower_sessions::session::Error> {
    let token = CsrfToken::new();
    let value = token.value.clone();

    session.insert(CSRF_TOKEN_KEY, token).await?;

    debug!("Generated new CSRF token: {}", token_prefix(&value));
    Ok(value)
}

/// Get or create a CSRF token for the session
pub async fn get_or_create_csrf_token(
    session: &Session,
) -> Result<String, tower_sessions::session::Error> {
    let token: Option<CsrfToken> = session.get(CSRF_TOKEN_KEY).await?;

    match token {
        Some(existing_token) if !existing_token.is_expired() => Ok(existing_token.value),
        _ => generate_csrf_token(session).await,
    }
}

async fn stored_token(session: &Session) -> Result<CsrfToken, StatusCode> {
    let stored: Option<CsrfToken> = session.get(CSRF_TOKEN_KEY).await.map_err(|e| {
        warn!("Failed to get CSRF token from session: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    match stored {
        Some(token) if token.is_expired() => {
            warn!("CSRF token expired");
            Err(StatusCode::FORBIDDEN)
        }
        Some(token) => Ok(token),
        None => {
            warn!("No CSRF token in session");
            Err(StatusCode::FORBIDDEN)
        }
    }
}

/// Form POSTs carry the token as the `csrf_token` field, which their handler
/// checks. Other methods have no form handler and must use the header.
fn is_form_post(request: &Request) -> bool {
    request.method() == Method::POST
        && request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false)
}

/// Validates CSRF tokens on state-changing requests.
///
/// Requests carrying the `X-CSRF-Token` header are checked here. Urlencoded
/// POSTs are passed through and validated by their handler through
/// [`validate_csrf_form_field`]. Any other unsafe request is rejected,
/// including form-encoded PUT and DELETE.
pub async fn csrf_validation_middleware(
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if matches!(method, Method::GET | Method::HEAD | Method::OPTIONS) {
        return Ok(next.run(request).await);
    }

    let provided_token = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    match provided_token {
        Some(token) => {
            let stored = stored_token(&session).await?;
            if token != stored.value {
                warn!(
                    "CSRF token mismatch for {} {}: expected {}, got {}",
                    method,
                    path,
                    token_prefix(&stored.value),
                    token_prefix(&token)
                );
                return Err(StatusCode::FORBIDDEN);
            }
            // Header tokens are not rotated; a page issues several requests with one token.
            Ok(next.run(request).await)
        }
        None if is_form_post(&request) => Ok(next.run(request).await),
        None => {
            warn!("Missing CSRF header for {} {}", method, path);
            Err(StatusCode::FORBIDDEN)
        }
    }
}

/// Helper function for handlers to validate CSRF tokens from form fields.
/// A valid token is rotated afterwards.
pub async fn validate_csrf_form_field(
    session: &Session,
    form_token: &str,
) -> Result<(), StatusCode> {
    let stored = stored_token(session).await?;

    if form_token != stored.value {
        warn!(
            "CSRF form token mismatch: expected {}, got {}",
            token_prefix(&stored.value),
            token_prefix(form_token)
        );
        return Err(StatusCode::FORBIDDEN);
    }

    if let Err(e) = generate_csrf_token(session).await {
        warn!("Failed to rotate CSRF token: {}", e);
    }

    Ok(())
}

/// Response wrapper to include CSRF error message
pub struct CsrfError {
    pub message: String,
}

impl IntoResponse for CsrfError {
    fn into_response(self) -> Response {
        (
            StatusCode::FORBIDDEN,
            format!("CSRF validation failed: {}", self.message),
        )
            .into_response()
    }
}
