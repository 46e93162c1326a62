#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::SqlitePool;
use todoapp::{
    app::build_router,
    config::{
        session::{create_session_store, SessionConfig},
        Environment,
    },
    middleware::CSRF_HEADER,
    test_utils::test_helpers,
    AppState,
};
use tower::ServiceExt;

/// Drives the full router in-process, carrying the session cookie between
/// requests the way a browser would.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
    csrf_token: Option<String>,
    pub pool: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = test_helpers::create_test_db()
            .await
            .expect("test database to be created");
        let store = create_session_store(pool.clone())
            .await
            .expect("session store to be migrated");
        let session_layer =
            SessionConfig::for_environment(Environment::Development).create_layer(store);

        TestApp {
            router: build_router(AppState::new(pool.clone()), session_layer),
            cookie: None,
            csrf_token: None,
            pool,
        }
    }

    pub async fn send(&mut self, mut request: Request<Body>) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            request.headers_mut().insert(
                header::COOKIE,
                cookie.parse().expect("cookie to be a valid header"),
            );
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router to respond");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            let pair = set_cookie.split(';').next().unwrap_or_default().trim();
            let removed = pair.ends_with('=') || set_cookie.contains("Max-Age=0");
            self.cookie = if removed {
                None
            } else {
                Some(pair.to_string())
            };
        }

        response
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .uri(uri)
            .header(header::ACCEPT, "text/html")
            .body(Body::empty())
            .expect("request to build");
        self.send(request).await
    }

    pub async fn get_json(&mut self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .expect("request to build");
        let response = self.send(request).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let body = serde_urlencoded::to_string(fields).expect("form to encode");
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("request to build");
        self.send(request).await
    }

    /// Sends a JSON request with the current CSRF token in the header.
    pub async fn json_request(
        &mut self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &self.csrf_token {
            builder = builder.header(CSRF_HEADER, token.as_str());
        }
        let body = body.map(|b| b.to_string()).unwrap_or_default();
        let response = self
            .send(builder.body(Body::from(body)).expect("request to build"))
            .await;
        let status = response.status();
        (status, body_json(response).await)
    }

    /// Loads a page and remembers the CSRF token embedded in it.
    pub async fn load_csrf_token(&mut self, uri: &str) -> String {
        let response = self.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {} should render", uri);
        let html = body_text(response).await;
        let token = extract_csrf_token(&html).expect("page to carry a csrf token");
        self.csrf_token = Some(token.clone());
        token
    }

    pub async fn sign_up(&mut self, first_name: &str, email: &str, password: &str) -> Response<Body> {
        let token = self.load_csrf_token("/signup").await;
        let response = self
            .post_form(
                "/users",
                &[
                    ("firstName", first_name),
                    ("lastName", "Patel"),
                    ("email", email),
                    ("password", password),
                    ("csrf_token", &token),
                ],
            )
            .await;
        if response.status().is_redirection() {
            self.load_csrf_token("/todos").await;
        }
        response
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Response<Body> {
        let token = self.load_csrf_token("/login").await;
        let response = self
            .post_form(
                "/session",
                &[("email", email), ("password", password), ("csrf_token", &token)],
            )
            .await;
        if response.status().is_redirection() {
            self.load_csrf_token("/todos").await;
        }
        response
    }

    pub async fn sign_out(&mut self) -> Response<Body> {
        let response = self.get("/signout").await;
        self.csrf_token = None;
        response
    }
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body to be readable");
    String::from_utf8(bytes.to_vec()).expect("body to be utf-8")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let text = body_text(response).await;
    if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    }
}

pub fn extract_csrf_token(html: &str) -> Option<String> {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')?;
    Some(html[start..start + end].to_string())
}

pub fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}
