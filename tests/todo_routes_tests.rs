mod common;

use axum::http::{Method, StatusCode};
use common::{body_text, location, today, TestApp};
use serde_json::{json, Value};

fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .map(|items| items.iter().filter_map(|t| t["id"].as_i64()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_sign_up_then_sign_out_protects_todos() {
    let mut app = TestApp::new().await;

    let response = app.sign_up("Asha", "asha@example.com", "111").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/todos"));

    let response = app.get("/todos").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Asha"));

    let response = app.sign_out().await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/"));

    let response = app.get("/todos").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_signed_in_visitors_skip_guest_pages() {
    let mut app = TestApp::new().await;
    app.sign_up("Asha", "asha@example.com", "111").await;

    for uri in ["/", "/signup", "/login"] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "GET {}", uri);
        assert_eq!(location(&response).as_deref(), Some("/todos"));
    }
}

#[tokio::test]
async fn test_todo_lifecycle_for_owner() {
    let mut app = TestApp::new().await;
    app.sign_up("Asha", "asha@example.com", "111").await;

    let (status, created) = app
        .json_request(
            Method::POST,
            "/todos",
            Some(json!({ "title": "Buy milk", "dueDate": today(), "completed": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["title"], "Buy milk");
    assert_eq!(created["completed"], false);
    let id = created["id"].as_i64().expect("created todo to have an id");

    let (status, grouped) = app.get_json("/todos").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&grouped["dueToday"]), vec![id]);
    assert!(ids(&grouped["overdue"]).is_empty());
    assert!(ids(&grouped["dueLater"]).is_empty());

    let uri = format!("/todos/{}/markAsCompleted", id);
    let (status, completed) = app.json_request(Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["completed"], true);

    let (_, again) = app.json_request(Method::PUT, &uri, None).await;
    assert_eq!(again["completed"], true);

    let (status, reopened) = app
        .json_request(
            Method::PUT,
            &format!("/todos/{}", id),
            Some(json!({ "completed": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reopened["completed"], false);

    let (status, deleted) = app
        .json_request(Method::DELETE, &format!("/todos/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!(true));

    let (status, body) = app.get_json(&format!("/todos/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (_, deleted_again) = app
        .json_request(Method::DELETE, &format!("/todos/{}", id), None)
        .await;
    assert_eq!(deleted_again, json!(false));
}

#[tokio::test]
async fn test_non_owner_cannot_touch_todo() {
    let mut app = TestApp::new().await;
    app.sign_up("Owner", "owner@example.com", "111").await;
    let (_, created) = app
        .json_request(
            Method::POST,
            "/todos",
            Some(json!({ "title": "Private", "dueDate": "2099-01-01" })),
        )
        .await;
    let id = created["id"].as_i64().expect("created todo to have an id");
    app.sign_out().await;

    app.sign_up("Other", "other@example.com", "222").await;

    let (status, body) = app
        .json_request(Method::DELETE, &format!("/todos/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(false));

    let (_, body) = app
        .json_request(Method::PUT, &format!("/todos/{}/markAsCompleted", id), None)
        .await;
    assert_eq!(body, json!(false));

    let (_, body) = app
        .json_request(
            Method::PUT,
            &format!("/todos/{}", id),
            Some(json!({ "completed": true })),
        )
        .await;
    assert_eq!(body, json!(false));

    let (status, _) = app.get_json(&format!("/todos/{}", id)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, grouped) = app.get_json("/todos").await;
    assert!(ids(&grouped["dueLater"]).is_empty());

    app.sign_out().await;
    app.sign_in("owner@example.com", "111").await;

    let (status, todo) = app.get_json(&format!("/todos/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(todo["completed"], false);
    assert_eq!(todo["title"], "Private");
}

#[tokio::test]
async fn test_form_post_creates_and_redirects() {
    let mut app = TestApp::new().await;
    app.sign_up("Asha", "asha@example.com", "111").await;
    let token = app.load_csrf_token("/todos").await;

    let response = app
        .post_form(
            "/todos",
            &[("title", "Water plants"), ("dueDate", "2000-01-01"), ("csrf_token", &token)],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/todos"));

    let (_, grouped) = app.get_json("/todos").await;
    assert_eq!(grouped["overdue"][0]["title"], "Water plants");

    let response = app.get("/todos").await;
    let html = body_text(response).await;
    assert!(html.contains("Water plants"));
}

#[tokio::test]
async fn test_form_post_with_stale_token_is_rejected() {
    let mut app = TestApp::new().await;
    app.sign_up("Asha", "asha@example.com", "111").await;

    let response = app
        .post_form(
            "/todos",
            &[("title", "Sneaky"), ("dueDate", "2000-01-01"), ("csrf_token", "forged")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (_, grouped) = app.get_json("/todos").await;
    assert!(ids(&grouped["overdue"]).is_empty());
}

#[tokio::test]
async fn test_form_post_with_blank_title_rerenders_page() {
    let mut app = TestApp::new().await;
    app.sign_up("Asha", "asha@example.com", "111").await;
    let token = app.load_csrf_token("/todos").await;

    let response = app
        .post_form(
            "/todos",
            &[("title", "   "), ("dueDate", "2000-01-01"), ("csrf_token", &token)],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Title is required"));
}

#[tokio::test]
async fn test_json_mutation_requires_csrf_header() {
    let mut app = TestApp::new().await;
    let response = app.sign_up("Asha", "asha@example.com", "111").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    app.sign_out().await;
    app.sign_in("asha@example.com", "111").await;

    let body = json!({ "title": "No token", "dueDate": today() }).to_string();
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/todos")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body))
        .expect("request to build");
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let request = axum::http::Request::builder()
        .method(Method::DELETE)
        .uri("/todos/1")
        .header("X-CSRF-Token", "forged")
        .body(axum::body::Body::empty())
        .expect("request to build");
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (_, grouped) = app.get_json("/todos").await;
    assert!(ids(&grouped["dueToday"]).is_empty());
}

#[tokio::test]
async fn test_json_create_rejects_missing_fields() {
    let mut app = TestApp::new().await;
    app.sign_up("Asha", "asha@example.com", "111").await;

    let (status, body) = app
        .json_request(Method::POST, "/todos", Some(json!({ "dueDate": today() })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = app
        .json_request(
            Method::POST,
            "/todos",
            Some(json!({ "title": "Buy milk", "dueDate": "tomorrow" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json_request(Method::PUT, "/todos/1", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sign_in_errors_and_case_insensitive_email() {
    let mut app = TestApp::new().await;
    app.sign_up("Asha", "asha@example.com", "111").await;
    app.sign_out().await;

    let response = app.sign_in("asha@example.com", "wrong").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Invalid email or password"));

    let response = app.sign_in("nobody@example.com", "111").await;
    let html = body_text(response).await;
    assert!(html.contains("Invalid email or password"));

    let response = app.sign_in("ASHA@Example.com", "111").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/todos"));
}

#[tokio::test]
async fn test_sign_up_errors_rerender_form() {
    let mut app = TestApp::new().await;
    app.sign_up("Asha", "asha@example.com", "111").await;
    app.sign_out().await;

    let response = app.sign_up("Asha", "ASHA@example.com", "111").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Email already registered"));

    let response = app.sign_up("", "new@example.com", "111").await;
    let html = body_text(response).await;
    assert!(html.contains("First name can not be empty"));
    assert!(html.contains("new@example.com"));

    let response = app.sign_up("Nia", "not-an-email", "111").await;
    let html = body_text(response).await;
    assert!(html.contains("Please enter a valid email address"));

    let response = app.sign_up("Nia", "nia@example.com", "").await;
    let html = body_text(response).await;
    assert!(html.contains("Password can not be empty"));
}

#[tokio::test]
async fn test_security_headers_are_present() {
    let mut app = TestApp::new().await;
    let response = app.get("/login").await;

    let headers = response.headers();
    assert_eq!(
        headers.get("x-content-type-options").and_then(|v| v.to_str().ok()),
        Some("nosniff")
    );
    assert!(headers.get("x-frame-options").is_some());
}

fn form_request(
    method: Method,
    uri: &str,
    body: &str,
) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(body.to_string()))
        .expect("request to build")
}

#[tokio::test]
async fn test_mutations_without_token_are_rejected() {
    let mut app = TestApp::new().await;
    app.sign_up("Asha", "asha@example.com", "111").await;

    let (_, created) = app
        .json_request(
            Method::POST,
            "/todos",
            Some(json!({ "title": "Guarded", "dueDate": today() })),
        )
        .await;
    let id = created["id"].as_i64().expect("created todo to have an id");

    let attempts = [
        form_request(Method::PUT, &format!("/todos/{}", id), "completed=true"),
        form_request(Method::PUT, &format!("/todos/{}/markAsCompleted", id), ""),
        form_request(Method::DELETE, &format!("/todos/{}", id), ""),
        axum::http::Request::builder()
            .method(Method::PUT)
            .uri(format!("/todos/{}", id))
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{"completed":true}"#))
            .expect("request to build"),
        axum::http::Request::builder()
            .method(Method::PUT)
            .uri(format!("/todos/{}/markAsCompleted", id))
            .body(axum::body::Body::empty())
            .expect("request to build"),
    ];

    for request in attempts {
        let description = format!("{} {}", request.method(), request.uri());
        let response = app.send(request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", description);
    }

    let (status, todo) = app.get_json(&format!("/todos/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(todo["completed"], false);
}

#[tokio::test]
async fn test_malformed_ids_get_json_answers() {
    let mut app = TestApp::new().await;
    app.sign_up("Asha", "asha@example.com", "111").await;

    let (status, body) = app.get_json("/todos/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = app
        .json_request(Method::PUT, "/todos/abc/markAsCompleted", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = app.json_request(Method::DELETE, "/todos/abc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(false));
}
