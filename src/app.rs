use crate::{
    auth::{self, middleware::redirect_if_authenticated, middleware::require_auth},
    config::session::SessionLayer,
    handlers,
    middleware::{add_security_headers, csrf_validation_middleware},
    AppState,
};
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub fn build_router(state: AppState, session_layer: SessionLayer) -> Router {
    let protected_routes = Router::new()
        .route(
            "/todos",
            get(handlers::list_todos_handler).post(handlers::create_todo_handler),
        )
        .route(
            "/todos/{id}",
            get(handlers::get_todo_handler)
                .put(handlers::update_todo_handler)
                .delete(handlers::delete_todo_handler),
        )
        .route(
            "/todos/{id}/markAsCompleted",
            put(handlers::mark_as_completed_handler),
        )
        .route("/signout", get(auth::handlers::logout_handler))
        .layer(middleware::from_fn(require_auth));

    let guest_routes = Router::new()
        .route("/signup", get(auth::handlers::signup_page))
        .route("/login", get(auth::handlers::login_page))
        .layer(middleware::from_fn(redirect_if_authenticated));

    Router::new()
        .route("/", get(handlers::index_handler))
        .route("/users", post(auth::handlers::signup_handler))
        .route("/session", post(auth::handlers::login_handler))
        .merge(guest_routes)
        .merge(protected_routes)
        .nest_service("/static", ServeDir::new("static"))
        .layer(middleware::from_fn(csrf_validation_middleware))
        .layer(session_layer)
        .layer(middleware::from_fn(add_security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
