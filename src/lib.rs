pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use repositories::{SqliteTodoRepository, SqliteUserRepository};
use services::{AuthService, TodoService, UserService};
use std::sync::Arc;

/// Application context handed to the router. Built once at startup; the pool
/// is closed through [`AppState::close`] at shutdown.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub auth_service: Arc<AuthService>,
    pub todo_service: Arc<TodoService>,
    pub pool: sqlx::SqlitePool,
}

impl AppState {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
        let todo_repository = Arc::new(SqliteTodoRepository::new(pool.clone()));

        AppState {
            user_service: Arc::new(UserService::new(user_repository.clone())),
            auth_service: Arc::new(AuthService::new(user_repository)),
            todo_service: Arc::new(TodoService::new(todo_repository)),
            pool,
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
