pub mod todo_repository;
pub mod user_repository;

pub use todo_repository::{SqliteTodoRepository, TodoRepository};
pub use user_repository::{SqliteUserRepository, UserRepository};
