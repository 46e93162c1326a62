pub mod home_handlers;
pub mod todo_handlers;

pub use home_handlers::index_handler;
pub use todo_handlers::{
    create_todo_handler, delete_todo_handler, get_todo_handler, list_todos_handler,
    mark_as_completed_handler, update_todo_handler,
};
