pub mod todo;
pub mod user;

pub use todo::{
    parse_due_date, CreateTodoRequest, GroupedTodos, Todo, TodoPayload, UpdateTodoPayload,
};
pub use user::{normalize_email, LoginForm, SignupForm, User};
