pub mod authorization;
pub mod handlers;
pub mod middleware;

pub use middleware::CurrentUser;

pub const SESSION_USER_ID: &str = "user_id";
pub const SESSION_EMAIL: &str = "email";
pub const SESSION_FIRST_NAME: &str = "first_name";
