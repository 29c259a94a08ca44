pub mod auth;
pub mod request_log;

pub use auth::RequireAdminKey;
pub use request_log::log_requests;
