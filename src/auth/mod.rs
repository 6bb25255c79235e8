//! Password log-in, session cookies and the middleware that guards the merge pages.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod session;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_session_cookie, set_session_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::PasswordHash;
pub use session::Session;
